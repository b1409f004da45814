//! Operation catalog
//!
//! Static request templates joined with the configured service endpoints.
//! A template whose service has no endpoint is left out of the catalog, so
//! invoking it fails with [`BrokerError::UnknownOperation`].

pub mod operations;
pub mod template;

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::ServiceEndpoint;
use crate::errors::BrokerError;

pub use operations::TEMPLATES;
pub use template::{FieldKind, FieldSpec, FieldValues, OperationTemplate};

/// A template bound to the endpoint it posts to
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub template: &'static OperationTemplate,
    pub endpoint: String,
    pub action: String,
}

impl OperationDescriptor {
    pub fn code(&self) -> &'static str {
        self.template.code
    }

    pub fn name(&self) -> &'static str {
        self.template.name
    }
}

#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    operations: Vec<OperationDescriptor>,
}

impl OperationCatalog {
    pub fn new(services: &HashMap<String, ServiceEndpoint>) -> Self {
        Self::from_templates(TEMPLATES, services)
    }

    pub fn from_templates(
        templates: &'static [OperationTemplate],
        services: &HashMap<String, ServiceEndpoint>,
    ) -> Self {
        let mut operations = Vec::with_capacity(templates.len());

        for template in templates {
            match services.get(template.service) {
                Some(endpoint) => {
                    debug!(
                        "Catalog: {} ({}) -> {}",
                        template.code, template.name, endpoint.url
                    );
                    operations.push(OperationDescriptor {
                        template,
                        endpoint: endpoint.url.clone(),
                        action: endpoint.action.clone(),
                    });
                }
                None => warn!(
                    "No endpoint configured for service {}; {} is unavailable",
                    template.service, template.name
                ),
            }
        }

        Self { operations }
    }

    pub fn get(&self, code: &str) -> Result<&OperationDescriptor, BrokerError> {
        self.operations
            .iter()
            .find(|op| op.template.code == code)
            .ok_or_else(|| BrokerError::UnknownOperation {
                code: code.to_string(),
            })
    }

    /// Look up by tool name, e.g. `create_sales_order`
    pub fn find_by_name(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.iter().find(|op| op.template.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services(codes: &[&str]) -> HashMap<String, ServiceEndpoint> {
        codes
            .iter()
            .map(|code| {
                (
                    code.to_string(),
                    ServiceEndpoint {
                        url: format!("https://erp.example.com/{}", code.to_lowercase()),
                        action: format!("urn:action:{}", code),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_full_catalog() {
        let catalog =
            OperationCatalog::new(&services(&["SO", "STO", "DN", "MAT", "SRC", "INF", "QTY"]));
        assert_eq!(catalog.len(), TEMPLATES.len());

        let so = catalog.get("SO").unwrap();
        assert_eq!(so.name(), "create_sales_order");
        assert_eq!(so.endpoint, "https://erp.example.com/so");
        assert_eq!(so.action, "urn:action:SO");

        // Both material views share one endpoint
        let sales = catalog.get("MAT_SALES").unwrap();
        let warehouse = catalog.get("MAT_WAREHOUSE").unwrap();
        assert_eq!(sales.endpoint, warehouse.endpoint);
    }

    #[test]
    fn test_unconfigured_service_is_unknown() {
        let catalog = OperationCatalog::new(&services(&["SO"]));
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("STO").unwrap_err(),
            BrokerError::UnknownOperation {
                code: "STO".to_string()
            }
        );
        assert!(catalog.get("NOPE").is_err());
    }

    #[test]
    fn test_find_by_name() {
        let catalog = OperationCatalog::new(&services(&["QTY"]));
        assert_eq!(
            catalog.find_by_name("change_kitting_qty").unwrap().code(),
            "QTY"
        );
        assert!(catalog.find_by_name("create_sales_order").is_none());
    }
}
