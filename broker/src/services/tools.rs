// Tool surface exposed to the calling agent
//
// Every call resolves the caller's session first, then either touches the
// credential store or goes through the dispatcher. Hard errors are turned
// into failed replies; nothing here returns an error to the host.

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{operations::SALES_ORDER, FieldValues};
use crate::constants::batch::SALES_ORDER_CORRELATION_FIELD;
use crate::credentials::CredentialStore;
use crate::services::dispatcher::Dispatcher;
use crate::session::{CallerContext, SessionResolver};

pub const SET_CREDENTIALS: &str = "set_sap_credentials";
pub const CHECK_CREDENTIALS: &str = "check_session_credentials";
pub const CLEAR_CREDENTIALS: &str = "clear_session_credentials";
pub const BATCH_SALES_ORDERS: &str = "batch_create_sales_orders";
pub const POOL_STATUS: &str = "get_thread_pool_status";

#[derive(Debug, Clone, Serialize)]
pub struct ToolParameter {
    pub name: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ToolParameter {
    const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ToolParameter>,
}

/// Text returned to the agent; `success` is false for any failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolReply {
    pub success: bool,
    pub text: String,
}

impl ToolReply {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    fn failed(text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
        }
    }

    fn pretty<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::ok(text),
            Err(e) => Self::failed(format!("Failed to serialize result: {}", e)),
        }
    }
}

pub struct ToolService {
    dispatcher: Arc<Dispatcher>,
    store: Arc<CredentialStore>,
}

impl ToolService {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<CredentialStore>) -> Self {
        Self { dispatcher, store }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn has_tool(&self, name: &str) -> bool {
        matches!(
            name,
            SET_CREDENTIALS | CHECK_CREDENTIALS | CLEAR_CREDENTIALS | BATCH_SALES_ORDERS | POOL_STATUS
        ) || self.dispatcher.catalog().find_by_name(name).is_some()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut tools = vec![
            ToolInfo {
                name: SET_CREDENTIALS,
                description: "Set the SAP credentials for the current session",
                parameters: vec![
                    ToolParameter::required("username"),
                    ToolParameter::required("password"),
                ],
            },
            ToolInfo {
                name: CHECK_CREDENTIALS,
                description: "Check whether the current session has credentials",
                parameters: Vec::new(),
            },
            ToolInfo {
                name: CLEAR_CREDENTIALS,
                description: "Remove the current session's credentials",
                parameters: Vec::new(),
            },
        ];

        tools.extend(self.dispatcher.catalog().iter().map(|op| ToolInfo {
            name: op.template.name,
            description: op.template.description,
            parameters: op
                .template
                .fields
                .iter()
                .map(|field| ToolParameter {
                    name: field.name,
                    required: field.is_required(),
                    default: field.default_value(),
                })
                .collect(),
        }));

        if self.dispatcher.catalog().get(SALES_ORDER).is_ok() {
            tools.push(ToolInfo {
                name: BATCH_SALES_ORDERS,
                description: "Create sales orders concurrently; results are tagged by CUST_PO",
                parameters: vec![ToolParameter::required("orders")],
            });
        }

        tools.push(ToolInfo {
            name: POOL_STATUS,
            description: "Report the worker pool configuration and counters",
            parameters: Vec::new(),
        });

        tools
    }

    pub async fn call(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
        context: Option<&CallerContext>,
    ) -> ToolReply {
        let session_id = SessionResolver::resolve(context);

        match name {
            SET_CREDENTIALS => self.set_credentials(&session_id, arguments),
            CHECK_CREDENTIALS => self.check_credentials(&session_id),
            CLEAR_CREDENTIALS => {
                self.store.clear(&session_id);
                ToolReply::ok(format!("Credentials cleared for session {}", session_id))
            }
            BATCH_SALES_ORDERS => self.batch_sales_orders(&session_id, arguments).await,
            POOL_STATUS => ToolReply::pretty(&self.dispatcher.status()),
            _ => self.invoke_operation(name, &session_id, arguments).await,
        }
    }

    fn set_credentials(&self, session_id: &str, arguments: &Map<String, Value>) -> ToolReply {
        let username = match string_argument(arguments, "username") {
            Ok(value) => value,
            Err(message) => return ToolReply::failed(message),
        };
        let password = match string_argument(arguments, "password") {
            Ok(value) => value,
            Err(message) => return ToolReply::failed(message),
        };

        self.store.set(session_id, username, password);
        ToolReply::ok(format!(
            "SAP credentials set for session {} (user: {})",
            session_id, username
        ))
    }

    fn check_credentials(&self, session_id: &str) -> ToolReply {
        match self.store.get(session_id) {
            Ok(pair) => ToolReply::ok(format!(
                "Session {} has credentials (user: {})",
                session_id, pair.user
            )),
            Err(_) => ToolReply::ok(format!("Session {} has no credentials set", session_id)),
        }
    }

    async fn batch_sales_orders(&self, session_id: &str, arguments: &Map<String, Value>) -> ToolReply {
        let Some(orders) = arguments.get("orders").and_then(Value::as_array) else {
            return ToolReply::failed("Argument 'orders' must be an array of objects");
        };

        let inputs: Vec<FieldValues> = orders
            .iter()
            .map(|order| match order.as_object() {
                Some(fields) => FieldValues::from_json(fields),
                None => FieldValues::new(),
            })
            .collect();

        match self
            .dispatcher
            .submit_batch(SALES_ORDER, session_id, inputs, SALES_ORDER_CORRELATION_FIELD)
            .await
        {
            Ok(records) => {
                let failed = records.iter().filter(|r| !r.success).count();
                info!(
                    "Batch for session {}: {} orders, {} failed",
                    session_id,
                    records.len(),
                    failed
                );
                ToolReply::pretty(&records)
            }
            Err(e) => ToolReply::failed(format!("Error: {}", e)),
        }
    }

    async fn invoke_operation(
        &self,
        name: &str,
        session_id: &str,
        arguments: &Map<String, Value>,
    ) -> ToolReply {
        let Some(code) = self.dispatcher.catalog().find_by_name(name).map(|op| op.code()) else {
            warn!("Unknown tool requested: {}", name);
            return ToolReply::failed(format!("Unknown tool '{}'", name));
        };

        let fields = FieldValues::from_json(arguments);
        match self.dispatcher.submit_one(code, session_id, fields).await {
            Ok(result) => ToolReply {
                success: result.success,
                text: result.to_string(),
            },
            Err(e) => ToolReply::failed(format!("Error: {}", e)),
        }
    }
}

fn string_argument<'a>(arguments: &'a Map<String, Value>, name: &str) -> Result<&'a str, String> {
    match arguments.get(name).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("Argument '{}' is required", name)),
    }
}
