//! Request-body templates and field resolution
//!
//! A template is an XML fragment with two kinds of placeholders:
//!
//! - `{FIELD}` is replaced by the escaped field value
//! - `{?FIELD}` becomes `<FIELD>value</FIELD>` when the value is non-empty
//!   and disappears otherwise (used for the optional `UUID` element)
//!
//! Empty strings count as absent, so a caller sending `""` for an optional
//! field gets the documented default.

use quick_xml::escape::escape;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::BrokerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// Number strictly greater than zero
    PositiveNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Default(&'static str),
    /// May stay empty
    Optional,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
}

impl FieldSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            requirement: Requirement::Required,
        }
    }

    pub const fn with_default(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            requirement: Requirement::Default(default),
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            requirement: Requirement::Optional,
        }
    }

    pub const fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_required(&self) -> bool {
        matches!(self.requirement, Requirement::Required)
    }

    pub fn default_value(&self) -> Option<&'static str> {
        match self.requirement {
            Requirement::Default(value) => Some(value),
            _ => None,
        }
    }
}

/// Field values after defaults, keyed by field name
pub type ResolvedFields = BTreeMap<&'static str, String>;

/// Hook that adjusts resolved values before substitution
pub type DeriveFn = fn(&mut ResolvedFields);

/// Static description of one remote operation's request body
pub struct OperationTemplate {
    /// Short catalog code, e.g. `SO`
    pub code: &'static str,
    /// Tool name exposed to the calling agent
    pub name: &'static str,
    pub description: &'static str,
    /// Code of the configured service endpoint this operation posts to
    pub service: &'static str,
    pub body: &'static str,
    pub fields: &'static [FieldSpec],
    pub derive: Option<DeriveFn>,
}

impl std::fmt::Debug for OperationTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationTemplate")
            .field("code", &self.code)
            .field("name", &self.name)
            .field("service", &self.service)
            .field("derive", &self.derive.is_some())
            .finish()
    }
}

impl OperationTemplate {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Apply defaults and validation, then run the derivation hook
    pub fn resolve(&self, values: &FieldValues) -> Result<ResolvedFields, BrokerError> {
        for supplied in values.names() {
            if self.field(supplied).is_none() {
                debug!("Ignoring unknown field {} for {}", supplied, self.name);
            }
        }

        let mut resolved = ResolvedFields::new();

        for spec in self.fields {
            let value = match (values.get(spec.name), spec.requirement) {
                (Some(value), _) => value.to_string(),
                (None, Requirement::Default(default)) => default.to_string(),
                (None, Requirement::Optional) => String::new(),
                (None, Requirement::Required) => {
                    return Err(BrokerError::MissingRequiredField {
                        operation: self.name.to_string(),
                        field: spec.name.to_string(),
                    })
                }
            };

            if !value.is_empty() {
                self.check_kind(spec, &value)?;
            }

            resolved.insert(spec.name, value);
        }

        if let Some(derive) = self.derive {
            derive(&mut resolved);
        }

        Ok(resolved)
    }

    fn check_kind(&self, spec: &FieldSpec, value: &str) -> Result<(), BrokerError> {
        let invalid = |reason: &str| BrokerError::InvalidField {
            operation: self.name.to_string(),
            field: spec.name.to_string(),
            reason: reason.to_string(),
        };

        match spec.kind {
            FieldKind::Text => Ok(()),
            FieldKind::Number | FieldKind::PositiveNumber => {
                let number: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid(&format!("'{}' is not a number", value)))?;
                if !number.is_finite() {
                    return Err(invalid(&format!("'{}' is not a finite number", value)));
                }
                if spec.kind == FieldKind::PositiveNumber && number <= 0.0 {
                    return Err(invalid(&format!("must be positive, got {}", value)));
                }
                Ok(())
            }
        }
    }

    /// Render the request body for the given caller values
    pub fn render(&self, values: &FieldValues) -> Result<String, BrokerError> {
        let resolved = self.resolve(values)?;
        Ok(substitute(self.body, &resolved))
    }

    /// Field names referenced by the body, in order of appearance
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.body;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + len];
            names.push(name.trim_start_matches('?'));
            rest = &rest[start + len + 1..];
        }
        names
    }
}

fn substitute(body: &str, resolved: &ResolvedFields) -> String {
    let mut out = String::with_capacity(body.len() + 64);
    let mut rest = body;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let placeholder = &rest[start + 1..start + len];
        match placeholder.strip_prefix('?') {
            Some(name) => {
                let value = resolved.get(name).map(String::as_str).unwrap_or("");
                if !value.is_empty() {
                    out.push_str(&format!("<{name}>{}</{name}>", escape(value)));
                }
            }
            None => {
                let value = resolved.get(placeholder).map(String::as_str).unwrap_or("");
                out.push_str(&escape(value));
            }
        }

        rest = &rest[start + len + 1..];
    }

    out.push_str(rest);
    out
}

/// Caller-supplied field values. Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: BTreeMap<String, String>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Non-empty value for the field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Convert a JSON object; numbers keep their JSON text, null becomes empty
    pub fn from_json(map: &Map<String, Value>) -> Self {
        let values = map
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::Null => String::new(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect();
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
