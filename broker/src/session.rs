//! Session identification from caller context
//!
//! A session id keys all per-caller state. When the host supplies client
//! parameters they are hashed into a stable UUIDv5; otherwise a request id
//! is used; otherwise every caller lands on the shared sentinel session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::constants::session::{CLIENT_PREFIX, DEFAULT_SESSION_ID, REQUEST_PREFIX};

/// Attributes the hosting surface knows about the caller at call time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerContext {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub client_params: Option<Value>,
}

impl CallerContext {
    pub fn with_client_params(client_params: Value) -> Self {
        Self {
            request_id: None,
            client_params: Some(client_params),
        }
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            client_params: None,
        }
    }
}

pub struct SessionResolver;

impl SessionResolver {
    pub fn resolve(context: Option<&CallerContext>) -> String {
        let Some(context) = context else {
            return DEFAULT_SESSION_ID.to_string();
        };

        if let Some(params) = context.client_params.as_ref().filter(|p| !is_empty(p)) {
            // serde_json maps are ordered, so equal params serialize identically
            let canonical = params.to_string();
            let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, canonical.as_bytes());
            return format!("{}{}", CLIENT_PREFIX, id);
        }

        match context.request_id.as_deref() {
            Some(request_id) if !request_id.trim().is_empty() => {
                format!("{}{}", REQUEST_PREFIX, request_id.trim())
            }
            _ => DEFAULT_SESSION_ID.to_string(),
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
