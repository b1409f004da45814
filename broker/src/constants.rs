//! Central repository for timeouts, pool limits and protocol constants
//!
//! Organized by category so the defaults used by configuration, the
//! connection layer and the SOAP codec live in one place.

use std::time::Duration;

/// HTTP transport constants for calls to the enterprise backend
pub mod http {
    use super::Duration;

    /// Timeout for establishing a TCP/TLS connection
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// How long an idle pooled connection is kept before being reclaimed
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Pause between connection-level retry attempts
    pub const RETRY_BACKOFF: Duration = Duration::from_millis(200);
}

/// Default configuration values
pub mod defaults {
    /// Default number of dispatcher workers (maximum concurrent remote calls)
    pub const MAX_WORKERS: usize = 100;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 300;

    /// Default connect timeout in seconds
    pub const CONNECT_TIMEOUT_SECONDS: u64 = 10;

    /// Maximum pooled connections kept per remote host, per worker
    pub const POOL_MAX_PER_HOST: usize = 20;

    /// Maximum pooled connections kept in total, per worker
    pub const POOL_MAX_TOTAL: usize = 20;

    /// Idle timeout for pooled connections in seconds
    pub const POOL_IDLE_TIMEOUT_SECONDS: u64 = 90;

    /// Automatic retries on connection-establishment failures
    pub const TRANSPORT_RETRIES: u32 = 3;

    pub const HOST: &str = "127.0.0.1";

    pub const PORT: u16 = 8096;

    /// Directory holding main.toml, service files and secrets.toml
    pub const CONFIG_DIR: &str = "config";
}

/// Environment variables that override file configuration
pub mod env {
    pub const CONFIG_DIR: &str = "BROKER_CONFIG_DIR";
    pub const MAX_WORKERS: &str = "SAP_MAX_WORKERS";
    pub const REQUEST_TIMEOUT: &str = "SAP_REQUEST_TIMEOUT";
    pub const DEFAULT_USER: &str = "SAP_USER";
    pub const DEFAULT_PASSWORD: &str = "SAP_PASSWORD";
}

/// Session identification
pub mod session {
    /// Identifier used when a call carries no caller context
    pub const DEFAULT_SESSION_ID: &str = "default";

    /// Prefix for identifiers derived from client parameters
    pub const CLIENT_PREFIX: &str = "client-";

    /// Prefix for identifiers derived from a request id
    pub const REQUEST_PREFIX: &str = "request-";
}

/// SOAP 1.1 envelope constants
pub mod soap {
    pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

    /// Namespace bound to the `urn:` prefix used by RFC function bodies
    pub const RFC_FUNCTIONS_NS: &str = "urn:sap-com:document:sap:rfc:functions";

    pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

    pub const ACCEPT: &str = "text/xml";

    pub const ACTION_HEADER: &str = "SOAPAction";
}

/// Batch submission constants
pub mod batch {
    /// Tag used when an element carries no correlation value
    pub const UNKNOWN_TAG: &str = "unknown";

    /// Correlation field for batched sales orders
    pub const SALES_ORDER_CORRELATION_FIELD: &str = "CUST_PO";
}
