//! Custom error types for the operation broker
//!
//! Hard failures only. Transport and remote-side failures are not errors:
//! they are carried as data in [`crate::http::InvocationOutcome`] so that a
//! batch never aborts because one element could not reach the backend.

use std::fmt;

/// Main error type for the broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// The session has neither explicit nor default credentials
    CredentialsNotFound { session_id: String },

    /// The operation code is not part of the catalog
    UnknownOperation { code: String },

    /// A required field was absent or empty and has no default
    MissingRequiredField { operation: String, field: String },

    /// A field value failed validation (e.g. a non-positive quantity)
    InvalidField {
        operation: String,
        field: String,
        reason: String,
    },

    /// The dispatcher queue is closed
    DispatcherUnavailable,

    /// Configuration errors
    Config(ConfigError),
}

/// Configuration error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// The same service code is defined twice
    DuplicateService { code: String, path: String },
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerError::CredentialsNotFound { session_id } => write!(
                f,
                "No credentials found for session {} and no default credentials are configured. \
                 Call set_sap_credentials first.",
                session_id
            ),
            BrokerError::UnknownOperation { code } => {
                write!(f, "Unknown operation '{}'", code)
            }
            BrokerError::MissingRequiredField { operation, field } => {
                write!(f, "Missing required field '{}' for {}", field, operation)
            }
            BrokerError::InvalidField {
                operation,
                field,
                reason,
            } => write!(f, "Invalid value for '{}' in {}: {}", field, operation, reason),
            BrokerError::DispatcherUnavailable => {
                write!(f, "Dispatcher is shut down and no longer accepts work")
            }
            BrokerError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::DuplicateService { code, path } => {
                write!(f, "Service '{}' defined again in '{}'", code, path)
            }
        }
    }
}

impl std::error::Error for BrokerError {}
impl std::error::Error for ConfigError {}

impl From<ConfigError> for BrokerError {
    fn from(err: ConfigError) -> Self {
        BrokerError::Config(err)
    }
}

impl BrokerError {
    /// Caller-side input problems, as opposed to setup problems
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BrokerError::MissingRequiredField { .. } | BrokerError::InvalidField { .. }
        )
    }
}
