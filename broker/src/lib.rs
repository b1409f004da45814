pub mod catalog;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod services;
pub mod session;
pub mod web;

// Re-export commonly used types
pub use catalog::{FieldValues, OperationCatalog};
pub use config::{Config, ConfigManager};
pub use credentials::{CredentialPair, CredentialStore};
pub use errors::{BrokerError, ConfigError};
pub use http::{InvocationOutcome, InvocationResult, OperationClient};
pub use services::{Dispatcher, ToolService};
pub use session::{CallerContext, SessionResolver};
