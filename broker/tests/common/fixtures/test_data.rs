//! Wiring helpers shared by integration tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use broker::config::ServiceEndpoint;
use broker::http::PoolSettings;
use broker::{CredentialStore, Dispatcher, OperationCatalog, ToolService};

pub const TEST_USER: &str = "RFC_TEST";
pub const TEST_SECRET: &str = "s3cret";
/// `base64("RFC_TEST:s3cret")`
pub const TEST_BASIC_AUTH: &str = "Basic UkZDX1RFU1Q6czNjcmV0";

pub fn no_retry_pool() -> PoolSettings {
    PoolSettings {
        retries: 0,
        ..PoolSettings::default()
    }
}

/// Default transport retries left on, for checking what is never retried
pub fn retrying_pool() -> PoolSettings {
    PoolSettings {
        retries: 3,
        ..PoolSettings::default()
    }
}

pub fn dispatcher_for(
    services: &HashMap<String, ServiceEndpoint>,
    store: Arc<CredentialStore>,
    workers: usize,
    timeout: Duration,
) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(
        Arc::new(OperationCatalog::new(services)),
        store,
        workers,
        timeout,
        no_retry_pool(),
    ))
}

pub fn tool_service_for(
    services: &HashMap<String, ServiceEndpoint>,
    workers: usize,
) -> (Arc<ToolService>, Arc<CredentialStore>) {
    let store = Arc::new(CredentialStore::new());
    let dispatcher = dispatcher_for(services, store.clone(), workers, Duration::from_secs(5));
    (Arc::new(ToolService::new(dispatcher, store.clone())), store)
}
