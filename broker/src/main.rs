use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use broker::constants::{defaults, env};
use broker::web::{start_web_server, AppState};
use broker::{ConfigManager, CredentialStore, Dispatcher, OperationCatalog, ToolService};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("broker=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting SAP operation broker");

    let config_dir =
        std::env::var(env::CONFIG_DIR).unwrap_or_else(|_| defaults::CONFIG_DIR.to_string());
    let config_manager = ConfigManager::new(config_dir.clone())
        .await
        .with_context(|| format!("Failed to load configuration from {}", config_dir))?;
    let config = config_manager.get_current_config();

    info!("==================================================");
    info!("Max workers:     {} (override with {})", config.max_workers, env::MAX_WORKERS);
    info!(
        "Request timeout: {}s (override with {})",
        config.request_timeout_seconds,
        env::REQUEST_TIMEOUT
    );
    info!(
        "Default credentials: {}",
        if config.default_credentials.is_some() {
            "configured"
        } else {
            "not configured, callers must use set_sap_credentials"
        }
    );
    info!("==================================================");

    let catalog = Arc::new(OperationCatalog::new(&config.services));
    info!("Operation catalog initialized with {} operations", catalog.len());

    let store = Arc::new(CredentialStore::with_default(
        config.default_credentials.clone(),
    ));

    let dispatcher = Arc::new(Dispatcher::from_config(&config, catalog, store.clone()));
    let tools = Arc::new(ToolService::new(dispatcher.clone(), store.clone()));

    let state = AppState::new(config, tools, store);
    start_web_server(state).await?;

    dispatcher.shutdown().await;
    Ok(())
}
