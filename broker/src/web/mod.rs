pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::services::ToolService;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tools: Arc<ToolService>,
    pub store: Arc<CredentialStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, tools: Arc<ToolService>, store: Arc<CredentialStore>) -> Self {
        Self {
            config,
            tools,
            store,
        }
    }
}
