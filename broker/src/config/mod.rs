pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::constants::defaults;
use crate::credentials::CredentialPair;
use crate::http::PoolSettings;

pub use manager::ConfigManager;
pub use secrets::SecretsLoader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_pool_max_per_host")]
    pub pool_max_per_host: usize,
    #[serde(default = "default_pool_max_total")]
    pub pool_max_total: usize,
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout_seconds: u64,
    #[serde(default = "default_transport_retries")]
    pub transport_retries: u32,
    // Backends commonly run with self-signed certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub services: HashMap<String, ServiceEndpoint>,
    // Populated from secrets.toml and the environment
    #[serde(skip)]
    pub default_credentials: Option<CredentialPair>,
}

/// One remote web service: where to POST and which SOAP action to announce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub url: String,
    pub action: String,
}

/// Additional `*.toml` files in the config directory contribute services only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfigFile {
    #[serde(default)]
    pub services: HashMap<String, ServiceEndpoint>,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_per_host: self.pool_max_per_host,
            max_total: self.pool_max_total,
            idle_timeout: Duration::from_secs(self.pool_idle_timeout_seconds),
            connect_timeout: Duration::from_secs(self.connect_timeout_seconds),
            retries: self.transport_retries,
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_workers: default_max_workers(),
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            pool_max_per_host: default_pool_max_per_host(),
            pool_max_total: default_pool_max_total(),
            pool_idle_timeout_seconds: default_pool_idle_timeout(),
            transport_retries: default_transport_retries(),
            accept_invalid_certs: false,
            services: HashMap::new(),
            default_credentials: None,
        }
    }
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_max_workers() -> usize {
    defaults::MAX_WORKERS
}

fn default_request_timeout() -> u64 {
    defaults::REQUEST_TIMEOUT_SECONDS
}

fn default_connect_timeout() -> u64 {
    defaults::CONNECT_TIMEOUT_SECONDS
}

fn default_pool_max_per_host() -> usize {
    defaults::POOL_MAX_PER_HOST
}

fn default_pool_max_total() -> usize {
    defaults::POOL_MAX_TOTAL
}

fn default_pool_idle_timeout() -> u64 {
    defaults::POOL_IDLE_TIMEOUT_SECONDS
}

fn default_transport_retries() -> u32 {
    defaults::TRANSPORT_RETRIES
}
