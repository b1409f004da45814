use super::{Config, SecretsLoader, ServiceConfigFile};
use anyhow::{anyhow, Result};
use glob::glob;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::constants::env;
use crate::credentials::CredentialPair;
use crate::errors::ConfigError;

const MAIN_CONFIG: &str = "main.toml";
const SECRETS_FILE: &str = "secrets.toml";

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    /// Load `<dir>/main.toml`, service files, secrets and environment overrides
    pub async fn new(config_dir: String) -> Result<Self> {
        Self::with_env(config_dir, |key| std::env::var(key).ok()).await
    }

    /// Same as [`ConfigManager::new`] with an explicit environment lookup
    pub async fn with_env<F>(config_dir: String, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_configuration(&config_dir).await?;
        apply_env_overrides(&mut config, &lookup)?;
        validate(&config)?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/{}", config_dir, MAIN_CONFIG);
        let main_config_content =
            fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: main_config_path.clone(),
                    reason: e.to_string(),
                })?;

        let mut config: Config =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::LoadFailed {
                path: main_config_path.clone(),
                reason: e.to_string(),
            })?;

        // Every other *.toml file may contribute service endpoints
        let pattern = format!("{}/*.toml", config_dir);
        let mut paths: Vec<_> = glob(&pattern)
            .map_err(|e| anyhow!("Glob pattern error: {}", e))?
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| anyhow!("Glob entry error: {}", e))?;
        paths.sort();

        for path in paths {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid filename"))?;

            if filename == MAIN_CONFIG || filename == SECRETS_FILE {
                continue;
            }

            debug!("Loading service config: {}", path.display());

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            let service_file: ServiceConfigFile =
                toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            for (code, endpoint) in service_file.services {
                if config.services.contains_key(&code) {
                    return Err(ConfigError::DuplicateService {
                        code,
                        path: path.display().to_string(),
                    }
                    .into());
                }
                config.services.insert(code, endpoint);
            }
        }

        let secrets = SecretsLoader::load(&Path::new(config_dir).join(SECRETS_FILE))?;
        config.default_credentials = secrets.default_credentials();

        info!(
            "Loaded {} services, max_workers={}, request_timeout={}s",
            config.services.len(),
            config.max_workers,
            config.request_timeout_seconds
        );

        Ok(config)
    }
}

/// Environment wins over files for worker count, timeout and default credentials
pub fn apply_env_overrides<F>(config: &mut Config, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(env::MAX_WORKERS) {
        config.max_workers = parse_env(env::MAX_WORKERS, &value)?;
    }

    if let Some(value) = lookup(env::REQUEST_TIMEOUT) {
        config.request_timeout_seconds = parse_env(env::REQUEST_TIMEOUT, &value)?;
    }

    let user = lookup(env::DEFAULT_USER).filter(|v| !v.is_empty());
    let password = lookup(env::DEFAULT_PASSWORD).filter(|v| !v.is_empty());
    match (user, password) {
        (Some(user), Some(password)) => {
            config.default_credentials = Some(CredentialPair::new(user, password));
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!(
                "Only one of {} / {} is set; both are needed for default credentials",
                env::DEFAULT_USER,
                env::DEFAULT_PASSWORD
            );
        }
        (None, None) => {}
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: key.to_string(),
        reason: format!("'{}' is not a valid number", value),
    })
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.max_workers == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_workers".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if config.request_timeout_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            field: "request_timeout_seconds".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if config.services.is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "services".to_string(),
        });
    }

    for (code, endpoint) in &config.services {
        reqwest::Url::parse(&endpoint.url).map_err(|e| ConfigError::InvalidValue {
            field: format!("services.{}.url", code),
            reason: e.to_string(),
        })?;
    }

    Ok(())
}
