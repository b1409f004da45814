//! Secrets loader for the process-wide default backend credentials.
//!
//! Secrets are stored in a separate TOML file (config/secrets.toml) that should
//! be excluded from version control. `SAP_USER` / `SAP_PASSWORD` in the
//! environment take precedence over the file.
//!
//! Example secrets.toml:
//! ```toml
//! [default_credentials]
//! user = "RFC_SERVICE"
//! password = "secret"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::credentials::CredentialPair;

#[derive(Debug, Deserialize)]
struct DefaultCredentials {
    user: String,
    password: String,
}

/// Structure matching the secrets.toml file format
#[derive(Debug, Deserialize, Default)]
struct SecretsFile {
    default_credentials: Option<DefaultCredentials>,
}

/// Loader for secrets from the secrets.toml file
pub struct SecretsLoader {
    secrets: SecretsFile,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            debug!("No secrets file at {:?}", secrets_path);
            return Ok(Self {
                secrets: SecretsFile::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        if secrets.default_credentials.is_some() {
            info!("Loaded default credentials from {:?}", secrets_path);
        }

        Ok(Self { secrets })
    }

    /// Default pair, if both user and password are non-empty
    pub fn default_credentials(&self) -> Option<CredentialPair> {
        self.secrets
            .default_credentials
            .as_ref()
            .filter(|c| !c.user.is_empty() && !c.password.is_empty())
            .map(|c| CredentialPair::new(&c.user, &c.password))
    }
}
