//! Test configuration builder writing a config directory to a temp dir

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_toml: Vec<String>,
    services: Vec<(String, String, String)>,
    extra_files: Vec<(String, String)>,
    secrets: Option<(String, String)>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_toml: Vec::new(),
            services: Vec::new(),
            extra_files: Vec::new(),
            secrets: None,
        }
    }

    /// Raw `key = value` line for main.toml
    pub fn with_setting(mut self, key: &str, value: &str) -> Self {
        self.main_toml.push(format!("{} = {}", key, value));
        self
    }

    pub fn with_service(mut self, code: &str, url: &str, action: &str) -> Self {
        self.services
            .push((code.to_string(), url.to_string(), action.to_string()));
        self
    }

    /// Additional file in the config directory, e.g. `material.toml`
    pub fn with_file(mut self, name: &str, content: &str) -> Self {
        self.extra_files.push((name.to_string(), content.to_string()));
        self
    }

    pub fn with_secrets(mut self, user: &str, password: &str) -> Self {
        self.secrets = Some((user.to_string(), password.to_string()));
        self
    }

    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        let mut main = self.main_toml.join("\n");
        main.push('\n');
        for (code, url, action) in &self.services {
            main.push_str(&format!(
                "\n[services.{}]\nurl = \"{}\"\naction = '{}'\n",
                code, url, action
            ));
        }
        fs::write(config_dir.join("main.toml"), main).expect("Failed to write main.toml");

        for (name, content) in &self.extra_files {
            fs::write(config_dir.join(name), content).expect("Failed to write config file");
        }

        if let Some((user, password)) = &self.secrets {
            fs::write(
                config_dir.join("secrets.toml"),
                format!(
                    "[default_credentials]\nuser = \"{}\"\npassword = \"{}\"\n",
                    user, password
                ),
            )
            .expect("Failed to write secrets.toml");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn dir(&self) -> String {
        self.config_dir.display().to_string()
    }
}
