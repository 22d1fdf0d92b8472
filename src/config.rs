//! Client configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default base domain of the console
pub const DEFAULT_BASE_DOMAIN: &str = "https://glasnostic.com";

/// Connection settings and credentials for the console client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_domain")]
    pub base_domain: String,
    pub username: String,
    pub password: String,
}

fn default_base_domain() -> String {
    DEFAULT_BASE_DOMAIN.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_domain: default_base_domain(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl ClientConfig {
    /// Load from TOML file
    pub fn from_toml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path, e)))?;
        Self::from_toml(&content)
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("TOML parse error: {}", e)))
    }

    /// Generate sample config
    pub fn sample_toml() -> String {
        r#"# Glasnostic console client configuration
# Use the same credentials you use to sign in to https://glasnostic.com/signin
# base_domain = "https://glasnostic.com"
username = "user@example.com"
password = "changeme"
"#
        .into()
    }
}
