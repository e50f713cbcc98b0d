use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{AssessmentError, Result};
use crate::models::is_json;

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Tool server registry, keyed by server id (`nmap-mcp`, `zap-mcp`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,
    #[serde(default = "default_timeout")]
    pub default_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_enabled() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            servers: BTreeMap::new(),
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssessmentError::config(format!(
                "cannot read gateway config {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::parse(&content, is_json(path)).map_err(|e| {
            AssessmentError::config(format!("invalid gateway config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else if content.trim().is_empty() {
            Ok(Self::default())
        } else {
            Ok(serde_yaml::from_str(content)?)
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, server) in &self.servers {
            let url = server.url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AssessmentError::config(format!(
                    "server '{}' has invalid url '{}'",
                    name, server.url
                )));
            }
        }
        Ok(())
    }

    pub fn with_server(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.servers.insert(
            name.into(),
            ServerConfig {
                url: url.into(),
                timeout_secs: None,
                enabled: true,
            },
        );
        self
    }

    pub fn timeout_for(&self, server: &ServerConfig) -> u64 {
        server.timeout_secs.unwrap_or(self.default_timeout_secs)
    }
}
