use std::path::Path;
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::protocol::DEFAULT_NAMESPACE;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub udp: UdpConfig,
    #[serde(default)]
    pub tcp: TcpConfig,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UdpConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_udp_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TcpConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_tcp_listen")]
    pub listen: String,
}

/// One fixture entry answered by every channel
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub version: Option<String>,
    pub address: String,
    pub node_name: String,
}

fn default_http_listen() -> String {
    "[::]:8080".to_string()
}

fn default_udp_listen() -> String {
    "0.0.0.0:8081".to_string()
}

fn default_tcp_listen() -> String {
    "0.0.0.0:8082".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_http_listen(),
        }
    }
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            listen: default_udp_listen(),
        }
    }
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            listen: default_tcp_listen(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
