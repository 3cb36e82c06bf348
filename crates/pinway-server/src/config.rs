use std::net::SocketAddr;
use std::path::Path;

use pinway_store::NodeConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Prefix every route is mounted under; empty or `/` mounts at the root.
    pub base_path: String,
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            base_path: "/ipfs".into(),
            max_upload_size: 100 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `base_path` with a leading slash and no trailing one; empty for root.
    pub fn normalized_base_path(&self) -> String {
        let trimmed = self.base_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

/// Whole-process configuration, as read from a TOML file.
///
/// ```toml
/// [server]
/// bind_addr = "0.0.0.0:8080"
/// base_path = "/ipfs"
///
/// [node]
/// multiaddr = "/ip4/127.0.0.1/tcp/5001"
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PinwayConfig {
    pub server: ServerConfig,
    pub node: NodeConfig,
}

impl PinwayConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
