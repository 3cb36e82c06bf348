use multiaddr::{Multiaddr, Protocol};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Where the storage node's RPC API lives and how to talk to it.
///
/// A non-blank `multiaddr` wins over `host`/`port`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub multiaddr: Option<String>,
    pub use_https: bool,
    pub timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5001,
            multiaddr: None,
            use_https: false,
            timeout_secs: 60,
        }
    }
}

impl NodeConfig {
    /// Base URL of the RPC API, without a trailing slash.
    pub fn base_url(&self) -> StoreResult<String> {
        match self.multiaddr.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => url_from_multiaddr(addr, self.use_https),
            _ => {
                if self.host.trim().is_empty() {
                    return Err(StoreError::InvalidAddress("empty host".into()));
                }
                let scheme = if self.use_https { "https" } else { "http" };
                Ok(format!("{scheme}://{}:{}", self.host.trim(), self.port))
            }
        }
    }
}

fn url_from_multiaddr(text: &str, use_https: bool) -> StoreResult<String> {
    let addr: Multiaddr = text
        .parse()
        .map_err(|e| StoreError::InvalidAddress(format!("{text}: {e}")))?;

    let mut host = None;
    let mut port = None;
    let mut https = use_https;
    for proto in addr.iter() {
        match proto {
            Protocol::Ip4(ip) => host = Some(ip.to_string()),
            Protocol::Ip6(ip) => host = Some(format!("[{ip}]")),
            Protocol::Dns(name) | Protocol::Dns4(name) | Protocol::Dns6(name) => {
                host = Some(name.to_string())
            }
            Protocol::Tcp(p) => port = Some(p),
            Protocol::Http => https = false,
            Protocol::Https => https = true,
            _ => continue,
        }
    }

    let host = host.ok_or_else(|| StoreError::InvalidAddress(format!("{text}: no host")))?;
    let port = port.ok_or_else(|| StoreError::InvalidAddress(format!("{text}: no tcp port")))?;
    let scheme = if https { "https" } else { "http" };
    Ok(format!("{scheme}://{host}:{port}"))
}
