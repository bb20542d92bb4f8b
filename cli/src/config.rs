//! Endpoint and environment configuration.
//!
//! Values come from flags, the process environment, or a `.env` file in the
//! working directory (loaded before argument parsing).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};

use ensindex_evm::{alchemy, HttpRpcClient};

pub const RPC_URL_VAR: &str = "ENSINDEX_RPC_URL";
pub const ALCHEMY_KEY_VAR: &str = "ALCHEMY_API_KEY";
pub const PRIVATE_KEY_VAR: &str = "ENSINDEX_PRIVATE_KEY";

/// Load `.env` if present, returning its path. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

/// Where JSON-RPC requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcEndpoint {
    Url(String),
    Alchemy { api_key: String, chain_id: u64 },
}

impl RpcEndpoint {
    /// A full URL wins over an Alchemy key.
    pub fn resolve(url: Option<&str>, alchemy_key: Option<&str>, chain_id: u64) -> Result<Self> {
        let non_empty = |s: &&str| !s.trim().is_empty();
        if let Some(url) = url.filter(non_empty) {
            return Ok(Self::Url(url.trim().to_string()));
        }
        if let Some(key) = alchemy_key.filter(non_empty) {
            return Ok(Self::Alchemy {
                api_key: key.trim().to_string(),
                chain_id,
            });
        }
        bail!("no RPC endpoint configured. Set {RPC_URL_VAR} or {ALCHEMY_KEY_VAR} (or pass --rpc <url>)")
    }

    pub fn client(&self, timeout: Duration) -> Result<HttpRpcClient> {
        let client = match self {
            Self::Url(url) => HttpRpcClient::new(url.clone(), timeout)?,
            Self::Alchemy { api_key, chain_id } => {
                alchemy::http_client_with_timeout(api_key, *chain_id, timeout)?
            }
        };
        Ok(client)
    }
}

/// Never prints the API key.
impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Alchemy { chain_id, .. } => write!(f, "alchemy (chain {chain_id})"),
        }
    }
}
