//! Alchemy provider profile.
//!
//! <https://docs.alchemy.com/reference/api-overview>

use std::time::Duration;

use crate::rpc::{HttpRpcClient, TransportError, DEFAULT_REQUEST_TIMEOUT};

/// URL template for the HTTP JSON-RPC endpoint.
pub fn http_url(api_key: &str, chain_id: u64) -> String {
    let network = chain_id_to_network(chain_id);
    format!("https://{network}.g.alchemy.com/v2/{api_key}")
}

/// Build an `HttpRpcClient` for Alchemy with the default timeout.
pub fn http_client(api_key: &str, chain_id: u64) -> Result<HttpRpcClient, TransportError> {
    http_client_with_timeout(api_key, chain_id, DEFAULT_REQUEST_TIMEOUT)
}

pub fn http_client_with_timeout(
    api_key: &str,
    chain_id: u64,
    timeout: Duration,
) -> Result<HttpRpcClient, TransportError> {
    HttpRpcClient::new(http_url(api_key, chain_id), timeout)
}

fn chain_id_to_network(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "eth-mainnet",
        5 => "eth-goerli",
        11155111 => "eth-sepolia",
        17000 => "eth-holesky",
        _ => "eth-mainnet",
    }
}
