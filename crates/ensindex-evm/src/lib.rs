//! ensindex-evm — EVM side of ENSIndex: JSON-RPC transport, registrar log
//! fetching, and ABI decoding of registrar controller events.

pub mod alchemy;
pub mod builder;
pub mod client;
pub mod decoder;
pub mod fetcher;
pub mod fingerprint;
pub mod rpc;

pub use builder::ExtractorBuilder;
pub use client::EthClient;
pub use decoder::RegistrarDecoder;
pub use fetcher::{LogFetcher, LogFilter, LogSource};
pub use rpc::{HttpRpcClient, RpcTransport, TransportError};
