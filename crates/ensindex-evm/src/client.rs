//! Typed Ethereum calls on top of an [`RpcTransport`].
//!
//! Uses `eth_chainId`, `eth_blockNumber`, `eth_getLogs` and
//! `eth_getTransactionReceipt`, converting the node's JSON into
//! [`ensindex_core`] types.

use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use ensindex_core::{tx_key, ExtractorError, LogEntry, ReceiptProvider, TransactionReceipt};

use crate::fetcher::{LogFilter, LogSource};
use crate::rpc::{RpcTransport, TransportError};

/// A log as returned by `eth_getLogs` or inside a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    /// `None` for pending logs.
    pub block_number: Option<U64>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<U64>,
    #[serde(default)]
    pub removed: Option<bool>,
}

impl RawLog {
    /// Returns `true` if this log was removed by a reorg.
    pub fn is_removed(&self) -> bool {
        self.removed.unwrap_or(false)
    }
}

impl TryFrom<RawLog> for LogEntry {
    type Error = TransportError;

    fn try_from(raw: RawLog) -> Result<Self, Self::Error> {
        let pending = || TransportError::Other("pending log has no transaction hash or block".into());
        Ok(LogEntry {
            transaction_hash: raw.transaction_hash.ok_or_else(pending)?,
            block_number: raw.block_number.ok_or_else(pending)?.to::<u64>(),
            log_index: raw.log_index.map(|i| i.to::<u64>()).unwrap_or_default(),
            address: raw.address,
            topics: raw.topics,
            data: raw.data,
        })
    }
}

/// The fields of `eth_getTransactionReceipt` the decoder needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReceipt {
    pub transaction_hash: B256,
    pub block_number: U64,
    /// Absent on pre-Byzantium receipts.
    #[serde(default)]
    pub status: Option<U64>,
    pub logs: Vec<RawLog>,
}

impl TryFrom<RawReceipt> for TransactionReceipt {
    type Error = TransportError;

    fn try_from(raw: RawReceipt) -> Result<Self, Self::Error> {
        let logs = raw
            .logs
            .into_iter()
            .map(LogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TransactionReceipt {
            transaction_hash: raw.transaction_hash,
            block_number: raw.block_number.to::<u64>(),
            status: raw.status.map_or(true, |s| s == U64::from(1)),
            logs,
        })
    }
}

/// Ethereum JSON-RPC client.
pub struct EthClient<T> {
    transport: T,
}

impl<T: RpcTransport> EthClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, TransportError> {
        let id: U64 = self.transport.call("eth_chainId", vec![]).await?;
        Ok(id.to::<u64>())
    }

    /// `eth_blockNumber`
    pub async fn block_number(&self) -> Result<u64, TransportError> {
        let n: U64 = self.transport.call("eth_blockNumber", vec![]).await?;
        Ok(n.to::<u64>())
    }

    /// `eth_getLogs` over `[from, to]`, dropping logs removed by a reorg.
    pub async fn logs(
        &self,
        from: u64,
        to: u64,
        filter: &LogFilter,
    ) -> Result<Vec<LogEntry>, TransportError> {
        let params = json!({
            "fromBlock": format!("0x{from:x}"),
            "toBlock": format!("0x{to:x}"),
            "address": filter.address,
            "topics": [filter.topic0],
        });
        let raw: Vec<RawLog> = self.transport.call("eth_getLogs", vec![params]).await?;
        raw.into_iter()
            .filter(|log| !log.is_removed())
            .map(LogEntry::try_from)
            .collect()
    }

    /// `eth_getTransactionReceipt`; `None` if the node does not know the hash.
    pub async fn receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>, TransportError> {
        let raw: Option<RawReceipt> = self
            .transport
            .call("eth_getTransactionReceipt", vec![Value::from(tx_key(&tx_hash))])
            .await?;
        raw.map(TransactionReceipt::try_from).transpose()
    }
}

#[async_trait]
impl<T: RpcTransport> ReceiptProvider for EthClient<T> {
    async fn get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<TransactionReceipt, ExtractorError> {
        self.receipt(tx_hash).await?.ok_or_else(|| {
            ExtractorError::Provider(format!("unknown transaction {}", tx_key(&tx_hash)))
        })
    }
}

#[async_trait]
impl<T: RpcTransport> LogSource for EthClient<T> {
    async fn get_logs(
        &self,
        from: u64,
        to: u64,
        filter: &LogFilter,
    ) -> Result<Vec<LogEntry>, ExtractorError> {
        Ok(self.logs(from, to, filter).await?)
    }
}
