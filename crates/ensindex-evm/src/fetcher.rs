//! Registrar log fetcher.
//!
//! Produces the ordered log sequence the extractor consumes, using
//! `eth_getLogs` split into block ranges the node will accept.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use ensindex_core::{ExtractorError, LogEntry, RegistrarEvent};

use crate::fingerprint;

/// Default number of blocks per `eth_getLogs` call.
pub const DEFAULT_MAX_RANGE: u64 = 10_000;

/// Logs emitted by one contract with one event signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub topic0: B256,
}

impl LogFilter {
    /// Filter for `event` logs emitted by `registrar`.
    pub fn registrar(registrar: Address, event: RegistrarEvent) -> Self {
        Self {
            address: registrar,
            topic0: fingerprint::event_topic(event),
        }
    }
}

/// Anything that can answer `eth_getLogs`.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn get_logs(
        &self,
        from: u64,
        to: u64,
        filter: &LogFilter,
    ) -> Result<Vec<LogEntry>, ExtractorError>;
}

/// Wraps a [`LogSource`] and adds range chunking.
pub struct LogFetcher<C> {
    source: C,
    max_range: u64,
}

impl<C: LogSource> LogFetcher<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            max_range: DEFAULT_MAX_RANGE,
        }
    }

    /// Blocks per request; values below 1 are treated as 1.
    pub fn max_range(mut self, blocks: u64) -> Self {
        self.max_range = blocks.max(1);
        self
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    /// Give back the wrapped source, e.g. to reuse the client for receipts.
    pub fn into_source(self) -> C {
        self.source
    }

    /// Fetch all logs in `[from, to]` matching `filter`, in chain order.
    pub async fn logs(
        &self,
        from: u64,
        to: u64,
        filter: &LogFilter,
    ) -> Result<Vec<LogEntry>, ExtractorError> {
        if to < from {
            return Ok(vec![]);
        }

        let mut all_logs = Vec::new();
        let mut start = from;
        loop {
            let end = start.saturating_add(self.max_range - 1).min(to);
            let chunk = self.source.get_logs(start, end, filter).await?;
            tracing::debug!(from = start, to = end, logs = chunk.len(), "fetched log range");
            all_logs.extend(chunk);
            if end == to {
                break;
            }
            start = end + 1;
        }

        tracing::info!(from, to, logs = all_logs.len(), "Fetched registrar logs");
        Ok(all_logs)
    }
}
