//! Incremental, deduplicated extraction of registration records from logs.
//!
//! For each log, in order:
//!   - skip it if its transaction hash is already in the registry
//!   - fetch the receipt and decode the first matching registrar event
//!   - insert the record and persist the full registry before moving on
//!
//! A progress report is emitted every `progress_interval` processed logs.
//! Any provider, decode or storage failure aborts the run; everything saved
//! before it remains, and the next run picks up where this one stopped.

use std::fmt;

use alloy_primitives::B256;
use tracing::{debug, info, warn};

use crate::config::{ExtractorConfig, DEFAULT_PROGRESS_INTERVAL};
use crate::error::{DecodeError, ExtractorError};
use crate::progress::{ProgressCallback, ProgressReport, StdoutProgress};
use crate::provider::{ReceiptDecoder, ReceiptProvider};
use crate::registry::{RegistrationMap, RegistrationRecord};
use crate::store::RegistryStore;
use crate::types::LogEntry;

/// Counters for one `extract` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Logs visited.
    pub processed: u64,
    /// Logs that produced a new record.
    pub inserted: u64,
    /// Logs whose transaction was already in the registry.
    pub skipped: u64,
}

impl fmt::Display for ExtractSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} logs: {} new, {} already known",
            self.processed, self.inserted, self.skipped
        )
    }
}

/// Drives extraction over an already-fetched sequence of logs.
pub struct Extractor<P, D, S> {
    provider: P,
    decoder: D,
    store: S,
    progress: Box<dyn ProgressCallback>,
    progress_interval: u64,
}

impl<P, D, S> Extractor<P, D, S>
where
    P: ReceiptProvider,
    D: ReceiptDecoder,
    S: RegistryStore,
{
    /// Create an extractor that reports progress to stdout every 1000 logs.
    pub fn new(provider: P, decoder: D, store: S) -> Self {
        Self {
            provider,
            decoder,
            store,
            progress: Box::new(StdoutProgress),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Create an extractor using the interval from `config`.
    ///
    /// `config.event` must be the event `decoder` was built for; the
    /// registrar address is already baked into the decoder.
    pub fn from_config(provider: P, decoder: D, store: S, config: &ExtractorConfig) -> Self {
        debug_assert_eq!(
            config.event,
            decoder.event(),
            "decoder was built for a different registrar event"
        );
        Self::new(provider, decoder, store).progress_interval(config.progress_interval)
    }

    /// Report every `n` processed logs (`0` disables reports).
    pub fn progress_interval(mut self, n: u64) -> Self {
        self.progress_interval = n;
        self
    }

    /// Replace the stdout progress sink.
    pub fn with_progress(mut self, progress: impl ProgressCallback + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted registry, or start from an empty one.
    pub async fn load_registry(&self) -> Result<RegistrationMap, ExtractorError> {
        let registry = self.store.load_or_default().await?;
        if !registry.is_empty() {
            info!(records = registry.len(), "Resuming from persisted registry");
        }
        Ok(registry)
    }

    /// Extract one record per previously unseen transaction in `logs`.
    ///
    /// `registry` is updated in place and persisted after every insertion.
    pub async fn extract(
        &self,
        logs: &[LogEntry],
        registry: &mut RegistrationMap,
    ) -> Result<ExtractSummary, ExtractorError> {
        let total = logs.len();
        let event = self.decoder.event();
        info!(total, known = registry.len(), %event, "Starting extraction");

        let mut summary = ExtractSummary::default();
        for log in logs {
            let key = log.key();
            if registry.contains_key(&key) {
                debug!(tx = %key, "Already extracted, skipping");
                summary.skipped += 1;
            } else {
                let record = self.decode_transaction(log.transaction_hash, &key).await?;
                debug!(tx = %key, name = %record.name, block = record.block_number, "Extracted registration");
                registry.insert(key.clone(), record);
                if let Err(e) = self.store.save(registry).await {
                    warn!(tx = %key, error = %e, "Failed to persist registry");
                    // Keep the caller's map equal to what was last persisted.
                    registry.revert_unsaved(&key);
                    return Err(e);
                }
                summary.inserted += 1;
            }

            summary.processed += 1;
            if self.progress_interval > 0 && summary.processed % self.progress_interval == 0 {
                self.progress.on_progress(&ProgressReport {
                    processed: summary.processed,
                    registry_size: registry.len(),
                    total,
                });
            }
        }

        info!(
            processed = summary.processed,
            inserted = summary.inserted,
            skipped = summary.skipped,
            records = registry.len(),
            "Extraction complete"
        );
        Ok(summary)
    }

    async fn decode_transaction(
        &self,
        tx_hash: B256,
        key: &str,
    ) -> Result<RegistrationRecord, ExtractorError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| {
                warn!(tx = %key, error = %e, "Receipt fetch failed");
                e
            })?;

        let event = self
            .decoder
            .decode(&receipt)
            .into_iter()
            .next()
            .ok_or_else(|| DecodeError::NoMatchingEvent {
                tx_hash: key.to_string(),
                event: self.decoder.event().to_string(),
            })?;

        Ok(RegistrationRecord::from(&event))
    }
}
