//! Error types for the extraction pipeline.

use thiserror::Error;

/// Errors that abort an extraction run.
///
/// None of these are retried locally; records persisted before the failure
/// stay valid and the next run resumes through the dedup check.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The node was unreachable, rejected the call, or does not know the hash.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The receipt did not yield a usable registrar event.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The registry could not be loaded or persisted.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Returns `true` if the failure came from the chain-data provider.
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// Returns `true` if the failure came from decoding receipt data.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Errors raised while decoding registrar events.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("No {event} event found in receipt for {tx_hash}")]
    NoMatchingEvent { tx_hash: String, event: String },

    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("Invalid log: {reason}")]
    InvalidLog { reason: String },
}
