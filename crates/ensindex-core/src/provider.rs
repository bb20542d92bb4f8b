//! Chain-data capabilities injected into the extractor.

use alloy_primitives::B256;
use async_trait::async_trait;

use crate::error::ExtractorError;
use crate::types::{DecodedEvent, RegistrarEvent, TransactionReceipt};

/// Fetches transaction receipts from a node.
///
/// Failures, including an unknown hash, surface as [`ExtractorError::Provider`].
#[async_trait]
pub trait ReceiptProvider: Send + Sync {
    async fn get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<TransactionReceipt, ExtractorError>;
}

/// Decodes registrar events out of a receipt.
///
/// Logs that do not match the decoder's schema are dropped, so an empty
/// result means the receipt held no matching event.
pub trait ReceiptDecoder: Send + Sync {
    /// The event this decoder extracts.
    fn event(&self) -> RegistrarEvent;

    fn decode(&self, receipt: &TransactionReceipt) -> Vec<DecodedEvent>;
}
