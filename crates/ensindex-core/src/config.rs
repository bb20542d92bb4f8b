//! Extractor configuration.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::types::RegistrarEvent;

/// Emit a progress report every this many processed logs.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// ENS `ETHRegistrarController` on Ethereum mainnet.
pub const ENS_REGISTRAR_CONTROLLER: Address = address!("283af0b28c62c092c9727f1ee09c02ca627eb7f5");

/// Configuration for an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Report progress every N processed logs (`0` disables reports).
    pub progress_interval: u64,
    /// Which registrar event to decode from each receipt.
    pub event: RegistrarEvent,
    /// Only logs emitted by this contract are decoded.
    pub registrar: Address,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            event: RegistrarEvent::NameRegistered,
            registrar: ENS_REGISTRAR_CONTROLLER,
        }
    }
}
