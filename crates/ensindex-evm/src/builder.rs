//! Fluent builder API for extractor configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use ensindex_core::RegistrarEvent;
//! use ensindex_evm::ExtractorBuilder;
//!
//! let builder = ExtractorBuilder::new()
//!     .event(RegistrarEvent::NameRenewed)
//!     .progress_interval(500);
//! let decoder = builder.build_decoder();
//! let config = builder.build_config();
//! ```

use alloy_primitives::Address;

use ensindex_core::{ExtractorConfig, RegistrarEvent};

use crate::decoder::RegistrarDecoder;
use crate::fetcher::LogFilter;

/// Fluent builder for `ExtractorConfig`.
#[derive(Debug, Default, Clone)]
pub struct ExtractorBuilder {
    config: ExtractorConfig,
}

impl ExtractorBuilder {
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }

    /// Set the registrar controller address.
    pub fn registrar(mut self, address: Address) -> Self {
        self.config.registrar = address;
        self
    }

    /// Set which registrar event to extract.
    pub fn event(mut self, event: RegistrarEvent) -> Self {
        self.config.event = event;
        self
    }

    /// Report progress every `n` processed logs.
    pub fn progress_interval(mut self, n: u64) -> Self {
        self.config.progress_interval = n;
        self
    }

    /// A decoder for the configured event and registrar.
    pub fn build_decoder(&self) -> RegistrarDecoder {
        RegistrarDecoder::new(self.config.event, self.config.registrar)
    }

    /// The `eth_getLogs` filter for the configured event and registrar.
    pub fn build_filter(&self) -> LogFilter {
        LogFilter::registrar(self.config.registrar, self.config.event)
    }

    /// Build the `ExtractorConfig`.
    pub fn build_config(self) -> ExtractorConfig {
        self.config
    }
}
