//! ensindex-core — foundation for the deduplicating ENS registration extractor.
//!
//! # Architecture
//!
//! ```text
//! Extractor
//!    ├── ReceiptProvider   (eth_getTransactionReceipt, injected)
//!    ├── ReceiptDecoder    (registrar event schema, injected)
//!    ├── RegistryStore     (full-map persistence after every insert)
//!    └── ProgressCallback  (report every N processed logs)
//! ```
//!
//! The [`RegistrationMap`] is owned by the caller and passed in by `&mut`, so a
//! run can be resumed by loading the map from the store and calling
//! [`Extractor::extract`] again with the same logs.

pub mod config;
pub mod error;
pub mod extractor;
pub mod progress;
pub mod provider;
pub mod registry;
pub mod store;
pub mod types;

pub use config::ExtractorConfig;
pub use error::{DecodeError, ExtractorError};
pub use extractor::{ExtractSummary, Extractor};
pub use progress::{ProgressCallback, ProgressReport, StdoutProgress};
pub use provider::{ReceiptDecoder, ReceiptProvider};
pub use registry::{RegistrationMap, RegistrationRecord};
pub use store::{MemoryRegistryStore, RegistryStore};
pub use types::{tx_key, DecodedEvent, LogEntry, RegistrarEvent, TransactionReceipt};
