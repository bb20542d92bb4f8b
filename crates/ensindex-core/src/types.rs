//! Shared types for the extraction pipeline.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Encode a transaction hash as the fixed-width registry key (`0x` + 64 lowercase hex digits).
pub fn tx_key(hash: &B256) -> String {
    format!("0x{}", hex::encode(hash.as_slice()))
}

// ─── LogEntry ─────────────────────────────────────────────────────────────────

/// A raw event log as returned by `eth_getLogs`.
///
/// The extractor only reads `transaction_hash`; the remaining fields are
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Hash of the transaction that emitted the log.
    pub transaction_hash: B256,
    /// Contract that emitted the log.
    pub address: Address,
    /// `topics[0]` is the event signature hash, `topics[1..]` the indexed params.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed params.
    pub data: Bytes,
    pub block_number: u64,
    pub log_index: u64,
}

impl LogEntry {
    /// The registry key for this log's transaction.
    pub fn key(&self) -> String {
        tx_key(&self.transaction_hash)
    }

    /// The event signature hash, if the log has any topics.
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }
}

// ─── TransactionReceipt ──────────────────────────────────────────────────────

/// The subset of `eth_getTransactionReceipt` the decoder needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    /// `true` when the transaction executed successfully.
    pub status: bool,
    /// Every log emitted by the transaction, in log-index order.
    pub logs: Vec<LogEntry>,
}

// ─── RegistrarEvent ──────────────────────────────────────────────────────────

/// Registrar controller events the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RegistrarEvent {
    /// A first-time registration; carries the owner address.
    #[default]
    NameRegistered,
    /// An extension of an existing registration; no owner.
    NameRenewed,
}

impl RegistrarEvent {
    /// Canonical ABI signature used to derive `topic0`.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::NameRegistered => "NameRegistered(string,bytes32,address,uint256,uint256)",
            Self::NameRenewed => "NameRenewed(string,bytes32,uint256,uint256)",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NameRegistered => "NameRegistered",
            Self::NameRenewed => "NameRenewed",
        }
    }

    /// Whether the event carries an indexed `owner` topic.
    pub fn has_owner(&self) -> bool {
        matches!(self, Self::NameRegistered)
    }
}

impl fmt::Display for RegistrarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegistrarEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "nameregistered" | "registered" => Ok(Self::NameRegistered),
            "namerenewed" | "renewed" => Ok(Self::NameRenewed),
            other => Err(format!("unknown registrar event: {other}")),
        }
    }
}

// ─── DecodedEvent ────────────────────────────────────────────────────────────

/// A registrar event decoded from one receipt log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub event: RegistrarEvent,
    pub transaction_hash: B256,
    pub block_number: u64,
    pub log_index: u64,
    /// The registered label, e.g. `"vitalik"` for `vitalik.eth`.
    pub name: String,
    /// `None` for renewals.
    pub owner: Option<Address>,
    /// Price paid, in wei.
    pub cost: U256,
    /// Expiry timestamp of the registration.
    pub expires: U256,
}
