//! `RegistrarDecoder`: decodes ENS registrar controller events from receipts.
//!
//! Both supported events share the same data layout:
//!
//! ```text
//! NameRegistered(string name, bytes32 indexed label, address indexed owner, uint cost, uint expires)
//! NameRenewed(string name, bytes32 indexed label, uint cost, uint expires)
//!
//! topics[0] = keccak256(signature)
//! topics[1] = label hash
//! topics[2] = owner (NameRegistered only)
//! data      = abi.encode(name, cost, expires)
//! ```

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, U256};

use ensindex_core::{
    DecodeError, DecodedEvent, LogEntry, ReceiptDecoder, RegistrarEvent, TransactionReceipt,
};

use crate::fingerprint;

/// Decodes one registrar event type from logs emitted by one contract.
#[derive(Debug, Clone)]
pub struct RegistrarDecoder {
    event: RegistrarEvent,
    registrar: Address,
    topic0: B256,
}

impl RegistrarDecoder {
    pub fn new(event: RegistrarEvent, registrar: Address) -> Self {
        Self {
            event,
            registrar,
            topic0: fingerprint::event_topic(event),
        }
    }

    /// Returns `true` if `log` was emitted by the registrar with this event's signature.
    pub fn matches(&self, log: &LogEntry) -> bool {
        log.address == self.registrar && log.topic0() == Some(&self.topic0)
    }

    /// Decode a single log already known to match.
    pub fn decode_log(&self, log: &LogEntry) -> Result<DecodedEvent, DecodeError> {
        let owner = if self.event.has_owner() {
            let topic = log.topics.get(2).ok_or_else(|| DecodeError::InvalidLog {
                reason: format!("{} log is missing the owner topic", self.event),
            })?;
            Some(Address::from_word(*topic))
        } else {
            None
        };

        let data_type = DynSolType::Tuple(vec![
            DynSolType::String,
            DynSolType::Uint(256),
            DynSolType::Uint(256),
        ]);
        let decoded = data_type
            .abi_decode_sequence(&log.data)
            .map_err(|e| DecodeError::AbiDecodeFailed {
                reason: e.to_string(),
            })?;

        let (name, cost, expires) = match decoded {
            DynSolValue::Tuple(values) => match values.as_slice() {
                [DynSolValue::String(name), DynSolValue::Uint(cost, _), DynSolValue::Uint(expires, _)] => {
                    (name.clone(), *cost, *expires)
                }
                _ => return Err(shape_mismatch()),
            },
            _ => return Err(shape_mismatch()),
        };

        Ok(DecodedEvent {
            event: self.event,
            transaction_hash: log.transaction_hash,
            block_number: log.block_number,
            log_index: log.log_index,
            name,
            owner,
            cost,
            expires,
        })
    }
}

fn shape_mismatch() -> DecodeError {
    DecodeError::AbiDecodeFailed {
        reason: "expected (string, uint256, uint256)".into(),
    }
}

impl ReceiptDecoder for RegistrarDecoder {
    fn event(&self) -> RegistrarEvent {
        self.event
    }

    /// Decode every matching log; non-matching or malformed logs are discarded.
    fn decode(&self, receipt: &TransactionReceipt) -> Vec<DecodedEvent> {
        receipt
            .logs
            .iter()
            .filter(|log| self.matches(log))
            .filter_map(|log| match self.decode_log(log) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::debug!(
                        tx = %ensindex_core::tx_key(&log.transaction_hash),
                        log_index = log.log_index,
                        error = %e,
                        "discarding undecodable registrar log"
                    );
                    None
                }
            })
            .collect()
    }
}

/// ABI-encode the data section of a registrar event.
pub fn encode_event_data(name: &str, cost: U256, expires: U256) -> Vec<u8> {
    DynSolValue::Tuple(vec![
        DynSolValue::String(name.to_string()),
        DynSolValue::Uint(cost, 256),
        DynSolValue::Uint(expires, 256),
    ])
    .abi_encode_params()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;

    const REGISTRAR: Address = Address::repeat_byte(0x28);

    fn registered_log(name: &str, owner: Address) -> LogEntry {
        LogEntry {
            transaction_hash: B256::repeat_byte(0x01),
            address: REGISTRAR,
            topics: vec![
                fingerprint::event_topic(RegistrarEvent::NameRegistered),
                fingerprint::keccak256(name.as_bytes()),
                owner.into_word(),
            ],
            data: Bytes::from(encode_event_data(name, U256::from(5u64), U256::from(999u64))),
            block_number: 100,
            log_index: 7,
        }
    }

    #[test]
    fn decodes_name_registered() {
        let owner = Address::repeat_byte(0xab);
        let dec = RegistrarDecoder::new(RegistrarEvent::NameRegistered, REGISTRAR);

        let event = dec.decode_log(&registered_log("foo", owner)).unwrap();

        assert_eq!(event.name, "foo");
        assert_eq!(event.owner, Some(owner));
        assert_eq!(event.cost, U256::from(5u64));
        assert_eq!(event.expires, U256::from(999u64));
        assert_eq!(event.block_number, 100);
        assert_eq!(event.log_index, 7);
    }

    #[test]
    fn skips_other_contracts_and_events() {
        let dec = RegistrarDecoder::new(RegistrarEvent::NameRegistered, REGISTRAR);
        let mut foreign = registered_log("foo", Address::ZERO);
        foreign.address = Address::repeat_byte(0x99);
        let mut renewal = registered_log("foo", Address::ZERO);
        renewal.topics[0] = fingerprint::event_topic(RegistrarEvent::NameRenewed);

        assert!(!dec.matches(&foreign));
        assert!(!dec.matches(&renewal));
    }

    #[test]
    fn missing_owner_topic_is_invalid() {
        let dec = RegistrarDecoder::new(RegistrarEvent::NameRegistered, REGISTRAR);
        let mut log = registered_log("foo", Address::ZERO);
        log.topics.truncate(2);
        assert!(matches!(
            dec.decode_log(&log),
            Err(DecodeError::InvalidLog { .. })
        ));
    }

    #[test]
    fn truncated_data_fails() {
        let dec = RegistrarDecoder::new(RegistrarEvent::NameRegistered, REGISTRAR);
        let mut log = registered_log("foo", Address::ZERO);
        log.data = Bytes::from(vec![0u8; 31]);
        assert!(matches!(
            dec.decode_log(&log),
            Err(DecodeError::AbiDecodeFailed { .. })
        ));
    }
}
