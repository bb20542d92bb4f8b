//! Event topic computation.
//!
//! `topic0` of an EVM log is the keccak256 hash of the event's canonical
//! signature, e.g. `keccak256("NameRenewed(string,bytes32,uint256,uint256)")`.

use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

use ensindex_core::RegistrarEvent;

/// keccak256 of `bytes`.
pub fn keccak256(bytes: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(bytes);
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Compute `topic0` for a canonical signature string.
pub fn signature_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// `topic0` of a registrar event.
pub fn event_topic(event: RegistrarEvent) -> B256 {
    signature_topic(event.signature())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_topic() {
        let topic = signature_topic("Transfer(address,address,uint256)");
        assert_eq!(
            format!("0x{}", hex::encode(topic)),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn registrar_topics_are_distinct() {
        let registered = event_topic(RegistrarEvent::NameRegistered);
        let renewed = event_topic(RegistrarEvent::NameRenewed);
        assert_ne!(registered, renewed);
        assert_eq!(registered, keccak256(RegistrarEvent::NameRegistered.signature().as_bytes()));
    }
}
