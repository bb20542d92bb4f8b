//! Account address derivation.
//!
//! The key is only used to show which account the environment is configured
//! for; extraction never signs anything.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use k256::ecdsa::SigningKey;

use ensindex_evm::fingerprint::keccak256;

/// Ethereum address for a hex-encoded secp256k1 private key (`0x` optional).
pub fn address_from_private_key(key_hex: &str) -> Result<Address> {
    let key_hex = key_hex.trim();
    let bytes = hex::decode(key_hex.strip_prefix("0x").unwrap_or(key_hex))
        .context("private key is not valid hex")?;
    let key = SigningKey::from_slice(&bytes).context("private key is not a valid secp256k1 scalar")?;

    // Uncompressed SEC1 point is 0x04 || X || Y; the address hashes X || Y.
    let point = key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Ok(Address::from_slice(&hash[12..]))
}
