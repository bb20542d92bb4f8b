//! The registration map: transaction hash → decoded registration record.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::types::DecodedEvent;

/// A flat record built from one decoded registrar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Block containing the registration.
    pub block_number: u64,
    /// Registrant; absent for renewals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    /// The registered label.
    pub name: String,
    /// Price paid, in wei.
    pub cost: U256,
    pub expires: U256,
}

impl From<&DecodedEvent> for RegistrationRecord {
    fn from(event: &DecodedEvent) -> Self {
        Self {
            block_number: event.block_number,
            owner: event.owner,
            name: event.name.clone(),
            cost: event.cost,
            expires: event.expires,
        }
    }
}

/// Mapping from hex transaction hash to exactly one [`RegistrationRecord`].
///
/// Keys are write-once: [`RegistrationMap::insert`] refuses to replace an
/// existing entry and the public API never removes one. Ordered so that persisted
/// snapshots are byte-stable across saves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationMap {
    records: BTreeMap<String, RegistrationRecord>,
}

impl RegistrationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&RegistrationRecord> {
        self.records.get(key)
    }

    /// Insert a record under a new key.
    ///
    /// Returns `false` and leaves the map untouched if the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, record: RegistrationRecord) -> bool {
        use std::collections::btree_map::Entry;
        match self.records.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Undo an insert whose persist failed. Not part of the public surface:
    /// persisted keys are never removed.
    pub(crate) fn revert_unsaved(&mut self, key: &str) {
        self.records.remove(key);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegistrationRecord)> {
        self.records.iter()
    }

    /// The record with the highest block number.
    pub fn latest(&self) -> Option<(&String, &RegistrationRecord)> {
        self.records.iter().max_by_key(|(_, r)| r.block_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(block: u64, name: &str) -> RegistrationRecord {
        RegistrationRecord {
            block_number: block,
            owner: Some(Address::repeat_byte(0xab)),
            name: name.into(),
            cost: U256::from(5u64),
            expires: U256::from(999u64),
        }
    }

    #[test]
    fn insert_never_overwrites() {
        let mut map = RegistrationMap::new();
        assert!(map.insert("0x01", record(100, "foo")));
        assert!(!map.insert("0x01", record(200, "bar")));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("0x01").unwrap().name, "foo");
    }

    #[test]
    fn latest_by_block_number() {
        let mut map = RegistrationMap::new();
        map.insert("0xaa", record(300, "late"));
        map.insert("0xbb", record(100, "early"));
        let (key, rec) = map.latest().unwrap();
        assert_eq!(key, "0xaa");
        assert_eq!(rec.name, "late");
    }

    #[test]
    fn renewal_record_omits_owner_in_json() {
        let mut rec = record(1, "renewed");
        rec.owner = None;
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("owner").is_none());
        let back: RegistrationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut map = RegistrationMap::new();
        map.insert("0x01", record(100, "foo"));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["0x01"]["name"], "foo");
        assert_eq!(json["0x01"]["block_number"], 100);
    }
}
