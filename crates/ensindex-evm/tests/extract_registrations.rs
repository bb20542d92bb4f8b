//! End-to-end extraction over a mocked JSON-RPC node.
//!
//! Receipts are built from ABI-encoded `NameRegistered` logs, served through
//! `EthClient`, decoded by `RegistrarDecoder`, and persisted to a
//! `MemoryRegistryStore`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::{json, Value};

use ensindex_core::{
    tx_key, Extractor, ExtractorError, LogEntry, MemoryRegistryStore, ProgressReport,
    RegistrarEvent, RegistrationMap,
};
use ensindex_evm::decoder::encode_event_data;
use ensindex_evm::fingerprint::{event_topic, keccak256};
use ensindex_evm::rpc::{JsonRpcRequest, JsonRpcResponse};
use ensindex_evm::{EthClient, RegistrarDecoder, RpcTransport, TransportError};

// ─── Helpers ──────────────────────────────────────────────────────────────────

const REGISTRAR: Address = Address::repeat_byte(0x28);

fn tx(n: u8) -> B256 {
    B256::repeat_byte(n)
}

/// Serves `eth_getTransactionReceipt` from a map of tx key → receipt JSON.
#[derive(Default)]
struct ReceiptNode {
    receipts: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
    ids: AtomicU64,
}

impl ReceiptNode {
    fn register(&mut self, hash: B256, block: u64, logs: Vec<Value>) {
        self.receipts.insert(
            tx_key(&hash),
            json!({
                "transactionHash": tx_key(&hash),
                "blockNumber": format!("0x{block:x}"),
                "status": "0x1",
                "logs": logs,
            }),
        );
    }
}

#[async_trait]
impl RpcTransport for ReceiptNode {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        assert_eq!(req.method, "eth_getTransactionReceipt");
        let key = req.params[0].as_str().unwrap().to_string();
        self.calls.lock().unwrap().push(key.clone());
        let result = self.receipts.get(&key).cloned().unwrap_or(Value::Null);
        Ok(JsonRpcResponse::ok(req.id, result))
    }

    fn next_id(&self) -> u64 {
        self.ids.fetch_add(1, Ordering::Relaxed)
    }

    fn url(&self) -> &str {
        "mock://node"
    }
}

fn registered_log_json(hash: B256, block: u64, name: &str, owner: Address, cost: u64) -> Value {
    let data = encode_event_data(name, U256::from(cost), U256::from(1_700_000_000u64));
    json!({
        "address": REGISTRAR,
        "topics": [
            event_topic(RegistrarEvent::NameRegistered),
            keccak256(name.as_bytes()),
            owner.into_word(),
        ],
        "data": Bytes::from(data),
        "blockNumber": format!("0x{block:x}"),
        "transactionHash": tx_key(&hash),
        "logIndex": "0x2",
    })
}

/// A transfer log from some other contract, emitted in the same transaction.
fn unrelated_log_json(hash: B256, block: u64) -> Value {
    json!({
        "address": Address::repeat_byte(0x77),
        "topics": [keccak256(b"Transfer(address,address,uint256)")],
        "data": "0x",
        "blockNumber": format!("0x{block:x}"),
        "transactionHash": tx_key(&hash),
        "logIndex": "0x1",
    })
}

/// The input logs only carry a transaction hash the extractor cares about.
fn input_log(hash: B256) -> LogEntry {
    LogEntry {
        transaction_hash: hash,
        address: REGISTRAR,
        topics: vec![event_topic(RegistrarEvent::NameRegistered)],
        data: Bytes::new(),
        block_number: 0,
        log_index: 0,
    }
}

fn extractor(
    node: ReceiptNode,
) -> Extractor<EthClient<ReceiptNode>, RegistrarDecoder, MemoryRegistryStore> {
    Extractor::new(
        EthClient::new(node),
        RegistrarDecoder::new(RegistrarEvent::NameRegistered, REGISTRAR),
        MemoryRegistryStore::new(),
    )
    .with_progress(|_: &ProgressReport| {})
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn extracts_records_from_receipts() {
    let alice = Address::repeat_byte(0xaa);
    let bob = Address::repeat_byte(0xbb);
    let mut node = ReceiptNode::default();
    node.register(
        tx(1),
        100,
        vec![unrelated_log_json(tx(1), 100), registered_log_json(tx(1), 100, "foo", alice, 5)],
    );
    node.register(tx(2), 101, vec![registered_log_json(tx(2), 101, "bar", bob, 7)]);
    let ex = extractor(node);
    let mut registry = RegistrationMap::new();

    let summary = ex
        .extract(&[input_log(tx(1)), input_log(tx(2))], &mut registry)
        .await
        .unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(ex.store().save_count(), 2);

    let foo = registry.get(&tx_key(&tx(1))).unwrap();
    assert_eq!(foo.name, "foo");
    assert_eq!(foo.owner, Some(alice));
    assert_eq!(foo.block_number, 100);
    assert_eq!(foo.cost, U256::from(5u64));
    assert_eq!(foo.expires, U256::from(1_700_000_000u64));

    let bar = registry.get(&tx_key(&tx(2))).unwrap();
    assert_eq!(bar.name, "bar");
    assert_eq!(bar.owner, Some(bob));
}

#[tokio::test]
async fn receipt_without_registration_is_fatal() {
    let mut node = ReceiptNode::default();
    node.register(tx(1), 100, vec![registered_log_json(tx(1), 100, "foo", Address::ZERO, 5)]);
    node.register(tx(2), 101, vec![unrelated_log_json(tx(2), 101)]);
    node.register(tx(3), 102, vec![registered_log_json(tx(3), 102, "baz", Address::ZERO, 5)]);
    let ex = extractor(node);
    let mut registry = RegistrationMap::new();

    let err = ex
        .extract(
            &[input_log(tx(1)), input_log(tx(2)), input_log(tx(3))],
            &mut registry,
        )
        .await
        .unwrap_err();

    assert!(err.is_decode());
    let persisted = ex.store().snapshot().unwrap();
    assert_eq!(persisted.len(), 1);
    assert!(persisted.contains_key(&tx_key(&tx(1))));
    assert!(!registry.contains_key(&tx_key(&tx(3))));
}

#[tokio::test]
async fn unknown_transaction_is_provider_error() {
    let ex = extractor(ReceiptNode::default());
    let mut registry = RegistrationMap::new();

    let err = ex
        .extract(&[input_log(tx(9))], &mut registry)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractorError::Provider(_)));
    assert!(registry.is_empty());
    assert_eq!(ex.store().save_count(), 0);
}

#[tokio::test]
async fn renewals_have_no_owner() {
    let hash = tx(4);
    let data = encode_event_data("foo", U256::from(3u64), U256::from(42u64));
    let mut node = ReceiptNode::default();
    node.register(
        hash,
        200,
        vec![json!({
            "address": REGISTRAR,
            "topics": [event_topic(RegistrarEvent::NameRenewed), keccak256(b"foo")],
            "data": Bytes::from(data),
            "blockNumber": "0xc8",
            "transactionHash": tx_key(&hash),
            "logIndex": "0x0",
        })],
    );
    let ex = Extractor::new(
        EthClient::new(node),
        RegistrarDecoder::new(RegistrarEvent::NameRenewed, REGISTRAR),
        MemoryRegistryStore::new(),
    )
    .with_progress(|_: &ProgressReport| {});
    let mut registry = RegistrationMap::new();

    ex.extract(&[input_log(hash)], &mut registry).await.unwrap();

    let rec = registry.get(&tx_key(&hash)).unwrap();
    assert_eq!(rec.owner, None);
    assert_eq!(rec.block_number, 200);
    assert_eq!(rec.expires, U256::from(42u64));
}
