//! Node scan against an in-memory chain.

use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use userverify_scanner::config::Config;
use userverify_scanner::node_scan::{self, NodeScanParams};
use userverify_scanner::output;
use userverify_scanner::rpc::{Block, BlockTransaction, ChainClient, Receipt, RpcTransaction};

const TARGET: &str = "0x70468f06cf32b776130e2da4c0d7dd08983282ec";
const SENDER: &str = "0x00000000000000000000000000000000000000aa";
const OTHER: &str = "0x00000000000000000000000000000000000000bb";

#[derive(Default)]
struct FakeChain {
    blocks: HashMap<u64, Block>,
    txs: HashMap<String, RpcTransaction>,
    receipts: HashMap<String, Receipt>,
    failing_blocks: HashSet<u64>,
    failing_transactions: HashSet<String>,
    failing_receipts: HashSet<String>,
    receipt_calls: Mutex<Vec<String>>,
}

impl FakeChain {
    fn add_block(&mut self, number: u64, timestamp: u64, txs: Vec<(RpcTransaction, Option<&str>)>) {
        let mut entries = Vec::new();
        for (tx, status) in txs {
            entries.push(BlockTransaction::Hash(tx.hash.clone()));
            if let Some(status) = status {
                self.receipts.insert(
                    tx.hash.clone(),
                    Receipt {
                        status_hex: Some(status.to_string()),
                    },
                );
            }
            self.txs.insert(tx.hash.clone(), tx);
        }
        self.blocks.insert(
            number,
            Block {
                number_hex: format!("0x{:x}", number),
                timestamp_hex: format!("0x{:x}", timestamp),
                transactions: entries,
            },
        );
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn get_block(&self, number: u64, _include_transactions: bool) -> Result<Option<Block>> {
        if self.failing_blocks.contains(&number) {
            return Err(eyre!("connection reset"));
        }
        Ok(self.blocks.get(&number).cloned())
    }

    async fn get_transaction(&self, hash: &str) -> Result<Option<RpcTransaction>> {
        if self.failing_transactions.contains(hash) {
            return Err(eyre!("connection reset"));
        }
        Ok(self.txs.get(hash).cloned())
    }

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<Receipt>> {
        self.receipt_calls.lock().unwrap().push(hash.to_string());
        if self.failing_receipts.contains(hash) {
            return Err(eyre!("timeout"));
        }
        Ok(self.receipts.get(hash).cloned())
    }
}

fn tx(hash: &str, to: Option<&str>, input: &str) -> RpcTransaction {
    RpcTransaction {
        hash: hash.to_string(),
        from: SENDER.to_string(),
        to: to.map(str::to_string),
        input: input.to_string(),
    }
}

fn params(start_block: u64, end_block: u64, batch_size: u64) -> NodeScanParams {
    let cfg = Config {
        start_block,
        end_block,
        batch_size,
        ..Config::default()
    };
    NodeScanParams::from(&cfg)
}

#[tokio::test]
async fn single_successful_call_yields_one_record() {
    let mut chain = FakeChain::default();
    chain.add_block(
        100,
        1_714_502_016,
        vec![(tx("0x01", Some(TARGET), "0xa4760a9e0000"), Some("0x1"))],
    );

    let report = node_scan::run(&chain, &params(100, 100, 100)).await;

    assert_eq!(report.total_successful_transactions, 1);
    let record = &report.transactions[0];
    assert_eq!(record.hash, "0x01");
    assert_eq!(record.block_number, 100);
    assert_eq!(record.method_signature, "0xa4760a9e");
    assert_eq!(record.method_name, "userVerify");
    assert_eq!(record.status, "success");
    assert_eq!(record.timestamp, 1_714_502_016);
    assert_eq!(record.date, "2024-04-30T18:33:36.000Z");
    assert_eq!(record.to.to_lowercase(), TARGET);
    assert_eq!(report.transactions_by_block[&100], vec!["0x01"]);
}

#[tokio::test]
async fn filters_recipient_signature_and_status() {
    let mut chain = FakeChain::default();
    chain.add_block(
        1,
        1_700_000_000,
        vec![
            // uppercase recipient still matches
            (tx("0xa1", Some("0x70468F06CF32B776130E2DA4C0D7DD08983282EC"), "0xa4760a9e"), Some("0x1")),
            (tx("0xa2", Some(OTHER), "0xa4760a9e"), Some("0x1")),
            (tx("0xa3", Some(TARGET), "0xdeadbeef"), Some("0x1")),
            (tx("0xa4", Some(TARGET), "0xa4760a9e"), Some("0x0")),
            (tx("0xa5", None, "0xa4760a9e"), Some("0x1")),
            (tx("0xa6", Some(TARGET), "0x"), Some("0x1")),
            (tx("0xa7", Some(TARGET), "0xa4760a9e"), None),
        ],
    );
    chain.add_block(
        2,
        1_700_000_012,
        vec![
            (tx("0xb1", Some(TARGET), "0xa4760a9eff"), Some("0x1")),
            (tx("0xb2", Some(TARGET), "0xa4760a9e00"), Some("0x1")),
        ],
    );

    let report = node_scan::run(&chain, &params(1, 2, 100)).await;

    let hashes: Vec<&str> = report.transactions.iter().map(|r| r.hash.as_str()).collect();
    assert_eq!(hashes, vec!["0xa1", "0xb1", "0xb2"]);
    assert_eq!(report.total_successful_transactions, 3);
    assert_eq!(report.transactions_by_block[&2], vec!["0xb1", "0xb2"]);

    // receipts are only requested once recipient and signature match
    let calls = chain.receipt_calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["0xa1", "0xa4", "0xa7", "0xb1", "0xb2"]);
}

#[tokio::test]
async fn inverted_range_is_empty() {
    let chain = FakeChain::default();
    let report = node_scan::run(&chain, &params(10, 5, 100)).await;

    assert_eq!(report.total_successful_transactions, 0);
    assert!(report.transactions.is_empty());
    assert!(report.transactions_by_block.is_empty());
    assert_eq!(report.start_block, 10);
    assert_eq!(report.end_block, 5);
}

#[tokio::test]
async fn failing_and_missing_blocks_are_skipped() {
    let mut chain = FakeChain::default();
    chain.add_block(1, 1, vec![(tx("0x1", Some(TARGET), "0xa4760a9e"), Some("0x1"))]);
    chain.add_block(2, 2, vec![(tx("0x2", Some(TARGET), "0xa4760a9e"), Some("0x1"))]);
    chain.add_block(4, 4, vec![(tx("0x4", Some(TARGET), "0xa4760a9e"), Some("0x1"))]);
    chain.failing_blocks.insert(2);
    // block 3 is absent

    let report = node_scan::run(&chain, &params(1, 4, 3)).await;

    let blocks: Vec<u64> = report.transactions_by_block.keys().copied().collect();
    assert_eq!(blocks, vec![1, 4]);
    assert_eq!(report.total_successful_transactions, 2);
}

#[tokio::test]
async fn receipt_failure_keeps_matches_confirmed_earlier_in_block() {
    let mut chain = FakeChain::default();
    chain.add_block(
        5,
        1_714_502_016,
        vec![
            (tx("0x01", Some(TARGET), "0xa4760a9e"), Some("0x1")),
            (tx("0x02", Some(TARGET), "0xa4760a9e"), Some("0x1")),
            (tx("0x03", Some(TARGET), "0xa4760a9e"), Some("0x1")),
        ],
    );
    chain.add_block(6, 1_714_502_028, vec![(tx("0x06", Some(TARGET), "0xa4760a9e"), Some("0x1"))]);
    chain.failing_receipts.insert("0x02".to_string());

    let report = node_scan::run(&chain, &params(5, 6, 100)).await;

    let hashes: Vec<&str> = report.transactions.iter().map(|r| r.hash.as_str()).collect();
    assert_eq!(hashes, vec!["0x01", "0x06"]);
    assert_eq!(report.total_successful_transactions, 2);
    assert_eq!(report.transactions_by_block[&5], vec!["0x01"]);
    assert_eq!(report.transactions_by_block[&6], vec!["0x06"]);

    // the rest of block 5 is abandoned once the receipt call fails
    let calls = chain.receipt_calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["0x01", "0x02", "0x06"]);
}

#[tokio::test]
async fn transaction_failure_keeps_earlier_matches_and_later_blocks() {
    let mut chain = FakeChain::default();
    chain.add_block(
        1,
        100,
        vec![
            (tx("0x11", Some(TARGET), "0xa4760a9e"), Some("0x1")),
            (tx("0x12", Some(OTHER), "0x"), None),
        ],
    );
    chain.add_block(2, 112, vec![(tx("0x21", Some(TARGET), "0xa4760a9e"), Some("0x1"))]);
    chain.failing_transactions.insert("0x12".to_string());

    let report = node_scan::run(&chain, &params(1, 2, 1)).await;

    let blocks: Vec<u64> = report.transactions_by_block.keys().copied().collect();
    assert_eq!(blocks, vec![1, 2]);
    assert_eq!(report.total_successful_transactions, report.transactions.len());
    assert_eq!(report.transactions.len(), 2);
}

#[tokio::test]
async fn batch_size_does_not_change_output() {
    let mut chain = FakeChain::default();
    for n in 1..=7 {
        chain.add_block(
            n,
            1_000 + n,
            vec![(tx(&format!("0x{:02x}", n), Some(TARGET), "0xa4760a9e"), Some("0x1"))],
        );
    }

    let one = node_scan::run(&chain, &params(1, 7, 1)).await;
    let three = node_scan::run(&chain, &params(1, 7, 3)).await;
    let big = node_scan::run(&chain, &params(1, 7, 100)).await;

    assert_eq!(one.transactions, three.transactions);
    assert_eq!(three.transactions, big.transactions);
    assert_eq!(big.total_successful_transactions, 7);
}

#[tokio::test]
async fn repeated_runs_write_identical_files() {
    let mut chain = FakeChain::default();
    chain.add_block(9, 1_714_502_016, vec![(tx("0x09", Some(TARGET), "0xa4760a9e"), Some("0x1"))]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.json");

    output::write_report(&path, &node_scan::run(&chain, &params(9, 9, 100)).await).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();
    output::write_report(&path, &node_scan::run(&chain, &params(9, 9, 100)).await).unwrap();
    let second = std::fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);

    let doc: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(doc["targetContract"], TARGET);
    assert_eq!(doc["totalSuccessfulTransactions"], 1);
    assert_eq!(doc["transactionsByBlock"]["9"][0], "0x09");
    assert_eq!(doc["transactions"][0]["methodName"], "userVerify");
}
