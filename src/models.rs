// src/models.rs
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const STATUS_SUCCESS: &str = "success";

/// One successful call found by scanning node blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub block_number: u64,
    pub hash: String,
    pub from: String,
    pub to: String,
    pub timestamp: u64, // epoch seconds
    pub method_signature: String,
    pub method_name: String,
    pub status: String,
    pub date: String, // ISO-8601 of `timestamp`
}

/// One successful call reported by the explorer, with its decoded arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerMatchRecord {
    pub block_number: u64,
    pub hash: String,
    pub from: String,
    pub to: String,
    pub timestamp: i64,
    pub date: String,
    pub method_signature: String,
    pub method_name: String,
    pub status: String,
    pub signature_timestamp: Value,
    pub verify_proof: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeScanReport {
    pub target_contract: String,
    pub start_block: u64,
    pub end_block: u64,
    pub total_successful_transactions: usize,
    pub transactions_by_block: BTreeMap<u64, Vec<String>>,
    pub transactions: Vec<MatchRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerScanReport {
    pub target_contract: String,
    pub method_signature: String,
    pub total_successful_transactions: usize,
    pub earliest_block: Option<u64>,
    pub latest_block: Option<u64>,
    pub transactions_by_block: BTreeMap<u64, Vec<String>>,
    pub transactions: Vec<ExplorerMatchRecord>,
    pub completed_at: String,
}

/// Block number → hashes, in record order.
pub fn index_by_block<'a, I>(entries: I) -> BTreeMap<u64, Vec<String>>
where
    I: IntoIterator<Item = (u64, &'a str)>,
{
    let mut index: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for (block, hash) in entries {
        index.entry(block).or_default().push(hash.to_string());
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_keeps_record_order_within_block() {
        let index = index_by_block(vec![(7, "0xb"), (3, "0xa"), (7, "0xc")]);
        assert_eq!(index.keys().copied().collect::<Vec<_>>(), vec![3, 7]);
        assert_eq!(index[&7], vec!["0xb".to_string(), "0xc".to_string()]);
    }

    #[test]
    fn record_serialises_in_camel_case() {
        let record = MatchRecord {
            block_number: 1,
            hash: "0xh".into(),
            from: "0xf".into(),
            to: "0xt".into(),
            timestamp: 0,
            method_signature: "0xa4760a9e".into(),
            method_name: "userVerify".into(),
            status: STATUS_SUCCESS.into(),
            date: "1970-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["blockNumber"], 1);
        assert_eq!(json["methodSignature"], "0xa4760a9e");
        assert!(json.get("block_number").is_none());
    }
}
