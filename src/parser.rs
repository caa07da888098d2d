// src/parser.rs
use alloy::primitives::Address;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ScanError;
use crate::rpc::RpcTransaction;

/// A node transaction reduced to what the filter looks at
#[derive(Debug, Clone)]
pub struct CallCandidate {
    pub hash: String,
    pub from: Address,
    pub to: Option<Address>,
    pub selector: Option<[u8; 4]>, // None when input is shorter than 4 bytes
}

/// Parse a `0x`-prefixed hex quantity (block number, timestamp, status).
pub fn parse_quantity(raw: &str) -> Result<u64, ScanError> {
    let digits = raw.trim_start_matches("0x");
    if digits.is_empty() {
        return Err(ScanError::InvalidQuantity(raw.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| ScanError::InvalidQuantity(raw.to_string()))
}

/// First 4 bytes of hex call data.
pub fn method_selector(input: &str) -> Option<[u8; 4]> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    let head = digits.get(..8)?;
    let bytes = hex::decode(head).ok()?;
    bytes.try_into().ok()
}

pub fn selector_hex(selector: &[u8; 4]) -> String {
    format!("0x{}", hex::encode(selector))
}

pub fn decode_transaction(tx: &RpcTransaction) -> Option<CallCandidate> {
    let from = tx.from.parse::<Address>().ok()?;
    let to = match &tx.to {
        Some(raw) => Some(raw.parse::<Address>().ok()?),
        None => None,
    };

    Some(CallCandidate {
        hash: tx.hash.to_lowercase(),
        from,
        to,
        selector: method_selector(&tx.input),
    })
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_date(timestamp: u64) -> Result<String, ScanError> {
    let secs = i64::try_from(timestamp)
        .map_err(|_| ScanError::InvalidTimestamp(timestamp.to_string()))?;
    let dt = DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| ScanError::InvalidTimestamp(timestamp.to_string()))?;
    Ok(format_iso(&dt))
}

pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an explorer RFC 3339 timestamp into UTC.
pub fn parse_iso(raw: &str) -> Result<DateTime<Utc>, ScanError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ScanError::InvalidTimestamp(raw.to_string()))
}
