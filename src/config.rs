use alloy::primitives::{address, Address};
use dotenvy::dotenv;
use eyre::Result;
use std::{env, time::Duration};
use tracing::info;

use crate::error::ScanError;
use crate::parser;

pub const DEFAULT_RPC_URL: &str = "https://rpc.hemi.network/rpc";
pub const DEFAULT_EXPLORER_API_URL: &str = "https://explorer.hemi.xyz/api/v2/addresses";
pub const DEFAULT_TARGET_CONTRACT: &str = "0x70468f06cf32b776130e2da4c0d7dd08983282ec";
pub const DEFAULT_METHOD_SIGNATURE: &str = "0xa4760a9e";
pub const DEFAULT_METHOD_NAME: &str = "userVerify";
pub const DEFAULT_START_BLOCK: u64 = 1_272_611;
pub const DEFAULT_END_BLOCK: u64 = 1_765_629;
pub const DEFAULT_BATCH_SIZE: u64 = 100;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 500;
pub const DEFAULT_NODE_OUTPUT_FILE: &str = "successful-userverify-transactions.json";
pub const DEFAULT_EXPLORER_OUTPUT_FILE: &str = "successful-userverify-transactions-explorer.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_http_url: String,
    pub explorer_api_url: String,
    pub target_contract: Address,
    pub method_signature: [u8; 4],
    pub method_name: String,
    pub start_block: u64,
    pub end_block: u64,
    pub batch_size: u64,
    pub page_delay: Duration,
    pub node_output_file: String,
    pub explorer_output_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_http_url: DEFAULT_RPC_URL.to_string(),
            explorer_api_url: DEFAULT_EXPLORER_API_URL.to_string(),
            target_contract: address!("70468f06cf32b776130e2da4c0d7dd08983282ec"),
            method_signature: [0xa4, 0x76, 0x0a, 0x9e],
            method_name: DEFAULT_METHOD_NAME.to_string(),
            start_block: DEFAULT_START_BLOCK,
            end_block: DEFAULT_END_BLOCK,
            batch_size: DEFAULT_BATCH_SIZE,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            node_output_file: DEFAULT_NODE_OUTPUT_FILE.to_string(),
            explorer_output_file: DEFAULT_EXPLORER_OUTPUT_FILE.to_string(),
        }
    }
}

impl Config {
    /// Lowercase `0x`-prefixed contract address, as written to reports.
    pub fn target_contract_hex(&self) -> String {
        format!("{:#x}", self.target_contract)
    }

    pub fn method_signature_hex(&self) -> String {
        parser::selector_hex(&self.method_signature)
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // .env is optional

    let rpc_http_url = env::var("RPC_HTTP_URL")
        .or_else(|_| env::var("HEMI_RPC")) // alias support
        .unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

    let explorer_api_url = env::var("EXPLORER_API_URL")
        .unwrap_or_else(|_| DEFAULT_EXPLORER_API_URL.to_string());

    let target_contract = parse_address(
        "TARGET_CONTRACT",
        &env::var("TARGET_CONTRACT").unwrap_or_else(|_| DEFAULT_TARGET_CONTRACT.to_string()),
    )?;

    let method_signature = parse_signature(
        "METHOD_SIGNATURE",
        &env::var("METHOD_SIGNATURE").unwrap_or_else(|_| DEFAULT_METHOD_SIGNATURE.to_string()),
    )?;

    let method_name =
        env::var("METHOD_NAME").unwrap_or_else(|_| DEFAULT_METHOD_NAME.to_string());

    let start_block = number_var("START_BLOCK", DEFAULT_START_BLOCK)?;
    let end_block = number_var("END_BLOCK", DEFAULT_END_BLOCK)?;

    let batch_size = number_var("BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
    if batch_size == 0 {
        return Err(ScanError::InvalidConfig {
            key: "BATCH_SIZE",
            value: "0".to_string(),
        }
        .into());
    }

    let page_delay = Duration::from_millis(number_var("PAGE_DELAY_MS", DEFAULT_PAGE_DELAY_MS)?);

    let node_output_file = env::var("NODE_OUTPUT_FILE")
        .unwrap_or_else(|_| DEFAULT_NODE_OUTPUT_FILE.to_string());
    let explorer_output_file = env::var("EXPLORER_OUTPUT_FILE")
        .unwrap_or_else(|_| DEFAULT_EXPLORER_OUTPUT_FILE.to_string());

    let cfg = Config {
        rpc_http_url,
        explorer_api_url,
        target_contract,
        method_signature,
        method_name,
        start_block,
        end_block,
        batch_size,
        page_delay,
        node_output_file,
        explorer_output_file,
    };

    info!("Loaded config: {:?}", cfg);

    Ok(cfg)
}

fn number_var(key: &'static str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ScanError::InvalidConfig { key, value: raw }.into()),
        Err(_) => Ok(default),
    }
}

fn parse_address(key: &'static str, raw: &str) -> Result<Address> {
    raw.trim().parse::<Address>().map_err(|_| {
        ScanError::InvalidConfig {
            key,
            value: raw.to_string(),
        }
        .into()
    })
}

/// Accepts `0x` followed by exactly 8 hex characters.
pub fn parse_signature(key: &'static str, raw: &str) -> Result<[u8; 4]> {
    let invalid = || ScanError::InvalidConfig {
        key,
        value: raw.to_string(),
    };

    let digits = raw.trim().strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 8 {
        return Err(invalid().into());
    }
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    let selector: [u8; 4] = bytes.try_into().map_err(|_| invalid())?;
    Ok(selector)
}
