// src/rpc.rs
use async_trait::async_trait;
use eyre::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ScanError;

/// Block as returned by `eth_getBlockByNumber`.
#[derive(Debug, Deserialize, Clone)]
pub struct Block {
    #[allow(dead_code)]
    #[serde(rename = "number")]
    pub number_hex: String,

    #[serde(rename = "timestamp")]
    pub timestamp_hex: String,

    #[serde(default)]
    pub transactions: Vec<BlockTransaction>,
}

/// Nodes return bare hashes or full objects depending on the hydration flag.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum BlockTransaction {
    Hash(String),
    Full(RpcTransaction),
}

impl BlockTransaction {
    pub fn hash(&self) -> &str {
        match self {
            BlockTransaction::Hash(hash) => hash,
            BlockTransaction::Full(tx) => &tx.hash,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RpcTransaction {
    pub hash: String,
    pub from: String,
    pub to: Option<String>, // None for contract creation
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Receipt {
    #[serde(rename = "status")]
    pub status_hex: Option<String>, // absent on pre-Byzantium receipts
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

// Error goes first: a bare `result: null` would otherwise swallow error payloads.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RpcResponse<T> {
    Error { error: RpcError },
    Success { result: Option<T> },
}

/// The three node calls the node scan depends on.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_block(&self, number: u64, include_transactions: bool) -> Result<Option<Block>>;

    async fn get_transaction(&self, hash: &str) -> Result<Option<RpcTransaction>>;

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<Receipt>>;
}

/// JSON-RPC 2.0 over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChainClient {
    client: Client,
    rpc_url: String,
}

impl HttpChainClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            rpc_url: rpc_url.into(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!("📡 Sending {} → {}", method, self.rpc_url);

        let text = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        match serde_json::from_str::<RpcResponse<T>>(&text)? {
            RpcResponse::Success { result } => Ok(result),
            RpcResponse::Error { error } => Err(ScanError::Rpc {
                code: error.code,
                message: error.message,
            }
            .into()),
        }
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn get_block(&self, number: u64, include_transactions: bool) -> Result<Option<Block>> {
        self.call(
            "eth_getBlockByNumber",
            json!([format!("0x{:x}", number), include_transactions]),
        )
        .await
    }

    async fn get_transaction(&self, hash: &str) -> Result<Option<RpcTransaction>> {
        self.call("eth_getTransactionByHash", json!([hash])).await
    }

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<Receipt>> {
        self.call("eth_getTransactionReceipt", json!([hash])).await
    }
}
