//! Blockscout v2 REST client for "transactions to address" listings.

use async_trait::async_trait;
use eyre::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ScanError;

/// Opaque cursor handed back by the explorer; echoed as query parameters.
pub type PageParams = Map<String, Value>;

#[derive(Debug, Deserialize, Clone)]
pub struct TransactionPage {
    pub items: Vec<ExplorerTransaction>,
    #[serde(default)]
    pub next_page_params: Option<PageParams>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExplorerTransaction {
    pub hash: String,
    pub block_number: Option<u64>, // null while pending
    pub from: AddressRef,
    pub to: Option<AddressRef>,
    pub timestamp: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub decoded_input: Option<DecodedInput>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AddressRef {
    pub hash: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DecodedInput {
    pub method_id: String,
    #[serde(default)]
    pub parameters: Vec<DecodedParameter>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DecodedParameter {
    pub value: Value,
}

impl ExplorerTransaction {
    pub fn method_id(&self) -> Option<&str> {
        self.decoded_input.as_ref().map(|d| d.method_id.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("ok") && self.result.as_deref() == Some("success")
    }

    /// Value of the decoded call argument at `index`.
    pub fn parameter(&self, index: usize) -> Result<&Value, ScanError> {
        self.decoded_input
            .as_ref()
            .and_then(|d| d.parameters.get(index))
            .map(|p| &p.value)
            .ok_or_else(|| ScanError::MissingParameter {
                hash: self.hash.clone(),
                index,
            })
    }
}

#[async_trait]
pub trait ExplorerClient: Send + Sync {
    /// Fetch one page; `page` is `None` for the first request.
    async fn fetch_page(&self, address: &str, page: Option<&PageParams>) -> Result<TransactionPage>;
}

#[derive(Debug, Clone)]
pub struct BlockscoutClient {
    client: Client,
    base_url: String,
}

impl BlockscoutClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn transactions_url(&self, address: &str) -> String {
        format!("{}/{}/transactions", self.base_url.trim_end_matches('/'), address)
    }
}

/// Query pairs for a request: the fixed `filter=to` plus the cursor fields.
pub fn page_query(page: Option<&PageParams>) -> Vec<(String, String)> {
    let mut query = vec![("filter".to_string(), "to".to_string())];
    if let Some(params) = page {
        for (key, value) in params {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                other => other.to_string(),
            };
            query.push((key.clone(), value));
        }
    }
    query
}

#[async_trait]
impl ExplorerClient for BlockscoutClient {
    async fn fetch_page(&self, address: &str, page: Option<&PageParams>) -> Result<TransactionPage> {
        let url = self.transactions_url(address);
        let query = page_query(page);

        debug!("📡 GET {} {:?}", url, query);

        let resp = self.client.get(&url).query(&query).send().await?;
        if !resp.status().is_success() {
            return Err(ScanError::Http {
                status: resp.status().as_u16(),
                url,
            }
            .into());
        }

        let text = resp.text().await?;
        let page: TransactionPage = serde_json::from_str(&text)?;
        Ok(page)
    }
}
