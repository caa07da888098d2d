use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid hex quantity `{0}`")]
    InvalidQuantity(String),

    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),

    #[error("explorer transaction {hash} is missing `{field}`")]
    MissingField { hash: String, field: &'static str },

    #[error("explorer transaction {hash} has no decoded parameter at index {index}")]
    MissingParameter { hash: String, index: usize },

    #[error("invalid value for {key}: `{value}`")]
    InvalidConfig { key: &'static str, value: String },

    #[error("explorer returned HTTP {status} for {url}")]
    Http { status: u16, url: String },
}
