use chrono::Utc;
use eyre::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use crate::config::Config;
use crate::error::ScanError;
use crate::explorer::{ExplorerClient, ExplorerTransaction, PageParams};
use crate::models::{index_by_block, ExplorerMatchRecord, ExplorerScanReport, STATUS_SUCCESS};
use crate::parser;

#[derive(Debug, Clone)]
pub struct ExplorerScanParams {
    pub target_contract: String,
    pub method_signature: String, // `0x`-prefixed
    pub method_name: String,
    pub page_delay: Duration,
}

impl From<&Config> for ExplorerScanParams {
    fn from(cfg: &Config) -> Self {
        Self {
            target_contract: cfg.target_contract_hex(),
            method_signature: cfg.method_signature_hex(),
            method_name: cfg.method_name.clone(),
            page_delay: cfg.page_delay,
        }
    }
}

/// Page through every transaction sent to `address`, in fetch order.
///
/// Sleeps `page_delay` between requests to stay under the explorer's rate
/// limit; no sleep follows the last page.
pub async fn fetch_all<C: ExplorerClient + ?Sized>(
    client: &C,
    address: &str,
    page_delay: Duration,
) -> Result<Vec<ExplorerTransaction>> {
    let mut all = Vec::new();
    let mut cursor: Option<PageParams> = None;
    let mut page_no = 1usize;

    loop {
        let page = client.fetch_page(address, cursor.as_ref()).await?;
        info!("Fetched page {} ({} transactions)", page_no, page.items.len());
        all.extend(page.items);

        match page.next_page_params {
            Some(next) => {
                cursor = Some(next);
                page_no += 1;
                sleep(page_delay).await;
            }
            None => break,
        }
    }

    info!("Fetched {} transactions in total", all.len());
    Ok(all)
}

/// Items whose decoded method id equals `signature` and that executed successfully.
pub fn filter_matches<'a>(
    transactions: &'a [ExplorerTransaction],
    signature: &str,
) -> Vec<&'a ExplorerTransaction> {
    let method_id = signature.strip_prefix("0x").unwrap_or(signature);
    transactions
        .iter()
        .filter(|tx| {
            tx.method_id()
                .is_some_and(|id| id.eq_ignore_ascii_case(method_id))
                && tx.is_success()
        })
        .collect()
}

pub fn to_record(
    tx: &ExplorerTransaction,
    params: &ExplorerScanParams,
) -> Result<ExplorerMatchRecord, ScanError> {
    let missing = |field: &'static str| ScanError::MissingField {
        hash: tx.hash.clone(),
        field,
    };

    let block_number = tx.block_number.ok_or_else(|| missing("block_number"))?;
    let to = tx.to.as_ref().ok_or_else(|| missing("to.hash"))?;
    let raw_timestamp = tx.timestamp.as_deref().ok_or_else(|| missing("timestamp"))?;
    let when = parser::parse_iso(raw_timestamp)?;

    Ok(ExplorerMatchRecord {
        block_number,
        hash: tx.hash.clone(),
        from: tx.from.hash.clone(),
        to: to.hash.clone(),
        timestamp: when.timestamp(),
        date: parser::format_iso(&when),
        method_signature: params.method_signature.clone(),
        method_name: params.method_name.clone(),
        status: STATUS_SUCCESS.to_string(),
        signature_timestamp: tx.parameter(0)?.clone(),
        verify_proof: tx.parameter(1)?.clone(),
    })
}

/// Filter the fetched list and assemble the report. Any unmappable match fails the whole build.
pub fn build_report(
    transactions: &[ExplorerTransaction],
    params: &ExplorerScanParams,
) -> Result<ExplorerScanReport, ScanError> {
    let records = filter_matches(transactions, &params.method_signature)
        .into_iter()
        .map(|tx| to_record(tx, params))
        .collect::<Result<Vec<_>, _>>()?;

    let earliest_block = records.iter().map(|r| r.block_number).min();
    let latest_block = records.iter().map(|r| r.block_number).max();
    let transactions_by_block =
        index_by_block(records.iter().map(|r| (r.block_number, r.hash.as_str())));

    Ok(ExplorerScanReport {
        target_contract: params.target_contract.clone(),
        method_signature: params.method_signature.clone(),
        total_successful_transactions: records.len(),
        earliest_block,
        latest_block,
        transactions_by_block,
        transactions: records,
        completed_at: parser::format_iso(&Utc::now()),
    })
}

pub async fn run<C: ExplorerClient + ?Sized>(
    client: &C,
    params: &ExplorerScanParams,
) -> Result<ExplorerScanReport> {
    info!(
        "Fetching transactions to {} with methodSignature \"{}\" from explorer",
        params.target_contract, params.method_signature
    );

    let transactions = fetch_all(client, &params.target_contract, params.page_delay).await?;
    let report = build_report(&transactions, params)?;

    info!(
        "Found {} successful {} transactions (blocks {:?} to {:?})",
        report.total_successful_transactions,
        params.method_name,
        report.earliest_block,
        report.latest_block
    );

    Ok(report)
}
