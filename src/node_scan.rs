use alloy::primitives::Address;
use eyre::Result;
use tracing::{error, info};

use crate::config::Config;
use crate::models::{index_by_block, MatchRecord, NodeScanReport, STATUS_SUCCESS};
use crate::parser;
use crate::rpc::ChainClient;

/// Parameters for one node scan
#[derive(Debug, Clone)]
pub struct NodeScanParams {
    pub target_contract: Address,
    pub method_signature: [u8; 4],
    pub method_name: String,
    pub start_block: u64,
    pub end_block: u64,
    pub batch_size: u64,
}

impl From<&Config> for NodeScanParams {
    fn from(cfg: &Config) -> Self {
        Self {
            target_contract: cfg.target_contract,
            method_signature: cfg.method_signature,
            method_name: cfg.method_name.clone(),
            start_block: cfg.start_block,
            end_block: cfg.end_block,
            batch_size: cfg.batch_size,
        }
    }
}

/// Walk `[start_block, end_block]` block by block and collect successful calls.
///
/// A block that fails to load or process is logged and skipped; matches
/// confirmed in it before the failure are kept. The report is always produced,
/// so partial results survive RPC failures.
pub async fn run<C: ChainClient + ?Sized>(client: &C, params: &NodeScanParams) -> NodeScanReport {
    let signature = parser::selector_hex(&params.method_signature);
    let batch_size = params.batch_size.max(1);

    info!(
        "Finding successful transactions with methodSignature \"{}\" to contract {:#x}",
        signature, params.target_contract
    );
    info!("Block range: {} to {}", params.start_block, params.end_block);

    let mut records: Vec<MatchRecord> = Vec::new();
    let mut current = params.start_block;

    while current <= params.end_block {
        let batch_end = current
            .saturating_add(batch_size - 1)
            .min(params.end_block);
        info!("Processing blocks {} to {}...", current, batch_end);

        for block_number in current..=batch_end {
            let before = records.len();
            let outcome = scan_block(client, params, &signature, block_number, &mut records).await;

            let found = records.len() - before;
            if found > 0 {
                info!(
                    "Block {}: {} successful {} transactions",
                    block_number, found, params.method_name
                );
            }
            if let Err(e) = outcome {
                error!("Error processing block {}: {:#}", block_number, e);
            }
        }

        info!(
            "Completed batch. Current total: {} successful {} transactions found",
            records.len(),
            params.method_name
        );

        current = match batch_end.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }

    let transactions_by_block =
        index_by_block(records.iter().map(|r| (r.block_number, r.hash.as_str())));

    NodeScanReport {
        target_contract: format!("{:#x}", params.target_contract),
        start_block: params.start_block,
        end_block: params.end_block,
        total_successful_transactions: records.len(),
        transactions_by_block,
        transactions: records,
    }
}

async fn scan_block<C: ChainClient + ?Sized>(
    client: &C,
    params: &NodeScanParams,
    signature: &str,
    block_number: u64,
    records: &mut Vec<MatchRecord>,
) -> Result<()> {
    let Some(block) = client.get_block(block_number, true).await? else {
        info!("Block {} not found", block_number);
        return Ok(());
    };

    let timestamp = parser::parse_quantity(&block.timestamp_hex)?;
    let date = parser::iso_date(timestamp)?;

    for entry in &block.transactions {
        let Some(tx) = client.get_transaction(entry.hash()).await? else {
            continue;
        };
        let Some(candidate) = parser::decode_transaction(&tx) else {
            continue;
        };

        let Some(to) = candidate.to else { continue };
        if to != params.target_contract {
            continue;
        }
        if candidate.selector != Some(params.method_signature) {
            continue;
        }

        let receipt = client.get_transaction_receipt(&candidate.hash).await?;
        let succeeded = match receipt.as_ref().and_then(|r| r.status_hex.as_deref()) {
            Some(status) => parser::parse_quantity(status)? == 1,
            None => false,
        };

        if !succeeded {
            info!(
                "Skipping failed {} transaction {} in block {}",
                params.method_name, candidate.hash, block_number
            );
            continue;
        }

        info!(
            "Found successful {} transaction {} in block {}",
            params.method_name, candidate.hash, block_number
        );

        records.push(MatchRecord {
            block_number,
            hash: candidate.hash,
            from: candidate.from.to_string(),
            to: to.to_string(),
            timestamp,
            method_signature: signature.to_string(),
            method_name: params.method_name.clone(),
            status: STATUS_SUCCESS.to_string(),
            date: date.clone(),
        });
    }

    Ok(())
}

/// One-line summary once the scan completes.
pub fn log_summary(report: &NodeScanReport, method_name: &str, output_file: &str) {
    info!("Analysis complete!");
    info!(
        "Total successful {} transactions to {}: {}",
        method_name, report.target_contract, report.total_successful_transactions
    );
    info!("Results saved to {}", output_file);
}
