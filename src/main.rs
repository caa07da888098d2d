use tracing::{error, info};
use userverify_scanner::{config, init_tracing, node_scan, output, rpc::HttpChainClient};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_tracing();

    info!("Node scan starting...");

    let cfg = config::load()?;
    info!("  RPC URL: {}", cfg.rpc_http_url);
    info!("  Output: {}", cfg.node_output_file);

    let client = HttpChainClient::new(cfg.rpc_http_url.clone());
    let params = node_scan::NodeScanParams::from(&cfg);

    let report = node_scan::run(&client, &params).await;

    // Per-block failures are already absorbed; only the final write can fail here.
    if let Err(e) = output::write_report(&cfg.node_output_file, &report) {
        error!("Error: {:?}", e);
        return Err(e);
    }

    node_scan::log_summary(&report, &cfg.method_name, &cfg.node_output_file);
    Ok(())
}
