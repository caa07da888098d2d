use tracing::{error, info};
use userverify_scanner::{
    config, explorer::BlockscoutClient, explorer_scan, init_tracing, output,
};

async fn scan(cfg: &config::Config) -> eyre::Result<()> {
    let client = BlockscoutClient::new(cfg.explorer_api_url.clone());
    let params = explorer_scan::ExplorerScanParams::from(cfg);

    let report = explorer_scan::run(&client, &params).await?;
    output::write_report(&cfg.explorer_output_file, &report)?;

    info!("Results saved to {}", cfg.explorer_output_file);
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_tracing();

    info!("Explorer scan starting...");

    let cfg = config::load()?;
    info!("  Explorer API: {}", cfg.explorer_api_url);

    // Any failure aborts before the report is written.
    if let Err(e) = scan(&cfg).await {
        error!("Explorer scan failed: {:?}", e);
        return Err(e);
    }

    Ok(())
}
