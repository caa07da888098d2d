pub mod config;
pub mod error;
pub mod explorer;
pub mod explorer_scan;
pub mod models;
pub mod node_scan;
pub mod output;
pub mod parser;
pub mod rpc;

use tracing_subscriber::EnvFilter;

/// Log to stdout; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout) // force logs to stdout
        .with_target(false)
        .init();
}
