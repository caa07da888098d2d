use eyre::{Result, WrapErr};
use serde::Serialize;
use std::{fs, path::Path};
use tracing::info;

/// Serialize `report` as two-space pretty JSON, replacing whatever is at `path`.
pub fn write_report<T: Serialize>(path: impl AsRef<Path>, report: &T) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    info!("💾 Wrote {}", path.display());
    Ok(())
}
