use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Crypto;

/// Column labels reproduced verbatim from the upstream exporter, typos
/// included.
pub const CSV_HEADER: [&str; 5] = [
    "data.name",
    "data.symbol",
    "ata.quote.USD.price",
    "ata.quote.USD.market_cap",
    "data.circulating_supply",
];

/// Writes the records to a CSV file derived from `base_path` and returns the
/// path actually written.
///
/// A base name without a `.csv` extension gets a 14-digit local timestamp
/// appended (`snap` becomes `snap_27082026153000.csv`); a name already ending
/// in `.csv` is used verbatim, timestamp-free. The asymmetry is intentional
/// and matches the historical behavior.
pub fn save_to_csv<P: AsRef<Path>>(records: &[Crypto], base_path: P) -> Result<PathBuf> {
    let timestamp = Local::now().format("%d%m%Y%H%M%S").to_string();
    let path = resolve_path(base_path.as_ref(), &timestamp);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let mut wtr = Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record([
            record.name.clone(),
            record.symbol.clone(),
            record.price.to_string(),
            record.market_cap.to_string(),
            record.circulating_supply.to_string(),
        ])?;
    }
    wtr.flush()?;

    tracing::debug!(count = records.len(), path = %path.display(), "snapshot written");
    Ok(path)
}

fn resolve_path(base: &Path, timestamp: &str) -> PathBuf {
    let name = base.as_os_str().to_string_lossy();
    if name.ends_with(".csv") {
        base.to_path_buf()
    } else {
        PathBuf::from(format!("{name}_{timestamp}.csv"))
    }
}
