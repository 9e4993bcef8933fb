//! Run log persistence.
//!
//! Each run appends one [`RunStats`] row to a CSV file.

use anyhow::Result;
use tracing::debug;

use crate::stats::RunStats;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Appends a [`RunStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, stats: &RunStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending run log record");

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // headers only on a fresh file
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}
