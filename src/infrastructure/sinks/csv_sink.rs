//! CSV file sink
//!
//! Writes a header row plus one row per product in the fixed column order.
//! The target file is replaced on every run; there is no index column.

use async_trait::async_trait;
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ProductSink, SinkError, SinkReport};
use crate::domain::product::ProductTable;

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Blocking write of the whole table
pub fn write_table(path: &Path, table: &ProductTable) -> Result<usize, SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(ProductTable::header())?;
    for row in table {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(table.len())
}

#[async_trait]
impl ProductSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn persist(&self, table: &ProductTable) -> Result<SinkReport, SinkError> {
        let path = self.path.clone();
        let table = table.clone();
        // file I/O stays off the async executor
        let rows_written = tokio::task::spawn_blocking(move || write_table(&path, &table))
            .await
            .map_err(|e| SinkError::Other(format!("CSV writer task failed: {}", e)))??;

        info!("💾 Saved {} products to {}", rows_written, self.path.display());
        Ok(SinkReport {
            sink: self.name().to_string(),
            rows_written,
            destination: self.path.display().to_string(),
        })
    }
}
