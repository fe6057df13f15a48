//! Load stage sinks
//!
//! Every sink consumes the same immutable [`ProductTable`]. Sinks share no
//! state and one sink failing never affects another.

pub mod csv_sink;
pub mod postgres_sink;
pub mod sheets_sink;

pub use csv_sink::CsvSink;
pub use postgres_sink::PostgresSink;
pub use sheets_sink::SheetsSink;

use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

use crate::domain::product::ProductTable;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),

    #[error("Invalid timestamp '{value}' for '{title}'")]
    InvalidTimestamp { title: String, value: String },

    #[error("{field} value {value} for '{title}' does not fit the destination column")]
    ValueOutOfRange {
        title: String,
        field: &'static str,
        value: String,
    },

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sink error: {0}")]
    Other(String),
}

/// What a sink did with the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    pub sink: String,
    pub rows_written: usize,
    /// Where the rows went (file path, table, spreadsheet range)
    pub destination: String,
}

/// A destination for the cleaned table
#[async_trait]
pub trait ProductSink: Send + Sync {
    /// Returns the name of the sink
    fn name(&self) -> &str;

    /// Write the whole table to the destination
    async fn persist(&self, table: &ProductTable) -> Result<SinkReport, SinkError>;
}

/// Keeps every table it receives in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Mutex<Vec<ProductTable>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables received so far, oldest first
    pub fn tables(&self) -> Vec<ProductTable> {
        self.tables.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ProductSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn persist(&self, table: &ProductTable) -> Result<SinkReport, SinkError> {
        self.tables
            .lock()
            .map_err(|_| SinkError::Other("memory sink lock poisoned".to_string()))?
            .push(table.clone());
        Ok(SinkReport {
            sink: self.name().to_string(),
            rows_written: table.len(),
            destination: "memory".to_string(),
        })
    }
}
