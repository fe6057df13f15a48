//! Fashion Studio ETL
//!
//! Scrapes the paginated Fashion Studio catalogue, normalizes the product
//! cards into a typed table and loads it into CSV, PostgreSQL and Google
//! Sheets.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the pipeline entry points for easier access
pub use application::{EtlPipeline, PipelineError, RunSummary};
