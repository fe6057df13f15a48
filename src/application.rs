//! Application layer module
//!
//! Orchestrates the extract, transform and load stages on top of the
//! infrastructure adapters.

pub mod etl_pipeline;
pub mod normalizer;
pub mod product_list_collector;

pub use etl_pipeline::{EtlPipeline, PipelineError, RunSummary, SinkOutcome};
pub use normalizer::{NormalizeReport, ProductNormalizer};
pub use product_list_collector::{CollectionOutcome, CollectorConfig, ProductListCollector};
