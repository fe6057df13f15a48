//! Extract, transform, load driver
//!
//! Runs the three stages once, in order. An empty extract or an empty clean
//! table aborts the run before any sink is touched; a failing sink is
//! recorded and the remaining sinks still run.

#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::application::normalizer::ProductNormalizer;
use crate::application::product_list_collector::ProductListCollector;
use crate::domain::pagination::PageRange;
use crate::domain::product::{ProductTable, RawProduct};
use crate::infrastructure::sinks::{ProductSink, SinkReport};

/// Rows shown in the stage previews
const PREVIEW_ROWS: usize = 5;

/// Fatal run failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no data extracted from pages {start}..={end}")]
    NoDataExtracted { start: u32, end: u32 },

    #[error("no valid rows left after transforming {raw_count} raw products")]
    NoValidRows { raw_count: usize },
}

/// What happened at one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkOutcome {
    pub sink: String,
    /// Report on success, error message on failure
    pub result: Result<SinkReport, String>,
}

impl SinkOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub raw_count: usize,
    pub clean_count: usize,
    pub sink_results: Vec<SinkOutcome>,
}

impl RunSummary {
    pub fn failed_sinks(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.sink_results.iter().filter(|outcome| !outcome.is_success())
    }

    pub fn all_sinks_succeeded(&self) -> bool {
        self.failed_sinks().next().is_none()
    }
}

pub struct EtlPipeline {
    collector: ProductListCollector,
    normalizer: ProductNormalizer,
    sinks: Vec<Arc<dyn ProductSink>>,
    range: PageRange,
    target_count: usize,
}

impl EtlPipeline {
    pub fn new(
        collector: ProductListCollector,
        normalizer: ProductNormalizer,
        range: PageRange,
        target_count: usize,
    ) -> Self {
        Self {
            collector,
            normalizer,
            sinks: Vec::new(),
            range,
            target_count,
        }
    }

    /// Sinks run in the order they are added
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ProductSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        info!(
            "🚀 Starting ETL run: pages {}..={}, target {} products",
            self.range.start, self.range.end, self.target_count
        );

        let outcome = self.collector.collect_with_stats(self.range, self.target_count).await;
        let raw = outcome.products;
        if raw.is_empty() {
            error!("❌ No data extracted, aborting before transform");
            return Err(PipelineError::NoDataExtracted {
                start: self.range.start,
                end: self.range.end,
            });
        }
        info!("Extracted {} raw products", raw.len());
        preview_raw(&raw);

        let table = self.normalizer.normalize(&raw);
        if table.is_empty() {
            error!("❌ No valid rows after transform, aborting before load");
            return Err(PipelineError::NoValidRows { raw_count: raw.len() });
        }
        info!("Transformed into {} clean products", table.len());
        preview_clean(&table);

        let sink_results = self.load(&table).await;
        let summary = RunSummary {
            raw_count: raw.len(),
            clean_count: table.len(),
            sink_results,
        };

        if summary.all_sinks_succeeded() {
            info!("✅ ETL run completed: {} rows loaded", summary.clean_count);
        } else {
            let failed: Vec<&str> = summary.failed_sinks().map(|o| o.sink.as_str()).collect();
            info!(
                "⚠️ ETL run completed with sink failures: {} rows, failed sinks {:?}",
                summary.clean_count, failed
            );
        }
        Ok(summary)
    }

    async fn load(&self, table: &ProductTable) -> Vec<SinkOutcome> {
        let mut results = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            let name = sink.name().to_string();
            let result = match sink.persist(table).await {
                Ok(report) => Ok(report),
                Err(e) => {
                    error!("❌ Failed to save data to {}: {}", name, e);
                    Err(e.to_string())
                }
            };
            results.push(SinkOutcome { sink: name, result });
        }
        results
    }
}

fn preview_raw(raw: &[RawProduct]) {
    for (i, product) in raw.iter().take(PREVIEW_ROWS).enumerate() {
        info!("  raw[{}] {:?}", i, product);
    }
}

fn preview_clean(table: &ProductTable) {
    for (i, row) in table.iter().take(PREVIEW_ROWS).enumerate() {
        info!(
            "  clean[{}] {} | {:.2} | {} | {} | {} | {} | {}",
            i, row.title, row.price, row.rating, row.colors, row.size, row.gender, row.timestamp
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::product_list_collector::CollectorConfig;
    use crate::infrastructure::parsing::ProductCardParser;
    use crate::infrastructure::simple_http_client::StaticPageFetcher;
    use crate::infrastructure::sinks::{MemorySink, SinkError};
    use async_trait::async_trait;
    use std::time::Duration;

    const BASE: &str = "https://shop.test/";

    struct FailingSink;

    #[async_trait]
    impl ProductSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn persist(&self, _table: &ProductTable) -> Result<SinkReport, SinkError> {
            Err(SinkError::Other("destination unavailable".to_string()))
        }
    }

    fn card(title: &str, price: &str) -> String {
        format!(
            r#"<div class="collection-card">
                 <h3 class="product-title">{title}</h3>
                 <span class="price">{price}</span>
                 <p>Rating: ⭐ 4.5 / 5</p><p>2 Colors</p><p>Size: L</p><p>Gender: Women</p>
               </div>"#
        )
    }

    fn pipeline(html: Option<String>) -> EtlPipeline {
        let mut fetcher = StaticPageFetcher::new();
        if let Some(html) = html {
            fetcher = fetcher.with_page(BASE, html);
        }
        let collector = ProductListCollector::new(
            Arc::new(fetcher),
            ProductCardParser::new().unwrap(),
            CollectorConfig {
                base_url: BASE.to_string(),
                page_delay: Duration::ZERO,
            },
        );
        EtlPipeline::new(collector, ProductNormalizer::new(2.0), PageRange::new(1, 1), 1000)
    }

    #[tokio::test]
    async fn test_run_loads_every_sink() {
        let memory = Arc::new(MemorySink::new());
        let html = format!("<html><body>{}{}</body></html>", card("A", "$10.00"), card("B", "$20.00"));
        let summary = pipeline(Some(html)).with_sink(memory.clone()).run().await.unwrap();

        assert_eq!(summary.raw_count, 2);
        assert_eq!(summary.clean_count, 2);
        assert!(summary.all_sinks_succeeded());
        let tables = memory.tables();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows()[1].price, 40.0);
    }

    #[tokio::test]
    async fn test_no_pages_is_fatal_before_sinks() {
        let memory = Arc::new(MemorySink::new());
        let result = pipeline(None).with_sink(memory.clone()).run().await;

        assert_eq!(result, Err(PipelineError::NoDataExtracted { start: 1, end: 1 }));
        assert!(memory.tables().is_empty());
    }

    #[tokio::test]
    async fn test_only_sentinels_is_fatal_before_sinks() {
        let memory = Arc::new(MemorySink::new());
        let html = format!("<html><body>{}</body></html>", card("Unknown Product", "$10.00"));
        let result = pipeline(Some(html)).with_sink(memory.clone()).run().await;

        assert_eq!(result, Err(PipelineError::NoValidRows { raw_count: 1 }));
        assert!(memory.tables().is_empty());
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_stop_others() {
        let memory = Arc::new(MemorySink::new());
        let html = format!("<html><body>{}</body></html>", card("A", "$10.00"));
        let summary = pipeline(Some(html))
            .with_sink(Arc::new(FailingSink))
            .with_sink(memory.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.sink_results.len(), 2);
        assert!(!summary.sink_results[0].is_success());
        assert!(summary.sink_results[1].is_success());
        assert_eq!(summary.failed_sinks().count(), 1);
        assert_eq!(memory.tables().len(), 1);
    }
}
