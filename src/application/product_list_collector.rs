//! Product list collection across listing pages
//!
//! Walks pages in order, extracts cards, deduplicates by title across the
//! whole run and stops once the target count is reached. Pages are handled
//! strictly one at a time.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use scraper::Html;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::pagination::{PageRange, page_url};
use crate::domain::product::RawProduct;
use crate::infrastructure::config::ScrapeConfig;
use crate::infrastructure::parsing::{ContextualParser, ParseContext, ParsingError};
use crate::infrastructure::simple_http_client::PageFetcher;

/// Unexpected fault while processing a single page
#[derive(Error, Debug)]
pub enum PageError {
    #[error("page {page}: {source}")]
    Parsing {
        page: u32,
        #[source]
        source: ParsingError,
    },
}

/// Collector settings, taken from [`ScrapeConfig`]
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub base_url: String,
    /// Pause after each processed page before the next one
    pub page_delay: Duration,
}

impl CollectorConfig {
    pub fn from_scrape_config(scrape: &ScrapeConfig) -> Self {
        Self {
            base_url: scrape.base_url.clone(),
            page_delay: Duration::from_millis(scrape.request_delay_ms),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::from_scrape_config(&ScrapeConfig::default())
    }
}

/// Result of one collection run
#[derive(Debug, Clone, Default)]
pub struct CollectionOutcome {
    /// Unique-by-title products in discovery order
    pub products: Vec<RawProduct>,
    pub pages_visited: u32,
    /// Pages whose fetch failed or that faulted during processing
    pub pages_failed: u32,
    pub duplicates_skipped: usize,
    pub target_reached: bool,
}

/// Page-level parser the collector runs on every fetched document
pub type ListingParser = dyn ContextualParser<Output = Vec<RawProduct>, Context = ParseContext> + Send + Sync;

/// Paginated listing collector
pub struct ProductListCollector {
    fetcher: Arc<dyn PageFetcher>,
    parser: Box<ListingParser>,
    config: CollectorConfig,
}

impl ProductListCollector {
    pub fn new<P>(fetcher: Arc<dyn PageFetcher>, parser: P, config: CollectorConfig) -> Self
    where
        P: ContextualParser<Output = Vec<RawProduct>, Context = ParseContext> + Send + Sync + 'static,
    {
        Self {
            fetcher,
            parser: Box::new(parser),
            config,
        }
    }

    /// Collect unique products from `start_page..=end_page`, stopping early
    /// once at least `target_count` products are gathered.
    ///
    /// Pages are 1-based: a range starting at page 0 is empty.
    pub async fn collect(&self, start_page: u32, end_page: u32, target_count: usize) -> Vec<RawProduct> {
        self.collect_with_stats(PageRange::new(start_page, end_page), target_count)
            .await
            .products
    }

    /// Same as [`Self::collect`], keeping per-run statistics
    pub async fn collect_with_stats(&self, range: PageRange, target_count: usize) -> CollectionOutcome {
        let mut outcome = CollectionOutcome::default();
        let mut seen_titles: HashSet<String> = HashSet::new();

        if range.is_empty() {
            warn!("Empty or invalid page range {}..={}, nothing to collect", range.start, range.end);
            return outcome;
        }

        for page in range.pages() {
            info!("📄 Scraping page {}...", page);
            let url = page_url(&self.config.base_url, page);
            outcome.pages_visited += 1;

            let page_products = match self.fetcher.fetch_page(&url).await {
                Some(document) => match self.process_page(page, &document) {
                    Ok(products) => products,
                    Err(e) => {
                        error!("❌ Error while scraping page {}: {}", page, e);
                        outcome.pages_failed += 1;
                        continue;
                    }
                },
                None => {
                    outcome.pages_failed += 1;
                    Vec::new()
                }
            };
            info!("Found {} products on page {}", page_products.len(), page);

            for product in page_products {
                let Some(title) = product.title() else { continue };
                if seen_titles.insert(title.to_string()) {
                    outcome.products.push(product);
                } else {
                    outcome.duplicates_skipped += 1;
                }
            }

            if outcome.products.len() >= target_count {
                info!("🎯 Target of {} products reached", target_count);
                outcome.target_reached = true;
                break;
            }

            if !range.is_last(page) && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }
        }

        info!(
            "✅ Collected {} unique products from {} pages ({} failed, {} duplicates skipped)",
            outcome.products.len(),
            outcome.pages_visited,
            outcome.pages_failed,
            outcome.duplicates_skipped
        );
        outcome
    }

    fn process_page(&self, page: u32, document: &Html) -> Result<Vec<RawProduct>, PageError> {
        let context = ParseContext::new(page);
        self.parser
            .parse_with_context(document, &context)
            .map_err(|source| PageError::Parsing { page, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::fields;
    use crate::infrastructure::parsing::ProductCardParser;
    use crate::infrastructure::simple_http_client::StaticPageFetcher;

    const BASE: &str = "https://shop.test/";

    /// Card parser that faults on one page number
    struct FaultOnPage {
        inner: ProductCardParser,
        page: u32,
    }

    impl ContextualParser for FaultOnPage {
        type Output = Vec<RawProduct>;
        type Context = ParseContext;

        fn parse_with_context(&self, html: &Html, context: &ParseContext) -> Result<Vec<RawProduct>, ParsingError> {
            if context.page_id == self.page {
                return Err(ParsingError::invalid_selector("div.collection-card", "listing layout changed"));
            }
            self.inner.parse_with_context(html, context)
        }
    }

    fn card(title: &str, price: &str) -> String {
        format!(
            r#"<div class="collection-card">
                 <h3 class="product-title">{title}</h3>
                 <span class="price">{price}</span>
                 <p>Rating: ⭐ 4.0 / 5</p><p>3 Colors</p><p>Size: M</p><p>Gender: Men</p>
               </div>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body>{}</body></html>", cards.join(""))
    }

    fn collector(fetcher: StaticPageFetcher) -> ProductListCollector {
        ProductListCollector::new(
            Arc::new(fetcher),
            ProductCardParser::new().unwrap(),
            CollectorConfig {
                base_url: BASE.to_string(),
                page_delay: Duration::ZERO,
            },
        )
    }

    fn titles(products: &[RawProduct]) -> Vec<&str> {
        products.iter().filter_map(RawProduct::title).collect()
    }

    #[tokio::test]
    async fn test_single_page_single_card() {
        let fetcher = StaticPageFetcher::new().with_page(BASE, page(&[card("T-shirt 1", "$10.00")]));
        let products = collector(fetcher).collect(1, 1, 1000).await;

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].get(fields::TITLE), Some("T-shirt 1"));
        assert_eq!(products[0].get(fields::PRICE), Some("10.00"));
    }

    #[tokio::test]
    async fn test_failed_fetch_contributes_nothing() {
        let fetcher = StaticPageFetcher::new()
            .with_page(BASE, page(&[card("A", "$1.00")]))
            .with_page("https://shop.test/page3", page(&[card("C", "$3.00")]));
        let outcome = collector(fetcher).collect_with_stats(PageRange::new(1, 3), 1000).await;

        assert_eq!(titles(&outcome.products), vec!["A", "C"]);
        assert_eq!(outcome.pages_visited, 3);
        assert_eq!(outcome.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_keep_first() {
        let fetcher = StaticPageFetcher::new()
            .with_page(BASE, page(&[card("A", "$1.00"), card("B", "$2.00"), card("A", "$9.00")]))
            .with_page("https://shop.test/page2", page(&[card("B", "$5.00"), card("C", "$3.00")]));
        let outcome = collector(fetcher).collect_with_stats(PageRange::new(1, 2), 1000).await;

        assert_eq!(titles(&outcome.products), vec!["A", "B", "C"]);
        assert_eq!(outcome.products[0].get(fields::PRICE), Some("1.00"));
        assert_eq!(outcome.products[1].get(fields::PRICE), Some("2.00"));
        assert_eq!(outcome.duplicates_skipped, 2);
    }

    #[tokio::test]
    async fn test_stops_after_page_reaching_target() {
        let fetcher = StaticPageFetcher::new()
            .with_page(BASE, page(&[card("A", "$1.00"), card("B", "$2.00")]))
            .with_page("https://shop.test/page2", page(&[card("C", "$1.00"), card("D", "$2.00")]))
            .with_page("https://shop.test/page3", page(&[card("E", "$1.00")]));
        let outcome = collector(fetcher).collect_with_stats(PageRange::new(1, 3), 3).await;

        // target checked per page, never mid-page
        assert_eq!(titles(&outcome.products), vec!["A", "B", "C", "D"]);
        assert!(outcome.target_reached);
        assert_eq!(outcome.pages_visited, 2);
    }

    #[tokio::test]
    async fn test_page_fault_is_skipped_and_walk_continues() {
        let fetcher = StaticPageFetcher::new()
            .with_page(BASE, page(&[card("A", "$1.00")]))
            .with_page("https://shop.test/page2", page(&[card("B", "$2.00")]))
            .with_page("https://shop.test/page3", page(&[card("C", "$3.00")]));
        let parser = FaultOnPage {
            inner: ProductCardParser::new().unwrap(),
            page: 2,
        };
        let collector = ProductListCollector::new(
            Arc::new(fetcher),
            parser,
            CollectorConfig {
                base_url: BASE.to_string(),
                page_delay: Duration::ZERO,
            },
        );

        let outcome = collector.collect_with_stats(PageRange::new(1, 3), 1000).await;

        assert_eq!(titles(&outcome.products), vec!["A", "C"]);
        assert_eq!(outcome.pages_visited, 3);
        assert_eq!(outcome.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_page_zero_start_collects_nothing() {
        let fetcher = StaticPageFetcher::new()
            .with_page(BASE, page(&[card("A", "$1.00")]))
            .with_page("https://shop.test/page2", page(&[card("B", "$2.00")]));
        let outcome = collector(fetcher).collect_with_stats(PageRange::new(0, 2), 10).await;

        assert!(outcome.products.is_empty());
        assert_eq!(outcome.pages_visited, 0);
    }

    #[tokio::test]
    async fn test_inverted_range_collects_nothing() {
        let fetcher = StaticPageFetcher::new().with_page(BASE, page(&[card("A", "$1.00")]));
        assert!(collector(fetcher).collect(2, 1, 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_start_page_beyond_one_uses_suffix() {
        let fetcher = StaticPageFetcher::new()
            .with_page(BASE, page(&[card("A", "$1.00")]))
            .with_page("https://shop.test/page2", page(&[card("B", "$2.00")]));
        let products = collector(fetcher).collect(2, 2, 10).await;
        assert_eq!(titles(&products), vec!["B"]);
    }
}
