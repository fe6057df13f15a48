//! Infrastructure layer for HTTP fetching, parsing, configuration and sinks
//!
//! Everything that touches the outside world lives here: the listing page
//! client, the HTML card parser, the CSV / PostgreSQL / Google Sheets sinks,
//! configuration loading and logging setup.

pub mod config; // Environment-driven settings
pub mod logging; // Logging infrastructure
pub mod parsing; // Card extraction
pub mod parsing_error;
pub mod simple_http_client;
pub mod sinks; // Load stage destinations

// Re-export commonly used items
pub use config::AppConfig;
pub use parsing::{CardSelectors, ParseContext, ParsingError, ParsingResult, ProductCardParser};
pub use simple_http_client::{FetchError, HttpClient, PageFetcher, StaticPageFetcher};
pub use sinks::{CsvSink, MemorySink, PostgresSink, ProductSink, SheetsSink, SinkError, SinkReport};
