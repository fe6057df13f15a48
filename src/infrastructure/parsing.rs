//! HTML parsing for listing pages
//!
//! Trait-based parsing: a parser takes an already-parsed document plus a
//! per-page context and yields raw records. Card-level failures never abort
//! a page.

pub mod config;
pub mod context;
pub mod error;
pub mod product_card_parser;

// Re-export public types
pub use config::CardSelectors;
pub use context::ParseContext;
pub use error::{ParsingError, ParsingResult};
pub use product_card_parser::ProductCardParser;

use scraper::Html;

/// Enhanced parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}
