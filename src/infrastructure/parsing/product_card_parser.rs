//! Listing card parser
//!
//! Turns every `div.collection-card` of a Fashion Studio listing page into a
//! [`RawProduct`]. Values are kept as text; typing happens in the normalizer.
//!
//! Card layout, in document order:
//! - `h3.product-title` - title
//! - `span.price` - price with currency symbol
//! - `p` #1 - `Rating: ⭐ 4.8 / 5`
//! - `p` #2 - `3 Colors`
//! - `p` #3 - `Size: M`
//! - `p` #4 - `Gender: Women`

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{CardSelectors, ContextualParser, ParseContext, ParsingError, ParsingResult};
use crate::domain::product::{RawProduct, fields};

const CURRENCY_SYMBOL: char = '$';
const SIZE_LABEL: &str = "Size:";
const GENDER_LABEL: &str = "Gender:";

/// Parser for extracting raw product cards from listing pages
#[derive(Debug, Clone)]
pub struct ProductCardParser {
    card_selector: Selector,
    title_selector: Selector,
    price_selector: Selector,
    detail_selector: Selector,
}

impl ProductCardParser {
    /// Create a parser with the default Fashion Studio selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&CardSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &CardSelectors) -> ParsingResult<Self> {
        Ok(Self {
            card_selector: compile_selector(&selectors.card)?,
            title_selector: compile_selector(&selectors.title)?,
            price_selector: compile_selector(&selectors.price)?,
            detail_selector: compile_selector(&selectors.detail)?,
        })
    }

    /// Extract every well-formed card of a page. Malformed cards are skipped.
    pub fn extract(&self, html: &Html, context: &ParseContext) -> Vec<RawProduct> {
        let mut products = Vec::new();
        for (index, card) in html.select(&self.card_selector).enumerate() {
            match self.extract_card(&card, context) {
                Ok(product) => products.push(product),
                Err(e) => debug!(
                    "Skipping incomplete card {} on page {}: {}",
                    index, context.page_id, e
                ),
            }
        }
        products
    }

    /// Extract one card; any missing sub-element fails the whole card
    fn extract_card(&self, card: &ElementRef, context: &ParseContext) -> ParsingResult<RawProduct> {
        let title = first_text(card, &self.title_selector)
            .ok_or_else(|| ParsingError::required_field_missing(fields::TITLE, Some("h3.product-title")))?;

        let price = first_text(card, &self.price_selector)
            .ok_or_else(|| ParsingError::required_field_missing(fields::PRICE, Some("span.price")))?
            .replace(CURRENCY_SYMBOL, "");

        let paragraphs: Vec<String> = card
            .select(&self.detail_selector)
            .map(|p| element_text(&p))
            .collect();

        let rating_text = paragraphs
            .first()
            .ok_or_else(|| ParsingError::required_field_missing(fields::RATING, Some("first paragraph")))?;
        let rating = rating_token(rating_text)
            .ok_or_else(|| ParsingError::required_field_missing(fields::RATING, Some("rating tokens")))?;

        let details: Vec<&str> = paragraphs.iter().skip(1).map(|p| p.trim()).collect();
        let colors = details
            .first()
            .and_then(|text| text.split_whitespace().next())
            .ok_or_else(|| ParsingError::required_field_missing(fields::COLORS, Some("second paragraph")))?;
        let size = details
            .get(1)
            .map(|text| strip_label(text, SIZE_LABEL))
            .ok_or_else(|| ParsingError::required_field_missing(fields::SIZE, Some("third paragraph")))?;
        let gender = details
            .get(2)
            .map(|text| strip_label(text, GENDER_LABEL))
            .ok_or_else(|| ParsingError::required_field_missing(fields::GENDER, Some("fourth paragraph")))?;

        Ok(RawProduct::new()
            .with(fields::TITLE, title)
            .with(fields::PRICE, price)
            .with(fields::RATING, rating)
            .with(fields::COLORS, colors)
            .with(fields::SIZE, size)
            .with(fields::GENDER, gender)
            .with(fields::TIMESTAMP, context.captured_at.clone()))
    }
}

impl ContextualParser for ProductCardParser {
    type Output = Vec<RawProduct>;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        Ok(self.extract(html, context))
    }
}

fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, &e.to_string()))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of the first match
fn first_text(card: &ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|e| element_text(&e).trim().to_string())
}

/// Third-from-last whitespace token: `Rating: ⭐ 4.8 / 5` -> `4.8`
fn rating_token(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens
        .len()
        .checked_sub(3)
        .map(|i| tokens[i].to_string())
}

fn strip_label(text: &str, label: &str) -> String {
    text.replace(label, "").trim().to_string()
}
