//! Raw record normalization
//!
//! Coerces scraped text into typed [`CleanProduct`] rows:
//! 1. fail closed when a required column is absent from every record
//! 2. drop sentinel rows (`Price Unavailable`, `Invalid Rating`, `Unknown Product`)
//! 3. coerce price / rating / colors, unparsable values become missing
//! 4. drop rows with any missing value
//! 5. keep the first row per title

#![allow(clippy::uninlined_format_args)]

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::domain::product::{CleanProduct, ProductTable, RawProduct, fields, sentinels};
use crate::infrastructure::config::TransformConfig;

static DECIMAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)?").expect("decimal pattern is valid"));
static INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("integer pattern is valid"));

/// Columns that must exist somewhere in the input
const REQUIRED_COLUMNS: [&str; 4] = [fields::TITLE, fields::PRICE, fields::RATING, fields::COLORS];

/// Why rows were dropped during one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub missing_columns: Vec<String>,
    pub sentinel: usize,
    pub coercion: usize,
    pub missing_title: usize,
    pub duplicate: usize,
    pub output_rows: usize,
}

/// Transform stage
#[derive(Debug, Clone)]
pub struct ProductNormalizer {
    exchange_rate: f64,
}

impl Default for ProductNormalizer {
    fn default() -> Self {
        Self::from_config(&TransformConfig::default())
    }
}

impl ProductNormalizer {
    pub fn new(exchange_rate: f64) -> Self {
        Self { exchange_rate }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(config.exchange_rate)
    }

    pub fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    pub fn normalize(&self, raw: &[RawProduct]) -> ProductTable {
        self.normalize_with_report(raw).0
    }

    pub fn normalize_with_report(&self, raw: &[RawProduct]) -> (ProductTable, NormalizeReport) {
        let mut report = NormalizeReport {
            input_rows: raw.len(),
            ..NormalizeReport::default()
        };

        if raw.is_empty() {
            warn!("No raw products to transform");
            return (ProductTable::empty(), report);
        }

        let shape: BTreeSet<&str> = raw.iter().flat_map(RawProduct::field_names).collect();
        report.missing_columns = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !shape.contains(*column))
            .map(ToString::to_string)
            .collect();
        if !report.missing_columns.is_empty() {
            warn!("Required columns missing from input: {:?}", report.missing_columns);
            return (ProductTable::empty(), report);
        }

        let mut seen_titles = HashSet::new();
        let mut rows = Vec::new();
        for record in raw {
            if is_sentinel(record) {
                report.sentinel += 1;
                continue;
            }
            let Some(title) = record.title().filter(|t| !t.trim().is_empty()) else {
                report.missing_title += 1;
                continue;
            };
            let Some(row) = self.coerce(title, record) else {
                report.coercion += 1;
                continue;
            };
            if !seen_titles.insert(row.title.clone()) {
                report.duplicate += 1;
                continue;
            }
            rows.push(row);
        }

        report.output_rows = rows.len();
        info!(
            "🔄 Transform finished: {} -> {} rows (sentinel {}, unparsable {}, untitled {}, duplicate {})",
            report.input_rows,
            report.output_rows,
            report.sentinel,
            report.coercion,
            report.missing_title,
            report.duplicate
        );
        (ProductTable::from_unique(rows), report)
    }

    fn coerce(&self, title: &str, record: &RawProduct) -> Option<CleanProduct> {
        let price = record
            .get(fields::PRICE)
            .and_then(parse_price)
            .map(|usd| usd * self.exchange_rate)
            .filter(|p| p.is_finite() && *p > 0.0)?;
        let rating = record.get(fields::RATING).and_then(parse_rating)?;
        let colors = record.get(fields::COLORS).and_then(parse_colors)?;

        Some(CleanProduct {
            title: title.to_string(),
            price,
            rating,
            colors,
            size: record.get(fields::SIZE).unwrap_or_default().to_string(),
            gender: record.get(fields::GENDER).unwrap_or_default().to_string(),
            timestamp: record.get(fields::TIMESTAMP).unwrap_or_default().to_string(),
        })
    }
}

/// Case-sensitive placeholder checks, applied before coercion
fn is_sentinel(record: &RawProduct) -> bool {
    record
        .get(fields::PRICE)
        .is_some_and(|p| p.contains(sentinels::PRICE_UNAVAILABLE))
        || record
            .get(fields::RATING)
            .is_some_and(|r| r.contains(sentinels::INVALID_RATING))
        || record.title() == Some(sentinels::UNKNOWN_PRODUCT)
}

/// `"$100.50"` -> `100.5`
pub fn parse_price(text: &str) -> Option<f64> {
    text.replace('$', "").trim().parse::<f64>().ok()
}

/// First decimal or integer found anywhere in the text
pub fn parse_rating(text: &str) -> Option<f64> {
    DECIMAL_PATTERN
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|r| r.is_finite())
}

/// First integer found anywhere in the text
pub fn parse_colors(text: &str) -> Option<u32> {
    INTEGER_PATTERN.find(text).and_then(|m| m.as_str().parse().ok())
}
