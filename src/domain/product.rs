//! Product records flowing through the ETL pipeline
//!
//! - [`RawProduct`]: free-form field map scraped from one listing card
//! - [`CleanProduct`]: typed, validated row produced by the normalizer
//! - [`ProductTable`]: immutable, title-unique collection handed to every sink

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Canonical field names shared by the extractor, normalizer and sinks
pub mod fields {
    pub const TITLE: &str = "Title";
    pub const PRICE: &str = "Price";
    pub const RATING: &str = "Rating";
    pub const COLORS: &str = "Colors";
    pub const SIZE: &str = "Size";
    pub const GENDER: &str = "Gender";
    pub const TIMESTAMP: &str = "Timestamp";

    /// Column order used by every tabular sink
    pub const COLUMN_ORDER: [&str; 7] = [TITLE, PRICE, RATING, COLORS, SIZE, GENDER, TIMESTAMP];
}

/// Placeholder strings the source site renders instead of real values
pub mod sentinels {
    pub const PRICE_UNAVAILABLE: &str = "Price Unavailable";
    pub const INVALID_RATING: &str = "Invalid Rating";
    pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
}

/// Capture time format, kept verbatim from extraction through every sink
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Raw scraped record: field name -> untrusted text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProduct {
    fields: BTreeMap<String, String>,
}

impl RawProduct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(fields::TITLE)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawProduct {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Normalized product row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanProduct {
    #[serde(rename = "Title")]
    pub title: String,
    /// Price in the target currency (exchange rate already applied)
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Rating")]
    pub rating: f64,
    #[serde(rename = "Colors")]
    pub colors: u32,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl CleanProduct {
    /// Cell values in [`fields::COLUMN_ORDER`]
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.price.to_string(),
            self.rating.to_string(),
            self.colors.to_string(),
            self.size.clone(),
            self.gender.clone(),
            self.timestamp.clone(),
        ]
    }

    /// Render back into a raw field map. Price is emitted as a plain number
    /// in the target currency.
    pub fn to_raw(&self) -> RawProduct {
        fields::COLUMN_ORDER
            .iter()
            .zip(self.to_cells())
            .map(|(field, value)| (*field, value))
            .collect()
    }
}

/// Cleaned result of one pipeline run. Titles are unique; order is discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProductTable {
    rows: Vec<CleanProduct>,
}

impl ProductTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from rows, keeping the first row for every title
    pub fn from_unique(rows: impl IntoIterator<Item = CleanProduct>) -> Self {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|row| seen.insert(row.title.clone()))
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CleanProduct> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[CleanProduct] {
        &self.rows
    }

    pub fn header() -> [&'static str; 7] {
        fields::COLUMN_ORDER
    }

    /// Header-less string rows, one per product
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(CleanProduct::to_cells).collect()
    }

    pub fn to_raw_products(&self) -> Vec<RawProduct> {
        self.rows.iter().map(CleanProduct::to_raw).collect()
    }
}

impl<'a> IntoIterator for &'a ProductTable {
    type Item = &'a CleanProduct;
    type IntoIter = std::slice::Iter<'a, CleanProduct>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
