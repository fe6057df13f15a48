//! Selector configuration for listing card extraction

use serde::{Deserialize, Serialize};

/// CSS selectors locating a listing card and its parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSelectors {
    /// One match per product card
    pub card: String,

    /// Product title inside a card
    pub title: String,

    /// Price inside a card
    pub price: String,

    /// Detail paragraphs inside a card, in order: rating, colors, size, gender
    pub detail: String,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            card: "div.collection-card".to_string(),
            title: "h3.product-title".to_string(),
            price: "span.price".to_string(),
            detail: "p".to_string(),
        }
    }
}
