//! Domain module - Core records and paging rules
//!
//! This module contains the product records that move through the
//! pipeline and the listing page addressing rules.

pub mod pagination;
pub mod product;

// Re-export commonly used items for convenience
pub use pagination::{PageRange, page_url};
pub use product::{CleanProduct, ProductTable, RawProduct};
