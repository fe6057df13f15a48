//! Parsing context for listing page extraction

use chrono::Local;

use crate::domain::product::TIMESTAMP_FORMAT;

/// Context information for parsing one listing page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Current page being parsed
    pub page_id: u32,

    /// Capture time stamped onto every record of the page
    pub captured_at: String,
}

impl ParseContext {
    /// Create new parse context stamped with the current local time
    pub fn new(page_id: u32) -> Self {
        Self {
            page_id,
            captured_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Override the capture time
    #[must_use]
    pub fn with_captured_at(mut self, captured_at: impl Into<String>) -> Self {
        self.captured_at = captured_at.into();
        self
    }
}
