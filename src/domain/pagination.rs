//! Listing page addressing.
//!
//! Rules:
//! - page 1 is the bare base URL
//! - page N (N > 1) appends `page{N}` to the base URL

/// Build the listing URL for a 1-based page number. Page 0 is not a
/// listing page; callers walk a [`PageRange`], which never yields it.
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}/page{}", base_url.trim_end_matches('/'), page)
    }
}

/// Inclusive page range walked by one collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Inverted ranges and ranges starting at page 0 hold no pages
    pub fn is_empty(&self) -> bool {
        self.start == 0 || self.start > self.end
    }

    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        let end = if self.is_empty() { 0 } else { self.end };
        self.start.max(1)..=end
    }

    pub fn is_last(&self, page: u32) -> bool {
        page >= self.end
    }
}
