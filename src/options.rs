//! Extraction options and configuration.

use std::time::Duration;

/// Options for outline extraction.
///
/// All thresholds the pipeline uses are carried here and passed explicitly
/// into the components that need them; there is no ambient mutable state.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum distance (points) from a canonical heading size for a font
    /// size to be classified as that level.
    pub size_threshold: f32,

    /// Spans within this distance of a page's maximum font size are treated
    /// as the same visual tier by the title detector.
    pub title_tolerance: f32,

    /// Number of leading pages the title detector inspects.
    pub title_pages: usize,

    /// Minimum trimmed text length (in chars) for a line to qualify as a
    /// heading. Filters stray glyphs and bullets.
    pub min_text_len: usize,

    /// Wall-clock deadline for heading extraction.
    pub timeout: Duration,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the classifier rejection threshold.
    pub fn with_size_threshold(mut self, threshold: f32) -> Self {
        self.size_threshold = threshold;
        self
    }

    /// Set the title same-tier tolerance.
    pub fn with_title_tolerance(mut self, tolerance: f32) -> Self {
        self.title_tolerance = tolerance;
        self
    }

    /// Set how many leading pages the title detector inspects.
    pub fn with_title_pages(mut self, pages: usize) -> Self {
        self.title_pages = pages;
        self
    }

    /// Set the minimum heading text length.
    pub fn with_min_text_len(mut self, len: usize) -> Self {
        self.min_text_len = len;
        self
    }

    /// Set the heading-extraction deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            size_threshold: 2.0,
            title_tolerance: 0.5,
            title_pages: 3,
            min_text_len: 3,
            timeout: Duration::from_secs(20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.size_threshold, 2.0);
        assert_eq!(options.title_tolerance, 0.5);
        assert_eq!(options.title_pages, 3);
        assert_eq!(options.min_text_len, 3);
        assert_eq!(options.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_builder() {
        let options = ExtractOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_min_text_len(1);
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.min_text_len, 1);
        // Untouched fields keep their defaults
        assert_eq!(options.title_pages, 3);
    }
}
