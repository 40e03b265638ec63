//! Output data model: heading levels, outline entries, and the per-document
//! result that is persisted as JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Heading prominence tier, H1 (most prominent) through H5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
}

impl HeadingLevel {
    /// All levels in table order, most prominent first.
    pub const ALL: [HeadingLevel; 5] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
    ];

    /// Label as it appears in the JSON output ("H1".."H5").
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
            HeadingLevel::H5 => "H5",
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified heading occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingEntry {
    /// Classified level
    pub level: HeadingLevel,

    /// Trimmed heading text
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,
}

impl HeadingEntry {
    /// Create a new heading entry.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// The final extraction result for one document.
///
/// Field order is the JSON key order: `title` first, then `outline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Resolved document title (never empty)
    pub title: String,

    /// Headings in document traversal order (page, then in-page order)
    pub outline: Vec<HeadingEntry>,
}

impl DocumentResult {
    /// Create a new result.
    pub fn new(title: impl Into<String>, outline: Vec<HeadingEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// Serialize as pretty-printed JSON (2-space indent, non-ASCII kept
    /// literal) with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))?;
        json.push('\n');
        Ok(json)
    }
}
