//! # pdfoutline
//!
//! Extracts a structured outline (title + heading hierarchy) from PDF
//! documents by analyzing font-size metadata in page content, producing one
//! JSON result per document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_file, ExtractOptions};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let result = extract_file("document.pdf", &ExtractOptions::default())?;
//!     println!("{}", result.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## How it works
//!
//! - **Title detection**: the first pages are scanned for the largest-font
//!   text tier, which is joined in reading order. When that yields nothing,
//!   the metadata title and finally the filename stand in.
//! - **Heading classification**: each text line's font size is matched
//!   against a fixed table of canonical heading sizes (H1..H5) with a
//!   rejection threshold.
//! - **Bounded extraction**: heading extraction runs on a worker with a hard
//!   wall-clock deadline; timeouts and errors degrade to an empty outline
//!   instead of stalling a batch.

pub mod classify;
pub mod detect;
pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod options;
pub mod process;
pub mod title;

// Re-export commonly used types
pub use classify::{classify_font_size, HEADING_SIZES};
pub use error::{Error, Result};
pub use extract::{extract_outline, extract_outline_bounded};
pub use model::{DocumentResult, HeadingEntry, HeadingLevel};
pub use options::ExtractOptions;
pub use process::{process_dir, process_file, BatchSummary};
pub use title::{detect_title, fallback_title};

use std::fs;
use std::path::Path;

/// Extract the title and outline from a PDF file.
pub fn extract_file<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<DocumentResult> {
    let path = path.as_ref();
    let pdf_bytes = fs::read(path)?;
    process::extract_result(pdf_bytes, Some(path), options)
}

/// Extract the title and outline from PDF bytes.
///
/// Without a source path the last tier of the title fallback chain is the
/// literal `"document"`.
pub fn extract_bytes(data: Vec<u8>, options: &ExtractOptions) -> Result<DocumentResult> {
    process::extract_result(data, None, options)
}
