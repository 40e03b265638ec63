//! Title detection and fallback resolution.
//!
//! The detector scans the leading pages for the largest-font text tier and
//! joins it in reading order. When that yields nothing, the fallback chain
//! tries the document metadata title and finally the input file's stem.

use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::layout::SpanExtractor;
use crate::options::ExtractOptions;

/// Detect the document title from the largest-font spans on the first pages.
///
/// Inspects at most `options.title_pages` pages. The first page that yields
/// any spans decides the outcome: the spans within `options.title_tolerance`
/// of that page's maximum font size are sorted top-of-page first, then
/// left-to-right, and joined with single spaces. Returns `None` when no
/// inspected page has spans; callers treat this as an expected outcome, not
/// an error.
pub fn detect_title(doc: &LopdfDocument, options: &ExtractOptions) -> Option<String> {
    let extractor = SpanExtractor::new(doc);

    for page_num in extractor.page_numbers().into_iter().take(options.title_pages) {
        // An extraction error ends detection; the fallback chain takes over
        let spans = match extractor.extract_page_spans(page_num) {
            Ok(spans) => spans,
            Err(e) => {
                log::warn!("Title detection failed on page {}: {}", page_num, e);
                return None;
            }
        };

        if spans.is_empty() {
            continue;
        }

        let max_size = spans
            .iter()
            .map(|s| s.font_size)
            .fold(f32::NEG_INFINITY, f32::max);

        // Near-equal sizes are the same visual tier; tolerate rendering jitter
        let mut title_spans: Vec<_> = spans
            .into_iter()
            .filter(|s| (s.font_size - max_size).abs() < options.title_tolerance)
            .collect();

        if title_spans.is_empty() {
            continue;
        }

        // Reading order: descending Y (PDF Y is bottom-up) then ascending X
        title_spans.sort_by(|a, b| {
            let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
            if y_cmp == std::cmp::Ordering::Equal {
                a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
            } else {
                y_cmp
            }
        });

        let title = title_spans
            .iter()
            .map(|s| s.text.trim())
            .collect::<Vec<_>>()
            .join(" ");

        return Some(title);
    }

    None
}

/// Resolve a title when span-based detection found nothing.
///
/// Prefers the document Info dictionary's `Title` if non-blank, else the
/// input file's stem. Never fails and never returns an empty string; a path
/// with no usable stem falls back to `"document"`.
pub fn fallback_title(doc: Option<&LopdfDocument>, path: Option<&Path>) -> String {
    if let Some(doc) = doc {
        if let Some(meta_title) = metadata_title(doc) {
            let trimmed = meta_title.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    path.and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "document".to_string())
}

/// Read the `Title` field from the document Info dictionary.
pub fn metadata_title(doc: &LopdfDocument) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let info_ref = info.as_reference().ok()?;
    let info_dict = doc.get_dictionary(info_ref).ok()?;
    get_string_from_dict(info_dict, b"Title")
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| {
        match obj {
            lopdf::Object::String(bytes, _) => {
                // Try UTF-16BE first (PDF standard for Unicode)
                if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                    let utf16: Vec<u16> = bytes[2..]
                        .chunks(2)
                        .filter_map(|c| {
                            if c.len() == 2 {
                                Some(u16::from_be_bytes([c[0], c[1]]))
                            } else {
                                None
                            }
                        })
                        .collect();
                    String::from_utf16(&utf16).ok()
                } else {
                    // Try as UTF-8, fall back to Latin-1
                    String::from_utf8(bytes.clone())
                        .ok()
                        .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
                }
            }
            lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
            _ => None,
        }
    })
}
