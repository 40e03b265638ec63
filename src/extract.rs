//! Heading extraction and the bounded execution wrapper.
//!
//! The extractor walks every page's text lines and classifies each line's
//! font size against the canonical heading table. Because malformed PDFs can
//! make content-stream traversal pathologically slow, callers run it through
//! [`extract_outline_bounded`], which enforces a wall-clock deadline on a
//! dedicated worker and degrades failures to an empty outline.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use lopdf::Document as LopdfDocument;

use crate::classify::classify_font_size;
use crate::error::Result;
use crate::layout::SpanExtractor;
use crate::model::HeadingEntry;
use crate::options::ExtractOptions;

/// Extract the heading outline from a loaded document.
///
/// Pages are traversed in order; per page, spans are grouped into lines, a
/// line's font size is that of its first span, and lines whose trimmed text
/// is at least `options.min_text_len` chars are classified. Any traversal
/// error aborts the whole document's extraction; no partial outline is
/// returned.
pub fn extract_outline(doc: &LopdfDocument, options: &ExtractOptions) -> Result<Vec<HeadingEntry>> {
    let extractor = SpanExtractor::new(doc);
    let mut outline = Vec::new();

    for page_num in extractor.page_numbers() {
        let spans = extractor.extract_page_spans(page_num)?;
        let lines = extractor.group_into_lines(spans);

        for line in lines {
            let font_size = match line.font_size() {
                Some(size) => size,
                None => continue,
            };

            let text = line.text();
            let trimmed = text.trim();
            if trimmed.chars().count() < options.min_text_len {
                continue;
            }

            if let Some(level) = classify_font_size(font_size, options.size_threshold) {
                outline.push(HeadingEntry::new(level, trimmed, page_num));
            }
        }
    }

    Ok(outline)
}

/// Run heading extraction over raw PDF bytes under a wall-clock deadline.
///
/// The worker thread loads its own document from `pdf_bytes`, so nothing is
/// shared with the caller beyond the one-shot result channel. An extraction
/// error or a deadline overrun degrades to an empty outline; nothing is
/// retried and no partial results are salvaged from a timed-out worker.
pub fn extract_outline_bounded(pdf_bytes: Vec<u8>, options: &ExtractOptions) -> Vec<HeadingEntry> {
    let worker_options = options.clone();
    run_bounded(options.timeout, move || {
        let doc = LopdfDocument::load_mem(&pdf_bytes)?;
        extract_outline(&doc, &worker_options)
    })
}

/// Run `task` on a dedicated worker thread with a hard deadline.
///
/// Three outcomes:
///
/// - the task finishes in time with an outline: that outline is returned;
/// - the task finishes in time with an error: logged, empty outline;
/// - the deadline expires: logged, the worker is abandoned and its eventual
///   result discarded (the bounded(1) send has no receiver left), empty
///   outline.
fn run_bounded<F>(timeout: Duration, task: F) -> Vec<HeadingEntry>
where
    F: FnOnce() -> Result<Vec<HeadingEntry>> + Send + 'static,
{
    let (tx, rx) = bounded::<Result<Vec<HeadingEntry>>>(1);

    let spawned = thread::Builder::new()
        .name("outline-extract".to_string())
        .spawn(move || {
            // The receiver may be gone after a timeout; the send result is
            // intentionally ignored.
            let _ = tx.send(task());
        });

    if let Err(e) = spawned {
        log::error!("Failed to spawn extraction worker: {}", e);
        return Vec::new();
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(outline)) => outline,
        Ok(Err(e)) => {
            log::warn!("Heading extraction failed: {}", e);
            Vec::new()
        }
        Err(RecvTimeoutError::Timeout) => {
            log::warn!(
                "Heading extraction timed out after {:?}; returning empty outline",
                timeout
            );
            Vec::new()
        }
        Err(RecvTimeoutError::Disconnected) => {
            // Worker panicked before sending
            log::warn!("Heading extraction worker disconnected; returning empty outline");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::HeadingLevel;
    use std::time::Instant;

    #[test]
    fn test_run_bounded_success() {
        let outline = run_bounded(Duration::from_secs(1), || {
            Ok(vec![HeadingEntry::new(HeadingLevel::H1, "Intro", 1)])
        });
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "Intro");
    }

    #[test]
    fn test_run_bounded_error_degrades_to_empty() {
        let outline = run_bounded(Duration::from_secs(1), || {
            Err(Error::TextExtract("broken page".to_string()))
        });
        assert!(outline.is_empty());
    }

    #[test]
    fn test_run_bounded_timeout_degrades_to_empty() {
        let start = Instant::now();
        let outline = run_bounded(Duration::from_millis(100), || {
            thread::sleep(Duration::from_secs(10));
            Ok(vec![HeadingEntry::new(HeadingLevel::H1, "too late", 1)])
        });
        let elapsed = start.elapsed();

        assert!(outline.is_empty());
        // Bounded by roughly the deadline, not the task duration
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_run_bounded_panicking_task_degrades_to_empty() {
        let outline = run_bounded(Duration::from_secs(1), || panic!("worker crash"));
        assert!(outline.is_empty());
    }

    #[test]
    fn test_bounded_invalid_bytes_degrade_to_empty() {
        let options = ExtractOptions::default();
        let outline = extract_outline_bounded(b"not a pdf".to_vec(), &options);
        assert!(outline.is_empty());
    }
}
