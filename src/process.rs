//! Per-document orchestration and the batch directory loop.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use lopdf::Document as LopdfDocument;

use crate::detect;
use crate::error::{Error, Result};
use crate::extract::extract_outline_bounded;
use crate::model::DocumentResult;
use crate::options::ExtractOptions;
use crate::title::{detect_title, fallback_title};

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files processed successfully
    pub processed: usize,
    /// Files that failed and were skipped
    pub failed: usize,
}

/// Extract a [`DocumentResult`] from PDF bytes.
///
/// `path` is used only for the filename tier of the title fallback chain;
/// pass `None` when no source path exists.
pub fn extract_result(
    pdf_bytes: Vec<u8>,
    path: Option<&Path>,
    options: &ExtractOptions,
) -> Result<DocumentResult> {
    if !detect::is_pdf_bytes(&pdf_bytes) {
        return Err(Error::UnknownFormat);
    }

    // Title detection runs on the caller's document; heading extraction gets
    // its own copy inside the bounded worker.
    let title_start = Instant::now();
    let title = match LopdfDocument::load_mem(&pdf_bytes) {
        Ok(doc) => detect_title(&doc, options)
            .unwrap_or_else(|| fallback_title(Some(&doc), path)),
        Err(e) => {
            log::warn!("Failed to load document for title detection: {}", e);
            fallback_title(None, path)
        }
    };
    log::debug!("Title extraction took {:?}", title_start.elapsed());

    let heading_start = Instant::now();
    let outline = extract_outline_bounded(pdf_bytes, options);
    log::debug!("Heading extraction took {:?}", heading_start.elapsed());

    Ok(DocumentResult::new(title, outline))
}

/// Process one PDF file: extract title and outline, write JSON to `output`.
pub fn process_file(input: &Path, output: &Path, options: &ExtractOptions) -> Result<()> {
    let start = Instant::now();
    log::info!("Processing {}", input.display());

    let pdf_bytes = fs::read(input)?;
    let result = extract_result(pdf_bytes, Some(input), options)?;

    fs::write(output, result.to_json()?)?;

    log::info!(
        "Wrote {} (title: {:?}, {} headings) in {:?}",
        output.display(),
        result.title,
        result.outline.len(),
        start.elapsed()
    );
    Ok(())
}

/// Output path for an input PDF: `<output_dir>/<stem>.json`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Enumerate batch candidates: files in `input_dir` with a case-insensitive
/// `.pdf` extension, sorted for deterministic processing order.
pub fn collect_pdf_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && detect::has_pdf_extension(path))
        .collect();
    files.sort();
    Ok(files)
}

/// Process every PDF in `input_dir`, writing one JSON file per input into
/// `output_dir` (created if absent).
///
/// A single file's failure is logged and the batch continues. An unreadable
/// input directory propagates as an error.
pub fn process_dir(
    input_dir: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<BatchSummary> {
    let files = collect_pdf_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut summary = BatchSummary::default();
    for input in &files {
        let output = output_path_for(input, output_dir);
        match process_file(input, &output, options) {
            Ok(()) => summary.processed += 1,
            Err(e) => {
                log::error!("Failed to process {}: {}", input.display(), e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for() {
        let path = output_path_for(Path::new("/in/Report.pdf"), Path::new("/out"));
        assert_eq!(path, PathBuf::from("/out/Report.json"));
    }

    #[test]
    fn test_collect_pdf_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        fs::write(dir.path().join("a.PDF"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let files = collect_pdf_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_collect_pdf_files_missing_dir() {
        let result = collect_pdf_files(Path::new("/no/such/dir"));
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_result_rejects_non_pdf() {
        let result = extract_result(b"plain text".to_vec(), None, &ExtractOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}
