//! Text span extraction from PDF content streams.
//!
//! Walks a page's decoded content stream, tracking the text matrix for
//! position and scale, and produces [`TextSpan`] values carrying the text,
//! effective font size, and position. Spans are the input to both the title
//! detector and the heading extractor.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// A contiguous run of rendered text sharing font and position attributes.
///
/// Ephemeral: produced and consumed within one page's analysis. `y` is in
/// PDF user space, so larger values are higher on the page.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Effective font size in points (Tf size scaled by the text matrix)
    pub font_size: f32,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: impl Into<String>, font_size: f32, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            x,
            y,
        }
    }
}

/// A text line composed of spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline of the first span)
    pub y: f32,
}

impl TextLine {
    fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        Self { spans, y }
    }

    /// Font size of the first span in the line.
    ///
    /// Lines are treated as font-homogeneous for classification; the first
    /// encountered size stands for the whole line.
    pub fn font_size(&self) -> Option<f32> {
        self.spans.first().map(|s| s.font_size)
    }

    /// Combined text of all spans, joined with single spaces.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Extracts positioned text spans from a loaded PDF document.
pub struct SpanExtractor<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> SpanExtractor<'a> {
    /// Create a new extractor over a loaded document.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Page numbers present in the document, in order (1-indexed).
    pub fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    /// Extract text spans from a page with position and font size.
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let fonts = self
            .doc
            .get_page_fonts(*page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let content = self.page_content(*page_id)?;
        self.parse_content_stream(&content, &fonts)
    }

    /// Group a page's spans into lines in reading order.
    ///
    /// Spans are sorted top-of-page first (descending Y, since PDF Y is
    /// bottom-up) then left-to-right, and grouped by baseline proximity.
    pub fn group_into_lines(&self, spans: Vec<TextSpan>) -> Vec<TextLine> {
        group_spans_into_lines(spans)
    }

    /// Get a page's decompressed content stream bytes.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = page_dict
            .get(b"Contents")
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return Ok(stream_content(s));
                }
                Err(Error::PdfParse("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            content.extend_from_slice(&stream_content(s));
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            Object::Stream(s) => Ok(stream_content(s)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Walk content stream operations and collect text spans.
    fn parse_content_stream(
        &self,
        content: &[u8],
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    ) -> Result<Vec<TextSpan>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut current_font_name: Vec<u8> = Vec::new();
        let mut current_font_size: f32 = 12.0;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    text_matrix = TextMatrix::default();
                }
                "ET" => {
                    in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_name) = &op.operands[0] {
                            current_font_name = font_name.clone();
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        text_matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        text_matrix.set(
                            get_number(&op.operands[0]).unwrap_or(1.0),
                            get_number(&op.operands[1]).unwrap_or(0.0),
                            get_number(&op.operands[2]).unwrap_or(0.0),
                            get_number(&op.operands[3]).unwrap_or(1.0),
                            get_number(&op.operands[4]).unwrap_or(0.0),
                            get_number(&op.operands[5]).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => {
                    text_matrix.next_line();
                }
                "Tj" | "TJ" => {
                    if in_text_block {
                        let encoding = fonts
                            .get(&current_font_name)
                            .and_then(|f| f.get_font_encoding(self.doc).ok());

                        let text = if op.operator == "TJ" {
                            // TJ: array of strings interleaved with kerning
                            // adjustments in 1/1000 text-space units. Large
                            // negative adjustments are how generators encode
                            // word spaces.
                            if let Some(Object::Array(arr)) = op.operands.first() {
                                let mut combined = String::new();
                                let space_threshold = 200.0;

                                for item in arr {
                                    match item {
                                        Object::String(bytes, _) => {
                                            if let Some(ref enc) = encoding {
                                                if let Ok(decoded) =
                                                    LopdfDocument::decode_text(enc, bytes)
                                                {
                                                    combined.push_str(&decoded);
                                                }
                                            } else {
                                                combined.push_str(&decode_text_simple(bytes));
                                            }
                                        }
                                        Object::Integer(n) => {
                                            if -(*n as f32) > space_threshold {
                                                push_word_space(&mut combined);
                                            }
                                        }
                                        Object::Real(n) => {
                                            if -n > space_threshold {
                                                push_word_space(&mut combined);
                                            }
                                        }
                                        _ => {}
                                    }
                                }
                                combined
                            } else {
                                String::new()
                            }
                        } else if let Some(Object::String(bytes, _)) = op.operands.first() {
                            if let Some(ref enc) = encoding {
                                LopdfDocument::decode_text(enc, bytes).unwrap_or_default()
                            } else {
                                decode_text_simple(bytes)
                            }
                        } else {
                            String::new()
                        };

                        push_span(&mut spans, text, current_font_size, &text_matrix);
                    }
                }
                "'" | "\"" => {
                    text_matrix.next_line();
                    if in_text_block {
                        let text_idx = if op.operator == "\"" { 2 } else { 0 };
                        if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                            let encoding = fonts
                                .get(&current_font_name)
                                .and_then(|f| f.get_font_encoding(self.doc).ok());

                            let text = if let Some(ref enc) = encoding {
                                LopdfDocument::decode_text(enc, bytes).unwrap_or_default()
                            } else {
                                decode_text_simple(bytes)
                            };
                            push_span(&mut spans, text, current_font_size, &text_matrix);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

/// A content stream without a `Filter` entry is stored raw; lopdf's
/// `decompressed_content` errors on the missing key, so fall back to the
/// stream bytes as-is.
fn stream_content(s: &lopdf::Stream) -> Vec<u8> {
    s.decompressed_content().unwrap_or_else(|_| s.content.clone())
}

/// Insert a word space for a large kerning adjustment, unless the text
/// already ends with one.
fn push_word_space(combined: &mut String) {
    if !combined.is_empty() && !combined.ends_with(' ') && !combined.ends_with('\u{00A0}') {
        combined.push(' ');
    }
}

/// Append a span for decoded text at the matrix's current position.
///
/// Whitespace-only runs are positioning artifacts, not content, and are
/// dropped.
fn push_span(spans: &mut Vec<TextSpan>, text: String, font_size: f32, matrix: &TextMatrix) {
    if text.trim().is_empty() {
        return;
    }
    let (x, y) = matrix.position();
    let effective_size = font_size * matrix.scale();
    spans.push(TextSpan::new(text, effective_size, x, y));
}

/// Sort spans into reading order and group them into baseline lines.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Sort by Y descending (PDF Y is bottom-up) then X ascending
    spans.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        // Allow 30% of font size baseline variance within a line
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => {
                current_line_spans.push(span);
            }
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
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
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    // Try UTF-8, fall back to Latin-1
    String::from_utf8(bytes.to_vec())
        .unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect())
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default line leading (could be set by TL operator)
        self.f -= 12.0 * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        // Vertical scale factor
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Stream};

    fn span(text: &str, size: f32, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text, size, x, y)
    }

    /// One-page in-memory document whose content stream holds `ops`.
    /// The stream dictionary has no Filter entry, so the bytes stay raw.
    fn single_page_doc(ops: Vec<Operation>) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let content = Content { operations: ops };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn tj_ops(items: Vec<Object>, size: f32) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Real(size)]),
            Operation::new("Td", vec![Object::Real(72.0), Object::Real(700.0)]),
            Operation::new("TJ", vec![Object::Array(items)]),
            Operation::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_extracts_spans_from_unfiltered_stream() {
        let doc = single_page_doc(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Real(24.0)]),
            Operation::new("Td", vec![Object::Real(72.0), Object::Real(700.0)]),
            Operation::new("Tj", vec![Object::string_literal("Annual Report")]),
            Operation::new("ET", vec![]),
        ]);

        let extractor = SpanExtractor::new(&doc);
        let spans = extractor.extract_page_spans(1).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Annual Report");
        assert_eq!(spans[0].font_size, 24.0);
    }

    #[test]
    fn test_extracts_spans_from_inline_content_stream() {
        // Contents held directly as a stream object instead of a reference
        let mut doc = single_page_doc(vec![]);
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Real(18.0)]),
                Operation::new("Td", vec![Object::Real(72.0), Object::Real(650.0)]),
                Operation::new("Tj", vec![Object::string_literal("Background")]),
                Operation::new("ET", vec![]),
            ],
        };
        let inline = Stream::new(dictionary! {}, content.encode().unwrap());

        let pages = doc.get_pages();
        let page_id = *pages.get(&1).unwrap();
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("Contents", Object::Stream(inline));

        let extractor = SpanExtractor::new(&doc);
        let spans = extractor.extract_page_spans(1).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Background");
    }

    #[test]
    fn test_tj_large_negative_adjustment_becomes_space() {
        let doc = single_page_doc(tj_ops(
            vec![
                Object::string_literal("Annual"),
                Object::Integer(-300),
                Object::string_literal("Report"),
            ],
            24.0,
        ));

        let extractor = SpanExtractor::new(&doc);
        let spans = extractor.extract_page_spans(1).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Annual Report");
    }

    #[test]
    fn test_tj_small_adjustment_is_plain_kerning() {
        let doc = single_page_doc(tj_ops(
            vec![
                Object::string_literal("Intro"),
                Object::Integer(-50),
                Object::string_literal("duction"),
            ],
            14.04,
        ));

        let extractor = SpanExtractor::new(&doc);
        let spans = extractor.extract_page_spans(1).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Introduction");
    }

    #[test]
    fn test_tj_real_adjustment_becomes_space() {
        let doc = single_page_doc(tj_ops(
            vec![
                Object::string_literal("Quarterly"),
                Object::Real(-250.5),
                Object::string_literal("Review"),
            ],
            18.0,
        ));

        let extractor = SpanExtractor::new(&doc);
        let spans = extractor.extract_page_spans(1).unwrap();

        assert_eq!(spans[0].text, "Quarterly Review");
    }

    #[test]
    fn test_group_into_lines_reading_order() {
        // Given out of order: footer (low y), title (high y), body
        let spans = vec![
            span("Footer", 8.0, 72.0, 40.0),
            span("Title", 24.0, 72.0, 700.0),
            span("Body", 12.0, 72.0, 650.0),
        ];

        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text(), "Title");
        assert_eq!(lines[1].text(), "Body");
        assert_eq!(lines[2].text(), "Footer");
    }

    #[test]
    fn test_spans_on_same_baseline_join_left_to_right() {
        let spans = vec![
            span("Report", 24.0, 160.0, 700.0),
            span("Annual", 24.0, 72.0, 700.0),
        ];

        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Annual Report");
        assert_eq!(lines[0].font_size(), Some(24.0));
    }

    #[test]
    fn test_baseline_jitter_within_tolerance() {
        // 2pt apart at 12pt font: within the 30% tolerance (3.6pt)
        let spans = vec![span("left", 12.0, 72.0, 500.0), span("right", 12.0, 150.0, 498.0)];
        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_empty_spans() {
        assert!(group_spans_into_lines(vec![]).is_empty());
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("Résumé".as_bytes()), "Résumé");
    }

    #[test]
    fn test_decode_text_simple_latin1_fallback() {
        // 0xE9 is 'é' in Latin-1 but invalid standalone UTF-8
        assert_eq!(decode_text_simple(&[0x52, 0xE9]), "Ré");
    }

    #[test]
    fn test_text_matrix_translate_and_scale() {
        let mut m = TextMatrix::default();
        m.translate(72.0, 700.0);
        assert_eq!(m.position(), (72.0, 700.0));
        assert_eq!(m.scale(), 1.0);

        m.set(2.0, 0.0, 0.0, 2.0, 10.0, 20.0);
        assert_eq!(m.position(), (10.0, 20.0));
        assert_eq!(m.scale(), 2.0);
    }
}
