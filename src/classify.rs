//! Heading level classification from font size.
//!
//! A nearest-centroid lookup over five canonical sizes with a rejection
//! band. Sizes farther than the threshold from every canonical size are not
//! headings.

use crate::model::HeadingLevel;

/// Canonical font size for each heading level, in table order.
///
/// The order matters: the scan below uses strict less-than, so on an exact
/// tie between two levels the earlier entry keeps priority.
pub const HEADING_SIZES: [(HeadingLevel, f32); 5] = [
    (HeadingLevel::H1, 24.0),
    (HeadingLevel::H2, 18.0),
    (HeadingLevel::H3, 14.04),
    (HeadingLevel::H4, 12.0),
    (HeadingLevel::H5, 9.96),
];

/// Map a font size to a heading level.
///
/// Returns the level whose canonical size is nearest to `font_size`, or
/// `None` if the nearest distance exceeds `threshold`.
pub fn classify_font_size(font_size: f32, threshold: f32) -> Option<HeadingLevel> {
    let mut closest: Option<HeadingLevel> = None;
    let mut smallest_diff = f32::INFINITY;

    for (level, canonical) in HEADING_SIZES {
        let diff = (font_size - canonical).abs();
        if diff < smallest_diff {
            smallest_diff = diff;
            closest = Some(level);
        }
    }

    if smallest_diff <= threshold {
        closest
    } else {
        None
    }
}
