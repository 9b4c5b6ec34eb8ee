//! Split OCR lines into the slide body and the caption strip.
//!
//! Screenshots of recorded lectures put the slide on top and subtitles or
//! speaker notes underneath. A single horizontal line, the caption
//! threshold, separates the two. Everything that starts above it is body.

use crate::provider::TextLine;

/// Body and caption lines, each in top-to-bottom reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLines {
    pub body: Vec<TextLine>,
    pub caption: Vec<TextLine>,
}

impl ClassifiedLines {
    /// Text of the body lines, in order.
    pub fn body_text(&self) -> Vec<&str> {
        self.body.iter().map(|l| l.text.as_str()).collect()
    }

    /// Text of the caption lines, in order.
    pub fn caption_text(&self) -> Vec<&str> {
        self.caption.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Sort `lines` by `top_y` (stable) and partition at `threshold`.
///
/// A line belongs to the body when `top_y < threshold`, otherwise to the
/// caption.
pub fn classify(mut lines: Vec<TextLine>, threshold: i64) -> ClassifiedLines {
    lines.sort_by_key(|l| l.top_y);
    let (body, caption): (Vec<TextLine>, Vec<TextLine>) =
        lines.into_iter().partition(|l| l.top_y < threshold);
    ClassifiedLines { body, caption }
}
