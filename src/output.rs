//! Run results and Markdown rendering of the grouped notes.

use crate::error::ImageError;
use serde::{Deserialize, Serialize};

/// One unique slide body and every caption seen with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSection {
    /// 1-based position in first-seen order.
    pub index: usize,
    pub body: String,
    /// Sorted lexicographically.
    pub captions: Vec<String>,
}

/// Counters for one run. Observational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Images found in the input directory.
    pub total: usize,
    /// Images sent through OCR successfully.
    pub processed: usize,
    /// Images served from the incremental cache.
    pub skipped: usize,
    /// Images that failed after their retry budget.
    pub failed: usize,
    /// Distinct slide bodies in the output.
    pub unique_slides: usize,
    pub duration_ms: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesOutput {
    pub markdown: String,
    pub slides: Vec<SlideSection>,
    pub stats: RunStats,
    /// Per-image failures, in processing order.
    pub failures: Vec<ImageError>,
}

/// Render sections as a Markdown document.
///
/// Each section gets a numbered heading, the body as a block quote (every
/// line quoted on its own), an optional captions list with one bullet per
/// caption line, and a trailing horizontal rule.
pub fn render_markdown(slides: &[SlideSection]) -> String {
    let mut md = String::new();
    for slide in slides {
        md.push_str(&format!("## Slide {}\n\n", slide.index));

        for line in slide.body.lines() {
            if line.is_empty() {
                md.push_str(">\n");
            } else {
                md.push_str(&format!("> {}\n", line));
            }
        }
        md.push('\n');

        if !slide.captions.is_empty() {
            md.push_str("### Captions:\n");
            for caption in &slide.captions {
                for line in caption.lines().filter(|l| !l.trim().is_empty()) {
                    md.push_str(&format!("* {}\n", line));
                }
            }
            md.push('\n');
        }

        md.push_str("---\n\n");
    }
    md
}
