//! # slide2notes
//!
//! Turn a folder of lecture screenshots into grouped Markdown notes.
//!
//! ## Why this crate?
//!
//! Screenshots of a recorded lecture show the slide on top and live
//! captions underneath. Capturing often means the same slide appears dozens
//! of times, each with a different caption. This crate reads every
//! screenshot through OCR, splits the text at a fixed caption line,
//! rebuilds lists and paragraphs, and emits one section per unique slide
//! with every caption that was shown for it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! screenshots/
//!  │
//!  ├─ 1. Input        list images, oldest first, with size + timestamps
//!  ├─ 2. Cache        unchanged image? reuse last run's texts
//!  ├─ 3. OCR          Azure AI Vision read, bounded retry on connection errors
//!  ├─ 4. Classify     split lines at the caption Y threshold
//!  ├─ 5. Reconstruct  bullets, numbered items, headings, wrapped paragraphs
//!  ├─ 6. Group        unique body → set of captions, first-seen order
//!  └─ 7. Output       Markdown document + run stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slide2notes::{extract_notes_to_file, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder("./screenshots")
//!         .caption_threshold(850)
//!         .azure(std::env::var("AZURE_ENDPOINT")?, std::env::var("AZURE_KEY")?)
//!         .build()?;
//!     let output = extract_notes_to_file(&config, "course_notes.md").await?;
//!     eprintln!("{} unique slides, {} failed images",
//!         output.stats.unique_slides,
//!         output.stats.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `slide2notes` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod grouping;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod provider;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cache::{CacheRecord, IncrementalCache};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{CacheError, ImageError, OcrError, SlideNotesError};
pub use extract::{extract_notes, extract_notes_sync, extract_notes_to_file};
pub use grouping::SlideGroupingStore;
pub use output::{render_markdown, NotesOutput, RunStats, SlideSection};
pub use pipeline::classify::{classify, ClassifiedLines};
pub use pipeline::reconstruct::{reconstruct, LineKind};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use provider::{AzureVisionProvider, OcrProvider, TextLine};
