//! Progress-callback trait for per-image extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the screenshot folder. The CLI uses it to
//! drive a progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use slide2notes::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     cached: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_image_cached(&self, _index: usize, _total: usize, name: &str) {
//!         self.cached.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: unchanged, reused cached text");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { cached: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder("./screenshots")
//!     .caption_threshold(850)
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::RunStats;
use std::sync::Arc;

/// Called by the pipeline as it processes each image.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once, after enumeration, before the first image.
    fn on_run_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called before an image is looked up in the cache.
    fn on_image_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a transient OCR failure is about to be retried.
    ///
    /// `attempt` is the number of the attempt that just failed.
    fn on_image_retry(&self, index: usize, name: &str, attempt: u32, error: &str) {
        let _ = (index, name, attempt, error);
    }

    /// Called when an unchanged image was served from the cache.
    fn on_image_cached(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an image was run through OCR successfully.
    ///
    /// `body_len` is the byte length of the reconstructed body text.
    fn on_image_complete(&self, index: usize, total: usize, name: &str, body_len: usize) {
        let _ = (index, total, name, body_len);
    }

    /// Called when an image failed for good.
    fn on_image_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every image has been attempted.
    fn on_run_complete(&self, stats: &RunStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
