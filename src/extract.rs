//! Run entry points: walk the screenshot folder and build grouped notes.
//!
//! Images are handled one at a time, oldest first. For each image:
//!
//! ```text
//! cache lookup ──hit──────────────────────────────────────┐
//!      │ miss                                             ▼
//!      └─▶ OCR (retry) ─▶ classify ─▶ reconstruct ×2 ─▶ grouping.add ─▶ cache.record
//! ```
//!
//! A cache hit skips OCR but still feeds the grouping store, so a resumed
//! run produces the same document as a fresh one. All run state lives in a
//! [`RunState`] created at the start and consumed at the end.

use crate::cache::{write_atomic, IncrementalCache};
use crate::config::ExtractionConfig;
use crate::error::{ImageError, SlideNotesError};
use crate::grouping::SlideGroupingStore;
use crate::output::{render_markdown, NotesOutput, RunStats};
use crate::pipeline::classify::classify;
use crate::pipeline::input::{self, ImageFile};
use crate::pipeline::ocr;
use crate::pipeline::reconstruct::reconstruct;
use crate::provider::{AzureVisionProvider, OcrProvider, TextLine};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What happened to one image. Exactly one counter moves per outcome.
#[derive(Debug, Clone)]
pub enum ImageOutcome {
    /// OCR ran and the result was recorded.
    Processed,
    /// Served from the incremental cache.
    Skipped,
    Failed(ImageError),
}

/// Mutable state for a single run.
#[derive(Debug)]
pub struct RunState {
    pub store: SlideGroupingStore,
    pub cache: IncrementalCache,
    pub stats: RunStats,
    pub failures: Vec<ImageError>,
}

impl RunState {
    pub fn new(cache: IncrementalCache, total: usize) -> Self {
        Self {
            store: SlideGroupingStore::new(),
            cache,
            stats: RunStats {
                total,
                ..RunStats::default()
            },
            failures: Vec::new(),
        }
    }

    /// Count `outcome` against exactly one of processed / skipped / failed.
    pub fn tally(&mut self, outcome: ImageOutcome) {
        match outcome {
            ImageOutcome::Processed => self.stats.processed += 1,
            ImageOutcome::Skipped => self.stats.skipped += 1,
            ImageOutcome::Failed(e) => {
                self.stats.failed += 1;
                self.failures.push(e);
            }
        }
    }

    /// Consume the state into the run's result.
    pub fn finish(self, started: Instant) -> NotesOutput {
        let slides = self.store.finalize();
        let markdown = render_markdown(&slides);
        let stats = RunStats {
            unique_slides: slides.len(),
            duration_ms: started.elapsed().as_millis() as u64,
            ..self.stats
        };
        NotesOutput {
            markdown,
            slides,
            stats,
            failures: self.failures,
        }
    }
}

/// Extract grouped notes from every screenshot in `config.input_dir`.
///
/// # Returns
/// `Ok(NotesOutput)` even when some images failed (check
/// `output.stats.failed` / `output.failures`).
///
/// # Errors
/// Returns `Err(SlideNotesError)` only for fatal errors:
/// - OCR provider not configured
/// - Input directory missing or holding no images
///
/// The incremental cache is saved before this returns; a failure to save
/// is logged, not returned.
pub async fn extract_notes(config: &ExtractionConfig) -> Result<NotesOutput, SlideNotesError> {
    let started = Instant::now();
    info!("Starting extraction: {}", config.input_dir.display());

    // ── Step 1: Resolve provider ─────────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 2: Enumerate images ─────────────────────────────────────────
    let images = input::list_images(&config.input_dir)?;
    let total = images.len();
    info!("Found {} images to process", total);

    // ── Step 3: Load cache ───────────────────────────────────────────────
    let cache = match config.cache_path {
        Some(ref path) => IncrementalCache::load(path),
        None => IncrementalCache::disabled(),
    };
    let mut state = RunState::new(cache, total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    // ── Step 4: Process sequentially ─────────────────────────────────────
    for (i, image) in images.iter().enumerate() {
        let outcome = process_image(&provider, image, i + 1, total, &mut state, config).await;
        state.tally(outcome);
    }

    // ── Step 5: Persist cache ────────────────────────────────────────────
    let pruned = state
        .cache
        .retain_listed(images.iter().map(|image| image.name.as_str()));
    if pruned > 0 {
        debug!("Dropped {} cache record(s) for images no longer present", pruned);
    }
    if let Err(e) = state.cache.save() {
        warn!("Could not save cache; the next run will redo OCR: {}", e);
    }

    // ── Step 6: Assemble result ──────────────────────────────────────────
    let output = state.finish(started);
    info!(
        "Extraction complete: {} unique slides from {} images ({} processed, {} cached, {} failed) in {}ms",
        output.stats.unique_slides,
        output.stats.total,
        output.stats.processed,
        output.stats.skipped,
        output.stats.failed,
        output.stats.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&output.stats);
    }

    Ok(output)
}

/// Extract notes and write the Markdown to `output_path`.
///
/// Written the same way as the cache: a sibling temp file persisted over
/// the target, so a failed write leaves no partial file behind. The
/// cache has already been saved when the write happens, so a failed write
/// loses only the document.
pub async fn extract_notes_to_file(
    config: &ExtractionConfig,
    output_path: impl AsRef<Path>,
) -> Result<NotesOutput, SlideNotesError> {
    let output = extract_notes(config).await?;
    let path = output_path.as_ref().to_path_buf();

    let target = path.clone();
    let markdown = output.markdown.clone();
    tokio::task::spawn_blocking(move || write_atomic(&target, markdown.as_bytes()))
        .await
        .map_err(|e| SlideNotesError::Internal(format!("Output write task failed: {}", e)))?
        .map_err(|source| SlideNotesError::OutputWriteFailed {
            path: path.clone(),
            source,
        })?;

    info!("Wrote {} slides to {}", output.slides.len(), path.display());
    Ok(output)
}

/// Synchronous wrapper around [`extract_notes`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_notes_sync(config: &ExtractionConfig) -> Result<NotesOutput, SlideNotesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SlideNotesError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_notes(config))
}

/// Split and reconstruct one image's OCR lines into `(body, caption)`.
pub fn texts_from_lines(lines: Vec<TextLine>, caption_threshold: i64) -> (String, String) {
    let classified = classify(lines, caption_threshold);
    let body = reconstruct(&classified.body_text());
    let caption = reconstruct(&classified.caption_text());
    (body, caption)
}

/// Run one image through cache lookup or OCR and fold the result into `state`.
pub async fn process_image(
    provider: &Arc<dyn OcrProvider>,
    image: &ImageFile,
    index: usize,
    total: usize,
    state: &mut RunState,
    config: &ExtractionConfig,
) -> ImageOutcome {
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_image_start(index, total, &image.name);
    }

    if let Some(hit) = state.cache.lookup_image(image) {
        debug!("{}: unchanged since last run, using cached text", image.name);
        state.store.add(hit.body, hit.caption);
        if let Some(cb) = cb {
            cb.on_image_cached(index, total, &image.name);
        }
        return ImageOutcome::Skipped;
    }

    match ocr::extract_lines(provider, image, index, config).await {
        Ok(extraction) => {
            let (body, caption) = texts_from_lines(extraction.lines, config.caption_threshold);
            debug!(
                "{}: body {} bytes, caption {} bytes",
                image.name,
                body.len(),
                caption.len()
            );
            state.store.add(&body, &caption);
            state.cache.record_image(image, &body, &caption);
            if let Some(cb) = cb {
                cb.on_image_complete(index, total, &image.name, body.len());
            }
            ImageOutcome::Processed
        }
        Err(e) => {
            warn!("Error processing {}: {}", image.name, e);
            if let Some(cb) = cb {
                cb.on_image_error(index, total, &image.name, &e.to_string());
            }
            ImageOutcome::Failed(e)
        }
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the OCR provider: a pre-built one wins, then Azure credentials.
fn resolve_provider(config: &ExtractionConfig) -> Result<Arc<dyn OcrProvider>, SlideNotesError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    match (config.azure_endpoint.as_deref(), config.azure_key.as_deref()) {
        (Some(endpoint), Some(key)) if !endpoint.is_empty() && !key.is_empty() => {
            let provider = AzureVisionProvider::new(endpoint, key, config.request_timeout_secs)
                .map_err(|e| SlideNotesError::ProviderNotConfigured {
                    hint: format!("Failed to initialise the Azure client: {e}"),
                })?;
            info!("Azure AI Vision client initialised");
            Ok(Arc::new(provider))
        }
        _ => Err(SlideNotesError::ProviderNotConfigured {
            hint: "Set AZURE_ENDPOINT and AZURE_KEY (or pass --endpoint / --key).".into(),
        }),
    }
}
