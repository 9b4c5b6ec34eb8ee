//! OCR invocation with bounded retry.
//!
//! Long batches over a home connection see the odd connection reset. Those
//! are worth another try after a short pause; a rejected key or a malformed
//! response is not, and fails the image straight away. The pause between
//! attempts is fixed.

use crate::config::ExtractionConfig;
use crate::error::{ImageError, OcrError};
use crate::pipeline::input::ImageFile;
use crate::provider::{OcrProvider, TextLine};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Lines recognised for one image and how many calls it took.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub lines: Vec<TextLine>,
    pub attempts: u32,
}

/// Read `image` and run it through `provider`, retrying transient failures.
///
/// At most `config.max_attempts` calls are made, `config.retry_delay_ms`
/// apart. Reading the file happens inside each attempt, so a flaky network
/// share is retried like a flaky OCR endpoint.
pub async fn extract_lines(
    provider: &Arc<dyn OcrProvider>,
    image: &ImageFile,
    index: usize,
    config: &ExtractionConfig,
) -> Result<Extraction, ImageError> {
    let max_attempts = config.max_attempts.max(1);
    let delay = Duration::from_millis(config.retry_delay_ms);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match analyze_file(provider.as_ref(), image).await {
            Ok(lines) => {
                debug!(
                    "{}: {} OCR lines on attempt {}",
                    image.name,
                    lines.len(),
                    attempt
                );
                return Ok(Extraction {
                    lines,
                    attempts: attempt,
                });
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let msg = e.to_string();
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {}ms",
                    image.name, attempt, max_attempts, msg, config.retry_delay_ms
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_retry(index, &image.name, attempt, &msg);
                }
                sleep(delay).await;
            }
            Err(e) => {
                warn!("{}: attempt {} failed: {}", image.name, attempt, e);
                return Err(ImageError::ExtractionFailed {
                    image: image.name.clone(),
                    attempts: attempt,
                    detail: e.to_string(),
                });
            }
        }
    }
}

async fn analyze_file(provider: &dyn OcrProvider, image: &ImageFile) -> Result<Vec<TextLine>, OcrError> {
    let bytes = tokio::fs::read(&image.path).await?;
    provider.analyze(&bytes).await
}
