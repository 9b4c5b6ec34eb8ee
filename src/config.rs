//! Configuration types for a note-extraction run.
//!
//! All run behaviour is controlled through [`ExtractionConfig`], built via
//! its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it easy to share a config between the CLI and library callers and to log
//! exactly what a run was asked to do.
//!
//! # The caption threshold
//! There is no sensible default for where captions start: it depends on the
//! screenshot resolution and on where the player draws subtitles. The
//! builder therefore refuses to build without one.

use crate::cache::DEFAULT_CACHE_FILE;
use crate::error::SlideNotesError;
use crate::progress::ProgressCallback;
use crate::provider::OcrProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`].
///
/// # Example
/// ```rust
/// use slide2notes::ExtractionConfig;
///
/// let config = ExtractionConfig::builder("./screenshots")
///     .caption_threshold(850)
///     .azure("https://demo.cognitiveservices.azure.com/", "key")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts, 3);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Directory holding the screenshots. Not searched recursively.
    pub input_dir: PathBuf,

    /// Y pixel separating slide body (above) from captions (at or below).
    pub caption_threshold: i64,

    /// Where the incremental cache lives. `None` disables caching.
    /// Default: `slide2notes-cache.json` in the working directory.
    pub cache_path: Option<PathBuf>,

    /// OCR attempts per image, including the first. Default: 3.
    ///
    /// Only transient failures (connection drops, local I/O) are retried;
    /// anything else fails the image on the first attempt.
    pub max_attempts: u32,

    /// Fixed pause between attempts in milliseconds. Default: 2000.
    pub retry_delay_ms: u64,

    /// Per-request HTTP timeout for the Azure client in seconds. Default: 60.
    pub request_timeout_secs: u64,

    /// Azure AI Vision endpoint, e.g. `https://<name>.cognitiveservices.azure.com/`.
    pub azure_endpoint: Option<String>,

    /// Azure AI Vision subscription key.
    pub azure_key: Option<String>,

    /// Pre-constructed OCR provider. Takes precedence over the Azure fields.
    pub provider: Option<Arc<dyn OcrProvider>>,

    /// Optional per-image progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("input_dir", &self.input_dir)
            .field("caption_threshold", &self.caption_threshold)
            .field("cache_path", &self.cache_path)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("azure_endpoint", &self.azure_endpoint)
            .field("azure_key", &self.azure_key.as_ref().map(|_| "<redacted>"))
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for screenshots in `input_dir`.
    pub fn builder(input_dir: impl Into<PathBuf>) -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            input_dir: input_dir.into(),
            caption_threshold: None,
            cache_path: Some(PathBuf::from(DEFAULT_CACHE_FILE)),
            max_attempts: 3,
            retry_delay_ms: 2000,
            request_timeout_secs: 60,
            azure_endpoint: None,
            azure_key: None,
            provider: None,
            progress_callback: None,
        }
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    input_dir: PathBuf,
    caption_threshold: Option<i64>,
    cache_path: Option<PathBuf>,
    max_attempts: u32,
    retry_delay_ms: u64,
    request_timeout_secs: u64,
    azure_endpoint: Option<String>,
    azure_key: Option<String>,
    provider: Option<Arc<dyn OcrProvider>>,
    progress_callback: Option<ProgressCallback>,
}

impl ExtractionConfigBuilder {
    pub fn caption_threshold(mut self, y: i64) -> Self {
        self.caption_threshold = Some(y);
        self
    }

    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Turn the incremental cache off for this run.
    pub fn no_cache(mut self) -> Self {
        self.cache_path = None;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Use Azure AI Vision at `endpoint` with `key`.
    pub fn azure(mut self, endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        self.azure_endpoint = Some(endpoint.into());
        self.azure_key = Some(key.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn OcrProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, SlideNotesError> {
        let caption_threshold = self.caption_threshold.ok_or_else(|| {
            SlideNotesError::InvalidConfig(
                "a caption threshold (Y pixel) is required; inspect a screenshot to find \
                 where captions begin"
                    .into(),
            )
        })?;
        if self.request_timeout_secs == 0 {
            return Err(SlideNotesError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(ExtractionConfig {
            input_dir: self.input_dir,
            caption_threshold,
            cache_path: self.cache_path,
            max_attempts: self.max_attempts,
            retry_delay_ms: self.retry_delay_ms,
            request_timeout_secs: self.request_timeout_secs,
            azure_endpoint: self.azure_endpoint,
            azure_key: self.azure_key,
            provider: self.provider,
            progress_callback: self.progress_callback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_required() {
        let err = ExtractionConfig::builder("shots").build().unwrap_err();
        assert!(matches!(err, SlideNotesError::InvalidConfig(_)));
        assert!(err.to_string().contains("caption threshold"));
    }

    #[test]
    fn defaults() {
        let c = ExtractionConfig::builder("shots")
            .caption_threshold(850)
            .build()
            .unwrap();
        assert_eq!(c.caption_threshold, 850);
        assert_eq!(c.max_attempts, 3);
        assert_eq!(c.retry_delay_ms, 2000);
        assert_eq!(c.cache_path, Some(PathBuf::from(DEFAULT_CACHE_FILE)));
        assert!(c.provider.is_none());
    }

    #[test]
    fn max_attempts_is_at_least_one() {
        let c = ExtractionConfig::builder("shots")
            .caption_threshold(1)
            .max_attempts(0)
            .build()
            .unwrap();
        assert_eq!(c.max_attempts, 1);
    }

    #[test]
    fn no_cache_clears_path() {
        let c = ExtractionConfig::builder("shots")
            .caption_threshold(1)
            .cache_path("x.json")
            .no_cache()
            .build()
            .unwrap();
        assert!(c.cache_path.is_none());
    }

    #[test]
    fn debug_redacts_key() {
        let c = ExtractionConfig::builder("shots")
            .caption_threshold(1)
            .azure("https://demo.example", "top-secret")
            .build()
            .unwrap();
        let dbg = format!("{:?}", c);
        assert!(!dbg.contains("top-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
