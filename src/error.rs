//! Error types for the slide2notes library.
//!
//! Four error types reflect four distinct failure modes:
//!
//! * [`SlideNotesError`]: **Fatal**: the run cannot proceed at all (input
//!   directory missing, no images, OCR provider not configured, output file
//!   not writable). Returned as `Err(SlideNotesError)` from the top-level
//!   `extract_notes*` functions.
//!
//! * [`ImageError`]: **Non-fatal**: a single screenshot failed after its
//!   retry budget, but every other image is fine. Collected in
//!   [`crate::output::NotesOutput::failures`] so the batch keeps going.
//!
//! * [`OcrError`]: what an [`crate::provider::OcrProvider`] returns for one
//!   call. The retry loop asks [`OcrError::is_transient`] whether another
//!   attempt is worthwhile.
//!
//! * [`CacheError`]: the incremental cache could not be read or written.
//!   Only resumability of the next run suffers, so the pipeline logs these
//!   and moves on.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the slide2notes library.
///
/// Per-image failures use [`ImageError`] and are stored in
/// [`crate::output::NotesOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum SlideNotesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The configured screenshot directory does not exist.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is a directory.")]
    InputDirNotFound { path: PathBuf },

    /// The directory exists but holds no `.png` / `.jpg` / `.jpeg` files.
    #[error("No .png or .jpg files found in '{path}'")]
    NoImagesFound { path: PathBuf },

    /// Listing the directory or reading file metadata failed.
    #[error("Failed to read input '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// Neither a pre-built provider nor Azure credentials were supplied,
    /// or the HTTP client could not be built.
    #[error("OCR provider is not configured.\n{hint}")]
    ProviderNotConfigured { hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single screenshot.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ImageError {
    /// OCR extraction failed; `attempts` counts every call made.
    #[error("{image}: extraction failed after {attempts} attempt(s): {detail}")]
    ExtractionFailed {
        image: String,
        attempts: u32,
        detail: String,
    },
}

impl ImageError {
    /// File name of the image this error belongs to.
    pub fn image(&self) -> &str {
        match self {
            ImageError::ExtractionFailed { image, .. } => image,
        }
    }
}

/// Errors surfaced by a single OCR call.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The service could not be reached, or the connection dropped.
    #[error("connection error: {0}")]
    Connection(String),

    /// Local I/O failed while preparing the request (e.g. reading the image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other transport-level failure reported by the HTTP client.
    #[error("request failed: {0}")]
    Request(String),

    /// The service rejected the credentials (HTTP 401/403).
    #[error("authentication rejected (HTTP {status}): {detail}")]
    Auth { status: u16, detail: String },

    /// Non-success HTTP status other than an auth failure.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The response body did not match the expected schema.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl OcrError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Connection and OS-level I/O failures qualify, as does any other
    /// error whose message mentions a connection problem.
    pub fn is_transient(&self) -> bool {
        match self {
            OcrError::Connection(_) | OcrError::Io(_) => true,
            other => other.to_string().to_lowercase().contains("connection"),
        }
    }
}

/// Failures reading or writing the incremental cache file.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache '{path}' is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialise cache: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write cache '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
