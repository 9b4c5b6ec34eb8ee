//! Pipeline stages for screenshot-to-notes extraction.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own with plain data.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ ocr ──▶ classify ──▶ reconstruct ──▶ (grouping, cache)
//! (files)  (retry)  (Y split)    (body, caption)
//! ```
//!
//! 1. [`input`]      : list screenshots oldest first with their identity
//! 2. [`ocr`]        : call the OCR provider with bounded retry; the only
//!    stage with network I/O
//! 3. [`classify`]   : sort lines top to bottom and split at the caption
//!    threshold
//! 4. [`reconstruct`]: rebuild lists, headings and wrapped paragraphs

pub mod classify;
pub mod input;
pub mod ocr;
pub mod reconstruct;
