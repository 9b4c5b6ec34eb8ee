//! Deduplicate slide bodies and collect every caption seen for each.
//!
//! A lecturer often lingers on one slide while the captions underneath keep
//! changing, so a folder of screenshots holds many copies of the same body.
//! [`SlideGroupingStore`] keys on the reconstructed body text (exact string
//! equality) and remembers the order in which bodies first appeared.
//! Near-identical OCR output for the same slide is *not* merged.

use crate::output::SlideSection;
use std::collections::{BTreeSet, HashMap};

/// Append-only mapping from unique body text to its caption set.
#[derive(Debug, Default, Clone)]
pub struct SlideGroupingStore {
    captions: HashMap<String, BTreeSet<String>>,
    order: Vec<String>,
}

impl SlideGroupingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one image's `(body, caption)` pair.
    ///
    /// Empty bodies are ignored, even when a caption is present. A new body
    /// is appended to the slide order; a non-empty caption is added to the
    /// body's set unless already there.
    pub fn add(&mut self, body: &str, caption: &str) {
        if body.is_empty() {
            return;
        }
        if !self.captions.contains_key(body) {
            self.order.push(body.to_string());
            self.captions.insert(body.to_string(), BTreeSet::new());
        }
        if caption.is_empty() {
            return;
        }
        if let Some(set) = self.captions.get_mut(body) {
            if !set.contains(caption) {
                set.insert(caption.to_string());
            }
        }
    }

    /// Bodies in first-seen order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Captions recorded for `body`, sorted.
    pub fn captions(&self, body: &str) -> Option<impl Iterator<Item = &str>> {
        self.captions
            .get(body)
            .map(|set| set.iter().map(String::as_str))
    }

    /// Number of unique bodies.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consume the store into numbered sections (1-based), bodies in
    /// first-seen order and captions sorted lexicographically.
    pub fn finalize(mut self) -> Vec<SlideSection> {
        self.order
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                let captions = self
                    .captions
                    .remove(&body)
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default();
                SlideSection {
                    index: i + 1,
                    body,
                    captions,
                }
            })
            .collect()
    }
}
