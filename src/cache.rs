//! Incremental cache: skip OCR for screenshots that have not changed.
//!
//! A run over 1 500 screenshots costs 1 500 OCR calls. The cache remembers,
//! per file name, the `(body, caption)` pair computed last time together
//! with the file's size and timestamps. On the next run an image whose size
//! *and* modified time still match is served from the cache; it still feeds
//! the grouping store, so the output is identical to a full re-run.
//!
//! The cache is loaded once at run start and saved once at run end, after
//! records for screenshots no longer in the folder are dropped. Any
//! read or write problem degrades resumability only and never fails a run.

use crate::error::CacheError;
use crate::pipeline::input::ImageFile;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default cache file name, resolved against the working directory.
pub const DEFAULT_CACHE_FILE: &str = "slide2notes-cache.json";

/// What the cache stores for one image.
///
/// `body` and `caption` are optional so files written by older versions,
/// which only tracked identity, still parse. Such records never hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub size: u64,
    /// Creation time, nanoseconds since the Unix epoch.
    #[serde(default)]
    pub created: u64,
    /// Modification time, nanoseconds since the Unix epoch.
    pub modified: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// A cache hit: the previously reconstructed texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedText<'a> {
    pub body: &'a str,
    pub caption: &'a str,
}

/// Per-image record store persisted as a JSON object keyed by file name.
#[derive(Debug, Default)]
pub struct IncrementalCache {
    path: Option<PathBuf>,
    records: BTreeMap<String, CacheRecord>,
}

impl IncrementalCache {
    /// A cache that is never loaded or saved.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Load the cache at `path`.
    ///
    /// A missing or unreadable file yields an empty cache; the problem is
    /// logged and the run carries on.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match read_records(&path) {
            Ok(Some(records)) => {
                info!("Loaded {} cached image(s) from {}", records.len(), path.display());
                records
            }
            Ok(None) => {
                debug!("No cache at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Ignoring unusable cache: {}", e);
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            records,
        }
    }

    /// Cached texts for `name`, if its size and modified time both match
    /// and the record carries a body and caption.
    pub fn lookup(&self, name: &str, size: u64, modified: u64) -> Option<CachedText<'_>> {
        let record = self.records.get(name)?;
        if record.size != size || record.modified != modified {
            return None;
        }
        match (&record.body, &record.caption) {
            (Some(body), Some(caption)) => Some(CachedText { body, caption }),
            _ => None,
        }
    }

    /// Convenience wrapper over [`Self::lookup`] for an enumerated image.
    pub fn lookup_image(&self, image: &ImageFile) -> Option<CachedText<'_>> {
        self.lookup(&image.name, image.size, image.modified)
    }

    /// Store (or overwrite) the record for `name`.
    pub fn record(
        &mut self,
        name: &str,
        size: u64,
        created: u64,
        modified: u64,
        body: &str,
        caption: &str,
    ) {
        self.records.insert(
            name.to_string(),
            CacheRecord {
                size,
                created,
                modified,
                body: Some(body.to_string()),
                caption: Some(caption.to_string()),
            },
        );
    }

    /// Convenience wrapper over [`Self::record`] for an enumerated image.
    pub fn record_image(&mut self, image: &ImageFile, body: &str, caption: &str) {
        self.record(
            &image.name,
            image.size,
            image.created,
            image.modified,
            body,
            caption,
        );
    }

    /// Drop records for images that are no longer in the folder.
    ///
    /// Returns how many records were removed.
    pub fn retain_listed<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> usize {
        let listed: HashSet<&str> = names.into_iter().collect();
        let before = self.records.len();
        self.records.retain(|name, _| listed.contains(name.as_str()));
        before - self.records.len()
    }

    /// Persist every record atomically (temp file + rename).
    ///
    /// A disabled cache saves nothing and succeeds.
    pub fn save(&self) -> Result<(), CacheError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.records)?;
        write_atomic(path, &json).map_err(|source| CacheError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Saved {} cache record(s) to {}", self.records.len(), path.display());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_records(path: &Path) -> Result<Option<BTreeMap<String, CacheRecord>>, CacheError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CacheError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| CacheError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Write `contents` to `path` via a sibling temp file so readers never see
/// a half-written file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IncrementalCache::load(dir.path().join("nope.json"));
        assert!(cache.is_empty());
        assert!(cache.lookup("a.png", 1, 1).is_none());
    }

    #[test]
    fn corrupt_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let cache = IncrementalCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn hit_requires_size_and_modified_match() {
        let mut cache = IncrementalCache::disabled();
        cache.record("a.png", 100, 7, 500, "Body", "Caption");

        let hit = cache.lookup("a.png", 100, 500).expect("exact match hits");
        assert_eq!(hit.body, "Body");
        assert_eq!(hit.caption, "Caption");

        assert!(cache.lookup("a.png", 101, 500).is_none(), "size changed");
        assert!(cache.lookup("a.png", 100, 501).is_none(), "mtime changed");
        assert!(cache.lookup("b.png", 100, 500).is_none(), "unknown name");
    }

    #[test]
    fn created_time_does_not_affect_hit() {
        let mut cache = IncrementalCache::disabled();
        cache.record("a.png", 10, 1, 2, "B", "");
        let rec = cache.records.get_mut("a.png").unwrap();
        rec.created = 999;
        assert!(cache.lookup("a.png", 10, 2).is_some());
    }

    #[test]
    fn record_overwrites() {
        let mut cache = IncrementalCache::disabled();
        cache.record("a.png", 1, 1, 1, "old", "");
        cache.record("a.png", 2, 2, 2, "new", "cap");
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup("a.png", 1, 1).is_none());
        assert_eq!(cache.lookup("a.png", 2, 2).unwrap().body, "new");
    }

    #[test]
    fn older_schema_record_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(
            &path,
            br#"{"a.png": {"size": 10, "created": 1, "modified": 2}}"#,
        )
        .unwrap();
        let cache = IncrementalCache::load(&path);
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup("a.png", 10, 2).is_none());
    }

    #[test]
    fn save_then_load_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut cache = IncrementalCache::load(&path);
        cache.record("a.png", 10, 1, 2, "Slide\n\nHeading", "caption one");
        cache.save().unwrap();

        let reloaded = IncrementalCache::load(&path);
        let hit = reloaded.lookup("a.png", 10, 2).unwrap();
        assert_eq!(hit.body, "Slide\n\nHeading");
        assert_eq!(hit.caption, "caption one");
    }

    #[test]
    fn retain_listed_drops_vanished_images() {
        let mut cache = IncrementalCache::disabled();
        cache.record("a.png", 1, 1, 1, "A", "");
        cache.record("b.png", 1, 1, 1, "B", "");
        cache.record("c.png", 1, 1, 1, "C", "");

        let removed = cache.retain_listed(["a.png", "c.png", "new.png"]);
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.lookup("b.png", 1, 1).is_none());
        assert!(cache.lookup("c.png", 1, 1).is_some());
    }

    #[test]
    fn disabled_cache_save_is_noop() {
        let mut cache = IncrementalCache::disabled();
        cache.record("a.png", 1, 1, 1, "b", "c");
        assert!(cache.save().is_ok());
        assert!(cache.path().is_none());
    }
}
