//! Input enumeration: find the screenshots to process and their identity.
//!
//! Screenshots are processed oldest first, by creation time, so the notes
//! follow the lecture's chronology even when file names do not. Each
//! [`ImageFile`] also carries the size and modified time the incremental
//! cache uses to decide whether a file changed since the last run.

use crate::error::SlideNotesError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// File extensions treated as screenshots (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A screenshot on disk and the metadata that identifies its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub path: PathBuf,
    /// File name without directory; the cache key.
    pub name: String,
    pub size: u64,
    /// Creation time in nanoseconds since the Unix epoch. Falls back to the
    /// modified time where the platform does not report creation.
    pub created: u64,
    /// Modification time in nanoseconds since the Unix epoch.
    pub modified: u64,
}

/// Check if `path` has one of [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List the screenshots in `dir` (non-recursive), oldest first.
///
/// Ties on creation time are broken by file name so the order is stable.
pub fn list_images(dir: &Path) -> Result<Vec<ImageFile>, SlideNotesError> {
    if !dir.is_dir() {
        return Err(SlideNotesError::InputDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let read_err = |source: std::io::Error| SlideNotesError::InputReadFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !is_image(&path) {
            continue;
        }
        let meta = entry
            .metadata()
            .map_err(|source| SlideNotesError::InputReadFailed {
                path: path.clone(),
                source,
            })?;
        if !meta.is_file() {
            continue;
        }

        let modified = meta.modified().map(epoch_nanos).unwrap_or(0);
        let created = meta.created().map(epoch_nanos).unwrap_or(modified);
        let name = entry.file_name().to_string_lossy().into_owned();

        images.push(ImageFile {
            path,
            name,
            size: meta.len(),
            created,
            modified,
        });
    }

    if images.is_empty() {
        return Err(SlideNotesError::NoImagesFound {
            path: dir.to_path_buf(),
        });
    }

    images.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.name.cmp(&b.name)));
    debug!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}

fn epoch_nanos(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
