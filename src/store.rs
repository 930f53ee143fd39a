//! Seam to the authoritative, externally-owned media store.
//!
//! The gallery never trusts its own cache over the store: the store is the
//! source of truth, the cache is the fallback when the store cannot be read.
//! `FsMediaStore` is the built-in directory-backed implementation covering
//! the app's per-kind media folders.

use crate::models::{CaptureTarget, MediaKind, MediaRecord};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Error type for external store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The store could not be read (listing failed, transient or
    /// authorization-related). Recovered by serving the cache.
    Unreadable(String),
    /// A destructive operation needs one-shot, user-granted authorization.
    AuthorizationRequired,
    /// The referenced item does not exist in the store.
    NotFound(String),
    /// Underlying I/O failure.
    Io(io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unreadable(msg) => write!(f, "Store unreadable: {}", msg),
            StoreError::AuthorizationRequired => {
                write!(f, "Operation requires user authorization")
            }
            StoreError::NotFound(msg) => write!(f, "Not found in store: {}", msg),
            StoreError::Io(e) => write!(f, "Store IO error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// The authoritative media catalog this core reconciles against.
///
/// Listing is per kind and filtered to the app's own media folder. Deletion
/// may be refused pending user authorization; targets may be allocated in a
/// pending state that keeps them hidden from readers until finalized.
pub trait MediaStore: Send + Sync {
    /// List all items of one kind, newest first.
    fn list(&self, kind: MediaKind) -> Result<Vec<MediaRecord>, StoreError>;

    /// Allocate a write target under `name`. With `pending` the target stays
    /// invisible to `list` until finalized.
    fn create_target(
        &self,
        name: &str,
        kind: MediaKind,
        pending: bool,
    ) -> Result<CaptureTarget, StoreError>;

    /// Make a pending target visible. No-op for non-pending targets.
    fn finalize_target(&self, target: &CaptureTarget) -> Result<(), StoreError>;

    /// Delete the item behind `locator`. `AuthorizationRequired` means the
    /// caller must obtain a one-shot user confirmation and retry.
    fn delete(&self, locator: &str) -> Result<(), StoreError>;
}

/// Configuration for the directory-backed store.
#[derive(Debug, Clone)]
pub struct FsStoreConfig {
    /// Base directory for photos (the platform pictures root).
    pub pictures_dir: String,
    /// Base directory for videos (the platform movies root).
    pub movies_dir: String,
    /// Subfolder under each base that belongs to this app.
    pub app_folder: String,
}

/// Media store backed by the app's per-kind directories.
///
/// `added_at` comes from file modification time; the surrogate id is a
/// stable hash of the entry name, good enough for local tie-breaking.
/// Pending targets live next to their final path with a `.pending` suffix
/// and are renamed into place on finalize, so listings never see them.
pub struct FsMediaStore {
    config: FsStoreConfig,
}

impl FsMediaStore {
    pub fn new(config: FsStoreConfig) -> Self {
        Self { config }
    }

    /// Directory holding this app's items of the given kind.
    fn kind_dir(&self, kind: MediaKind) -> PathBuf {
        let base = match kind {
            MediaKind::Photo => &self.config.pictures_dir,
            MediaKind::Video => &self.config.movies_dir,
        };
        Path::new(base).join(&self.config.app_folder)
    }
}

impl MediaStore for FsMediaStore {
    fn list(&self, kind: MediaKind) -> Result<Vec<MediaRecord>, StoreError> {
        let dir = self.kind_dir(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            // No folder yet means no captures yet, not a read failure.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Unreadable(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            }
        };

        let mut items = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StoreError::Unreadable(format!("{}: {}", dir.display(), e)))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            // Pending targets carry a different extension and stay hidden.
            if path.extension().and_then(|e| e.to_str()) != Some(kind.extension()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = entry
                .metadata()
                .map_err(|e| StoreError::Unreadable(format!("{}: {}", path.display(), e)))?;
            let added_at = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            items.push(MediaRecord {
                locator: path.to_string_lossy().into_owned(),
                store_id: stable_id(&name),
                kind,
                added_at,
            });
        }

        items.sort_by(|a, b| {
            b.added_at
                .cmp(&a.added_at)
                .then(b.store_id.cmp(&a.store_id))
        });
        log::debug!("Listed {} {} items from {}", items.len(), kind.as_str(), dir.display());
        Ok(items)
    }

    fn create_target(
        &self,
        name: &str,
        kind: MediaKind,
        pending: bool,
    ) -> Result<CaptureTarget, StoreError> {
        let dir = self.kind_dir(kind);
        fs::create_dir_all(&dir)?;

        let final_path = dir.join(name);
        let locator = final_path.to_string_lossy().into_owned();
        let write_path = if pending {
            format!("{}.pending", locator)
        } else {
            locator.clone()
        };

        // Uniqueness is enforced here: allocating an existing name fails.
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&write_path)?;

        log::debug!("Allocated {} target {} (pending={})", kind.as_str(), locator, pending);
        Ok(CaptureTarget {
            locator,
            write_path,
            store_id: stable_id(name),
            kind,
            pending,
        })
    }

    fn finalize_target(&self, target: &CaptureTarget) -> Result<(), StoreError> {
        if !target.pending {
            return Ok(());
        }
        match fs::rename(&target.write_path, &target.locator) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(target.write_path.clone()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn delete(&self, locator: &str) -> Result<(), StoreError> {
        match fs::remove_file(locator) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(locator.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(StoreError::AuthorizationRequired)
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Stable surrogate id for an entry name. Local ordering only.
fn stable_id(name: &str) -> i64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish() as i64
}
