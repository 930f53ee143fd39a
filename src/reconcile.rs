//! Full resync of the gallery cache against the external store.
//!
//! A successful pass replaces the cache atomically with the store listing.
//! A failed read serves the last known-good cache instead: a transient
//! store failure must never blank the user's visible history.

use crate::cache::GalleryCache;
use crate::error::GalleryError;
use crate::models::{MediaKind, MediaRecord};
use crate::store::{MediaStore, StoreError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct GalleryReconciler<S: MediaStore> {
    cache: Arc<GalleryCache>,
    store: Arc<S>,
    /// Monotonic refresh ticket; only the newest in-flight refresh may
    /// write its result to the cache.
    generation: AtomicU64,
}

impl<S: MediaStore> GalleryReconciler<S> {
    pub fn new(cache: Arc<GalleryCache>, store: Arc<S>) -> Self {
        Self {
            cache,
            store,
            generation: AtomicU64::new(0),
        }
    }

    /// Resync the cache with the store and return the current listing.
    ///
    /// On a store read failure the cache is left untouched and its pre-call
    /// contents are returned unchanged. Cache I/O failures still propagate.
    pub async fn refresh(&self) -> Result<Vec<MediaRecord>, GalleryError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let fallback = self.cache.all()?;

        match self.list_merged() {
            Ok(items) => {
                if self.generation.load(Ordering::SeqCst) == ticket {
                    self.cache.replace_all(&items)?;
                    log::info!("Gallery refreshed: {} items", items.len());
                } else {
                    log::debug!("Refresh superseded by a newer call, result discarded");
                }
                Ok(items)
            }
            Err(e) => {
                log::warn!(
                    "Media store unreadable, serving {} cached items: {}",
                    fallback.len(),
                    e
                );
                Ok(fallback)
            }
        }
    }

    /// Both kind listings merged, newest first, ties broken by surrogate id.
    fn list_merged(&self) -> Result<Vec<MediaRecord>, StoreError> {
        let mut items = self.store.list(MediaKind::Photo)?;
        items.extend(self.store.list(MediaKind::Video)?);
        items.sort_by(|a, b| {
            b.added_at
                .cmp(&a.added_at)
                .then(b.store_id.cmp(&a.store_id))
        });
        Ok(items)
    }
}
