//! Service facade wiring the cache, the external store, the reconciler and
//! the delete coordinator into the single entry point a UI collaborator
//! holds. The platform tier is passed per call and never cached here.

use crate::cache::GalleryCache;
use crate::delete::{ConfirmationHandle, DeleteCompletion, DeleteCoordinator, DeleteOutcome};
use crate::error::GalleryError;
use crate::models::{CaptureTarget, MediaKind, MediaRecord};
use crate::naming;
use crate::permissions::{
    resolve_capabilities, screen_permissions, Capabilities, PermissionFlag, PermissionSnapshot,
    PlatformTier, Screen,
};
use crate::reconcile::GalleryReconciler;
use crate::store::MediaStore;
use std::sync::Arc;
use tokio::sync::watch;

pub struct GalleryService<S: MediaStore> {
    cache: Arc<GalleryCache>,
    store: Arc<S>,
    reconciler: GalleryReconciler<S>,
    deleter: DeleteCoordinator<S>,
}

impl<S: MediaStore> GalleryService<S> {
    pub fn new(cache: GalleryCache, store: S) -> Self {
        let cache = Arc::new(cache);
        let store = Arc::new(store);
        Self {
            reconciler: GalleryReconciler::new(cache.clone(), store.clone()),
            deleter: DeleteCoordinator::new(cache.clone(), store.clone()),
            cache,
            store,
        }
    }

    /// Resolve the capture/read capabilities for one snapshot/tier pair.
    pub fn capabilities(&self, snapshot: &PermissionSnapshot, tier: PlatformTier) -> Capabilities {
        resolve_capabilities(snapshot, tier)
    }

    /// Exact flag set the given screen must request at the given tier.
    pub fn screen_permissions(&self, screen: Screen, tier: PlatformTier) -> Vec<PermissionFlag> {
        screen_permissions(screen, tier)
    }

    /// Current cache snapshot, newest first.
    pub fn all(&self) -> Result<Vec<MediaRecord>, GalleryError> {
        self.cache.all()
    }

    /// Push-updated view of the cache.
    pub fn live_view(&self) -> watch::Receiver<Vec<MediaRecord>> {
        self.cache.live_view()
    }

    /// Resync against the external store; serves the cached listing when
    /// the store cannot be read.
    pub async fn refresh(&self) -> Result<Vec<MediaRecord>, GalleryError> {
        self.reconciler.refresh().await
    }

    /// Try to delete a media item; may hand back a confirmation handle.
    pub async fn attempt_delete(&self, locator: &str) -> Result<DeleteOutcome, GalleryError> {
        self.deleter.attempt_delete(locator).await
    }

    /// Finish a confirmation-gated delete.
    pub async fn complete_after_confirmation(
        &self,
        handle: ConfirmationHandle,
        locator: &str,
        approved: bool,
    ) -> Result<DeleteCompletion, GalleryError> {
        self.deleter
            .complete_after_confirmation(handle, locator, approved)
            .await
    }

    /// Allocate a named write target for an in-progress capture.
    ///
    /// From the scoped-storage tier up the target is allocated pending and
    /// stays hidden from readers until finalized; below that tier pending
    /// writes are not supported and the target is visible immediately.
    pub async fn begin_capture(
        &self,
        kind: MediaKind,
        tier: PlatformTier,
    ) -> Result<CaptureTarget, GalleryError> {
        let name = naming::new_media_name(kind);
        let pending = tier >= PlatformTier::ScopedStorage;
        let target = self.store.create_target(&name, kind, pending)?;
        log::debug!("Capture target allocated: {}", target.locator);
        Ok(target)
    }

    /// Finalize a capture once the external capture subsystem has written
    /// its bytes: flip the pending flag off (no-op for non-pending targets)
    /// and record the item in the cache.
    pub async fn finalize_capture(
        &self,
        target: &CaptureTarget,
    ) -> Result<MediaRecord, GalleryError> {
        self.store.finalize_target(target)?;

        let record = MediaRecord {
            locator: target.locator.clone(),
            store_id: target.store_id,
            kind: target.kind,
            added_at: chrono::Utc::now().timestamp(),
        };
        self.cache.upsert(&record)?;
        log::info!("Capture finalized: {}", record.locator);
        Ok(record)
    }
}
