//! Confirmation-gated deletion against the external store.
//!
//! Deletion is a two-call protocol. `attempt_delete` either commits
//! immediately or hands back a one-shot `ConfirmationHandle` the collaborator
//! presents to the user out of band; `complete_after_confirmation` consumes
//! the handle and finishes (or cancels) the delete. The cache entry is only
//! removed after the store has confirmed the delete, so cache and store
//! never diverge.

use crate::cache::GalleryCache;
use crate::error::GalleryError;
use crate::store::{MediaStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// One-shot capability token for a delete awaiting user confirmation.
///
/// Carries the locator so the collaborator can present the system
/// confirmation for the right item. Consumed exactly once.
#[derive(Debug)]
pub struct ConfirmationHandle {
    token: Uuid,
    locator: String,
}

impl ConfirmationHandle {
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// Locator the pending delete refers to, for presenting the confirmation.
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

/// Result of an immediate delete attempt.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The store delete succeeded and the cache entry is gone.
    Deleted,
    /// The store refused without one-shot user authorization; present the
    /// confirmation named by the handle, then complete.
    NeedsConfirmation(ConfirmationHandle),
}

/// Result of completing a confirmation-gated delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteCompletion {
    Deleted,
    Cancelled,
}

pub struct DeleteCoordinator<S: MediaStore> {
    cache: Arc<GalleryCache>,
    store: Arc<S>,
    /// Outstanding confirmation tokens and the locator each was issued for.
    pending: Mutex<HashMap<Uuid, String>>,
}

impl<S: MediaStore> DeleteCoordinator<S> {
    pub fn new(cache: Arc<GalleryCache>, store: Arc<S>) -> Self {
        Self {
            cache,
            store,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Try to delete `locator` from the external store.
    ///
    /// `NotFound` and other store failures surface as errors, leave the
    /// cache untouched and are not retried here.
    pub async fn attempt_delete(&self, locator: &str) -> Result<DeleteOutcome, GalleryError> {
        match self.store.delete(locator) {
            Ok(()) => {
                self.cache.delete_by_locator(locator)?;
                log::info!("Deleted media {}", locator);
                Ok(DeleteOutcome::Deleted)
            }
            Err(StoreError::AuthorizationRequired) => {
                let handle = ConfirmationHandle {
                    token: Uuid::new_v4(),
                    locator: locator.to_string(),
                };
                self.pending_locked()
                    .insert(handle.token, locator.to_string());
                log::debug!("Delete of {} needs user confirmation", locator);
                Ok(DeleteOutcome::NeedsConfirmation(handle))
            }
            Err(StoreError::NotFound(l)) => Err(GalleryError::NotFound(l)),
            Err(e) => Err(GalleryError::Store(e)),
        }
    }

    /// Finish a confirmation-gated delete. The handle is consumed either way.
    ///
    /// On approval the raw delete is re-issued; a store-side `NotFound` still
    /// counts as confirmed, since on some platforms the system confirmation
    /// performs the delete itself. The cache entry goes away only after the
    /// store has confirmed.
    pub async fn complete_after_confirmation(
        &self,
        handle: ConfirmationHandle,
        locator: &str,
        approved: bool,
    ) -> Result<DeleteCompletion, GalleryError> {
        let registered = self.pending_locked().remove(&handle.token);
        let registered = match registered {
            Some(l) => l,
            None => {
                return Err(GalleryError::Validation(
                    "confirmation handle already consumed or unknown".to_string(),
                ))
            }
        };
        if registered != locator {
            return Err(GalleryError::Validation(
                "confirmation handle does not match locator".to_string(),
            ));
        }

        if !approved {
            log::debug!("Delete of {} cancelled by user", locator);
            return Ok(DeleteCompletion::Cancelled);
        }

        match self.store.delete(locator) {
            Ok(()) | Err(StoreError::NotFound(_)) => {
                self.cache.delete_by_locator(locator)?;
                log::info!("Deleted media {} after confirmation", locator);
                Ok(DeleteCompletion::Deleted)
            }
            Err(StoreError::AuthorizationRequired) => {
                log::warn!("Delete still requires authorization after confirmation: {}", locator);
                Err(GalleryError::Store(StoreError::AuthorizationRequired))
            }
            Err(e) => Err(GalleryError::Store(e)),
        }
    }

    fn pending_locked(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, String>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaKind, MediaRecord};
    use crate::store::mock::MockStore;
    use rusqlite::Connection;

    fn record(locator: &str, added_at: i64) -> MediaRecord {
        MediaRecord {
            locator: locator.to_string(),
            store_id: added_at,
            kind: MediaKind::Photo,
            added_at,
        }
    }

    fn seeded(locators: &[&str]) -> (Arc<GalleryCache>, Arc<MockStore>) {
        let cache = Arc::new(GalleryCache::new(Connection::open_in_memory().unwrap()).unwrap());
        let mut records = Vec::new();
        for (i, locator) in locators.iter().enumerate() {
            let r = record(locator, 100 + i as i64);
            cache.upsert(&r).unwrap();
            records.push(r);
        }
        (cache, Arc::new(MockStore::with_records(records)))
    }

    #[tokio::test]
    async fn test_immediate_delete_removes_store_then_cache() {
        let (cache, store) = seeded(&["a", "b"]);
        let coordinator = DeleteCoordinator::new(cache.clone(), store.clone());

        let outcome = coordinator.attempt_delete("a").await.unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted));
        assert_eq!(cache.all().unwrap().len(), 1);
        assert!(store.list(MediaKind::Photo).unwrap().iter().all(|r| r.locator != "a"));
    }

    #[tokio::test]
    async fn test_delete_unknown_locator_is_not_found_and_cache_unchanged() {
        let (cache, store) = seeded(&["a"]);
        let coordinator = DeleteCoordinator::new(cache.clone(), store);

        let result = coordinator.attempt_delete("missing").await;
        assert!(matches!(result, Err(GalleryError::NotFound(_))));
        assert_eq!(cache.all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_protected_delete_yields_confirmation_handle() {
        let (cache, store) = seeded(&["a"]);
        store.protect("a");
        let coordinator = DeleteCoordinator::new(cache.clone(), store);

        let outcome = coordinator.attempt_delete("a").await.unwrap();
        match outcome {
            DeleteOutcome::NeedsConfirmation(handle) => assert_eq!(handle.locator(), "a"),
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        }
        // Nothing was deleted yet.
        assert_eq!(cache.all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_confirmation_changes_nothing() {
        let (cache, store) = seeded(&["a"]);
        store.protect("a");
        let coordinator = DeleteCoordinator::new(cache.clone(), store.clone());

        let handle = match coordinator.attempt_delete("a").await.unwrap() {
            DeleteOutcome::NeedsConfirmation(h) => h,
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        };

        let completion = coordinator
            .complete_after_confirmation(handle, "a", false)
            .await
            .unwrap();
        assert_eq!(completion, DeleteCompletion::Cancelled);
        assert_eq!(cache.all().unwrap().len(), 1);
        assert_eq!(store.list(MediaKind::Photo).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approved_confirmation_deletes_store_then_cache() {
        let (cache, store) = seeded(&["a"]);
        store.protect("a");
        let coordinator = DeleteCoordinator::new(cache.clone(), store.clone());

        let handle = match coordinator.attempt_delete("a").await.unwrap() {
            DeleteOutcome::NeedsConfirmation(h) => h,
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        };

        // The user approving lifts the protection for the re-issued delete.
        store.unprotect("a");
        let completion = coordinator
            .complete_after_confirmation(handle, "a", true)
            .await
            .unwrap();
        assert_eq!(completion, DeleteCompletion::Deleted);
        assert!(cache.all().unwrap().is_empty());
        assert!(store.list(MediaKind::Photo).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirmation_completes_when_system_already_deleted() {
        let (cache, store) = seeded(&["a"]);
        store.protect("a");
        let coordinator = DeleteCoordinator::new(cache.clone(), store.clone());

        let handle = match coordinator.attempt_delete("a").await.unwrap() {
            DeleteOutcome::NeedsConfirmation(h) => h,
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        };

        // The platform dialog performed the delete itself; the re-issued
        // delete will find nothing, which still counts as confirmed.
        store.remove_record("a");
        let completion = coordinator
            .complete_after_confirmation(handle, "a", true)
            .await
            .unwrap();
        assert_eq!(completion, DeleteCompletion::Deleted);
        assert!(cache.all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_is_consumed_exactly_once() {
        let (cache, store) = seeded(&["a", "b"]);
        store.protect("a");
        store.protect("b");
        let coordinator = DeleteCoordinator::new(cache, store.clone());

        let first = match coordinator.attempt_delete("a").await.unwrap() {
            DeleteOutcome::NeedsConfirmation(h) => h,
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        };
        let token = first.token();

        coordinator
            .complete_after_confirmation(first, "a", false)
            .await
            .unwrap();

        // A forged handle with the consumed token must be rejected.
        let replay = ConfirmationHandle {
            token,
            locator: "a".to_string(),
        };
        let result = coordinator
            .complete_after_confirmation(replay, "a", true)
            .await;
        assert!(matches!(result, Err(GalleryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_handle_locator_mismatch_is_rejected() {
        let (cache, store) = seeded(&["a", "b"]);
        store.protect("a");
        let coordinator = DeleteCoordinator::new(cache.clone(), store);

        let handle = match coordinator.attempt_delete("a").await.unwrap() {
            DeleteOutcome::NeedsConfirmation(h) => h,
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        };

        let result = coordinator
            .complete_after_confirmation(handle, "b", true)
            .await;
        assert!(matches!(result, Err(GalleryError::Validation(_))));
        assert_eq!(cache.all().unwrap().len(), 2);
    }
}
