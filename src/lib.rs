//! # Media Gallery
//!
//! Core library for a capture/gallery application: permission-tiered
//! capability resolution and a local cache reconciled against an
//! authoritative, externally-owned media store.
//!
//! This crate provides:
//! - Capability resolution from a granted-permission snapshot and an ordered
//!   platform tier (photo capture, video capture, gallery read, per-screen
//!   request sets)
//! - A durable SQLite-backed gallery cache with a push-updated live view
//! - Full resync against the external store, degrading to the last
//!   known-good cache when the store cannot be read
//! - A two-call, confirmation-gated delete protocol with one-shot handles
//! - Timestamped capture output naming and a pending → finalized write
//!   lifecycle
//!
//! ## Platform Separation
//!
//! This crate holds the cross-platform core. Screen layout, camera preview,
//! video playback and the system permission dialogs stay in the application
//! layer, which feeds permission snapshots and a platform tier in and renders
//! the listings coming back. The external media catalog is reached through
//! the [`store::MediaStore`] trait; [`store::FsMediaStore`] is the built-in
//! directory-backed implementation.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use media_gallery::{FsMediaStore, FsStoreConfig, GalleryCache, GalleryService};
//!
//! let cache = GalleryCache::new(rusqlite::Connection::open("gallery.db")?)?;
//! let store = FsMediaStore::new(FsStoreConfig {
//!     pictures_dir: "/storage/Pictures".to_string(),
//!     movies_dir: "/storage/Movies".to_string(),
//!     app_folder: "MyApp".to_string(),
//! });
//! let service = GalleryService::new(cache, store);
//! ```

pub mod cache;
pub mod delete;
pub mod error;
pub mod models;
pub mod naming;
pub mod permissions;
pub mod reconcile;
pub mod schema;
pub mod service;
pub mod store;

pub use cache::GalleryCache;
pub use delete::{ConfirmationHandle, DeleteCompletion, DeleteCoordinator, DeleteOutcome};
pub use error::GalleryError;
pub use models::{CaptureTarget, MediaKind, MediaRecord};
pub use naming::{media_name_at, new_media_name};
pub use permissions::{
    gallery_read_allowed, permissions_to_check, photo_capture_allowed, resolve_capabilities,
    screen_permissions, video_capture_allowed, Capabilities, PermissionFlag, PermissionSnapshot,
    PlatformTier, Screen,
};
pub use reconcile::GalleryReconciler;
pub use schema::init_gallery_schema;
pub use service::GalleryService;
pub use store::{FsMediaStore, FsStoreConfig, MediaStore, StoreError};
