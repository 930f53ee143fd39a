use serde::{Deserialize, Serialize};

/// Kind of a media item managed by the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Stable string form used in the cache table.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }

    /// Parse the stable string form back; `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "photo" => Some(MediaKind::Photo),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// File name prefix for capture outputs of this kind.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            MediaKind::Photo => "IMG",
            MediaKind::Video => "VID",
        }
    }

    /// File extension for capture outputs of this kind (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// A media item as mirrored in the local gallery cache.
///
/// `locator` is the opaque reference the external store resolves; at most one
/// live record exists per locator. `store_id` is the store-assigned surrogate
/// used only for local ordering, never shown to callers as an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub locator: String,
    pub store_id: i64,
    pub kind: MediaKind,
    /// Seconds since the epoch.
    pub added_at: i64,
}

/// A write target allocated in the external store for an in-progress capture.
///
/// While `pending` is set the target is visible only to its writer; callers
/// must finalize it once the capture subsystem reports the bytes written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTarget {
    /// Locator the target will be listed under once visible.
    pub locator: String,
    /// Path the capture subsystem writes its bytes to. Identical to the
    /// locator for non-pending targets.
    pub write_path: String,
    pub store_id: i64,
    pub kind: MediaKind,
    pub pending: bool,
}
