//! Permission-tiered capability resolution.
//!
//! Pure functions mapping a granted-permission snapshot and a platform tier
//! to the capture/read capabilities and to the exact flag set each screen
//! must request. No I/O, no caching: the tier is passed on every call.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A capability-granting permission token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionFlag {
    Camera,
    Microphone,
    ReadImages,
    ReadVideos,
    /// Partial visual access granted by the user picking individual items.
    ReadVisualSelected,
    /// Single legacy read flag covering all media kinds.
    ReadExternalLegacy,
    /// Required for writing to shared storage on the legacy tier.
    WriteExternalLegacy,
}

/// Ordered platform capability generations.
///
/// Resolver logic branches on `tier >= X` comparisons only; exact equality
/// is reserved for the bottom tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlatformTier {
    /// Shared storage writes need an explicit write flag; one read flag
    /// covers all media.
    Legacy,
    /// Scoped storage: writes to the app's own collections need no flag;
    /// pending-write support appears here.
    ScopedStorage,
    /// Media reads split into per-kind flags.
    SplitMediaRead,
    /// User may grant access to a selected subset of visual media.
    PartialAccess,
}

/// Granted flags at one point in time. Built once per permission-check cycle
/// and superseded wholesale by the next snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSnapshot {
    granted: HashSet<PermissionFlag>,
}

impl PermissionSnapshot {
    /// Snapshot with the given flags granted; everything absent is denied.
    pub fn from_granted<I: IntoIterator<Item = PermissionFlag>>(flags: I) -> Self {
        Self {
            granted: flags.into_iter().collect(),
        }
    }

    pub fn is_granted(&self, flag: PermissionFlag) -> bool {
        self.granted.contains(&flag)
    }
}

impl FromIterator<PermissionFlag> for PermissionSnapshot {
    fn from_iter<I: IntoIterator<Item = PermissionFlag>>(iter: I) -> Self {
        Self::from_granted(iter)
    }
}

/// Screens whose permission requirements differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Photo,
    Video,
    Gallery,
}

/// Resolved capabilities for one snapshot/tier pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub photo_capture: bool,
    pub video_capture: bool,
    pub gallery_read: bool,
}

/// Whether taking and saving a photo is currently allowed.
///
/// On the legacy tier saving to shared storage additionally requires the
/// explicit write flag.
pub fn photo_capture_allowed(snapshot: &PermissionSnapshot, tier: PlatformTier) -> bool {
    let has_camera = snapshot.is_granted(PermissionFlag::Camera);
    if tier >= PlatformTier::ScopedStorage {
        return has_camera;
    }
    has_camera && snapshot.is_granted(PermissionFlag::WriteExternalLegacy)
}

/// Whether recording and saving a video is currently allowed.
pub fn video_capture_allowed(snapshot: &PermissionSnapshot, tier: PlatformTier) -> bool {
    let has_camera = snapshot.is_granted(PermissionFlag::Camera);
    let has_audio = snapshot.is_granted(PermissionFlag::Microphone);
    if tier >= PlatformTier::ScopedStorage {
        return has_camera && has_audio;
    }
    has_camera && has_audio && snapshot.is_granted(PermissionFlag::WriteExternalLegacy)
}

/// Whether the gallery may read media.
///
/// From the partial-access tier up, the full per-kind pair or the
/// user-selected flag suffices; from the split-read tier up, only the full
/// pair; below that, the single legacy read flag.
pub fn gallery_read_allowed(snapshot: &PermissionSnapshot, tier: PlatformTier) -> bool {
    let full_pair = snapshot.is_granted(PermissionFlag::ReadImages)
        && snapshot.is_granted(PermissionFlag::ReadVideos);
    if tier >= PlatformTier::PartialAccess {
        return full_pair || snapshot.is_granted(PermissionFlag::ReadVisualSelected);
    }
    if tier >= PlatformTier::SplitMediaRead {
        return full_pair;
    }
    snapshot.is_granted(PermissionFlag::ReadExternalLegacy)
}

/// Resolve all three capabilities at once.
pub fn resolve_capabilities(snapshot: &PermissionSnapshot, tier: PlatformTier) -> Capabilities {
    Capabilities {
        photo_capture: photo_capture_allowed(snapshot, tier),
        video_capture: video_capture_allowed(snapshot, tier),
        gallery_read: gallery_read_allowed(snapshot, tier),
    }
}

/// Exact flag set a screen must request at the given tier.
pub fn screen_permissions(screen: Screen, tier: PlatformTier) -> Vec<PermissionFlag> {
    let mut flags = Vec::new();
    match screen {
        Screen::Photo => {
            flags.push(PermissionFlag::Camera);
            push_media_read(&mut flags, tier);
            if tier < PlatformTier::ScopedStorage {
                flags.push(PermissionFlag::WriteExternalLegacy);
            }
        }
        Screen::Video => {
            flags.push(PermissionFlag::Camera);
            flags.push(PermissionFlag::Microphone);
            push_media_read(&mut flags, tier);
            if tier < PlatformTier::ScopedStorage {
                flags.push(PermissionFlag::WriteExternalLegacy);
            }
        }
        Screen::Gallery => {
            push_media_read(&mut flags, tier);
        }
    }
    flags
}

/// All flags whose grant state a collaborator must sample when building a
/// snapshot. Includes the user-selected flag from the partial-access tier up,
/// since a partial grant reports through that flag alone.
pub fn permissions_to_check(tier: PlatformTier) -> Vec<PermissionFlag> {
    let mut flags = vec![PermissionFlag::Camera, PermissionFlag::Microphone];
    push_media_read(&mut flags, tier);
    if tier >= PlatformTier::PartialAccess {
        flags.push(PermissionFlag::ReadVisualSelected);
    }
    if tier < PlatformTier::ScopedStorage {
        flags.push(PermissionFlag::WriteExternalLegacy);
    }
    flags
}

/// Tier-appropriate media read flags (split per kind, or the legacy flag).
fn push_media_read(flags: &mut Vec<PermissionFlag>, tier: PlatformTier) {
    if tier >= PlatformTier::SplitMediaRead {
        flags.push(PermissionFlag::ReadImages);
        flags.push(PermissionFlag::ReadVideos);
    } else {
        flags.push(PermissionFlag::ReadExternalLegacy);
    }
}
