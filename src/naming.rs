//! Capture output names: `IMG_yyyyMMdd_HHmmss.jpg` / `VID_yyyyMMdd_HHmmss.mp4`.
//!
//! Names within the same second collide; the store's target allocation is
//! the uniqueness point, so callers needing stronger guarantees add their
//! own distinguishing suffix.

use crate::models::MediaKind;
use chrono::{Local, NaiveDateTime};

/// New output name for the given kind, stamped with the current local time.
pub fn new_media_name(kind: MediaKind) -> String {
    media_name_at(kind, Local::now().naive_local())
}

/// Deterministic variant for callers carrying their own clock.
pub fn media_name_at(kind: MediaKind, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        kind.file_prefix(),
        at.format("%Y%m%d_%H%M%S"),
        kind.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_photo_name_pattern() {
        let at = NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(14, 3, 9)
            .unwrap();
        assert_eq!(media_name_at(MediaKind::Photo, at), "IMG_20260806_140309.jpg");
    }

    #[test]
    fn test_video_name_pattern() {
        let at = NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap();
        assert_eq!(media_name_at(MediaKind::Video, at), "VID_20251231_235958.mp4");
    }

    #[test]
    fn test_new_name_matches_pattern() {
        let name = new_media_name(MediaKind::Photo);
        assert!(name.starts_with("IMG_"));
        assert!(name.ends_with(".jpg"));
        // IMG_ + 8 date digits + _ + 6 time digits + .jpg
        assert_eq!(name.len(), "IMG_00000000_000000.jpg".len());
    }
}
