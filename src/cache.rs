//! Persisted mirror of media records, owned exclusively by this crate.
//!
//! Collaborators read `all()` or subscribe to `live_view()`; every committed
//! mutation is pushed to subscribers. Mutations go through the operations
//! here only.

use crate::error::GalleryError;
use crate::models::{MediaKind, MediaRecord};
use crate::schema;
use rusqlite::{params, Connection};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

/// Durable key-value store holding one record per known media item,
/// ordered newest first (`added_at DESC, store_id DESC`).
pub struct GalleryCache {
    conn: Mutex<Connection>,
    live: watch::Sender<Vec<MediaRecord>>,
}

impl GalleryCache {
    /// Open the cache over an existing connection, initializing the schema
    /// if needed. The cache takes exclusive ownership of the connection.
    pub fn new(conn: Connection) -> Result<Self, GalleryError> {
        schema::init_gallery_schema(&conn)?;
        let initial = query_all(&conn)?;
        let (live, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            live,
        })
    }

    /// Insert a record, replacing any existing row with the same locator.
    pub fn upsert(&self, record: &MediaRecord) -> Result<(), GalleryError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO gallery_items (locator, store_id, kind, added_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(locator) DO UPDATE SET
                store_id = excluded.store_id,
                kind = excluded.kind,
                added_at = excluded.added_at",
            params![
                record.locator,
                record.store_id,
                record.kind.as_str(),
                record.added_at
            ],
        )?;
        self.publish(&conn)
    }

    /// Snapshot of all records, newest first.
    pub fn all(&self) -> Result<Vec<MediaRecord>, GalleryError> {
        let conn = self.conn();
        query_all(&conn)
    }

    /// Push-updated view of the cache. The receiver holds the ordered
    /// listing as of the last committed mutation.
    pub fn live_view(&self) -> watch::Receiver<Vec<MediaRecord>> {
        self.live.subscribe()
    }

    /// Delete the record with the given locator. Returns whether a row
    /// was removed.
    pub fn delete_by_locator(&self, locator: &str) -> Result<bool, GalleryError> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM gallery_items WHERE locator = ?1",
            params![locator],
        )?;
        self.publish(&conn)?;
        Ok(rows > 0)
    }

    /// Remove all records.
    pub fn clear(&self) -> Result<(), GalleryError> {
        let conn = self.conn();
        conn.execute("DELETE FROM gallery_items", [])?;
        self.publish(&conn)
    }

    /// Replace the full contents with `records` in a single transaction.
    /// Subscribers observe either the previous listing or the new one,
    /// never the cleared intermediate state.
    pub fn replace_all(&self, records: &[MediaRecord]) -> Result<(), GalleryError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM gallery_items", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO gallery_items (locator, store_id, kind, added_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(locator) DO UPDATE SET
                    store_id = excluded.store_id,
                    kind = excluded.kind,
                    added_at = excluded.added_at",
            )?;
            for record in records {
                stmt.execute(params![
                    record.locator,
                    record.store_id,
                    record.kind.as_str(),
                    record.added_at
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("Cache replaced with {} records", records.len());
        self.publish(&conn)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means another caller panicked mid-operation;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Push the committed state to live-view subscribers.
    fn publish(&self, conn: &Connection) -> Result<(), GalleryError> {
        let items = query_all(conn)?;
        self.live.send_replace(items);
        Ok(())
    }
}

fn query_all(conn: &Connection) -> Result<Vec<MediaRecord>, GalleryError> {
    let mut stmt = conn.prepare(
        "SELECT locator, store_id, kind, added_at FROM gallery_items
         ORDER BY added_at DESC, store_id DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        let kind_str: String = row.get(2)?;
        Ok(MediaRecord {
            locator: row.get(0)?,
            store_id: row.get(1)?,
            kind: MediaKind::parse(&kind_str).ok_or(rusqlite::Error::InvalidQuery)?,
            added_at: row.get(3)?,
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_cache() -> GalleryCache {
        let conn = Connection::open_in_memory().unwrap();
        GalleryCache::new(conn).unwrap()
    }

    fn record(locator: &str, store_id: i64, kind: MediaKind, added_at: i64) -> MediaRecord {
        MediaRecord {
            locator: locator.to_string(),
            store_id,
            kind,
            added_at,
        }
    }

    #[test]
    fn test_upsert_and_ordering() {
        let cache = open_cache();
        cache
            .upsert(&record("a", 1, MediaKind::Photo, 100))
            .unwrap();
        cache
            .upsert(&record("b", 2, MediaKind::Video, 300))
            .unwrap();
        cache
            .upsert(&record("c", 3, MediaKind::Photo, 200))
            .unwrap();

        let all = cache.all().unwrap();
        let locators: Vec<&str> = all.iter().map(|r| r.locator.as_str()).collect();
        assert_eq!(locators, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ordering_ties_break_on_store_id() {
        let cache = open_cache();
        cache
            .upsert(&record("old", 5, MediaKind::Photo, 100))
            .unwrap();
        cache
            .upsert(&record("new", 9, MediaKind::Photo, 100))
            .unwrap();

        let all = cache.all().unwrap();
        assert_eq!(all[0].locator, "new");
        assert_eq!(all[1].locator, "old");
    }

    #[test]
    fn test_upsert_duplicate_locator_replaces() {
        let cache = open_cache();
        cache
            .upsert(&record("x", 1, MediaKind::Photo, 100))
            .unwrap();
        cache
            .upsert(&record("x", 1, MediaKind::Video, 150))
            .unwrap();

        let all = cache.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, MediaKind::Video);
        assert_eq!(all[0].added_at, 150);
    }

    #[test]
    fn test_delete_by_locator() {
        let cache = open_cache();
        cache
            .upsert(&record("x", 1, MediaKind::Photo, 100))
            .unwrap();

        assert!(cache.delete_by_locator("x").unwrap());
        assert!(!cache.delete_by_locator("x").unwrap());
        assert!(cache.all().unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = open_cache();
        for i in 0..4 {
            cache
                .upsert(&record(&format!("m{}", i), i, MediaKind::Photo, i * 10))
                .unwrap();
        }
        cache.clear().unwrap();
        assert!(cache.all().unwrap().is_empty());
    }

    #[test]
    fn test_live_view_tracks_mutations() {
        let cache = open_cache();
        let view = cache.live_view();
        assert!(view.borrow().is_empty());

        cache
            .upsert(&record("a", 1, MediaKind::Photo, 100))
            .unwrap();
        assert_eq!(view.borrow().len(), 1);

        cache.delete_by_locator("a").unwrap();
        assert!(view.borrow().is_empty());
    }

    #[test]
    fn test_replace_all_is_atomic_for_observers() {
        let cache = open_cache();
        cache
            .upsert(&record("seed", 1, MediaKind::Photo, 100))
            .unwrap();

        let mut view = cache.live_view();
        view.mark_unchanged();

        let fresh = vec![
            record("n1", 10, MediaKind::Photo, 500),
            record("n2", 11, MediaKind::Video, 400),
        ];
        cache.replace_all(&fresh).unwrap();

        // Exactly one notification, already holding the full new listing.
        assert!(view.has_changed().unwrap());
        let seen = view.borrow_and_update().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].locator, "n1");
        assert!(!view.has_changed().unwrap());
    }

    #[test]
    fn test_cache_survives_reopen_on_same_connection_path() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("gallery.db");

        {
            let conn = Connection::open(&db_path).unwrap();
            let cache = GalleryCache::new(conn).unwrap();
            cache
                .upsert(&record("persisted", 7, MediaKind::Video, 123))
                .unwrap();
        }

        let conn = Connection::open(&db_path).unwrap();
        let cache = GalleryCache::new(conn).unwrap();
        let all = cache.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].locator, "persisted");
        // The reopened live view starts from the persisted listing.
        assert_eq!(cache.live_view().borrow().len(), 1);
    }
}
