use rusqlite::{Connection, Result};

/// Initialize the gallery cache schema.
pub fn init_gallery_schema(conn: &Connection) -> Result<()> {
    // Schema version table for the gallery cache
    conn.execute(
        "CREATE TABLE IF NOT EXISTS gallery_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Check current gallery schema version
    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM gallery_schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_gallery_schema_v1(conn)?;
        conn.execute("INSERT INTO gallery_schema_version (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Create gallery cache schema version 1
fn create_gallery_schema_v1(conn: &Connection) -> Result<()> {
    // Table: gallery_items - one row per known media item, keyed by locator
    conn.execute(
        "CREATE TABLE IF NOT EXISTS gallery_items (
            locator TEXT PRIMARY KEY,
            store_id INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK(kind IN ('photo', 'video')),
            added_at INTEGER NOT NULL
        )",
        [],
    )?;

    // Index for the newest-first listing order
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_gallery_items_added
         ON gallery_items(added_at DESC, store_id DESC)",
        [],
    )?;

    Ok(())
}
