//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the source database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Monitored menu sources
CREATE TABLE IF NOT EXISTS menu_sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    source_type TEXT NOT NULL,
    status TEXT NOT NULL,
    last_checked_at TEXT,
    last_fingerprint TEXT,
    etag TEXT,
    last_modified TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_menu_sources_status ON menu_sources(status);

-- Reviews opened when a source's fingerprint changes
CREATE TABLE IF NOT EXISTS menu_source_change_reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    menu_source_id INTEGER NOT NULL REFERENCES menu_sources(id),
    diff_status TEXT NOT NULL,
    diff_content TEXT,
    detected_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_change_reviews_source ON menu_source_change_reviews(menu_source_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["menu_sources", "menu_source_change_reviews"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
