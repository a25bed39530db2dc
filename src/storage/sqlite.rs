//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the SourceStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SourceStore, StorageError, StorageResult};
use crate::storage::{
    ChangeReviewRecord, CheckUpdate, DiffStatus, MenuSourceRecord, SourceStatus, SourceType,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SOURCE_COLUMNS: &str =
    "id, url, source_type, status, last_checked_at, last_fingerprint, etag, last_modified";

const REVIEW_COLUMNS: &str = "id, menu_source_id, diff_status, diff_content, detected_at";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema exists
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = init_database(path)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn review_exists(&self, review_id: i64) -> StorageResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM menu_source_change_reviews WHERE id = ?1",
                params![review_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl SourceStore for SqliteStore {
    // ===== Sources =====

    fn insert_source(&mut self, url: &str, source_type: SourceType) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO menu_sources (url, source_type, status, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                url,
                source_type.to_db_string(),
                SourceStatus::Active.to_db_string(),
                now
            ],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM menu_sources WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_source(&self, source_id: i64) -> StorageResult<MenuSourceRecord> {
        let sql = format!("SELECT {} FROM menu_sources WHERE id = ?1", SOURCE_COLUMNS);
        self.conn
            .query_row(&sql, params![source_id], source_from_row)
            .optional()?
            .ok_or(StorageError::SourceNotFound(source_id))
    }

    fn list_active_sources(&self) -> StorageResult<Vec<MenuSourceRecord>> {
        let sql = format!(
            "SELECT {} FROM menu_sources WHERE status = ?1 ORDER BY id",
            SOURCE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let sources = stmt
            .query_map(
                params![SourceStatus::Active.to_db_string()],
                source_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    fn set_source_status(&mut self, source_id: i64, status: SourceStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE menu_sources SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), source_id],
        )?;
        if updated == 0 {
            return Err(StorageError::SourceNotFound(source_id));
        }
        Ok(())
    }

    fn record_check(&mut self, source_id: i64, update: &CheckUpdate) -> StorageResult<()> {
        let validators = update.validators.as_ref();
        let updated = self.conn.execute(
            "UPDATE menu_sources SET
                last_checked_at = COALESCE(?1, last_checked_at),
                last_fingerprint = COALESCE(?2, last_fingerprint),
                etag = CASE WHEN ?3 THEN ?4 ELSE etag END,
                last_modified = CASE WHEN ?3 THEN ?5 ELSE last_modified END
             WHERE id = ?6",
            params![
                update.checked_at.map(|t| t.to_rfc3339()),
                update.fingerprint,
                validators.is_some(),
                validators.and_then(|v| v.etag.as_deref()),
                validators.and_then(|v| v.last_modified.as_deref()),
                source_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::SourceNotFound(source_id));
        }
        Ok(())
    }

    // ===== Change reviews =====

    fn create_review(
        &mut self,
        source_id: i64,
        detected_at: DateTime<Utc>,
    ) -> StorageResult<i64> {
        // Surface a typed error rather than a foreign key failure
        self.get_source(source_id)?;

        self.conn.execute(
            "INSERT INTO menu_source_change_reviews (menu_source_id, diff_status, detected_at)
             VALUES (?1, ?2, ?3)",
            params![
                source_id,
                DiffStatus::Pending.to_db_string(),
                detected_at.to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_review(&self, review_id: i64) -> StorageResult<ChangeReviewRecord> {
        let sql = format!(
            "SELECT {} FROM menu_source_change_reviews WHERE id = ?1",
            REVIEW_COLUMNS
        );
        self.conn
            .query_row(&sql, params![review_id], review_from_row)
            .optional()?
            .ok_or(StorageError::ReviewNotFound(review_id))
    }

    fn finish_review(
        &mut self,
        review_id: i64,
        status: DiffStatus,
        content: &str,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE menu_source_change_reviews SET diff_status = ?1, diff_content = ?2
             WHERE id = ?3 AND diff_status = ?4",
            params![
                status.to_db_string(),
                content,
                review_id,
                DiffStatus::Pending.to_db_string()
            ],
        )?;

        if updated == 0 {
            return Err(if self.review_exists(review_id)? {
                StorageError::ReviewFinished(review_id)
            } else {
                StorageError::ReviewNotFound(review_id)
            });
        }
        Ok(())
    }
}

fn source_from_row(row: &Row<'_>) -> rusqlite::Result<MenuSourceRecord> {
    let last_checked_at: Option<String> = row.get(4)?;
    Ok(MenuSourceRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        source_type: SourceType::from_db_string(&row.get::<_, String>(2)?)
            .unwrap_or(SourceType::Html),
        status: SourceStatus::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(SourceStatus::Inactive),
        last_checked_at: last_checked_at
            .map(|s| parse_timestamp(4, &s))
            .transpose()?,
        last_fingerprint: row.get(5)?,
        etag: row.get(6)?,
        last_modified: row.get(7)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<ChangeReviewRecord> {
    Ok(ChangeReviewRecord {
        id: row.get(0)?,
        menu_source_id: row.get(1)?,
        diff_status: DiffStatus::from_db_string(&row.get::<_, String>(2)?)
            .unwrap_or(DiffStatus::Pending),
        diff_content: row.get(3)?,
        detected_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
    })
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Opens a database connection and initializes the schema
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Validators;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_source_defaults_to_active() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = store
            .insert_source("https://bistro.example/menu.pdf", SourceType::Pdf)
            .unwrap();

        let source = store.get_source(id).unwrap();
        assert_eq!(source.url, "https://bistro.example/menu.pdf");
        assert_eq!(source.source_type, SourceType::Pdf);
        assert_eq!(source.status, SourceStatus::Active);
        assert!(source.last_checked_at.is_none());
        assert!(source.last_fingerprint.is_none());
    }

    #[test]
    fn test_insert_duplicate_source() {
        let mut store = SqliteStore::in_memory().unwrap();
        let first = store
            .insert_source("https://bistro.example/menu", SourceType::Html)
            .unwrap();
        let second = store
            .insert_source("https://bistro.example/menu", SourceType::Html)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_source() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.get_source(42),
            Err(StorageError::SourceNotFound(42))
        ));
    }

    #[test]
    fn test_list_active_skips_inactive() {
        let mut store = SqliteStore::in_memory().unwrap();
        let a = store
            .insert_source("https://a.example/menu", SourceType::Html)
            .unwrap();
        let b = store
            .insert_source("https://b.example/menu.pdf", SourceType::Pdf)
            .unwrap();
        store.set_source_status(a, SourceStatus::Inactive).unwrap();

        let active = store.list_active_sources().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b);
    }

    #[test]
    fn test_record_check_keeps_unset_fields() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = store
            .insert_source("https://a.example/menu.pdf", SourceType::Pdf)
            .unwrap();

        store
            .record_check(
                id,
                &CheckUpdate {
                    checked_at: Some(at(8)),
                    fingerprint: Some("abc".to_string()),
                    validators: Some(Validators {
                        etag: Some("\"v1\"".to_string()),
                        last_modified: None,
                    }),
                },
            )
            .unwrap();

        store
            .record_check(
                id,
                &CheckUpdate {
                    checked_at: Some(at(9)),
                    ..Default::default()
                },
            )
            .unwrap();

        let source = store.get_source(id).unwrap();
        assert_eq!(source.last_checked_at, Some(at(9)));
        assert_eq!(source.last_fingerprint.as_deref(), Some("abc"));
        assert_eq!(source.etag.as_deref(), Some("\"v1\""));
        assert!(source.last_modified.is_none());
    }

    #[test]
    fn test_record_check_replaces_validators() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = store
            .insert_source("https://a.example/menu.pdf", SourceType::Pdf)
            .unwrap();

        store
            .record_check(
                id,
                &CheckUpdate {
                    checked_at: Some(at(8)),
                    fingerprint: Some("abc".to_string()),
                    validators: Some(Validators {
                        etag: Some("\"v1\"".to_string()),
                        last_modified: Some("Wed, 01 May 2024 08:00:00 GMT".to_string()),
                    }),
                },
            )
            .unwrap();

        // A later full response without an ETag clears the stale one
        store
            .record_check(
                id,
                &CheckUpdate {
                    checked_at: Some(at(9)),
                    fingerprint: None,
                    validators: Some(Validators {
                        etag: None,
                        last_modified: Some("Thu, 02 May 2024 08:00:00 GMT".to_string()),
                    }),
                },
            )
            .unwrap();

        let source = store.get_source(id).unwrap();
        assert!(source.etag.is_none());
        assert_eq!(
            source.last_modified.as_deref(),
            Some("Thu, 02 May 2024 08:00:00 GMT")
        );
        assert_eq!(source.last_fingerprint.as_deref(), Some("abc"));
    }

    #[test]
    fn test_review_lifecycle() {
        let mut store = SqliteStore::in_memory().unwrap();
        let source = store
            .insert_source("https://a.example/menu", SourceType::Html)
            .unwrap();
        let review = store.create_review(source, at(10)).unwrap();

        let pending = store.get_review(review).unwrap();
        assert_eq!(pending.menu_source_id, source);
        assert_eq!(pending.diff_status, DiffStatus::Pending);
        assert_eq!(pending.detected_at, at(10));
        assert!(pending.diff_content.is_none());

        store
            .finish_review(review, DiffStatus::DiffComplete, "ADDED (1 lines):\n+ Soup")
            .unwrap();
        let done = store.get_review(review).unwrap();
        assert_eq!(done.diff_status, DiffStatus::DiffComplete);
        assert_eq!(done.diff_content.as_deref(), Some("ADDED (1 lines):\n+ Soup"));
    }

    #[test]
    fn test_finished_review_is_terminal() {
        let mut store = SqliteStore::in_memory().unwrap();
        let source = store
            .insert_source("https://a.example/menu", SourceType::Html)
            .unwrap();
        let review = store.create_review(source, at(10)).unwrap();
        store
            .finish_review(review, DiffStatus::DiffFailed, "boom")
            .unwrap();

        let again = store.finish_review(review, DiffStatus::DiffComplete, "late");
        assert!(matches!(again, Err(StorageError::ReviewFinished(_))));
        assert_eq!(
            store.get_review(review).unwrap().diff_status,
            DiffStatus::DiffFailed
        );

        let missing = store.finish_review(999, DiffStatus::DiffComplete, "x");
        assert!(matches!(missing, Err(StorageError::ReviewNotFound(999))));
    }

    #[test]
    fn test_review_for_unknown_source() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.create_review(7, at(1)),
            Err(StorageError::SourceNotFound(7))
        ));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store
                .insert_source("https://a.example/menu", SourceType::Html)
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.list_active_sources().unwrap().len(), 1);
    }
}
