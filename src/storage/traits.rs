//! Storage traits and error types
//!
//! This module defines the trait interfaces for the source database and the
//! baseline archive, and the errors they share.

use crate::storage::{
    ChangeReviewRecord, CheckUpdate, DiffStatus, MenuSourceRecord, SourceStatus, SourceType,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Menu source not found: {0}")]
    SourceNotFound(i64),

    #[error("Change review not found: {0}")]
    ReviewNotFound(i64),

    #[error("Change review {0} is already finished")]
    ReviewFinished(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for menu sources and their change reviews
pub trait SourceStore {
    // ===== Sources =====

    /// Registers a new source as active and returns its ID
    ///
    /// Registering a URL that already exists returns the existing ID.
    fn insert_source(&mut self, url: &str, source_type: SourceType) -> StorageResult<i64>;

    /// Gets a source by ID
    fn get_source(&self, source_id: i64) -> StorageResult<MenuSourceRecord>;

    /// Lists every active source in ID order
    fn list_active_sources(&self) -> StorageResult<Vec<MenuSourceRecord>>;

    /// Activates or deactivates a source
    fn set_source_status(&mut self, source_id: i64, status: SourceStatus) -> StorageResult<()>;

    /// Writes the outcome of a fingerprint check
    ///
    /// Fields of `update` left as `None` keep their stored values.
    fn record_check(&mut self, source_id: i64, update: &CheckUpdate) -> StorageResult<()>;

    // ===== Change reviews =====

    /// Opens a pending review for a source
    fn create_review(&mut self, source_id: i64, detected_at: DateTime<Utc>)
        -> StorageResult<i64>;

    /// Gets a review by ID
    fn get_review(&self, review_id: i64) -> StorageResult<ChangeReviewRecord>;

    /// Moves a pending review to a terminal status
    ///
    /// Fails with [`StorageError::ReviewFinished`] if the review already left
    /// `pending`.
    fn finish_review(
        &mut self,
        review_id: i64,
        status: DiffStatus,
        content: &str,
    ) -> StorageResult<()>;
}

/// Single-generation archive of each source's last diffed content
pub trait BaselineStore {
    /// Loads the stored baseline, if any
    fn load(&self, source_id: i64, source_type: SourceType) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the stored baseline
    fn store(&self, source_id: i64, source_type: SourceType, content: &[u8])
        -> StorageResult<()>;
}
