//! Storage module for persisting monitored menu sources
//!
//! This module handles:
//! - SQLite database initialization and schema management
//! - Menu source records and their fingerprint validators
//! - Change review records produced by the diff pipeline
//! - Single-generation content baselines on the filesystem

mod baseline;
mod schema;
mod sqlite;
mod traits;

pub use baseline::FsBaselineStore;
pub use sqlite::{init_database, SqliteStore};
pub use traits::{BaselineStore, SourceStore, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Initializes or opens the source database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_storage(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::open(path)
}

/// A monitored menu source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuSourceRecord {
    pub id: i64,
    pub url: String,
    pub source_type: SourceType,
    pub status: SourceStatus,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_fingerprint: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// A change review created when a fingerprint mismatch triggers a diff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeReviewRecord {
    pub id: i64,
    pub menu_source_id: i64,
    pub diff_status: DiffStatus,
    pub diff_content: Option<String>,
    pub detected_at: DateTime<Utc>,
}

/// HTTP cache validators returned with a full response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Values written back after a fingerprint check
#[derive(Debug, Clone, Default)]
pub struct CheckUpdate {
    pub checked_at: Option<DateTime<Utc>>,
    /// `None` keeps the stored value
    pub fingerprint: Option<String>,
    /// `None` keeps the stored validators; `Some` replaces both, clearing
    /// any the server no longer sends
    pub validators: Option<Validators>,
}

/// Kind of content behind a menu source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Pdf,
    Html,
}

impl SourceType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(Self::Pdf),
            "html" => Some(Self::Html),
            _ => None,
        }
    }
}

/// Whether a source takes part in sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Active,
    Inactive,
}

impl SourceStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Lifecycle of a change review; terminal once it leaves `Pending`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Pending,
    DiffComplete,
    DiffFailed,
}

impl DiffStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::DiffComplete => "diff_complete",
            Self::DiffFailed => "diff_failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "diff_complete" => Some(Self::DiffComplete),
            "diff_failed" => Some(Self::DiffFailed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
