//! Output module for CLI results
//!
//! This module handles:
//! - Pretty-printed JSON for crawl and extraction results
//! - Plain-text sweep statistics
//! - Change review rendering

pub mod stats;

pub use stats::{print_sweep_stats, write_sweep_stats};

use crate::storage::ChangeReviewRecord;
use serde::Serialize;
use std::io::{self, Write};

/// Writes `value` as pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> crate::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Prints `value` to stdout as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> crate::Result<()> {
    write_json(&mut io::stdout().lock(), value)
}

/// Writes a review header followed by its stored diff report
pub fn write_review<W: Write>(out: &mut W, review: &ChangeReviewRecord) -> io::Result<()> {
    writeln!(
        out,
        "Review {} (source {}, {}, detected {})",
        review.id,
        review.menu_source_id,
        review.diff_status.to_db_string(),
        review.detected_at.to_rfc3339()
    )?;
    writeln!(out)?;
    match &review.diff_content {
        Some(content) => writeln!(out, "{}", content),
        None => writeln!(out, "(diff not computed yet)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DiffStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_write_json_is_pretty() {
        let mut buf = Vec::new();
        write_json(&mut buf, &serde_json::json!({"pdfs": ["https://a.example/m.pdf"]})).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("{\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_write_review() {
        let review = ChangeReviewRecord {
            id: 3,
            menu_source_id: 1,
            diff_status: DiffStatus::DiffComplete,
            diff_content: Some("+++ New version (1 lines)".to_string()),
            detected_at: Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap(),
        };
        let mut buf = Vec::new();
        write_review(&mut buf, &review).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Review 3 (source 1, diff_complete, detected 2024-05-01T06:00:00+00:00)"));
        assert!(text.contains("+++ New version (1 lines)"));
    }
}
