//! Change detection for monitored menu sources
//!
//! - [`FingerprintProbe`]: conditional GET and content hash (cheap tier)
//! - [`diff_lines`] / [`render_report`]: line-set comparison (expensive tier)
//! - [`SourceMonitor`]: ties both tiers to the source store and baselines

mod diff;
mod fingerprint;
mod pdf_text;
mod pipeline;

pub use diff::{diff_lines, render_report, LineDiff, MAX_REPORT_LINES, NO_DIFFERENCE_MESSAGE};
pub use fingerprint::{
    fingerprint_bytes, fingerprint_text, Fingerprint, FingerprintProbe, ProbeOutcome,
};
pub use pdf_text::{PdfTextError, PdfTextExtractor, PdftotextExtractor};
pub use pipeline::{CheckOutcome, SourceMonitor, SweepStats, NEW_VERSION_FAILED_MESSAGE};
