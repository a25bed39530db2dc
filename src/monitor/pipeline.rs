//! Two-tier change detection for monitored menu sources
//!
//! [`SourceMonitor::check_source`] is the cheap tier: one conditional request
//! and a hash comparison. Only a fingerprint mismatch opens a change review,
//! which [`SourceMonitor::diff_review`] then resolves by extracting the new
//! text and diffing it against the source's single stored baseline.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::crawler::{write_temp_pdf, HttpTransport, PageFetcher, PdfFetcher};
use crate::extract::strip_text;
use crate::monitor::diff::{diff_lines, render_report};
use crate::monitor::fingerprint::{FingerprintProbe, ProbeOutcome};
use crate::monitor::pdf_text::PdfTextExtractor;
use crate::robots::RobotsGate;
use crate::storage::{
    BaselineStore, CheckUpdate, DiffStatus, MenuSourceRecord, SourceStore, SourceType,
    StorageError, Validators,
};
use crate::{Result, ScoutError};
use serde::Serialize;
use std::sync::Arc;

pub const NEW_VERSION_FAILED_MESSAGE: &str = "Could not extract text from new version";

/// Result of the cheap tier for one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Fingerprint matched or the server answered 304
    Unchanged,
    /// Fingerprint differed; a pending review was opened
    Changed { review_id: i64 },
    /// The source could not be fetched this time
    Unavailable,
}

/// Counters for one sweep over the active sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    pub checked: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub diff_complete: usize,
    pub diff_failed: usize,
    pub errors: usize,
}

/// Freshly fetched content of a source
struct NewVersion {
    text: String,
    baseline: Vec<u8>,
}

pub struct SourceMonitor {
    store: Box<dyn SourceStore>,
    baselines: Box<dyn BaselineStore>,
    probe: FingerprintProbe,
    pages: PageFetcher,
    pdfs: PdfFetcher,
    pdf_text: Arc<dyn PdfTextExtractor>,
    clock: Arc<dyn Clock>,
}

impl SourceMonitor {
    pub fn new(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        robots: Arc<RobotsGate>,
        store: Box<dyn SourceStore>,
        baselines: Box<dyn BaselineStore>,
        pdf_text: Arc<dyn PdfTextExtractor>,
    ) -> Self {
        Self {
            store,
            baselines,
            probe: FingerprintProbe::from_config(config, transport.clone(), robots.clone()),
            pages: PageFetcher::from_config(config, transport.clone(), robots.clone()),
            pdfs: PdfFetcher::from_config(config, transport, robots),
            pdf_text,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &dyn SourceStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn SourceStore {
        self.store.as_mut()
    }

    /// Runs the cheap fingerprint tier for one source
    ///
    /// A source without a stored fingerprint always counts as changed.
    pub async fn check_source(&mut self, source_id: i64) -> Result<CheckOutcome> {
        let source = self.store.get_source(source_id).map_err(scout_error)?;
        let now = self.clock.now();

        let fingerprint = match self.probe.probe(&source).await {
            ProbeOutcome::NotModified => {
                tracing::debug!("{} not modified", source.url);
                self.touch(source_id)?;
                return Ok(CheckOutcome::Unchanged);
            }
            ProbeOutcome::Unavailable(reason) => {
                tracing::warn!("Could not check {}: {}", source.url, reason);
                self.touch(source_id)?;
                return Ok(CheckOutcome::Unavailable);
            }
            ProbeOutcome::Fetched(fingerprint) => fingerprint,
        };

        let unchanged = source.last_fingerprint.as_deref() == Some(fingerprint.value.as_str());
        let update = CheckUpdate {
            checked_at: Some(now),
            fingerprint: (!unchanged).then(|| fingerprint.value.clone()),
            validators: Some(Validators {
                etag: fingerprint.etag,
                last_modified: fingerprint.last_modified,
            }),
        };
        self.store
            .record_check(source_id, &update)
            .map_err(scout_error)?;

        if unchanged {
            tracing::debug!("{} unchanged", source.url);
            return Ok(CheckOutcome::Unchanged);
        }

        let review_id = self
            .store
            .create_review(source_id, now)
            .map_err(scout_error)?;
        tracing::info!(
            "Change detected for source {} ({}), opened review {}",
            source_id,
            source.url,
            review_id
        );
        Ok(CheckOutcome::Changed { review_id })
    }

    /// Runs the expensive diff tier for a pending review
    ///
    /// Reviews that already left `pending` are returned as they are.
    pub async fn diff_review(&mut self, review_id: i64) -> Result<DiffStatus> {
        let review = self.store.get_review(review_id).map_err(scout_error)?;
        if review.diff_status.is_terminal() {
            tracing::debug!("Review {} already finished", review_id);
            return Ok(review.diff_status);
        }

        match self.run_diff(review_id, review.menu_source_id).await {
            Ok(status) => Ok(status),
            Err(e) => {
                tracing::error!("Diff failed for review {}: {}", review_id, e);
                self.store
                    .finish_review(review_id, DiffStatus::DiffFailed, &format!("Error: {}", e))
                    .map_err(scout_error)?;
                Ok(DiffStatus::DiffFailed)
            }
        }
    }

    /// Checks every active source, diffing the ones that changed
    ///
    /// A failure on one source is counted and logged; the sweep continues.
    pub async fn sweep(&mut self) -> Result<SweepStats> {
        let sources = self.store.list_active_sources().map_err(scout_error)?;
        let mut stats = SweepStats::default();

        for source in sources {
            stats.checked += 1;
            match self.check_source(source.id).await {
                Ok(CheckOutcome::Unchanged) => stats.unchanged += 1,
                Ok(CheckOutcome::Unavailable) => stats.errors += 1,
                Ok(CheckOutcome::Changed { review_id }) => {
                    stats.changed += 1;
                    match self.diff_review(review_id).await {
                        Ok(DiffStatus::DiffComplete) => stats.diff_complete += 1,
                        Ok(_) => stats.diff_failed += 1,
                        Err(e) => {
                            tracing::error!("Review {} for {}: {}", review_id, source.url, e);
                            stats.errors += 1;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Check failed for {}: {}", source.url, e);
                    stats.errors += 1;
                }
            }
        }

        tracing::info!(
            "Sweep finished: {} checked, {} unchanged, {} changed, {} errors",
            stats.checked,
            stats.unchanged,
            stats.changed,
            stats.errors
        );
        Ok(stats)
    }

    async fn run_diff(&mut self, review_id: i64, source_id: i64) -> Result<DiffStatus> {
        let source = self.store.get_source(source_id).map_err(scout_error)?;
        let previous = self.previous_text(&source).await;

        let Some(new_version) = self.new_version(&source).await else {
            tracing::warn!("No text from new version of {}", source.url);
            self.store
                .finish_review(review_id, DiffStatus::DiffFailed, NEW_VERSION_FAILED_MESSAGE)
                .map_err(scout_error)?;
            return Ok(DiffStatus::DiffFailed);
        };

        let old_text = previous.unwrap_or_default();
        let diff = diff_lines(&old_text, &new_version.text);
        let report = render_report(&diff, !old_text.trim().is_empty());

        self.store
            .finish_review(review_id, DiffStatus::DiffComplete, &report)
            .map_err(scout_error)?;
        tracing::info!(
            "Review {}: {} added, {} removed",
            review_id,
            diff.added.len(),
            diff.removed.len()
        );

        if let Err(e) = self
            .baselines
            .store(source.id, source.source_type, &new_version.baseline)
        {
            tracing::warn!("Could not archive baseline for {}: {}", source.url, e);
        }

        Ok(DiffStatus::DiffComplete)
    }

    /// Text of the stored baseline; unreadable baselines count as absent
    async fn previous_text(&self, source: &MenuSourceRecord) -> Option<String> {
        let bytes = match self.baselines.load(source.id, source.source_type) {
            Ok(bytes) => bytes?,
            Err(e) => {
                tracing::warn!("Could not load baseline for {}: {}", source.url, e);
                return None;
            }
        };

        match source.source_type {
            SourceType::Html => Some(String::from_utf8_lossy(&bytes).into_owned()),
            SourceType::Pdf => self.pdf_to_text(&source.url, &bytes).await,
        }
    }

    async fn new_version(&self, source: &MenuSourceRecord) -> Option<NewVersion> {
        let (text, baseline) = match source.source_type {
            SourceType::Pdf => {
                let bytes = self.pdfs.fetch_bytes(&source.url).await?;
                let text = self.pdf_to_text(&source.url, &bytes).await?;
                (text, bytes)
            }
            SourceType::Html => {
                let html = self.pages.fetch(&source.url).await?;
                let text = strip_text(&html);
                let baseline = text.clone().into_bytes();
                (text, baseline)
            }
        };

        if text.trim().is_empty() {
            return None;
        }
        Some(NewVersion { text, baseline })
    }

    async fn pdf_to_text(&self, url: &str, bytes: &[u8]) -> Option<String> {
        let file = match write_temp_pdf(bytes) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Could not write temp PDF for {}: {}", url, e);
                return None;
            }
        };

        match self.pdf_text.extract_text(file.path()).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("PDF text extraction failed for {}: {}", url, e);
                None
            }
        }
    }

    fn touch(&mut self, source_id: i64) -> Result<()> {
        let update = CheckUpdate {
            checked_at: Some(self.clock.now()),
            ..Default::default()
        };
        self.store
            .record_check(source_id, &update)
            .map_err(scout_error)
    }
}

fn scout_error(error: StorageError) -> ScoutError {
    match error {
        StorageError::SourceNotFound(id) => ScoutError::SourceNotFound(id),
        StorageError::ReviewNotFound(id) => ScoutError::ReviewNotFound(id),
        other => ScoutError::Storage(other),
    }
}
