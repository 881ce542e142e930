//! Subtitle acquisition.
//!
//! The orchestrator walks library items one at a time:
//! gap detection, one search per item, per-language ranking, download,
//! sidecar write. Per-item and per-language failures become report records
//! and counters; only library resolution failures are returned as errors.

mod criteria;
mod report;
mod runner;
mod sidecar;
mod types;

pub use criteria::build_criteria;
pub use report::{DownloadRecord, DownloadReport, ReportSummary};
pub use runner::AcquisitionOrchestrator;
pub use sidecar::{subtitle_exists, subtitle_path};
pub use types::{AcquisitionSettings, DownloadBudget, ItemOutcome, LibraryStats};

use thiserror::Error;

use crate::media::LibraryError;

/// Errors that abort an acquisition run.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Library could not be listed or resolved.
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Settings leave nothing to acquire.
    #[error("Invalid acquisition settings: {0}")]
    InvalidSettings(String),
}
