//! Acquisition settings, budget and statistics.

use std::collections::BTreeSet;
use std::ops::AddAssign;

use serde::Serialize;

use crate::config::AcquisitionConfig;
use crate::language::{parse_languages, LanguageCode};

use super::AcquisitionError;

/// Resolved acquisition settings.
#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    /// Languages every item should have.
    pub targets: BTreeSet<LanguageCode>,
    /// Language assumed for unlabeled subtitle streams.
    pub default_language: LanguageCode,
    /// Send the OpenSubtitles file hash with searches.
    pub compute_file_hash: bool,
}

impl AcquisitionSettings {
    pub fn new(
        targets: BTreeSet<LanguageCode>,
        default_language: LanguageCode,
        compute_file_hash: bool,
    ) -> Self {
        Self {
            targets,
            default_language,
            compute_file_hash,
        }
    }

    /// Normalise configured language tags.
    pub fn from_config(
        config: &AcquisitionConfig,
        compute_file_hash: bool,
    ) -> Result<Self, AcquisitionError> {
        let targets = parse_languages(&config.languages);
        if targets.is_empty() {
            return Err(AcquisitionError::InvalidSettings(format!(
                "no usable target language in {:?}",
                config.languages
            )));
        }

        let default_language = LanguageCode::parse(&config.default_language).ok_or_else(|| {
            AcquisitionError::InvalidSettings(format!(
                "invalid default language '{}'",
                config.default_language
            ))
        })?;

        Ok(Self::new(targets, default_language, compute_file_hash))
    }
}

/// Global download budget shared across items and libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadBudget {
    remaining: Option<u32>,
}

impl DownloadBudget {
    /// `None` means unlimited.
    pub fn new(max_downloads: Option<u32>) -> Self {
        Self {
            remaining: max_downloads,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Downloads left, `None` if unlimited.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Account for one successful download.
    pub fn consume(&mut self) {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

impl Default for DownloadBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// What happened to a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// No file path, or the file is not on disk.
    Skipped,
    /// Every target language is already present.
    UpToDate,
    /// Searched, and downloads attempted where possible.
    Processed { downloaded: u32, errored: bool },
}

impl ItemOutcome {
    /// Number of subtitles written for the item.
    pub fn downloaded(&self) -> u32 {
        match self {
            Self::Processed { downloaded, .. } => *downloaded,
            _ => 0,
        }
    }
}

/// Counters for one library, or summed over several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LibraryStats {
    pub scanned: u32,
    pub needing_subtitles: u32,
    pub downloaded: u32,
    pub errored: u32,
    pub skipped: u32,
}

impl AddAssign for LibraryStats {
    fn add_assign(&mut self, other: Self) {
        self.scanned += other.scanned;
        self.needing_subtitles += other.needing_subtitles;
        self.downloaded += other.downloaded;
        self.errored += other.errored;
        self.skipped += other.skipped;
    }
}
