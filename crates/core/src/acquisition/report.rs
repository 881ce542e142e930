//! Download report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::language::LanguageCode;
use crate::media::{MediaItem, MediaType};
use crate::provider::SubtitleCandidate;

/// Outcome of one attempted (item, language) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRecord {
    pub title: String,
    pub media_type: MediaType,
    pub language: LanguageCode,
    /// Candidate fields are absent when no candidate was selected.
    pub rating: Option<f64>,
    pub download_count: Option<u64>,
    pub release: Option<String>,
    pub uploader: Option<String>,
    /// Sidecar written, on success.
    pub subtitle_file: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
}

impl DownloadRecord {
    pub fn success(item: &MediaItem, candidate: &SubtitleCandidate, subtitle_file: PathBuf) -> Self {
        Self {
            title: item.display_name(),
            media_type: item.media_type(),
            language: candidate.language.clone(),
            rating: Some(candidate.rating),
            download_count: Some(candidate.download_count),
            release: Some(candidate.release.clone()),
            uploader: Some(candidate.uploader.clone()),
            subtitle_file: Some(subtitle_file),
            timestamp: Utc::now(),
            success: true,
            error: None,
        }
    }

    pub fn failure(
        item: &MediaItem,
        language: &LanguageCode,
        candidate: Option<&SubtitleCandidate>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            title: item.display_name(),
            media_type: item.media_type(),
            language: language.clone(),
            rating: candidate.map(|c| c.rating),
            download_count: candidate.map(|c| c.download_count),
            release: candidate.map(|c| c.release.clone()),
            uploader: candidate.map(|c| c.uploader.clone()),
            subtitle_file: None,
            timestamp: Utc::now(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregates derived from the records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Mean rating of successful downloads.
    pub average_rating: Option<f64>,
    /// Sum of community download counts of successful downloads.
    pub total_community_downloads: u64,
    pub by_language: BTreeMap<LanguageCode, usize>,
}

/// Append-only record list for a run.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    records: Vec<DownloadRecord>,
}

impl DownloadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DownloadRecord) {
        self.records.push(record);
    }

    /// Records in append order.
    pub fn records(&self) -> &[DownloadRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &DownloadRecord> {
        self.records.iter().filter(|r| r.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadRecord> {
        self.records.iter().filter(|r| !r.success)
    }

    pub fn summary(&self) -> ReportSummary {
        let mut by_language = BTreeMap::new();
        let mut rating_sum = 0.0;
        let mut succeeded = 0;
        let mut total_community_downloads = 0;

        for record in self.successes() {
            succeeded += 1;
            rating_sum += record.rating.unwrap_or(0.0);
            total_community_downloads += record.download_count.unwrap_or(0);
            *by_language.entry(record.language.clone()).or_insert(0) += 1;
        }

        ReportSummary {
            total: self.records.len(),
            succeeded,
            failed: self.records.len() - succeeded,
            average_rating: (succeeded > 0).then(|| rating_sum / succeeded as f64),
            total_community_downloads,
            by_language,
        }
    }

    /// Pretty JSON document: generation time, summary and records.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Document<'a> {
            generated_at: DateTime<Utc>,
            summary: ReportSummary,
            records: &'a [DownloadRecord],
        }

        serde_json::to_string_pretty(&Document {
            generated_at: Utc::now(),
            summary: self.summary(),
            records: &self.records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;

    fn item() -> MediaItem {
        MediaItem {
            id: "1".to_string(),
            title: "Pilot".to_string(),
            kind: MediaKind::Episode {
                series_title: "Show".to_string(),
                season: 1,
                episode: 2,
            },
            guids: vec![],
            file: None,
            subtitle_streams: vec![],
        }
    }

    fn candidate(lang: &str, rating: f64, downloads: u64) -> SubtitleCandidate {
        SubtitleCandidate {
            file_id: 7,
            language: LanguageCode::parse(lang).unwrap(),
            rating,
            download_count: downloads,
            release: "Show.S01E02.WEB".to_string(),
            uploader: "someone".to_string(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = DownloadReport::new().summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_rating, None);
        assert!(summary.by_language.is_empty());
    }

    #[test]
    fn test_summary_counts_successes_only() {
        let mut report = DownloadReport::new();
        let item = item();
        report.push(DownloadRecord::success(
            &item,
            &candidate("en", 8.0, 100),
            PathBuf::from("/tv/a.en.srt"),
        ));
        report.push(DownloadRecord::success(
            &item,
            &candidate("es", 6.0, 50),
            PathBuf::from("/tv/a.es.srt"),
        ));
        report.push(DownloadRecord::failure(
            &item,
            &LanguageCode::parse("fr").unwrap(),
            Some(&candidate("fr", 9.9, 1000)),
            "Download quota exhausted",
        ));

        let summary = report.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.average_rating, Some(7.0));
        assert_eq!(summary.total_community_downloads, 150);
        assert_eq!(summary.by_language.len(), 2);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_record_fields() {
        let record = DownloadRecord::failure(
            &item(),
            &LanguageCode::parse("es").unwrap(),
            None,
            "No es subtitles found",
        );
        assert_eq!(record.title, "Show - S01E02 - Pilot");
        assert_eq!(record.media_type, MediaType::Episode);
        assert!(record.rating.is_none());
        assert!(!record.success);
        assert_eq!(record.error.as_deref(), Some("No es subtitles found"));
    }

    #[test]
    fn test_json_document() {
        let mut report = DownloadReport::new();
        report.push(DownloadRecord::success(
            &item(),
            &candidate("en", 8.0, 100),
            PathBuf::from("/tv/a.en.srt"),
        ));

        let json = report.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["succeeded"], 1);
        assert_eq!(value["summary"]["by_language"]["en"], 1);
        assert_eq!(value["records"][0]["media_type"], "episode");
        assert_eq!(value["records"][0]["subtitle_file"], "/tv/a.en.srt");
    }
}
