//! Types for the subtitle provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::LanguageCode;

/// What to search for.
///
/// At least one of `query`, an external id, or `movie_hash` + `file_size`
/// must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchCriteria {
    /// Free-text title query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// IMDB id without the `tt` prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<String>,
    /// OpenSubtitles file hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_hash: Option<String>,
    /// Media file size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    /// Languages to search, sent comma-joined.
    pub languages: Vec<LanguageCode>,
}

impl SearchCriteria {
    /// Whether there is anything to search for.
    pub fn has_subject(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.query)
            || filled(&self.imdb_id)
            || filled(&self.tmdb_id)
            || (filled(&self.movie_hash) && self.file_size.is_some())
    }

    /// Comma-joined language filter, e.g. `en,es`.
    pub fn language_filter(&self) -> String {
        self.languages
            .iter()
            .map(LanguageCode::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Query parameters in alphabetical order, empty values omitted.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(episode) = self.episode_number {
            params.push(("episode_number", episode.to_string()));
        }
        if let Some(imdb) = &self.imdb_id {
            params.push(("imdb_id", imdb.clone()));
        }
        params.push(("languages", self.language_filter()));
        if let Some(size) = self.file_size {
            params.push(("moviebytesize", size.to_string()));
        }
        if let Some(hash) = &self.movie_hash {
            params.push(("moviehash", hash.clone()));
        }
        if let Some(query) = &self.query {
            params.push(("query", query.clone()));
        }
        if let Some(season) = self.season_number {
            params.push(("season_number", season.to_string()));
        }
        if let Some(tmdb) = &self.tmdb_id {
            params.push(("tmdb_id", tmdb.clone()));
        }
        params
    }
}

/// A single subtitle search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubtitleCandidate {
    /// Provider file id passed to `download`.
    pub file_id: u64,
    pub language: LanguageCode,
    /// Community rating (0-10).
    pub rating: f64,
    pub download_count: u64,
    /// Release name the subtitle was made for.
    pub release: String,
    pub uploader: String,
}

/// Remaining downloads in the provider's current window.
///
/// Only ever replaced by a value the provider reports.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "remaining", rename_all = "snake_case")]
pub enum DownloadQuota {
    /// No download response seen yet.
    #[default]
    Unknown,
    Remaining(u32),
}

impl DownloadQuota {
    /// Build from the provider's `remaining` field (negative means none).
    pub fn from_reported(remaining: i64) -> Self {
        Self::Remaining(remaining.clamp(0, u32::MAX as i64) as u32)
    }

    /// Known to be zero.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Remaining(0))
    }

    pub fn remaining(&self) -> Option<u32> {
        match self {
            Self::Unknown => None,
            Self::Remaining(n) => Some(*n),
        }
    }
}

/// A bearer token obtained by logging in. Has no known expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub obtained_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            obtained_at: Utc::now(),
        }
    }
}
