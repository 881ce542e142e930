//! Subtitle provider abstraction.
//!
//! This module provides a `SubtitleProvider` trait for searching and
//! downloading subtitles, with an OpenSubtitles REST implementation that
//! owns request spacing, authentication and download quota state.

mod hash;
mod opensubtitles;
mod rate_limiter;
mod types;

pub use hash::{movie_hash, HASH_CHUNK_SIZE};
pub use opensubtitles::OpenSubtitlesClient;
pub use rate_limiter::RateLimiter;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to a subtitle provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Client not configured (missing credentials, bad header value, etc.).
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Login rejected the username/password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The API key was rejected.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Search criteria carry nothing to search for.
    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),

    /// The session token was rejected, even after logging in again.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited with no (or exhausted) retry guidance.
    #[error("Rate limited by provider{}", retry_after_secs.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// No downloads left in the current quota window.
    #[error("Download quota exhausted")]
    QuotaExhausted,

    /// The provider refused to serve this subtitle.
    #[error("Subtitle unavailable: {0}")]
    Unavailable(String),

    /// Fetching the signed download link failed.
    #[error("Failed to fetch subtitle file: {0}")]
    FileFetchFailed(String),

    /// Network failure or server-side (5xx) error.
    #[error("Transient provider error: {0}")]
    Transient(String),

    /// Unexpected API response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Whether the same call might succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transient(_) | Self::RateLimited { .. } | Self::FileFetchFailed(_)
        )
    }
}

/// Trait for subtitle sources.
///
/// Calls take `&mut self`: a provider owns its session, quota and request
/// spacing, and calls are issued one at a time.
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Search for subtitles in every language of `criteria`.
    ///
    /// "No results" is an empty list, not an error.
    async fn search(
        &mut self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SubtitleCandidate>, ProviderError>;

    /// Download the raw bytes of a subtitle file.
    async fn download(&mut self, file_id: u64) -> Result<Vec<u8>, ProviderError>;

    /// Remaining downloads as last reported by the provider.
    fn quota(&self) -> DownloadQuota;
}
