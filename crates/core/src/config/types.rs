use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::media::MediaType;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub opensubtitles: OpenSubtitlesConfig,
    pub plex: PlexConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

/// OpenSubtitles REST API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenSubtitlesConfig {
    /// Consumer API key sent as the `Api-Key` header.
    pub api_key: String,
    /// Account username (required for downloads).
    pub username: String,
    /// Account password (required for downloads).
    pub password: String,
    /// User agent string; the API rejects requests without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// API base URL (default: https://api.opensubtitles.com/api/v1)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Minimum spacing between two outbound calls, in milliseconds.
    #[serde(default = "default_min_interval")]
    pub min_request_interval_ms: u64,
    /// Send the OpenSubtitles file hash along with searches.
    #[serde(default = "default_true")]
    pub compute_file_hash: bool,
}

fn default_user_agent() -> String {
    format!("subfetch v{}", env!("CARGO_PKG_VERSION"))
}

fn default_base_url() -> String {
    "https://api.opensubtitles.com/api/v1".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_min_interval() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

/// Plex media server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlexConfig {
    /// Plex server URL (e.g., "http://localhost:32400")
    #[serde(default = "default_plex_url")]
    pub url: String,
    /// Plex authentication token
    pub token: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_plex_url() -> String {
    "http://localhost:32400".to_string()
}

/// What to fetch and how much of it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcquisitionConfig {
    /// Target subtitle languages (two-letter codes).
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Language assumed for subtitle streams without a language tag.
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Global download budget across all libraries (unlimited when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_downloads: Option<u32>,
    /// Restrict processing to movies or episodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Process a single library by name instead of every library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    /// Where the JSON run report is written.
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            default_language: default_language(),
            max_downloads: None,
            media_type: None,
            library: None,
            report_path: default_report_path(),
        }
    }
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_language() -> String {
    "en".to_string()
}

fn default_report_path() -> PathBuf {
    PathBuf::from("subtitle_download_report.json")
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub opensubtitles: SanitizedOpenSubtitlesConfig,
    pub plex: SanitizedPlexConfig,
    pub acquisition: AcquisitionConfig,
}

/// Sanitized OpenSubtitles config (credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOpenSubtitlesConfig {
    pub base_url: String,
    pub user_agent: String,
    pub api_key_configured: bool,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
    pub min_request_interval_ms: u64,
    pub compute_file_hash: bool,
}

/// Sanitized Plex config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPlexConfig {
    pub url: String,
    pub token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let os = &config.opensubtitles;
        Self {
            opensubtitles: SanitizedOpenSubtitlesConfig {
                base_url: os.base_url.clone(),
                user_agent: os.user_agent.clone(),
                api_key_configured: !os.api_key.is_empty(),
                username: os.username.clone(),
                password_configured: !os.password.is_empty(),
                timeout_secs: os.timeout_secs,
                min_request_interval_ms: os.min_request_interval_ms,
                compute_file_hash: os.compute_file_hash,
            },
            plex: SanitizedPlexConfig {
                url: config.plex.url.clone(),
                token_configured: !config.plex.token.is_empty(),
            },
            acquisition: config.acquisition.clone(),
        }
    }
}
