//! OpenSubtitles REST API (v1) client.
//!
//! Every outbound request goes through the client's `RateLimiter`. Search
//! and download-link requests are retried once when the API answers 429
//! with a `Retry-After` header; without one the 429 is surfaced.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::OpenSubtitlesConfig;
use crate::language::LanguageCode;

use super::rate_limiter::RateLimiter;
use super::types::{AuthSession, DownloadQuota, SearchCriteria, SubtitleCandidate};
use super::{ProviderError, SubtitleProvider};

/// OpenSubtitles client. Owns the session token, the download quota and
/// the request spacing.
pub struct OpenSubtitlesClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    rate_limiter: RateLimiter,
    session: Option<AuthSession>,
    quota: DownloadQuota,
}

impl std::fmt::Debug for OpenSubtitlesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSubtitlesClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("logged_in", &self.session.is_some())
            .field("quota", &self.quota)
            .finish()
    }
}

impl OpenSubtitlesClient {
    /// Create a new client. No request is made until the first call.
    pub fn new(config: &OpenSubtitlesConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(config.api_key.trim()).map_err(|_| {
                ProviderError::NotConfigured("API key is not a valid header value".to_string())
            })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            rate_limiter: RateLimiter::new(Duration::from_millis(config.min_request_interval_ms)),
            session: None,
            quota: DownloadQuota::Unknown,
        })
    }

    /// Current session, if logged in.
    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Exchange username/password for a bearer token.
    ///
    /// Search works without a session; downloads log in lazily.
    pub async fn login(&mut self) -> Result<AuthSession, ProviderError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ProviderError::NotConfigured(
                "username and password are required for downloads".to_string(),
            ));
        }

        info!("Logging in to OpenSubtitles...");
        self.rate_limiter.acquire().await;

        let url = format!("{}/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                username: &self.username,
                password: &self.password,
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            let body: LoginResponse = response.json().await.map_err(|e| {
                ProviderError::Parse(format!("Failed to parse login response: {}", e))
            })?;
            let session = AuthSession::new(body.token);
            self.session = Some(session.clone());
            info!("Successfully logged in");
            return Ok(session);
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                error!("Invalid username or password");
                Err(ProviderError::InvalidCredentials)
            }
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited {
                retry_after_secs: retry_after(response.headers()).map(|d| d.as_secs()),
            }),
            _ => Err(status_error(status, response).await),
        }
    }

    /// Send a request, honouring one `Retry-After` on 429.
    async fn send_with_retry<F>(&mut self, build: F) -> Result<Response, ProviderError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        self.rate_limiter.acquire().await;
        let response = build(&self.client).send().await.map_err(transport_error)?;
        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return Ok(response);
        }

        let Some(wait) = retry_after(response.headers()) else {
            error!("Rate limit exceeded with no Retry-After header");
            return Err(ProviderError::RateLimited {
                retry_after_secs: None,
            });
        };

        warn!("Rate limit exceeded. Waiting {} seconds...", wait.as_secs());
        sleep(wait).await;

        self.rate_limiter.acquire().await;
        let response = build(&self.client).send().await.map_err(transport_error)?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after(response.headers()).map(|d| d.as_secs()),
            });
        }
        Ok(response)
    }

    /// POST /download: resolve a file id to a signed link.
    async fn request_download_link(&mut self, file_id: u64) -> Result<String, ProviderError> {
        let token = self
            .session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(ProviderError::Unauthorized)?;

        let url = format!("{}/download", self.base_url);
        let body = DownloadRequest { file_id };
        let response = self
            .send_with_retry(|client| client.post(&url).bearer_auth(&token).json(&body))
            .await?;

        let status = response.status();
        if status.is_success() {
            let link: DownloadLinkResponse = response.json().await.map_err(|e| {
                ProviderError::Parse(format!("Failed to parse download response: {}", e))
            })?;
            if let Some(remaining) = link.remaining {
                self.quota = DownloadQuota::from_reported(remaining);
            }
            debug!(file_id, remaining = ?self.quota.remaining(), "Download link obtained");

            return link.link.filter(|l| !l.is_empty()).ok_or_else(|| {
                ProviderError::Parse("download response has no link".to_string())
            });
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(ProviderError::Unauthorized),
            StatusCode::NOT_ACCEPTABLE => {
                let text = response.text().await.unwrap_or_default();
                let body = serde_json::from_str::<DownloadLinkResponse>(&text).ok();
                let message = body
                    .as_ref()
                    .and_then(|b| b.message.clone())
                    .unwrap_or_else(|| text.chars().take(200).collect());

                match body.and_then(|b| b.remaining) {
                    Some(remaining) if remaining > 0 => {
                        self.quota = DownloadQuota::from_reported(remaining);
                        warn!(file_id, "Subtitle unavailable: {}", message);
                        Err(ProviderError::Unavailable(message))
                    }
                    _ => {
                        self.quota = DownloadQuota::Remaining(0);
                        error!("Download limit reached: {}", message);
                        Err(ProviderError::QuotaExhausted)
                    }
                }
            }
            _ => Err(status_error(status, response).await),
        }
    }

    /// GET the signed link. Not retried.
    async fn fetch_file(&mut self, link: &str) -> Result<Vec<u8>, ProviderError> {
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|e| ProviderError::FileFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::FileFetchFailed(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::FileFetchFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SubtitleProvider for OpenSubtitlesClient {
    fn name(&self) -> &str {
        "opensubtitles"
    }

    async fn search(
        &mut self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SubtitleCandidate>, ProviderError> {
        if !criteria.has_subject() {
            return Err(ProviderError::InvalidCriteria(
                "need a query, an external id, or a file hash and size".to_string(),
            ));
        }
        if criteria.languages.is_empty() {
            return Err(ProviderError::InvalidCriteria(
                "no languages requested".to_string(),
            ));
        }

        let url = format!("{}/subtitles", self.base_url);
        let params = criteria.query_params();
        debug!(languages = %criteria.language_filter(), "Searching OpenSubtitles");

        let response = self
            .send_with_retry(|client| client.get(&url).query(&params))
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: SearchResponse = response.json().await.map_err(|e| {
                ProviderError::Parse(format!("Failed to parse search response: {}", e))
            })?;
            let candidates = into_candidates(body.data);
            debug!(results = candidates.len(), "OpenSubtitles search complete");
            return Ok(candidates);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("Invalid API key");
                Err(ProviderError::InvalidApiKey)
            }
            StatusCode::NOT_ACCEPTABLE => {
                debug!("No subtitles found");
                Ok(Vec::new())
            }
            _ => Err(status_error(status, response).await),
        }
    }

    async fn download(&mut self, file_id: u64) -> Result<Vec<u8>, ProviderError> {
        if self.quota.is_exhausted() {
            error!("Daily download limit reached");
            return Err(ProviderError::QuotaExhausted);
        }

        if self.session.is_none() {
            self.login().await?;
        }

        let link = match self.request_download_link(file_id).await {
            Err(ProviderError::Unauthorized) => {
                warn!("Invalid token - logging in again");
                self.session = None;
                self.login().await?;
                self.request_download_link(file_id).await?
            }
            other => other?,
        };

        let content = self.fetch_file(&link).await?;
        debug!(
            file_id,
            bytes = content.len(),
            remaining = ?self.quota.remaining(),
            "Subtitle downloaded"
        );
        Ok(content)
    }

    fn quota(&self) -> DownloadQuota {
        self.quota
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Transient("request timed out".to_string())
    } else {
        ProviderError::Transient(e.to_string())
    }
}

async fn status_error(status: StatusCode, response: Response) -> ProviderError {
    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(200).collect();
    if status.is_server_error() {
        ProviderError::Transient(format!("HTTP {}: {}", status, message))
    } else {
        ProviderError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}

/// Parse a `Retry-After` value: delay seconds or an HTTP date.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let wait = date.with_timezone(&Utc) - Utc::now();
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}

/// Map raw results to candidates, dropping those without a usable
/// language or file.
fn into_candidates(results: Vec<SubtitleResult>) -> Vec<SubtitleCandidate> {
    results
        .into_iter()
        .filter_map(|result| {
            let attrs = result.attributes;
            let Some(language) = attrs.language.as_deref().and_then(LanguageCode::parse) else {
                debug!("Skipping result without language");
                return None;
            };
            let Some(file) = attrs.files.first() else {
                debug!(language = %language, "Skipping result without files");
                return None;
            };

            Some(SubtitleCandidate {
                file_id: file.file_id,
                language,
                rating: attrs.ratings.unwrap_or(0.0),
                download_count: attrs.download_count.unwrap_or(0),
                release: attrs.release.unwrap_or_else(|| "Unknown".to_string()),
                uploader: attrs
                    .uploader
                    .and_then(|u| u.name)
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
        })
        .collect()
}

// OpenSubtitles API request/response types

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct DownloadRequest {
    file_id: u64,
}

#[derive(Debug, Deserialize)]
struct DownloadLinkResponse {
    link: Option<String>,
    remaining: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SubtitleResult>,
}

#[derive(Debug, Deserialize)]
struct SubtitleResult {
    attributes: SubtitleAttributes,
}

#[derive(Debug, Deserialize)]
struct SubtitleAttributes {
    language: Option<String>,
    ratings: Option<f64>,
    download_count: Option<u64>,
    release: Option<String>,
    uploader: Option<Uploader>,
    #[serde(default)]
    files: Vec<SubtitleFile>,
}

#[derive(Debug, Deserialize)]
struct Uploader {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubtitleFile {
    file_id: u64,
}
