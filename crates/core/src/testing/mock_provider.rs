//! Mock subtitle provider for testing.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::provider::{
    DownloadQuota, ProviderError, SearchCriteria, SubtitleCandidate, SubtitleProvider,
};

/// Search handler producing results from the criteria.
type SearchHandler =
    Box<dyn Fn(&SearchCriteria) -> Result<Vec<SubtitleCandidate>, ProviderError> + Send + Sync>;

/// Mock implementation of the SubtitleProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results, or compute them per search
/// - Fail the next search, or the next download of a given file id
/// - Track a download quota that each success decrements
/// - Record searches and downloads for assertions
///
/// # Example
///
/// ```rust,ignore
/// use subfetch_core::testing::{fixtures, MockSubtitleProvider};
///
/// let mut provider = MockSubtitleProvider::new();
/// provider.set_results(vec![fixtures::candidate(1, "es", 9.0, 200)]);
///
/// let results = provider.search(&criteria).await?;
/// assert_eq!(provider.searches().len(), 1);
/// ```
pub struct MockSubtitleProvider {
    results: Vec<SubtitleCandidate>,
    search_handler: Option<SearchHandler>,
    next_search_error: Option<ProviderError>,
    download_errors: HashMap<u64, ProviderError>,
    content: Vec<u8>,
    quota: DownloadQuota,
    searches: Vec<SearchCriteria>,
    downloads: Vec<u64>,
}

impl std::fmt::Debug for MockSubtitleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSubtitleProvider")
            .field("results", &self.results.len())
            .field("search_handler", &self.search_handler.is_some())
            .field("quota", &self.quota)
            .field("searches", &self.searches.len())
            .field("downloads", &self.downloads)
            .finish()
    }
}

impl Default for MockSubtitleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubtitleProvider {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            search_handler: None,
            next_search_error: None,
            download_errors: HashMap::new(),
            content: b"1\n00:00:01,000 --> 00:00:02,000\nHello\n".to_vec(),
            quota: DownloadQuota::Unknown,
            searches: Vec::new(),
            downloads: Vec::new(),
        }
    }

    /// Results returned by every search (unless a handler is set).
    pub fn set_results(&mut self, results: Vec<SubtitleCandidate>) {
        self.results = results;
    }

    /// Compute results from the search criteria.
    pub fn set_search_handler<F>(&mut self, handler: F)
    where
        F: Fn(&SearchCriteria) -> Result<Vec<SubtitleCandidate>, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        self.search_handler = Some(Box::new(handler));
    }

    /// Fail the next search with `error`.
    pub fn fail_next_search(&mut self, error: ProviderError) {
        self.next_search_error = Some(error);
    }

    /// Fail the next download of `file_id` with `error`.
    pub fn fail_download(&mut self, file_id: u64, error: ProviderError) {
        self.download_errors.insert(file_id, error);
    }

    /// Bytes returned by successful downloads.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    pub fn set_quota(&mut self, quota: DownloadQuota) {
        self.quota = quota;
    }

    /// Criteria of every search, in order.
    pub fn searches(&self) -> &[SearchCriteria] {
        &self.searches
    }

    /// File ids of every download attempt, in order.
    pub fn downloads(&self) -> &[u64] {
        &self.downloads
    }
}

#[async_trait]
impl SubtitleProvider for MockSubtitleProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(
        &mut self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SubtitleCandidate>, ProviderError> {
        self.searches.push(criteria.clone());

        if let Some(error) = self.next_search_error.take() {
            return Err(error);
        }
        if let Some(handler) = &self.search_handler {
            return handler(criteria);
        }
        Ok(self.results.clone())
    }

    async fn download(&mut self, file_id: u64) -> Result<Vec<u8>, ProviderError> {
        if self.quota.is_exhausted() {
            return Err(ProviderError::QuotaExhausted);
        }

        self.downloads.push(file_id);
        if let Some(error) = self.download_errors.remove(&file_id) {
            return Err(error);
        }

        if let DownloadQuota::Remaining(remaining) = self.quota {
            self.quota = DownloadQuota::Remaining(remaining.saturating_sub(1));
        }
        Ok(self.content.clone())
    }

    fn quota(&self) -> DownloadQuota {
        self.quota
    }
}
