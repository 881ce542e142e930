//! Acquisition orchestrator implementation.
//!
//! Strictly sequential: one item at a time, one language at a time, one
//! provider request in flight.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::language::{LanguageCode, LanguageGapAnalyzer};
use crate::media::{MediaItem, MediaLibrary, MediaType};
use crate::provider::{movie_hash, SubtitleProvider};
use crate::ranker::select_best;

use super::criteria::build_criteria;
use super::report::{DownloadRecord, DownloadReport};
use super::sidecar::{subtitle_exists, subtitle_path};
use super::types::{AcquisitionSettings, DownloadBudget, ItemOutcome, LibraryStats};
use super::AcquisitionError;

/// Drives items through gap detection, search, ranking and download.
pub struct AcquisitionOrchestrator<P: SubtitleProvider> {
    provider: P,
    analyzer: LanguageGapAnalyzer,
    settings: AcquisitionSettings,
    report: DownloadReport,
}

impl<P: SubtitleProvider> AcquisitionOrchestrator<P> {
    pub fn new(provider: P, settings: AcquisitionSettings) -> Self {
        Self {
            provider,
            analyzer: LanguageGapAnalyzer::new(settings.default_language.clone()),
            settings,
            report: DownloadReport::new(),
        }
    }

    pub fn settings(&self) -> &AcquisitionSettings {
        &self.settings
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Records collected so far.
    pub fn report(&self) -> &DownloadReport {
        &self.report
    }

    pub fn into_report(self) -> DownloadReport {
        self.report
    }

    /// Whether new downloads may still be initiated.
    fn can_download(&self, budget: &DownloadBudget) -> bool {
        !budget.is_exhausted() && !self.provider.quota().is_exhausted()
    }

    /// Acquire every missing language for one item.
    pub async fn process_item(
        &mut self,
        item: &MediaItem,
        budget: &mut DownloadBudget,
    ) -> ItemOutcome {
        let name = item.display_name();

        let Some(file) = item.file.as_ref() else {
            warn!("Could not get path for: {}", name);
            return ItemOutcome::Skipped;
        };
        let media_path = file.path.as_path();

        let metadata = match tokio::fs::metadata(media_path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => {
                warn!("File not found: {}", media_path.display());
                return ItemOutcome::Skipped;
            }
        };
        let file_size = file.size.unwrap_or(metadata.len());

        let missing = self.missing_on_disk(item, media_path).await;
        if missing.is_empty() {
            debug!("{} already has all subtitles on disk", name);
            return ItemOutcome::UpToDate;
        }

        info!("Downloading subtitles for: {}", name);
        info!("  Missing languages: {}", join(&missing));

        let hash = if self.settings.compute_file_hash {
            match movie_hash(media_path).await {
                Ok(hash) => hash,
                Err(e) => {
                    warn!("  Could not hash {}: {}", media_path.display(), e);
                    None
                }
            }
        } else {
            None
        };

        let criteria = build_criteria(item, &missing, Some(file_size), hash);
        let candidates = match self.provider.search(&criteria).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("  Search failed: {}", e);
                for language in &missing {
                    self.report.push(DownloadRecord::failure(
                        item,
                        language,
                        None,
                        format!("Search failed: {}", e),
                    ));
                }
                return ItemOutcome::Processed {
                    downloaded: 0,
                    errored: true,
                };
            }
        };

        if candidates.is_empty() {
            info!("  No subtitles found");
            for language in &missing {
                self.report.push(DownloadRecord::failure(
                    item,
                    language,
                    None,
                    "No subtitles found",
                ));
            }
            return ItemOutcome::Processed {
                downloaded: 0,
                errored: false,
            };
        }

        info!("  Found {} subtitle option(s)", candidates.len());

        let mut downloaded = 0;
        let mut errored = false;

        for language in &missing {
            if !self.can_download(budget) {
                info!("  Download limit reached, not fetching remaining languages");
                break;
            }

            let Some(best) = select_best(&candidates, language) else {
                info!("  No {} subtitles found", language);
                self.report.push(DownloadRecord::failure(
                    item,
                    language,
                    None,
                    format!("No {} subtitles found", language),
                ));
                continue;
            };

            info!(
                "  Downloading {} subtitle (Rating: {:.1}, Downloads: {})...",
                language, best.rating, best.download_count
            );

            let content = match self.provider.download(best.file_id).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("  Failed to download {} subtitle: {}", language, e);
                    self.report.push(DownloadRecord::failure(
                        item,
                        language,
                        Some(best),
                        e.to_string(),
                    ));
                    errored = true;
                    continue;
                }
            };

            let target = subtitle_path(media_path, language, false);
            if let Err(e) = tokio::fs::write(&target, &content).await {
                error!("  Failed to save subtitle {}: {}", target.display(), e);
                self.report.push(DownloadRecord::failure(
                    item,
                    language,
                    Some(best),
                    format!("Failed to save subtitle: {}", e),
                ));
                errored = true;
                continue;
            }

            info!("  Saved: {}", target.display());
            self.report.push(DownloadRecord::success(item, best, target));
            budget.consume();
            downloaded += 1;
        }

        ItemOutcome::Processed {
            downloaded,
            errored,
        }
    }

    /// Metadata gap minus languages whose sidecar is already on disk.
    async fn missing_on_disk(
        &self,
        item: &MediaItem,
        media_path: &Path,
    ) -> BTreeSet<LanguageCode> {
        let mut missing = BTreeSet::new();
        for language in self
            .analyzer
            .missing_languages(item, &self.settings.targets)
        {
            if subtitle_exists(media_path, &language).await {
                debug!("  {} subtitle already on disk", language);
            } else {
                missing.insert(language);
            }
        }
        missing
    }

    /// Process every item of one library.
    pub async fn process_library(
        &mut self,
        library: &dyn MediaLibrary,
        library_name: &str,
        filter: Option<MediaType>,
        budget: &mut DownloadBudget,
    ) -> Result<LibraryStats, AcquisitionError> {
        info!("Processing library: {}", library_name);
        if let Some(remaining) = budget.remaining() {
            info!("Max downloads: {}", remaining);
        }

        let items = library.list_items(library_name, filter).await?;
        let total = items.len();
        info!("Found {} items to scan", total);

        let mut stats = LibraryStats {
            scanned: total as u32,
            ..Default::default()
        };

        for (i, item) in items.iter().enumerate() {
            if !self.can_download(budget) {
                let remaining = (total - i) as u32;
                stats.skipped += remaining;
                if budget.is_exhausted() {
                    info!("Reached download limit. Skipping remaining {} items.", remaining);
                } else {
                    info!("Download quota exhausted. Skipping remaining {} items.", remaining);
                }
                break;
            }

            let gap = self
                .analyzer
                .missing_languages(item, &self.settings.targets);
            if gap.is_empty() {
                debug!("[{}/{}] Skipping {} - has all subtitles", i + 1, total, item.title);
                continue;
            }

            stats.needing_subtitles += 1;
            info!("[{}/{}] Processing item...", i + 1, total);

            match self.process_item(item, budget).await {
                ItemOutcome::Skipped => stats.skipped += 1,
                ItemOutcome::UpToDate => {}
                ItemOutcome::Processed {
                    downloaded,
                    errored,
                } => {
                    stats.downloaded += downloaded;
                    if errored {
                        stats.errored += 1;
                    }
                }
            }
        }

        info!("Summary for {}:", library_name);
        info!("  Total items scanned: {}", stats.scanned);
        info!("  Items needing subtitles: {}", stats.needing_subtitles);
        info!("  Subtitles downloaded: {}", stats.downloaded);
        if stats.skipped > 0 {
            info!("  Items skipped: {}", stats.skipped);
        }
        info!("  Errors: {}", stats.errored);

        Ok(stats)
    }

    /// Process every movie and show library, carrying the budget forward.
    pub async fn process_all_libraries(
        &mut self,
        library: &dyn MediaLibrary,
        filter: Option<MediaType>,
        budget: &mut DownloadBudget,
    ) -> Result<LibraryStats, AcquisitionError> {
        let mut total = LibraryStats::default();

        for section in library.sections().await? {
            if !section.kind.is_video() {
                debug!("Ignoring non-video library '{}'", section.title);
                continue;
            }
            if !self.can_download(budget) {
                info!("Stopping before library '{}' - download limit reached", section.title);
                break;
            }

            total += self
                .process_library(library, &section.title, filter, budget)
                .await?;
        }

        Ok(total)
    }
}

fn join(languages: &BTreeSet<LanguageCode>) -> String {
    languages
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
