pub mod acquisition;
pub mod config;
pub mod language;
pub mod media;
pub mod provider;
pub mod ranker;
pub mod testing;

pub use acquisition::{
    AcquisitionError, AcquisitionOrchestrator, AcquisitionSettings, DownloadBudget,
    DownloadRecord, DownloadReport, ItemOutcome, LibraryStats, ReportSummary,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use language::{LanguageCode, LanguageGapAnalyzer};
pub use media::{LibraryError, MediaItem, MediaLibrary, MediaType, PlexLibrary};
pub use provider::{
    DownloadQuota, OpenSubtitlesClient, ProviderError, RateLimiter, SearchCriteria,
    SubtitleCandidate, SubtitleProvider,
};
pub use ranker::select_best;
