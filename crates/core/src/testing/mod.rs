//! Testing utilities and mock implementations.
//!
//! Mocks for the provider and media-library seams, so the orchestrator can
//! be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use subfetch_core::testing::{fixtures, MockMediaLibrary, MockSubtitleProvider};
//!
//! let mut provider = MockSubtitleProvider::new();
//! provider.set_results(vec![fixtures::candidate(1, "es", 9.0, 200)]);
//!
//! let library = MockMediaLibrary::new().with_section(
//!     "Movies",
//!     SectionKind::Movie,
//!     vec![fixtures::movie("1", "Heat", Some(path))],
//! );
//! ```

mod mock_library;
mod mock_provider;

pub use mock_library::MockMediaLibrary;
pub use mock_provider::MockSubtitleProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::language::LanguageCode;
    use crate::media::{MediaFile, MediaItem, MediaKind, SubtitleStream};
    use crate::provider::SubtitleCandidate;

    /// Create a subtitle candidate.
    ///
    /// Panics on an unparseable language tag.
    pub fn candidate(file_id: u64, language: &str, rating: f64, download_count: u64) -> SubtitleCandidate {
        SubtitleCandidate {
            file_id,
            language: LanguageCode::parse(language).expect("fixture language"),
            rating,
            download_count,
            release: format!("Release.{}.1080p", file_id),
            uploader: "fixture".to_string(),
        }
    }

    /// Create a movie, optionally backed by a file.
    pub fn movie(id: &str, title: &str, path: Option<PathBuf>) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            title: title.to_string(),
            kind: MediaKind::Movie,
            guids: vec![],
            file: path.map(|path| MediaFile { path, size: None }),
            subtitle_streams: vec![],
        }
    }

    /// Create an episode, optionally backed by a file.
    pub fn episode(
        id: &str,
        series_title: &str,
        season: u32,
        episode: u32,
        path: Option<PathBuf>,
    ) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            title: format!("Episode {}", episode),
            kind: MediaKind::Episode {
                series_title: series_title.to_string(),
                season,
                episode,
            },
            guids: vec![],
            file: path.map(|path| MediaFile { path, size: None }),
            subtitle_streams: vec![],
        }
    }

    /// Add labeled subtitle streams to an item.
    pub fn with_streams(mut item: MediaItem, languages: &[&str]) -> MediaItem {
        item.subtitle_streams
            .extend(languages.iter().map(|l| SubtitleStream::labeled(l)));
        item
    }

    /// Write a small media file under `dir` and return its path.
    pub fn media_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; 1024]).expect("write fixture media file");
        path
    }
}
