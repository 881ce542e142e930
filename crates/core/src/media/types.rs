//! Types describing library content.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Movie or episode, used for filtering and reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Episode,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Episode => write!(f, "episode"),
        }
    }
}

/// Kind of a media item with its kind-specific fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Episode {
        /// Title of the show this episode belongs to.
        series_title: String,
        season: u32,
        episode: u32,
    },
}

impl MediaKind {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaKind::Movie => MediaType::Movie,
            MediaKind::Episode { .. } => MediaType::Episode,
        }
    }
}

/// External catalog identifier attached to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalId {
    /// IMDB id, numeric part only (`tt0133093` -> `0133093`).
    Imdb(String),
    /// TMDB id.
    Tmdb(String),
}

impl ExternalId {
    /// Parse a library guid such as `imdb://tt0133093` or `tmdb://603`.
    ///
    /// Returns `None` for other schemes and for empty ids.
    pub fn parse(guid: &str) -> Option<Self> {
        if let Some(rest) = guid.strip_prefix("imdb://") {
            let id = rest.strip_prefix("tt").unwrap_or(rest);
            return (!id.is_empty()).then(|| ExternalId::Imdb(id.to_string()));
        }
        if let Some(id) = guid.strip_prefix("tmdb://") {
            return (!id.is_empty()).then(|| ExternalId::Tmdb(id.to_string()));
        }
        None
    }
}

/// A subtitle stream the library already knows about.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubtitleStream {
    /// Raw language tag (two- or three-letter), absent when unlabeled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub forced: bool,
}

impl SubtitleStream {
    pub fn labeled(language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            forced: false,
        }
    }

    pub fn unlabeled() -> Self {
        Self::default()
    }
}

/// On-disk location of the media file as reported by the library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A movie or episode from the library. Immutable while it is processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaItem {
    /// Library-assigned identifier.
    pub id: String,
    /// Movie title, or episode title for episodes.
    pub title: String,
    pub kind: MediaKind,
    /// Raw external ids (`imdb://tt..`, `tmdb://..`, ...).
    #[serde(default)]
    pub guids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<MediaFile>,
    #[serde(default)]
    pub subtitle_streams: Vec<SubtitleStream>,
}

impl MediaItem {
    pub fn media_type(&self) -> MediaType {
        self.kind.media_type()
    }

    /// Name used in logs and reports.
    ///
    /// Episodes render as `Show - S01E02 - Title`.
    pub fn display_name(&self) -> String {
        match &self.kind {
            MediaKind::Movie => self.title.clone(),
            MediaKind::Episode {
                series_title,
                season,
                episode,
            } => format!(
                "{} - S{:02}E{:02} - {}",
                series_title, season, episode, self.title
            ),
        }
    }

    /// Title to search for when no external id is available.
    pub fn search_title(&self) -> &str {
        match &self.kind {
            MediaKind::Movie => &self.title,
            MediaKind::Episode { series_title, .. } => series_title,
        }
    }

    /// First IMDB or TMDB id found in the guid list, in list order.
    pub fn external_id(&self) -> Option<ExternalId> {
        self.guids.iter().find_map(|g| ExternalId::parse(g))
    }
}

/// Kind of a library section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Movie,
    Show,
    Other,
}

impl SectionKind {
    /// Whether the section holds video content subtitles apply to.
    pub fn is_video(&self) -> bool {
        matches!(self, SectionKind::Movie | SectionKind::Show)
    }

    /// The item type this section yields.
    pub fn item_type(&self) -> Option<MediaType> {
        match self {
            SectionKind::Movie => Some(MediaType::Movie),
            SectionKind::Show => Some(MediaType::Episode),
            SectionKind::Other => None,
        }
    }
}

/// A library section (e.g. "Movies", "TV Shows").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibrarySection {
    pub key: String,
    pub title: String,
    pub kind: SectionKind,
}
