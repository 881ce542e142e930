//! Plex Media Server library adapter.
//!
//! Read-only: lists sections, items and the subtitle streams Plex knows
//! about. Listings do not include stream details, so each item costs one
//! extra metadata request.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PlexConfig;

use super::types::{
    LibrarySection, MediaFile, MediaItem, MediaKind, MediaType, SectionKind, SubtitleStream,
};
use super::{LibraryError, MediaLibrary};

/// Plex stream type for subtitles.
const SUBTITLE_STREAM_TYPE: u32 = 3;

/// Plex library client.
pub struct PlexLibrary {
    client: Client,
    base_url: String,
    token: String,
}

impl PlexLibrary {
    /// Create a new Plex client.
    pub fn new(config: &PlexConfig) -> Result<Self, LibraryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LibraryError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Plex request");

        let response = self
            .client
            .get(&url)
            .header("X-Plex-Token", &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LibraryError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| LibraryError::Parse(format!("{}: {}", path, e)))
    }

    async fn find_section(&self, library_name: &str) -> Result<LibrarySection, LibraryError> {
        self.sections()
            .await?
            .into_iter()
            .find(|s| s.title == library_name)
            .ok_or_else(|| LibraryError::NotFound(library_name.to_string()))
    }

    async fn subtitle_streams(&self, rating_key: &str) -> Result<Vec<SubtitleStream>, LibraryError> {
        let path = format!("/library/metadata/{}", urlencoding::encode(rating_key));
        let response: PlexResponse<PlexMetadataContainer> = self.get_json(&path, &[]).await?;

        Ok(response
            .media_container
            .metadata
            .into_iter()
            .next()
            .map(|m| collect_subtitle_streams(&m))
            .unwrap_or_default())
    }
}

#[async_trait]
impl MediaLibrary for PlexLibrary {
    fn name(&self) -> &str {
        "plex"
    }

    async fn sections(&self) -> Result<Vec<LibrarySection>, LibraryError> {
        let response: PlexResponse<PlexDirectoryContainer> =
            self.get_json("/library/sections", &[]).await?;

        Ok(response
            .media_container
            .directory
            .into_iter()
            .map(|d| LibrarySection {
                kind: section_kind(&d.section_type),
                key: d.key,
                title: d.title,
            })
            .collect())
    }

    async fn list_items(
        &self,
        library_name: &str,
        filter: Option<MediaType>,
    ) -> Result<Vec<MediaItem>, LibraryError> {
        let section = self.find_section(library_name).await?;

        let Some(item_type) = section.kind.item_type() else {
            debug!(library = library_name, "Skipping non-video library");
            return Ok(Vec::new());
        };
        if filter.is_some_and(|f| f != item_type) {
            return Ok(Vec::new());
        }

        let plex_type = match item_type {
            MediaType::Movie => "1",
            MediaType::Episode => "4",
        };
        let path = format!("/library/sections/{}/all", urlencoding::encode(&section.key));
        let response: PlexResponse<PlexMetadataContainer> = self
            .get_json(&path, &[("type", plex_type), ("includeGuids", "1")])
            .await?;

        let mut items = Vec::with_capacity(response.media_container.metadata.len());
        for metadata in response.media_container.metadata {
            // Without stream details the gap is unknown, so the item is left out
            let streams = match self.subtitle_streams(&metadata.rating_key).await {
                Ok(streams) => streams,
                Err(e) => {
                    warn!("Skipping {}: failed to read subtitle streams: {}", metadata.title, e);
                    continue;
                }
            };
            if let Some(item) = to_media_item(metadata, item_type, streams) {
                items.push(item);
            }
        }

        debug!(library = library_name, items = items.len(), "Listed Plex items");
        Ok(items)
    }
}

fn section_kind(section_type: &str) -> SectionKind {
    match section_type {
        "movie" => SectionKind::Movie,
        "show" => SectionKind::Show,
        _ => SectionKind::Other,
    }
}

fn collect_subtitle_streams(metadata: &PlexMetadata) -> Vec<SubtitleStream> {
    metadata
        .media
        .iter()
        .flat_map(|m| m.parts.iter())
        .flat_map(|p| p.streams.iter())
        .filter(|s| s.stream_type == SUBTITLE_STREAM_TYPE)
        .map(|s| SubtitleStream {
            language: s.language_code.clone().filter(|l| !l.is_empty()),
            forced: s.forced,
        })
        .collect()
}

/// Convert a Plex metadata entry. Episodes without season/episode
/// numbers are dropped.
fn to_media_item(
    metadata: PlexMetadata,
    item_type: MediaType,
    subtitle_streams: Vec<SubtitleStream>,
) -> Option<MediaItem> {
    let kind = match item_type {
        MediaType::Movie => MediaKind::Movie,
        MediaType::Episode => MediaKind::Episode {
            series_title: metadata.grandparent_title.clone().unwrap_or_default(),
            season: metadata.parent_index?,
            episode: metadata.index?,
        },
    };

    let file = metadata
        .media
        .first()
        .and_then(|m| m.parts.first())
        .and_then(|p| {
            p.file.as_ref().map(|f| MediaFile {
                path: PathBuf::from(f),
                size: p.size,
            })
        });

    Some(MediaItem {
        id: metadata.rating_key,
        title: metadata.title,
        kind,
        guids: metadata.guids.into_iter().map(|g| g.id).collect(),
        file,
        subtitle_streams,
    })
}

// Plex API response types

#[derive(Debug, Deserialize)]
struct PlexResponse<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Deserialize)]
struct PlexDirectoryContainer {
    #[serde(rename = "Directory", default)]
    directory: Vec<PlexDirectory>,
}

#[derive(Debug, Deserialize)]
struct PlexDirectory {
    key: String,
    title: String,
    #[serde(rename = "type")]
    section_type: String,
}

#[derive(Debug, Deserialize)]
struct PlexMetadataContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlexMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlexMetadata {
    rating_key: String,
    title: String,
    grandparent_title: Option<String>,
    parent_index: Option<u32>,
    index: Option<u32>,
    #[serde(rename = "Guid", default)]
    guids: Vec<PlexGuid>,
    #[serde(rename = "Media", default)]
    media: Vec<PlexMedia>,
}

#[derive(Debug, Deserialize)]
struct PlexGuid {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PlexMedia {
    #[serde(rename = "Part", default)]
    parts: Vec<PlexPart>,
}

#[derive(Debug, Deserialize)]
struct PlexPart {
    file: Option<String>,
    size: Option<u64>,
    #[serde(rename = "Stream", default)]
    streams: Vec<PlexStream>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlexStream {
    stream_type: u32,
    language_code: Option<String>,
    #[serde(default)]
    forced: bool,
}
