//! Media library boundary.
//!
//! The library is a read-only collaborator: it enumerates titles and
//! episodes together with the subtitle streams it already knows about.
//! `PlexLibrary` talks to a Plex Media Server; tests use
//! `testing::MockMediaLibrary`.

mod plex;
mod types;

pub use plex::PlexLibrary;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading from a media library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The requested library does not exist.
    #[error("Library not found: {0}")]
    NotFound(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error.
    #[error("Library API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Read-only access to a media library.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// List every library section.
    async fn sections(&self) -> Result<Vec<LibrarySection>, LibraryError>;

    /// List the items of one library.
    ///
    /// Movie libraries yield movies and show libraries yield every episode.
    /// A `filter` that does not match the library kind yields nothing.
    async fn list_items(
        &self,
        library_name: &str,
        filter: Option<MediaType>,
    ) -> Result<Vec<MediaItem>, LibraryError>;
}
