//! Mock media library for testing.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::media::{
    LibraryError, LibrarySection, MediaItem, MediaLibrary, MediaType, SectionKind,
};

/// In-memory MediaLibrary.
///
/// Sections are returned in insertion order. Listing an unknown library
/// fails with `LibraryError::NotFound`.
#[derive(Debug, Default)]
pub struct MockMediaLibrary {
    sections: Vec<LibrarySection>,
    items: HashMap<String, Vec<MediaItem>>,
}

impl MockMediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library section holding `items`.
    pub fn add_section(&mut self, title: &str, kind: SectionKind, items: Vec<MediaItem>) {
        self.sections.push(LibrarySection {
            key: (self.sections.len() + 1).to_string(),
            title: title.to_string(),
            kind,
        });
        self.items.insert(title.to_string(), items);
    }

    /// Builder form of [`add_section`](Self::add_section).
    pub fn with_section(mut self, title: &str, kind: SectionKind, items: Vec<MediaItem>) -> Self {
        self.add_section(title, kind, items);
        self
    }
}

#[async_trait]
impl MediaLibrary for MockMediaLibrary {
    fn name(&self) -> &str {
        "mock"
    }

    async fn sections(&self) -> Result<Vec<LibrarySection>, LibraryError> {
        Ok(self.sections.clone())
    }

    async fn list_items(
        &self,
        library_name: &str,
        filter: Option<MediaType>,
    ) -> Result<Vec<MediaItem>, LibraryError> {
        let items = self
            .items
            .get(library_name)
            .ok_or_else(|| LibraryError::NotFound(library_name.to_string()))?;

        Ok(items
            .iter()
            .filter(|item| filter.map_or(true, |f| item.media_type() == f))
            .cloned()
            .collect())
    }
}
