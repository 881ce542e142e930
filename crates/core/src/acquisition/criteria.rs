//! Search criteria for a media item.

use std::collections::BTreeSet;

use crate::language::LanguageCode;
use crate::media::{ExternalId, MediaItem, MediaKind};
use crate::provider::SearchCriteria;

/// Build one search covering every missing language of `item`.
///
/// An IMDB or TMDB id is preferred; the title (series title for episodes)
/// is only used as a query when neither is present.
pub fn build_criteria(
    item: &MediaItem,
    languages: &BTreeSet<LanguageCode>,
    file_size: Option<u64>,
    movie_hash: Option<String>,
) -> SearchCriteria {
    let mut criteria = SearchCriteria {
        file_size,
        movie_hash,
        languages: languages.iter().cloned().collect(),
        ..Default::default()
    };

    match item.external_id() {
        Some(ExternalId::Imdb(id)) => criteria.imdb_id = Some(id),
        Some(ExternalId::Tmdb(id)) => criteria.tmdb_id = Some(id),
        None => criteria.query = Some(item.search_title().to_string()),
    }

    if let MediaKind::Episode {
        season, episode, ..
    } = &item.kind
    {
        criteria.season_number = Some(*season);
        criteria.episode_number = Some(*episode);
    }

    criteria
}
