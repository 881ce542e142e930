//! Language code normalisation and subtitle gap detection.
//!
//! Every comparison between languages happens on normalised codes:
//! lowercase, with three-letter ISO 639-2 codes folded to their two-letter
//! form. Unknown three-letter codes are truncated to their first two
//! characters.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::media::MediaItem;

/// Three-letter codes with a two-letter form that is not a plain
/// truncation (plus the common set, for clarity).
const THREE_LETTER_CODES: &[(&str, &str)] = &[
    ("eng", "en"),
    ("spa", "es"),
    ("fra", "fr"),
    ("fre", "fr"),
    ("deu", "de"),
    ("ger", "de"),
    ("ita", "it"),
    ("por", "pt"),
    ("nld", "nl"),
    ("dut", "nl"),
    ("jpn", "ja"),
    ("zho", "zh"),
    ("chi", "zh"),
    ("kor", "ko"),
    ("swe", "sv"),
    ("dan", "da"),
    ("ell", "el"),
    ("gre", "el"),
    ("heb", "he"),
    ("pol", "pl"),
    ("ces", "cs"),
    ("cze", "cs"),
    ("ron", "ro"),
    ("rum", "ro"),
    ("tur", "tr"),
    ("ara", "ar"),
    ("fas", "fa"),
    ("per", "fa"),
    ("vie", "vi"),
    ("ukr", "uk"),
    ("srp", "sr"),
    ("hrv", "hr"),
    ("slk", "sk"),
    ("slo", "sk"),
    ("est", "et"),
];

/// Tags that mean "no language".
const UNDETERMINED: &[&str] = &["und", "unk", "zxx", "mis"];

/// A normalised language code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Normalise a raw language tag.
    ///
    /// Returns `None` for blank or undetermined tags. Applying `parse` to
    /// the result of `parse` yields the same code.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_lowercase();
        if code.is_empty() || UNDETERMINED.contains(&code.as_str()) {
            return None;
        }

        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            let two = THREE_LETTER_CODES
                .iter()
                .find(|(three, _)| *three == code)
                .map(|(_, two)| (*two).to_string())
                .unwrap_or_else(|| code[..2].to_string());
            return Some(Self(two));
        }

        Some(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a list of raw tags, dropping blank ones and duplicates.
pub fn parse_languages<S: AsRef<str>>(raw: &[S]) -> BTreeSet<LanguageCode> {
    raw.iter()
        .filter_map(|l| LanguageCode::parse(l.as_ref()))
        .collect()
}

/// Computes which target languages an item is missing.
#[derive(Debug, Clone)]
pub struct LanguageGapAnalyzer {
    default_language: LanguageCode,
}

impl LanguageGapAnalyzer {
    /// `default_language` is assumed for unlabeled subtitle streams.
    pub fn new(default_language: LanguageCode) -> Self {
        Self { default_language }
    }

    pub fn default_language(&self) -> &LanguageCode {
        &self.default_language
    }

    /// Languages of the subtitle streams the library reports for `item`.
    pub fn existing_languages(&self, item: &MediaItem) -> BTreeSet<LanguageCode> {
        item.subtitle_streams
            .iter()
            .map(|stream| {
                stream
                    .language
                    .as_deref()
                    .and_then(LanguageCode::parse)
                    .unwrap_or_else(|| self.default_language.clone())
            })
            .collect()
    }

    /// `targets` minus the item's existing languages.
    pub fn missing_languages(
        &self,
        item: &MediaItem,
        targets: &BTreeSet<LanguageCode>,
    ) -> BTreeSet<LanguageCode> {
        let existing = self.existing_languages(item);
        targets.difference(&existing).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaKind, SubtitleStream};

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    fn item_with_streams(streams: Vec<SubtitleStream>) -> MediaItem {
        MediaItem {
            id: "1".to_string(),
            title: "Movie".to_string(),
            kind: MediaKind::Movie,
            guids: vec![],
            file: None,
            subtitle_streams: streams,
        }
    }

    fn analyzer() -> LanguageGapAnalyzer {
        LanguageGapAnalyzer::new(lang("en"))
    }

    #[test]
    fn test_parse_common_three_letter_codes() {
        for (three, two) in [
            ("eng", "en"),
            ("spa", "es"),
            ("fra", "fr"),
            ("deu", "de"),
            ("ita", "it"),
            ("por", "pt"),
        ] {
            assert_eq!(lang(three).as_str(), two, "{} should map to {}", three, two);
        }
    }

    #[test]
    fn test_parse_unknown_three_letter_code_truncates() {
        assert_eq!(lang("fin").as_str(), "fi");
        assert_eq!(lang("hun").as_str(), "hu");
    }

    #[test]
    fn test_parse_lowercases_and_trims() {
        assert_eq!(lang(" EN ").as_str(), "en");
        assert_eq!(lang("ENG").as_str(), "en");
        assert_eq!(lang("pt-BR").as_str(), "pt-br");
    }

    #[test]
    fn test_parse_blank_and_undetermined() {
        assert!(LanguageCode::parse("").is_none());
        assert!(LanguageCode::parse("   ").is_none());
        assert!(LanguageCode::parse("und").is_none());
    }

    #[test]
    fn test_parse_is_idempotent() {
        for raw in ["eng", "EN", "ger", "fin", "pt-BR", "es", "zho", "x"] {
            let once = lang(raw);
            let twice = lang(once.as_str());
            assert_eq!(once, twice, "normalising {} twice changed it", raw);
        }
    }

    #[test]
    fn test_existing_languages_normalizes_and_dedups() {
        let item = item_with_streams(vec![
            SubtitleStream::labeled("eng"),
            SubtitleStream::labeled("en"),
            SubtitleStream::labeled("spa"),
        ]);
        let existing = analyzer().existing_languages(&item);
        assert_eq!(existing, parse_languages(&["en", "es"]));
    }

    #[test]
    fn test_unlabeled_stream_counts_as_default_language() {
        let item = item_with_streams(vec![SubtitleStream::unlabeled()]);
        let existing = analyzer().existing_languages(&item);
        assert_eq!(existing, parse_languages(&["en"]));

        let analyzer = LanguageGapAnalyzer::new(lang("fr"));
        assert_eq!(analyzer.existing_languages(&item), parse_languages(&["fr"]));
    }

    #[test]
    fn test_missing_languages_is_set_difference() {
        let item = item_with_streams(vec![SubtitleStream::labeled("eng")]);
        let targets = parse_languages(&["en", "es"]);

        let missing = analyzer().missing_languages(&item, &targets);
        assert_eq!(missing, parse_languages(&["es"]));
    }

    #[test]
    fn test_missing_languages_nothing_missing() {
        let item = item_with_streams(vec![
            SubtitleStream::labeled("ger"),
            SubtitleStream::labeled("fre"),
        ]);
        let targets = parse_languages(&["de", "fr"]);
        assert!(analyzer().missing_languages(&item, &targets).is_empty());
    }

    #[test]
    fn test_missing_languages_without_streams_is_all_targets() {
        let item = item_with_streams(vec![]);
        let targets = parse_languages(&["en", "es", "it"]);
        assert_eq!(analyzer().missing_languages(&item, &targets), targets);
    }

    #[test]
    fn test_parse_languages_drops_blank_and_duplicates() {
        let parsed = parse_languages(&["en", "eng", "", "es"]);
        assert_eq!(parsed.len(), 2);
    }
}
