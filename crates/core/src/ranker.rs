//! Candidate ranking.
//!
//! Candidates for a language are ordered by rating, then by download
//! count, both descending. Equal keys keep their original order, so the
//! first-seen candidate wins a tie.

use std::cmp::Ordering;

use crate::language::LanguageCode;
use crate::provider::SubtitleCandidate;

/// Order two candidates best-first.
fn compare(a: &SubtitleCandidate, b: &SubtitleCandidate) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| b.download_count.cmp(&a.download_count))
}

/// Candidates in `language`, best first.
pub fn rank<'a>(
    candidates: &'a [SubtitleCandidate],
    language: &LanguageCode,
) -> Vec<&'a SubtitleCandidate> {
    let mut matching: Vec<&SubtitleCandidate> = candidates
        .iter()
        .filter(|c| &c.language == language)
        .collect();
    // sort_by is stable
    matching.sort_by(|a, b| compare(a, b));
    matching
}

/// Pick the best candidate in `language`, or `None` if there is none.
pub fn select_best<'a>(
    candidates: &'a [SubtitleCandidate],
    language: &LanguageCode,
) -> Option<&'a SubtitleCandidate> {
    rank(candidates, language).into_iter().next()
}
