//! Sidecar subtitle paths.

use std::path::{Path, PathBuf};

use crate::language::LanguageCode;

/// `<media path without extension>.<lang>[.forced].srt`
pub fn subtitle_path(media_path: &Path, language: &LanguageCode, forced: bool) -> PathBuf {
    let extension = if forced {
        format!("{}.forced.srt", language)
    } else {
        format!("{}.srt", language)
    };
    media_path.with_extension(extension)
}

/// Whether a non-forced sidecar for `language` is already on disk.
pub async fn subtitle_exists(media_path: &Path, language: &LanguageCode) -> bool {
    tokio::fs::try_exists(subtitle_path(media_path, language, false))
        .await
        .unwrap_or(false)
}
