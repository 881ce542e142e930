use super::{types::Config, ConfigError};

/// Lowest accepted spacing between OpenSubtitles calls.
pub const MIN_REQUEST_INTERVAL_MS: u64 = 1000;

/// Validate configuration
/// Currently validates:
/// - OpenSubtitles API key and credentials are present
/// - Plex token is present
/// - At least one target language, none blank
/// - Request spacing is at least one second
/// - Download budget is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let os = &config.opensubtitles;
    if os.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "opensubtitles.api_key is required".to_string(),
        ));
    }
    if os.username.trim().is_empty() || os.password.is_empty() {
        return Err(ConfigError::ValidationError(
            "opensubtitles.username and opensubtitles.password are required for downloads"
                .to_string(),
        ));
    }
    if os.min_request_interval_ms < MIN_REQUEST_INTERVAL_MS {
        return Err(ConfigError::ValidationError(format!(
            "opensubtitles.min_request_interval_ms must be at least {}",
            MIN_REQUEST_INTERVAL_MS
        )));
    }

    if config.plex.token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "plex.token is required".to_string(),
        ));
    }

    let acquisition = &config.acquisition;
    if acquisition.languages.is_empty() {
        return Err(ConfigError::ValidationError(
            "acquisition.languages cannot be empty".to_string(),
        ));
    }
    if acquisition.languages.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "acquisition.languages cannot contain blank entries".to_string(),
        ));
    }
    if acquisition.max_downloads == Some(0) {
        return Err(ConfigError::ValidationError(
            "acquisition.max_downloads cannot be 0".to_string(),
        ));
    }

    Ok(())
}
