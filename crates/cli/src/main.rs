use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subfetch_core::{
    load_config, validate_config, AcquisitionOrchestrator, AcquisitionSettings, Config,
    DownloadBudget, DownloadReport, LibraryStats, MediaLibrary, OpenSubtitlesClient, PlexLibrary,
    SanitizedConfig, SubtitleProvider,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("subfetch v{}", VERSION);

    // Determine config path
    let config_path = std::env::var("SUBFETCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );

    let settings = AcquisitionSettings::from_config(
        &config.acquisition,
        config.opensubtitles.compute_file_hash,
    )
    .context("Invalid acquisition settings")?;
    info!(
        "Target languages: {}",
        settings
            .targets
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Connect to the media library
    let library = PlexLibrary::new(&config.plex).context("Failed to create Plex client")?;
    let sections = library
        .sections()
        .await
        .with_context(|| format!("Failed to connect to Plex at {}", config.plex.url))?;
    info!("Connected to Plex ({} libraries)", sections.len());

    // Log in to the subtitle provider
    let mut provider = OpenSubtitlesClient::new(&config.opensubtitles)
        .context("Failed to create OpenSubtitles client")?;
    provider.login().await.context("Failed to log in to OpenSubtitles")?;

    let mut orchestrator = AcquisitionOrchestrator::new(provider, settings);
    let mut budget = DownloadBudget::new(config.acquisition.max_downloads);

    let outcome = until_shutdown(
        acquire(&mut orchestrator, &library, &config, &mut budget),
        signal::ctrl_c(),
    )
    .await;

    let stats = match outcome {
        Some(Ok(stats)) => Some(stats),
        Some(Err(e)) => {
            save_report(orchestrator.report(), &config.acquisition.report_path).await;
            return Err(e);
        }
        None => {
            warn!("Interrupted, saving partial report");
            None
        }
    };

    save_report(orchestrator.report(), &config.acquisition.report_path).await;

    if let Some(stats) = stats {
        log_totals(&stats);
    }
    let summary = orchestrator.report().summary();
    info!(
        "Report: {} downloaded, {} failed",
        summary.succeeded, summary.failed
    );
    if let Some(quota) = orchestrator.provider().quota().remaining() {
        info!("Remaining downloads today: {}", quota);
    }

    Ok(())
}

/// Race `run` against `shutdown`. `None` means the run was interrupted
/// and dropped; whatever it recorded so far is still owned by the caller.
async fn until_shutdown<F, S>(run: F, shutdown: S) -> Option<F::Output>
where
    F: Future,
    S: Future,
{
    tokio::select! {
        result = run => Some(result),
        _ = shutdown => None,
    }
}

/// Run the configured driver.
async fn acquire<P: SubtitleProvider>(
    orchestrator: &mut AcquisitionOrchestrator<P>,
    library: &PlexLibrary,
    config: &Config,
    budget: &mut DownloadBudget,
) -> Result<LibraryStats> {
    let filter = config.acquisition.media_type;
    let stats = match config.acquisition.library.as_deref() {
        Some(name) => orchestrator
            .process_library(library, name, filter, budget)
            .await
            .with_context(|| format!("Failed to process library '{}'", name))?,
        None => orchestrator
            .process_all_libraries(library, filter, budget)
            .await
            .context("Failed to process libraries")?,
    };
    Ok(stats)
}

async fn save_report(report: &DownloadReport, path: &Path) {
    let json = match report.to_json_pretty() {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize report: {}", e);
            return;
        }
    };

    match tokio::fs::write(path, json).await {
        Ok(()) => info!("Report saved to: {}", path.display()),
        Err(e) => error!("Failed to write report to {}: {}", path.display(), e),
    }
}

fn log_totals(stats: &LibraryStats) {
    info!("Totals:");
    info!("  Total items scanned: {}", stats.scanned);
    info!("  Items needing subtitles: {}", stats.needing_subtitles);
    info!("  Subtitles downloaded: {}", stats.downloaded);
    info!("  Items skipped: {}", stats.skipped);
    info!("  Errors: {}", stats.errored);
}
