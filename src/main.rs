//! Tile Stitcher - Download a deep-zoom artwork image as a single file.
//!
//! This binary parses the configuration, wires the HTTP fetcher and the file
//! sink together and runs the stitcher.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tile_stitcher::{
    create_http_client, Config, FileSink, HttpFetcher, StitchError, StitchReport, Stitcher,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate().map_err(StitchError::Config) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let client = match create_http_client(config.request_timeout(), &config.user_agent) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stitcher = Stitcher::new(HttpFetcher::new(client), FileSink, config.context());

    match stitcher.run().await {
        Ok(report) => {
            print_summary(&report);
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log one line per figure and a final tally.
fn print_summary(report: &StitchReport) {
    info!("");
    info!("Artwork: {}", report.slug);
    for outcome in &report.figures {
        match &outcome.result {
            Ok(saved) if saved.skipped.is_empty() => {
                info!(
                    "  ✓ figure {}: {} ({}x{}, zoom level {})",
                    outcome.index,
                    saved.path.display(),
                    saved.width,
                    saved.height,
                    saved.zoom_level
                );
            }
            Ok(saved) => {
                warn!(
                    "  ! figure {}: {} ({}x{}, zoom level {}, {} tile(s) missing)",
                    outcome.index,
                    saved.path.display(),
                    saved.width,
                    saved.height,
                    saved.zoom_level,
                    saved.skipped.len()
                );
            }
            Err(e) => {
                error!("  ✗ figure {}: {}", outcome.index, e);
            }
        }
    }

    let saved = report.saved().count();
    info!("{} of {} figure(s) saved", saved, report.figures.len());
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tile_stitcher=debug"
    } else {
        "tile_stitcher=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
