//! Configuration management for Tile Stitcher.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `STITCH_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use tile_stitcher::config::Config;
//!
//! // Parse from command line and environment
//! let config = Config::parse();
//! config.validate()?;
//!
//! let context = config.context();
//! println!("Stitching {} into {}", context.page_url, context.output_dir.display());
//! ```
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with the `STITCH_` prefix:
//!
//! - `STITCH_URL` - Artwork page URL (required)
//! - `STITCH_OUTPUT_DIR` - Directory for output images (default: .)
//! - `STITCH_PROBE_LIMIT` - Number of zoom levels probed (default: 20)
//! - `STITCH_CONCURRENCY` - Tile requests in flight (default: 1)
//! - `STITCH_TIMEOUT` - Per-request timeout in seconds (default: 30)
//! - `STITCH_USER_AGENT` - User-Agent header sent with every request

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::stitch::StitchContext;
use crate::tile::{DEFAULT_CONCURRENCY, DEFAULT_PROBE_LIMIT};

// =============================================================================
// Default Values
// =============================================================================

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = concat!("tile-stitcher/", env!("CARGO_PKG_VERSION"));

/// Maximum accepted probe limit.
pub const MAX_PROBE_LIMIT: u32 = 64;

/// Maximum accepted number of tile requests in flight.
pub const MAX_CONCURRENCY: usize = 64;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tile Stitcher - Download a deep-zoom artwork image as a single file.
///
/// Reads the artwork page, finds the deepest available tile level of every
/// figure and stitches its tiles into `<slug>-<index>.<format>`.
#[derive(Parser, Debug, Clone)]
#[command(name = "tile-stitcher")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Artwork page URL.
    #[arg(env = "STITCH_URL")]
    pub url: String,

    /// Directory the stitched images are written to.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "STITCH_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    // =========================================================================
    // Download Configuration
    // =========================================================================
    /// Number of zoom levels probed for tile (0, 0).
    #[arg(long, default_value_t = DEFAULT_PROBE_LIMIT, env = "STITCH_PROBE_LIMIT")]
    pub probe_limit: u32,

    /// Maximum number of tile requests in flight.
    ///
    /// 1 downloads tiles sequentially.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, env = "STITCH_CONCURRENCY")]
    pub concurrency: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "STITCH_TIMEOUT")]
    pub timeout: u64,

    /// User-Agent header sent with every request.
    #[arg(long, default_value = DEFAULT_USER_AGENT, env = "STITCH_USER_AGENT")]
    pub user_agent: String,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.url)
            .map_err(|e| format!("Invalid page URL '{}': {}", self.url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "Page URL must use http or https, got '{}'",
                url.scheme()
            ));
        }

        if self.probe_limit == 0 || self.probe_limit > MAX_PROBE_LIMIT {
            return Err(format!("probe_limit must be between 1 and {}", MAX_PROBE_LIMIT));
        }

        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(format!("concurrency must be between 1 and {}", MAX_CONCURRENCY));
        }

        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }

        Ok(())
    }

    /// Get the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Build the context handed to the stitcher.
    pub fn context(&self) -> StitchContext {
        StitchContext {
            page_url: self.url.clone(),
            output_dir: self.output_dir.clone(),
            probe_limit: self.probe_limit,
            concurrency: self.concurrency,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
