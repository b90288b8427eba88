//! # Tile Stitcher
//!
//! Downloads the deep-zoom tile pyramid of an artwork published on an
//! art-catalog page and stitches it into one raster image per figure.
//!
//! ## Features
//!
//! - **Metadata extraction**: Reads the figures' deep-zoom geometry from the JSON embedded in the page
//! - **Zoom discovery**: Probes tile `(0, 0)` level by level to find the deepest available tile set
//! - **Missing-tile tolerance**: Absent or corrupt tiles are left blank and reported, never fatal
//! - **Bounded concurrency**: Optional parallel tile downloads with identical output
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`io`] - `Fetcher` abstraction and the reqwest-backed HTTP fetcher
//! - [`metadata`] - Page payload extraction into figure descriptors
//! - [`tile`] - Grid geometry, zoom discovery and tile assembly
//! - [`sink`] - Persistence of assembled images
//! - [`stitch`] - Per-artwork orchestration
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tile_stitcher::{create_http_client, FileSink, HttpFetcher, StitchContext, Stitcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = create_http_client(Duration::from_secs(30), "tile-stitcher")?;
//!     let context = StitchContext::new("https://www.artsy.net/artwork/some-artwork", "out");
//!
//!     let stitcher = Stitcher::new(HttpFetcher::new(client), FileSink, context);
//!     let report = stitcher.run().await?;
//!
//!     for figure in report.saved() {
//!         println!("{} at {}x{}", figure.path.display(), figure.width, figure.height);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod metadata;
pub mod sink;
pub mod stitch;
pub mod tile;

// Re-export commonly used types
pub use config::Config;
pub use error::{AssembleError, ExtractError, FetchError, SinkError, StitchError};
pub use io::{create_http_client, Fetcher, HttpFetcher};
pub use metadata::{extract_artwork, parse_bootstrap_payload, Artwork, FigureDescriptor};
pub use sink::{output_filename, FileSink, ImageSink};
pub use stitch::{FigureOutcome, SavedFigure, StitchContext, StitchReport, Stitcher};
pub use tile::{
    discover_zoom_level, tile_url, AssembledFigure, SkipReason, SkippedTile, TileAssembler,
    TileCoord, TileGrid, DEFAULT_CONCURRENCY, DEFAULT_PROBE_LIMIT,
};
