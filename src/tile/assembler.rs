//! Tile assembler for rebuilding a full image from its deep-zoom tiles.
//!
//! The assembler orchestrates:
//! - Zoom-level discovery
//! - Grid download (sequential, or with bounded concurrency)
//! - Tile decoding and compositing onto the canvas
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        TileAssembler                         │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                      assemble()                        │  │
//! │  │  1. Probe zoom levels    3. Fetch every tile           │  │
//! │  │  2. Compute grid         4. Decode & paste, or skip    │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │              │                               │               │
//! │              ▼                               ▼               │
//! │     ┌─────────────────┐            ┌──────────────────┐      │
//! │     │     Fetcher     │            │  RgbImage canvas │      │
//! │     └─────────────────┘            └──────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Missing or undecodable tiles never abort assembly: their region stays
//! black and they are returned in [`AssembledFigure::skipped`].

use std::fmt;
use std::pin::pin;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use image::{imageops, RgbImage};
use tracing::{debug, info, warn};

use super::grid::{tile_url, TileCoord, TileGrid};
use super::zoom::{discover_zoom_level, DEFAULT_PROBE_LIMIT};
use crate::error::{AssembleError, FetchError};
use crate::io::Fetcher;
use crate::metadata::FigureDescriptor;

/// Default number of tile requests in flight (sequential).
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Largest canvas allocated for one figure, in bytes (RGB, 3 bytes per pixel).
pub const MAX_CANVAS_BYTES: u64 = 4 * 1024 * 1024 * 1024;

// =============================================================================
// Assembly Result
// =============================================================================

/// Why a tile was left out of the composed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The tile could not be fetched
    Fetch(FetchError),

    /// The tile was fetched but is not a decodable image
    Decode(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fetch(e) => write!(f, "fetch failed: {}", e),
            SkipReason::Decode(msg) => write!(f, "decode failed: {}", msg),
        }
    }
}

/// A tile that is missing from the composed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTile {
    pub coord: TileCoord,
    pub url: String,
    pub reason: SkipReason,
}

/// Result of assembling one figure.
#[derive(Debug, Clone)]
pub struct AssembledFigure {
    /// Composed image, exactly the declared width x height
    pub image: RgbImage,

    /// Zoom level the tiles were taken from
    pub zoom_level: u32,

    /// Grid that was downloaded
    pub grid: TileGrid,

    /// Tiles left as background, in grid order
    pub skipped: Vec<SkippedTile>,
}

impl AssembledFigure {
    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Number of tiles pasted onto the canvas.
    pub fn tiles_placed(&self) -> u64 {
        self.grid.tile_count() - self.skipped.len() as u64
    }
}

// =============================================================================
// Tile Assembler
// =============================================================================

/// Rebuilds figures from their tile pyramids.
///
/// # Example
///
/// ```ignore
/// use tile_stitcher::io::{create_http_client, HttpFetcher};
/// use tile_stitcher::tile::TileAssembler;
///
/// let fetcher = HttpFetcher::new(create_http_client(timeout, "tile-stitcher")?);
/// let assembler = TileAssembler::new(fetcher).with_concurrency(4);
///
/// let figure = assembler.assemble(&descriptor).await?;
/// println!("{}x{}, {} tiles skipped", figure.width(), figure.height(), figure.skipped.len());
/// ```
pub struct TileAssembler<F: Fetcher> {
    /// Source of tiles
    fetcher: F,

    /// Exclusive upper bound on probed zoom levels
    probe_limit: u32,

    /// Maximum number of tile requests in flight
    concurrency: usize,
}

impl<F: Fetcher> TileAssembler<F> {
    /// Create an assembler that probes up to [`DEFAULT_PROBE_LIMIT`] levels and
    /// downloads tiles one at a time.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            probe_limit: DEFAULT_PROBE_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the number of zoom levels probed.
    pub fn with_probe_limit(mut self, probe_limit: u32) -> Self {
        self.probe_limit = probe_limit;
        self
    }

    /// Set the maximum number of tile requests in flight (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Get a reference to the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Discover the best zoom level and download the figure at that level.
    ///
    /// # Errors
    ///
    /// Returns [`AssembleError::NoTileset`] if tile `(0, 0)` cannot be fetched
    /// at level 0, and [`AssembleError::InvalidGeometry`] for a descriptor with
    /// zero dimensions. Individual tile failures are not errors.
    pub async fn assemble(
        &self,
        figure: &FigureDescriptor,
    ) -> Result<AssembledFigure, AssembleError> {
        let zoom_level = self.discover_zoom_level(figure).await.ok_or_else(|| {
            AssembleError::NoTileset {
                base_url: figure.tile_base_url.clone(),
            }
        })?;

        info!(
            figure = figure.index,
            zoom_level, "Using zoom level, beginning download"
        );

        self.download_grid(figure, zoom_level).await
    }

    /// Find the highest zoom level available for a figure.
    pub async fn discover_zoom_level(&self, figure: &FigureDescriptor) -> Option<u32> {
        discover_zoom_level(
            &self.fetcher,
            &figure.tile_base_url,
            &figure.tile_format,
            self.probe_limit,
        )
        .await
    }

    /// Download every tile of `zoom_level` and composite them.
    pub async fn download_grid(
        &self,
        figure: &FigureDescriptor,
        zoom_level: u32,
    ) -> Result<AssembledFigure, AssembleError> {
        let grid = TileGrid::for_image(figure.image_width, figure.image_height, figure.tile_size)?;
        check_canvas_size(figure.image_width, figure.image_height)?;
        let mut canvas = RgbImage::new(figure.image_width, figure.image_height);
        let mut skipped = Vec::new();

        debug!(
            columns = grid.columns,
            rows = grid.rows,
            concurrency = self.concurrency,
            "Downloading tile grid"
        );

        let base_url = figure.tile_base_url.as_str();
        let format = figure.tile_format.as_str();
        let fetcher = &self.fetcher;

        // `buffered` keeps results in grid order regardless of completion order.
        let fetches = stream::iter(grid.coords())
            .map(|coord| {
                let url = tile_url(base_url, zoom_level, coord, format);
                async move {
                    info!(%url, "Downloading tile");
                    let result = fetcher.get(&url).await;
                    (coord, url, result)
                }
            })
            .buffered(self.concurrency);
        let mut fetches = pin!(fetches);

        while let Some((coord, url, result)) = fetches.next().await {
            let reason = match result {
                Ok(body) => match paste_tile(&mut canvas, &grid, coord, &body) {
                    Ok(()) => continue,
                    Err(msg) => SkipReason::Decode(msg),
                },
                Err(e) => SkipReason::Fetch(e),
            };

            warn!(%url, %reason, "Skipping tile");
            skipped.push(SkippedTile { coord, url, reason });
        }

        Ok(AssembledFigure {
            image: canvas,
            zoom_level,
            grid,
            skipped,
        })
    }
}

/// Reject canvases too large to allocate.
fn check_canvas_size(width: u32, height: u32) -> Result<(), AssembleError> {
    let bytes = width as u64 * height as u64 * 3;
    if bytes > MAX_CANVAS_BYTES || usize::try_from(bytes).is_err() {
        return Err(AssembleError::InvalidGeometry(format!(
            "{}x{} canvas needs {} bytes, limit is {}",
            width, height, bytes, MAX_CANVAS_BYTES
        )));
    }
    Ok(())
}

/// Decode a tile and copy it onto the canvas at its grid position.
///
/// Tiles extending past the canvas are cropped.
fn paste_tile(
    canvas: &mut RgbImage,
    grid: &TileGrid,
    coord: TileCoord,
    body: &Bytes,
) -> Result<(), String> {
    let tile = image::load_from_memory(body)
        .map_err(|e| e.to_string())?
        .to_rgb8();

    let (x, y) = grid.pixel_offset(coord);
    imageops::replace(canvas, &tile, x as i64, y as i64);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
