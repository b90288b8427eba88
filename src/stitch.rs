//! Per-artwork orchestration.
//!
//! A run fetches the artwork page, extracts its figures and, for each figure
//! in turn, assembles the tiles and saves the result. A figure that fails is
//! reported and the run moves on to the next one; only page retrieval and
//! metadata extraction abort the whole run.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{ExtractError, StitchError};
use crate::io::Fetcher;
use crate::metadata::{extract_artwork, FigureDescriptor};
use crate::sink::{output_filename, ImageSink};
use crate::tile::{SkippedTile, TileAssembler, DEFAULT_CONCURRENCY, DEFAULT_PROBE_LIMIT};

// =============================================================================
// Context
// =============================================================================

/// Everything a run needs to know about where to read from and write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchContext {
    /// Artwork page URL
    pub page_url: String,

    /// Directory the images are written to
    pub output_dir: PathBuf,

    /// Number of zoom levels probed
    pub probe_limit: u32,

    /// Maximum number of tile requests in flight
    pub concurrency: usize,
}

impl StitchContext {
    /// Create a context with the default probe limit and sequential downloads.
    pub fn new(page_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            page_url: page_url.into(),
            output_dir: output_dir.into(),
            probe_limit: DEFAULT_PROBE_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// A figure that was assembled and saved.
#[derive(Debug, Clone)]
pub struct SavedFigure {
    /// Where the image was written
    pub path: PathBuf,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Zoom level the tiles came from
    pub zoom_level: u32,

    /// Tiles left as background
    pub skipped: Vec<SkippedTile>,
}

/// Outcome of one figure.
#[derive(Debug, Clone)]
pub struct FigureOutcome {
    /// Position of the figure in the artwork
    pub index: usize,

    /// The saved figure, or why it could not be produced
    pub result: Result<SavedFigure, StitchError>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub struct StitchReport {
    /// Artwork slug
    pub slug: String,

    /// One entry per figure with deep-zoom tiles
    pub figures: Vec<FigureOutcome>,
}

impl StitchReport {
    /// Figures that were saved.
    pub fn saved(&self) -> impl Iterator<Item = &SavedFigure> {
        self.figures.iter().filter_map(|f| f.result.as_ref().ok())
    }

    /// Number of figures that could not be produced.
    pub fn failed_count(&self) -> usize {
        self.figures.iter().filter(|f| f.result.is_err()).count()
    }

    /// Whether every figure was saved.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

// =============================================================================
// Stitcher
// =============================================================================

/// Drives a full run: page, metadata, then every figure.
///
/// # Example
///
/// ```ignore
/// use tile_stitcher::{FileSink, HttpFetcher, StitchContext, Stitcher};
///
/// let context = StitchContext::new("https://www.artsy.net/artwork/some-slug", "out");
/// let stitcher = Stitcher::new(fetcher, FileSink, context);
///
/// let report = stitcher.run().await?;
/// for figure in report.saved() {
///     println!("{} at {}x{}", figure.path.display(), figure.width, figure.height);
/// }
/// ```
pub struct Stitcher<F: Fetcher, S: ImageSink> {
    assembler: TileAssembler<F>,
    sink: S,
    context: StitchContext,
}

impl<F: Fetcher, S: ImageSink> Stitcher<F, S> {
    /// Create a stitcher using `fetcher` for the page and tiles.
    pub fn new(fetcher: F, sink: S, context: StitchContext) -> Self {
        let assembler = TileAssembler::new(fetcher)
            .with_probe_limit(context.probe_limit)
            .with_concurrency(context.concurrency);
        Self {
            assembler,
            sink,
            context,
        }
    }

    /// Get the run context.
    pub fn context(&self) -> &StitchContext {
        &self.context
    }

    /// Get the tile assembler.
    pub fn assembler(&self) -> &TileAssembler<F> {
        &self.assembler
    }

    /// Get the image sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Process every figure of the artwork page.
    ///
    /// # Errors
    ///
    /// Fails only if the page cannot be fetched or carries no usable
    /// metadata. Per-figure failures are recorded in the report.
    pub async fn run(&self) -> Result<StitchReport, StitchError> {
        info!(url = %self.context.page_url, "Fetching artwork page");
        let body = self.assembler.fetcher().get(&self.context.page_url).await?;
        let html =
            std::str::from_utf8(&body).map_err(|e| ExtractError::Encoding(e.to_string()))?;

        let artwork = extract_artwork(html)?;
        info!(
            slug = %artwork.slug,
            figures = artwork.figures.len(),
            "Found artwork"
        );
        if artwork.figures.is_empty() {
            warn!(slug = %artwork.slug, "Artwork has no deep-zoom figures");
        }

        let mut figures = Vec::with_capacity(artwork.figures.len());
        for figure in &artwork.figures {
            let result = self.stitch_figure(&artwork.slug, figure).await;
            if let Err(ref e) = result {
                warn!(figure = figure.index, error = %e, "Failed to stitch figure");
            }
            figures.push(FigureOutcome {
                index: figure.index,
                result,
            });
        }

        Ok(StitchReport {
            slug: artwork.slug,
            figures,
        })
    }

    /// Assemble one figure and save it as `{slug}-{index}.{format}`.
    pub async fn stitch_figure(
        &self,
        slug: &str,
        figure: &FigureDescriptor,
    ) -> Result<SavedFigure, StitchError> {
        let assembled = self.assembler.assemble(figure).await?;

        let filename = output_filename(slug, figure.index, &figure.tile_format);
        let path = self.context.output_dir.join(filename);
        self.sink.save(&assembled.image, &path)?;

        if !assembled.skipped.is_empty() {
            warn!(
                figure = figure.index,
                skipped = assembled.skipped.len(),
                total = assembled.grid.tile_count(),
                "Some tiles were missing and left blank"
            );
        }
        info!(
            "Downloaded to {} at {}x{}",
            path.display(),
            assembled.width(),
            assembled.height()
        );

        Ok(SavedFigure {
            path,
            width: assembled.width(),
            height: assembled.height(),
            zoom_level: assembled.zoom_level,
            skipped: assembled.skipped,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
