//! Tile assembly layer.
//!
//! This module rebuilds a full-resolution image from a deep-zoom tile pyramid.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Stitcher                   │
//! └────────────────────┬────────────────────┘
//!                      │ FigureDescriptor
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             TileAssembler               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ Zoom probing │  │ Grid download & │  │
//! │  │ (0_0 tiles)  │  │ compositing     │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │                Fetcher                  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileAssembler`]: Main entry point, probes then downloads and composites
//! - [`discover_zoom_level`]: Finds the deepest level whose tile `(0, 0)` exists
//! - [`TileGrid`]: Grid dimensions and pixel offsets for an image
//! - [`AssembledFigure`]: Composed image plus the tiles that were skipped

mod assembler;
mod grid;
mod zoom;

pub use assembler::{
    AssembledFigure, SkipReason, SkippedTile, TileAssembler, DEFAULT_CONCURRENCY,
};
pub use grid::{tile_url, TileCoord, TileGrid};
pub use zoom::{discover_zoom_level, DEFAULT_PROBE_LIMIT};
