//! Tile grid geometry.
//!
//! A deep-zoom level is a uniform grid of square tiles. Tile `(col, row)`
//! covers the pixels starting at `(col * tile_size, row * tile_size)`; tiles on
//! the right and bottom edges may be smaller than `tile_size`.

use std::fmt;

use crate::error::AssembleError;

/// Position of a tile in the grid of one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileCoord {
    /// Column, 0-indexed from the left
    pub col: u32,

    /// Row, 0-indexed from the top
    pub row: u32,
}

impl TileCoord {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.col, self.row)
    }
}

/// Tile grid covering a full-resolution image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    /// Number of tile columns
    pub columns: u32,

    /// Number of tile rows
    pub rows: u32,

    /// Tile edge length in pixels
    pub tile_size: u32,
}

impl TileGrid {
    /// Compute the grid for an image of `width` x `height` pixels.
    ///
    /// `columns = width / tile_size + 1` and `rows = height / tile_size + 1`.
    /// When a dimension is an exact multiple of the tile size this includes
    /// one extra column or row past the edge; those tiles are normally absent
    /// and end up reported as skipped.
    pub fn for_image(width: u32, height: u32, tile_size: u32) -> Result<Self, AssembleError> {
        if tile_size == 0 {
            return Err(AssembleError::InvalidGeometry(
                "tile size must be greater than 0".to_string(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(AssembleError::InvalidGeometry(format!(
                "image dimensions must be greater than 0, got {}x{}",
                width, height
            )));
        }

        let overflow = || {
            AssembleError::InvalidGeometry(format!(
                "{}x{} image with {}px tiles needs more than {} tiles per side",
                width,
                height,
                tile_size,
                u32::MAX
            ))
        };

        Ok(Self {
            columns: (width / tile_size).checked_add(1).ok_or_else(overflow)?,
            rows: (height / tile_size).checked_add(1).ok_or_else(overflow)?,
            tile_size,
        })
    }

    /// Total number of tiles in the grid.
    pub fn tile_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Whether `coord` lies inside the grid.
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.col < self.columns && coord.row < self.rows
    }

    /// Iterate over all coordinates, columns outer and rows inner.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let rows = self.rows;
        (0..self.columns).flat_map(move |col| (0..rows).map(move |row| TileCoord::new(col, row)))
    }

    /// Pixel position of the top-left corner of a tile.
    pub fn pixel_offset(&self, coord: TileCoord) -> (u64, u64) {
        (
            coord.col as u64 * self.tile_size as u64,
            coord.row as u64 * self.tile_size as u64,
        )
    }
}

/// Build the URL of a tile: `{base}/{level}/{col}_{row}.{format}`.
pub fn tile_url(base_url: &str, level: u32, coord: TileCoord, format: &str) -> String {
    format!("{}/{}/{}.{}", base_url, level, coord, format)
}

// =============================================================================
// Tests
// =============================================================================
