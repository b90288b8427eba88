use serde::{Deserialize, Deserializer};

use crate::error::ExtractError;

// =============================================================================
// Public Types
// =============================================================================

/// Deep-zoom geometry of one figure of an artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureDescriptor {
    /// Position of the figure in the artwork's figure list
    pub index: usize,

    /// Base URL of the tile pyramid, without trailing slash
    pub tile_base_url: String,

    /// Tile file extension (e.g. "jpg")
    pub tile_format: String,

    /// Full-resolution width in pixels
    pub image_width: u32,

    /// Full-resolution height in pixels
    pub image_height: u32,

    /// Edge length of a (non-edge) tile in pixels
    pub tile_size: u32,
}

impl FigureDescriptor {
    /// Create a descriptor, stripping any trailing slash from the base URL.
    pub fn new(
        index: usize,
        tile_base_url: impl Into<String>,
        tile_format: impl Into<String>,
        image_width: u32,
        image_height: u32,
        tile_size: u32,
    ) -> Self {
        let tile_base_url = tile_base_url.into().trim_end_matches('/').to_string();
        Self {
            index,
            tile_base_url,
            tile_format: tile_format.into(),
            image_width,
            image_height,
            tile_size,
        }
    }

    /// Check the invariants the assembler relies on.
    pub fn validate(&self) -> Result<(), ExtractError> {
        let invalid = |message: &str| ExtractError::InvalidDescriptor {
            figure: self.index,
            message: message.to_string(),
        };

        if self.tile_base_url.is_empty() {
            return Err(invalid("empty tile URL"));
        }
        if !is_file_name_component(&self.tile_format) {
            return Err(invalid("tile format is not a plain file extension"));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(invalid("image dimensions must be greater than 0"));
        }
        if self.tile_size == 0 {
            return Err(invalid("tile size must be greater than 0"));
        }
        Ok(())
    }
}

/// Whether `s` can be spliced into a file name without leaving the output
/// directory: non-empty, no path separators, no `..`, no NUL.
pub(crate) fn is_file_name_component(s: &str) -> bool {
    !s.is_empty() && !s.contains(['/', '\\', '\0']) && !s.contains("..")
}

/// An artwork record: its slug and the figures that carry deep-zoom tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    /// Short identifier used to name output files
    pub slug: String,

    /// Figures with a deep-zoom record, in payload order
    pub figures: Vec<FigureDescriptor>,
}

// =============================================================================
// Payload Shape
// =============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct RawArtwork {
    pub slug: Option<String>,
    #[serde(default)]
    pub figures: Vec<RawFigure>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawFigure {
    #[serde(rename = "deepZoom")]
    pub deep_zoom: Option<RawDeepZoom>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawDeepZoom {
    #[serde(rename = "Image")]
    pub image: RawDeepZoomImage,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawDeepZoomImage {
    #[serde(rename = "Url")]
    pub url: String,

    #[serde(rename = "Format")]
    pub format: String,

    #[serde(rename = "TileSize", deserialize_with = "lenient_u32")]
    pub tile_size: u32,

    #[serde(rename = "Size")]
    pub size: RawSize,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawSize {
    #[serde(rename = "Width", deserialize_with = "lenient_u32")]
    pub width: u32,

    #[serde(rename = "Height", deserialize_with = "lenient_u32")]
    pub height: u32,
}

impl RawDeepZoomImage {
    pub(super) fn into_descriptor(self, index: usize) -> FigureDescriptor {
        FigureDescriptor::new(
            index,
            self.url,
            self.format,
            self.size.width,
            self.size.height,
            self.tile_size,
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

/// Deep-zoom descriptors publish sizes either as JSON numbers or as strings.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("expected an integer, got {:?}", s)))?,
    };
    u32::try_from(value).map_err(|_| D::Error::custom(format!("{} does not fit in u32", value)))
}

// =============================================================================
// Tests
// =============================================================================
