//! Persistence of assembled images.

use std::path::Path;

use image::RgbImage;

use crate::error::SinkError;

/// Destination for composed images.
pub trait ImageSink: Send + Sync {
    /// Store `image` at `path`.
    ///
    /// The encoding is chosen from the path's extension.
    fn save(&self, image: &RgbImage, path: &Path) -> Result<(), SinkError>;
}

/// Writes images to the local filesystem, creating parent directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl ImageSink for FileSink {
    fn save(&self, image: &RgbImage, path: &Path) -> Result<(), SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SinkError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        image.save(path).map_err(|e| match e {
            image::ImageError::IoError(io) => SinkError::Io(format!("{}: {}", path.display(), io)),
            other => SinkError::Encode(format!("{}: {}", path.display(), other)),
        })
    }
}

/// Output filename for a figure: `{slug}-{index}.{format}`.
pub fn output_filename(slug: &str, figure_index: usize, format: &str) -> String {
    format!("{}-{}.{}", slug, figure_index, format)
}

// =============================================================================
// Tests
// =============================================================================
