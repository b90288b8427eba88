//! Zoom-level discovery.
//!
//! Tile pyramids are published with levels `0..=N` and no gaps, but `N` is
//! not part of the metadata. Levels are probed upwards by requesting tile
//! `(0, 0)`; the first failure ends the pyramid.

use tracing::{debug, warn};

use super::grid::{tile_url, TileCoord};
use crate::io::Fetcher;

/// Default number of zoom levels probed before giving up.
pub const DEFAULT_PROBE_LIMIT: u32 = 20;

/// Find the highest zoom level whose tile `(0, 0)` can be fetched.
///
/// Probes levels `0, 1, 2, ...` below `probe_limit` and stops at the first
/// level that fails for any reason (404, other status, transport error). No
/// request is retried.
///
/// Returns `None` when level 0 itself is unreachable.
pub async fn discover_zoom_level<F>(
    fetcher: &F,
    base_url: &str,
    format: &str,
    probe_limit: u32,
) -> Option<u32>
where
    F: Fetcher + ?Sized,
{
    let mut best = None;

    for level in 0..probe_limit {
        let url = tile_url(base_url, level, TileCoord::new(0, 0), format);
        match fetcher.get(&url).await {
            Ok(_) => {
                debug!(level, %url, "Zoom level available");
                best = Some(level);
            }
            Err(e) if e.is_not_found() => {
                debug!(level, %url, "Zoom level unavailable, stopping probe");
                break;
            }
            Err(e) => {
                warn!(level, %url, error = %e, "Zoom probe failed, stopping probe");
                break;
            }
        }
    }

    best
}

// =============================================================================
// Tests
// =============================================================================
