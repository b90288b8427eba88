//! Artwork metadata.
//!
//! This module turns an artwork page into the deep-zoom geometry of each of
//! its figures:
//!
//! ```text
//! page HTML ──► __RELAY_BOOTSTRAP__ ──► unescape ──► JSON ──► Artwork
//!                                                              ├─ slug
//!                                                              └─ figures[]: FigureDescriptor
//! ```

mod descriptor;
mod extractor;

pub use descriptor::{Artwork, FigureDescriptor};
pub use extractor::{extract_artwork, parse_bootstrap_payload, unescape};
