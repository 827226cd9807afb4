//! Dominant color extraction and palette derivation for album art.
//!
//! An image reference is fetched through an [`ImageSource`], stretched onto a
//! small raster and scanned for its most frequent qualifying color. That color
//! feeds [`Palette::generate`], which derives the secondary, accent, text and
//! background colors used to theme the player and track cards.

pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pipeline;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

pub use common::{Color, ImageRef};
pub use config::Configuration;
pub use coordinator::{Track, TrackColorCoordinator, TrackColors};
pub use error::{AppError, ColorError, ConfigError, ExtractionError};
pub use pipeline::{ColorExtractor, ColorSampler, Palette};
pub use source::{ImageSource, StorageResolver};
