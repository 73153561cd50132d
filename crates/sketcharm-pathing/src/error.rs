//! Error types for the pathing crate.

use sketcharm_core::GeometryError;
use thiserror::Error;

/// Errors that can occur while turning rasters into toolpaths.
#[derive(Error, Debug)]
pub enum PathingError {
    /// The raster or workspace geometry cannot produce a toolpath.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Invalid parameters were provided to a planner.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Image decoding or processing failed.
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for pathing operations.
pub type PathingResult<T> = Result<T, PathingError>;
