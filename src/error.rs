//! Error types
//!
//! Parsing-level anomalies (bad escape sequences, unknown colors) are
//! recovered locally and never show up here. These variants cover contract
//! violations at component boundaries and failing output sinks.

use std::io;

use thiserror::Error;

use crate::renderer::FontError;

/// Largest accepted grid width or height, in cells
pub const MAX_GRID_DIM: usize = 4096;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid grid dimensions: {cols}x{rows} (each must be 1 to {max})", max = MAX_GRID_DIM)]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("Snapshot has insufficient cells: expected {expected}, got {actual}")]
    InsufficientCells { expected: usize, actual: usize },

    #[error("Refusing to encode an empty frame sequence")]
    EmptySequence,

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject zero-sized and oversized grids
pub(crate) fn check_dimensions(cols: usize, rows: usize) -> Result<()> {
    if !(1..=MAX_GRID_DIM).contains(&cols) || !(1..=MAX_GRID_DIM).contains(&rows) {
        return Err(Error::InvalidDimensions { cols, rows });
    }
    Ok(())
}
