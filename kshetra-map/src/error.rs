//! Error types for kshetra-map.

use thiserror::Error;

/// Errors raised while constructing map structures.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid resolution must be positive (got {0})")]
    InvalidResolution(f64),

    #[error("polygon needs at least 3 vertices (got {0})")]
    DegeneratePolygon(usize),
}

pub type Result<T> = std::result::Result<T, MapError>;
