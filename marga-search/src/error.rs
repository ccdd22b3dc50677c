//! Error types for marga-search.

use kshetra_map::GridCoord;
use thiserror::Error;

/// Errors raised while constructing a planner.
///
/// Absence of a path is not an error; `compute_shortest_path` reports it
/// through its return value.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("graph covers {graph:?} cells but grid is {grid:?}")]
    DimensionMismatch {
        graph: (usize, usize),
        grid: (usize, usize),
    },

    #[error("cell ({}, {}) is outside the planning grid", .0.x, .0.y)]
    OutOfBounds(GridCoord),
}

pub type Result<T> = std::result::Result<T, PlanError>;
