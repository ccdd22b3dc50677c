//! # Kshetra-Map: grid and graph providers for 2D path planning
//!
//! This crate supplies the world model consumed by the `marga-search`
//! planners:
//!
//! - [`OccupancyGrid`]: a mutable occupancy grid with a batch cell-update
//!   primitive and world↔grid coordinate conversion
//! - [`Graph`] / [`GridGraph`]: search graphs of positioned nodes with
//!   symmetric neighbor sets; grid graphs assign ids by row-major traversal
//! - [`Polygon`]: obstacle geometry with buffered segment intersection
//!   tests for any-angle line-of-sight checks
//!
//! ## Coordinate frames
//!
//! Grid coordinates are integer cell indices ([`GridCoord`], x = column,
//! y = row). World coordinates are meters ([`Point2D`]); a cell maps to the
//! world point at its center.

pub mod collision;
pub mod error;
pub mod graph;
pub mod grid;
pub mod point;

pub use collision::Polygon;
pub use error::MapError;
pub use graph::{Connectivity, Graph, GraphNode, GridGraph, NodeId};
pub use grid::{OccupancyGrid, FREE, OCCUPIED};
pub use point::{GridCoord, Point2D};
