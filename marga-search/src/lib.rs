//! # Marga-Search: incremental heuristic search for 2D path planning
//!
//! Four planners over a shared node/heap/store substrate:
//!
//! - [`AStarPlanner`]: standard forward A* on a prebuilt graph
//! - [`ThetaStarPlanner`]: any-angle A* that shortcuts through a
//!   line-of-sight oracle
//! - [`LpaStarPlanner`]: Lifelong Planning A* on an occupancy grid;
//!   replans after map changes by repairing only the affected vertices
//! - [`DStarLitePlanner`]: LPA* searched backward from the goal with a
//!   moving query anchor, for a robot that replans as it drives
//!
//! The incremental planners keep two mutually consistent structures per
//! vertex: a best-known cost `g` and a one-step lookahead `rhs`, with a
//! priority queue holding exactly the locally inconsistent vertices. Edge
//! cost changes dirty a handful of vertices; the next
//! `compute_shortest_path` call repairs them in key order and reuses
//! everything else from the previous search.
//!
//! World model types (grids, graphs, collision geometry) come from
//! [`kshetra_map`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kshetra_map::{Connectivity, GridCoord, GridGraph, OccupancyGrid};
//! use marga_search::LpaStarPlanner;
//!
//! let grid = OccupancyGrid::new(20, 20, 0.1).unwrap();
//! let graph = GridGraph::from_grid(&grid, Connectivity::Eight);
//! let mut planner =
//!     LpaStarPlanner::new(graph, grid, GridCoord::new(0, 0), GridCoord::new(19, 19)).unwrap();
//!
//! if planner.compute_shortest_path() {
//!     println!("path with {} waypoints", planner.path().len());
//! }
//!
//! // a sensor reports a newly blocked cell; repair and replan
//! if planner.map_change(&[(GridCoord::new(10, 10), 100)]) {
//!     planner.compute_shortest_path();
//! }
//! ```

pub mod astar;
mod base;
pub mod d_star_lite;
pub mod error;
pub mod key;
pub mod lpa_star;
pub mod node;
pub mod open;
pub mod store;
pub mod theta_star;

pub use astar::{AStarConfig, AStarPlanner};
pub use d_star_lite::DStarLitePlanner;
pub use error::PlanError;
pub use key::{Key, EPSILON};
pub use lpa_star::LpaStarPlanner;
pub use node::{NodeState, SearchNode};
pub use open::OpenSet;
pub use store::VertexStore;
pub use theta_star::{GridOracle, LineOfSight, PolygonOracle, ThetaStarConfig, ThetaStarPlanner};

use kshetra_map::Point2D;

/// Total Euclidean length of a waypoint sequence.
pub fn path_length(path: &[Point2D]) -> f64 {
    path.windows(2).map(|w| w[0].distance(&w[1])).sum()
}
