//! Theta* any-angle search.
//!
//! Theta* runs the same best-first loop as A* but, when relaxing a
//! neighbor, first tries to route it directly from the popped vertex's
//! parent. If the line-of-sight oracle clears that segment the neighbor
//! inherits the grandparent (path 2), producing paths that cut corners
//! the grid connectivity would otherwise force; otherwise the relaxation
//! falls back to the A* edge (path 1).

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use kshetra_map::{Graph, NodeId, OccupancyGrid, Point2D, Polygon};

use crate::base::{best_first_search, ComputeCost, SearchState};
use crate::node::SearchNode;
use crate::store::VertexStore;

/// Collision oracle for any-angle shortcuts.
///
/// Implementations answer whether the straight segment between two world
/// points is traversable.
pub trait LineOfSight {
    /// True when the segment from `a` to `b` is unobstructed.
    fn is_clear(&self, a: Point2D, b: Point2D) -> bool;
}

/// Line-of-sight against a set of obstacle polygons, each inflated by a
/// buffer radius.
pub struct PolygonOracle {
    obstacles: Vec<Polygon>,
    buffer: f64,
}

impl PolygonOracle {
    /// Create an oracle over obstacle polygons with a clearance buffer.
    pub fn new(obstacles: Vec<Polygon>, buffer: f64) -> Self {
        Self { obstacles, buffer }
    }
}

impl LineOfSight for PolygonOracle {
    fn is_clear(&self, a: Point2D, b: Point2D) -> bool {
        self.obstacles
            .iter()
            .all(|polygon| !polygon.intersects_segment(a, b, self.buffer))
    }
}

/// Line-of-sight over an occupancy grid (Bresenham cell walk).
pub struct GridOracle<'g> {
    grid: &'g OccupancyGrid,
}

impl<'g> GridOracle<'g> {
    /// Create an oracle reading a grid.
    pub fn new(grid: &'g OccupancyGrid) -> Self {
        Self { grid }
    }
}

impl LineOfSight for GridOracle<'_> {
    fn is_clear(&self, a: Point2D, b: Point2D) -> bool {
        self.grid
            .line_of_sight(self.grid.world_to_grid(a), self.grid.world_to_grid(b))
    }
}

/// Theta* configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThetaStarConfig {
    /// Maximum number of vertex expansions before giving up.
    pub max_expansions: usize,
}

impl Default for ThetaStarConfig {
    fn default() -> Self {
        Self {
            max_expansions: 100_000,
        }
    }
}

/// Any-angle planner over a prebuilt graph and a line-of-sight oracle.
pub struct ThetaStarPlanner<'a, O: LineOfSight> {
    graph: &'a Graph,
    oracle: O,
    config: ThetaStarConfig,
    state: SearchState,
    store: VertexStore,
}

struct ThetaCost<'o, O: LineOfSight> {
    oracle: &'o O,
}

impl<O: LineOfSight> ComputeCost for ThetaCost<'_, O> {
    fn compute_cost(
        &self,
        state: &SearchState,
        store: &VertexStore,
        graph: &Graph,
        s: &SearchNode,
        sp: &mut SearchNode,
    ) {
        let sp_point = graph.node(sp.id).point;

        if let Some(parent) = s.parent {
            let parent_point = graph.node(parent).point;
            if self.oracle.is_clear(parent_point, sp_point) {
                // path 2: inherit the grandparent
                let parent_g = store.node(parent).g;
                let cost = state.cost_triple(parent_g, parent_point, sp_point);
                if cost.f < sp.key.k1 {
                    sp.g = cost.g;
                    sp.h = cost.h;
                    sp.calc_key(0.0);
                    sp.parent = Some(parent);
                }
                return;
            }
        }

        // path 1: grid-constrained relaxation through s
        let cost = state.cost_triple(s.g, graph.node(s.id).point, sp_point);
        if cost.f < sp.key.k1 {
            sp.g = cost.g;
            sp.h = cost.h;
            sp.calc_key(0.0);
            sp.parent = Some(s.id);
        }
    }
}

impl<'a, O: LineOfSight> ThetaStarPlanner<'a, O> {
    /// Create a planner over a graph and an oracle.
    pub fn new(graph: &'a Graph, oracle: O, config: ThetaStarConfig) -> Self {
        Self {
            graph,
            oracle,
            config,
            state: SearchState::new(),
            store: VertexStore::new(),
        }
    }

    /// Create with default configuration.
    pub fn with_defaults(graph: &'a Graph, oracle: O) -> Self {
        Self::new(graph, oracle, ThetaStarConfig::default())
    }

    /// Search from `source` to `goal`.
    pub fn compute_shortest_path(&mut self, source: NodeId, goal: NodeId) -> bool {
        trace!("[ThetaStar] search {source} -> {goal}");
        let policy = ThetaCost {
            oracle: &self.oracle,
        };
        let found = best_first_search(
            self.graph,
            &mut self.state,
            &mut self.store,
            &policy,
            source,
            goal,
            self.config.max_expansions,
        );
        if !found {
            debug!(
                "[ThetaStar] no path {source} -> {goal} ({} expanded)",
                self.state.expanded.len()
            );
        }
        found
    }

    /// The most recent path, goal-first.
    pub fn path(&self) -> &[Point2D] {
        &self.state.path
    }

    /// Vertices popped during the most recent search.
    pub fn expanded_nodes(&self) -> &[Point2D] {
        &self.state.expanded
    }
}
