//! A* search over a prebuilt graph.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use kshetra_map::{Graph, NodeId, Point2D};

use crate::base::{best_first_search, ComputeCost, SearchState};
use crate::node::SearchNode;
use crate::store::VertexStore;

/// A* configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AStarConfig {
    /// Maximum number of vertex expansions before giving up.
    pub max_expansions: usize,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            max_expansions: 100_000,
        }
    }
}

/// Standard forward A*.
///
/// The graph is read-only during a search; each call to
/// [`AStarPlanner::compute_shortest_path`] starts from scratch.
pub struct AStarPlanner<'a> {
    graph: &'a Graph,
    config: AStarConfig,
    state: SearchState,
    store: VertexStore,
}

struct AStarCost;

impl ComputeCost for AStarCost {
    fn compute_cost(
        &self,
        state: &SearchState,
        _store: &VertexStore,
        graph: &Graph,
        s: &SearchNode,
        sp: &mut SearchNode,
    ) {
        let cost = state.cost_triple(s.g, graph.node(s.id).point, graph.node(sp.id).point);
        // k1 caches the incumbent f-value; relax only on improvement
        if cost.f < sp.key.k1 {
            sp.g = cost.g;
            sp.h = cost.h;
            sp.calc_key(0.0);
            sp.parent = Some(s.id);
        }
    }
}

impl<'a> AStarPlanner<'a> {
    /// Create a planner over a graph.
    pub fn new(graph: &'a Graph, config: AStarConfig) -> Self {
        Self {
            graph,
            config,
            state: SearchState::new(),
            store: VertexStore::new(),
        }
    }

    /// Create with default configuration.
    pub fn with_defaults(graph: &'a Graph) -> Self {
        Self::new(graph, AStarConfig::default())
    }

    /// Search from `source` to `goal`.
    ///
    /// Returns true when a path was found; retrieve it with
    /// [`AStarPlanner::path`].
    pub fn compute_shortest_path(&mut self, source: NodeId, goal: NodeId) -> bool {
        trace!("[AStar] search {source} -> {goal}");
        let found = best_first_search(
            self.graph,
            &mut self.state,
            &mut self.store,
            &AStarCost,
            source,
            goal,
            self.config.max_expansions,
        );
        if found {
            trace!(
                "[AStar] path with {} vertices, {} expanded",
                self.state.path.len(),
                self.state.expanded.len()
            );
        } else {
            debug!(
                "[AStar] no path {source} -> {goal} ({} expanded)",
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
