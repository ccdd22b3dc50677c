//! Shared search scaffolding: heuristic, cost triple, path assembly, and
//! the best-first driver the non-incremental planners plug into.

use log::{debug, warn};

use kshetra_map::{Graph, NodeId, Point2D};

use crate::node::{NodeState, SearchNode};
use crate::store::VertexStore;

/// Cost of reaching a vertex through a candidate parent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CostTriple {
    /// Total cost g + h.
    pub f: f64,
    /// Path cost through the candidate parent.
    pub g: f64,
    /// Heuristic of the relaxed vertex.
    pub h: f64,
}

/// State every planner carries: the goal location the heuristic measures
/// against, the assembled path, and the expanded-vertex diagnostic.
#[derive(Clone, Debug, Default)]
pub(crate) struct SearchState {
    pub goal_loc: Point2D,
    pub path: Vec<Point2D>,
    pub expanded: Vec<Point2D>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Euclidean heuristic to the current goal.
    #[inline]
    pub fn h(&self, point: Point2D) -> f64 {
        point.distance(&self.goal_loc)
    }

    /// Relaxation costs for reaching `sp_point` through a parent with path
    /// cost `s_g` at `s_point`.
    pub fn cost_triple(&self, s_g: f64, s_point: Point2D, sp_point: Point2D) -> CostTriple {
        let g = s_g + s_point.distance(&sp_point);
        let h = self.h(sp_point);
        CostTriple { f: g + h, g, h }
    }

    /// Walk parent pointers from the goal, emitting points goal-first.
    pub fn assemble_path(&mut self, store: &VertexStore, graph: &Graph, goal: NodeId) {
        self.path.clear();
        self.path.push(graph.node(goal).point);

        let mut current = goal;
        while let Some(parent) = store.node(current).parent {
            self.path.push(graph.node(parent).point);
            current = parent;
        }
    }
}

/// Relaxation policy: how a popped vertex updates one neighbor.
///
/// The driver hands the policy a snapshot of the popped vertex and a
/// mutable copy of the neighbor; the policy overwrites costs, key, and
/// parent when it finds a cheaper route.
pub(crate) trait ComputeCost {
    fn compute_cost(
        &self,
        state: &SearchState,
        store: &VertexStore,
        graph: &Graph,
        s: &SearchNode,
        sp: &mut SearchNode,
    );
}

/// Best-first search over a prebuilt graph.
///
/// Vertices are created lazily on first discovery, popped in key order,
/// and never revisited once closed. Returns true once the goal vertex is
/// popped; false when the open heap drains or the expansion limit runs
/// out.
pub(crate) fn best_first_search<P: ComputeCost>(
    graph: &Graph,
    state: &mut SearchState,
    store: &mut VertexStore,
    policy: &P,
    source: NodeId,
    goal: NodeId,
    max_expansions: usize,
) -> bool {
    state.path.clear();
    state.expanded.clear();
    store.clear();
    state.goal_loc = graph.node(goal).point;

    let mut start = SearchNode::new(source);
    start.g = 0.0;
    start.h = state.h(graph.node(source).point);
    start.calc_key(0.0);
    start.state = NodeState::Open;
    store.update(start);

    let mut expansions = 0;
    while let Some((_, u)) = store.pop_min() {
        expansions += 1;
        if expansions > max_expansions {
            warn!("[Search] expansion limit of {max_expansions} exhausted");
            return false;
        }

        state.expanded.push(graph.node(u).point);

        if u == goal {
            state.assemble_path(store, graph, u);
            return true;
        }

        let s = store.node(u).clone();
        let neighbors: Vec<NodeId> = graph.node(u).neighbors.iter().copied().collect();
        for id in neighbors {
            if store.get(id).map(|n| n.state) == Some(NodeState::Closed) {
                continue;
            }

            let mut sp = match store.get(id) {
                Some(existing) => existing.clone(),
                None => SearchNode::new(id),
            };

            policy.compute_cost(state, store, graph, &s, &mut sp);

            sp.state = NodeState::Open;
            store.update(sp);
        }
    }

    debug!("[Search] open heap drained after {expansions} expansions, no path");
    false
}
