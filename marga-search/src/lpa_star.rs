//! Lifelong Planning A* on an occupancy grid.
//!
//! Every cell gets a search record at construction. The planner maintains
//! the LPA* invariants across calls:
//!
//! - `rhs(u)` is the one-step lookahead over u's predecessors;
//!   `rhs(source)` is pinned to zero
//! - a vertex sits on the open heap exactly when it is locally
//!   inconsistent (`g != rhs` beyond tolerance)
//!
//! [`LpaStarPlanner::map_change`] feeds occupancy updates to the grid and
//! dirties the affected vertices; the next
//! [`LpaStarPlanner::compute_shortest_path`] repairs them in key order,
//! reusing all untouched state from the previous search. That reuse is the
//! point: replanning after a local map change expands a fraction of the
//! vertices a fresh search would.

use log::{debug, trace, warn};

use kshetra_map::{GridCoord, GridGraph, NodeId, OccupancyGrid, Point2D};

use crate::base::SearchState;
use crate::error::PlanError;
use crate::key::Key;
use crate::node::{NodeState, SearchNode};
use crate::store::VertexStore;

/// Incremental shortest-path planner over a grid-shaped graph.
pub struct LpaStarPlanner {
    pub(crate) graph: GridGraph,
    pub(crate) grid: OccupancyGrid,
    pub(crate) store: VertexStore,
    pub(crate) source_id: NodeId,
    pub(crate) goal_id: NodeId,
    pub(crate) km: f64,
    pub(crate) state: SearchState,
}

impl LpaStarPlanner {
    /// Create a planner over a grid and its graph.
    ///
    /// The graph must cover the grid cell-for-cell (row-major ids). All
    /// vertices are materialized up front; the source starts as the only
    /// inconsistent (queued) vertex.
    pub fn new(
        graph: GridGraph,
        grid: OccupancyGrid,
        source: GridCoord,
        goal: GridCoord,
    ) -> Result<Self, PlanError> {
        let graph_dims = (graph.width(), graph.height());
        if graph_dims != grid.dimensions() {
            return Err(PlanError::DimensionMismatch {
                graph: graph_dims,
                grid: grid.dimensions(),
            });
        }
        if !graph.contains(source) {
            return Err(PlanError::OutOfBounds(source));
        }
        if !graph.contains(goal) {
            return Err(PlanError::OutOfBounds(goal));
        }

        let source_id = graph.id_at(source);
        let goal_id = graph.id_at(goal);

        let mut state = SearchState::new();
        state.goal_loc = graph.graph().node(goal_id).point;

        let mut store = VertexStore::with_capacity(graph.graph().len());
        for node in graph.graph().iter() {
            store.update(SearchNode::new(node.id));
        }

        let mut src = store.node(source_id).clone();
        src.rhs = 0.0;
        src.h = state.h(graph.graph().node(source_id).point);
        src.calc_key(0.0);
        src.state = NodeState::Open;
        store.update(src);

        trace!(
            "[LpaStar] initialized {}x{} grid, source ({}, {}), goal ({}, {})",
            graph.width(),
            graph.height(),
            source.x,
            source.y,
            goal.x,
            goal.y
        );

        Ok(Self {
            graph,
            grid,
            store,
            source_id,
            goal_id,
            km: 0.0,
            state,
        })
    }

    /// Repair the search until the goal is settled.
    ///
    /// Returns true when a path exists; retrieve it with
    /// [`LpaStarPlanner::path`]. Persisted (g, rhs) state from previous
    /// calls is reused, so after a [`LpaStarPlanner::map_change`] only the
    /// disturbed region is re-expanded.
    pub fn compute_shortest_path(&mut self) -> bool {
        self.state.path.clear();
        self.state.expanded.clear();

        while let Some((k_old, u)) = self.store.peek_min() {
            let anchor = self.anchor_key();
            if k_old.greater_than(&anchor) && self.store.node(self.goal_id).is_consistent() {
                break;
            }

            self.store.pop_min();

            let mut node = self.store.node(u).clone();
            node.h = self.state.h(self.graph.graph().node(u).point);
            node.calc_key(self.km);

            if k_old.less_than(&node.key) {
                // popped under a stale, too-small key: requeue and retry
                node.state = NodeState::Open;
                self.store.update(node);
            } else if node.g > node.rhs {
                // over-consistent: commit the cheaper cost, relax successors
                node.g = node.rhs;
                self.store.update(node);
                for id in self.neighbor_ids(u) {
                    self.update_vertex(id);
                }
            } else {
                // under-consistent: invalidate and re-evaluate u with its successors
                node.g = f64::INFINITY;
                self.store.update(node);
                self.update_vertex(u);
                for id in self.neighbor_ids(u) {
                    self.update_vertex(id);
                }
            }
        }

        let goal = self.store.node(self.goal_id);
        if goal.is_consistent() && goal.g.is_finite() {
            self.assemble_path();
            !self.state.path.is_empty()
        } else {
            debug!(
                "[LpaStar] no path: goal rhs={}, {} vertices still queued",
                goal.rhs,
                self.store.open_len()
            );
            false
        }
    }

    /// Apply a batch of occupancy updates and dirty the affected vertices.
    ///
    /// Returns true iff any cell's traversability actually changed; in
    /// that case the caller must run
    /// [`LpaStarPlanner::compute_shortest_path`] again to converge.
    pub fn map_change(&mut self, updates: &[(GridCoord, u8)]) -> bool {
        self.state.expanded.clear();

        let flags = self.grid.update_cells(updates);
        let mut any = false;

        for (&(coord, _), changed) in updates.iter().zip(flags) {
            if !changed {
                continue;
            }
            any = true;

            // both directed edge sets incident to the cell changed cost
            let id = self.graph.id_at(coord);
            self.update_vertex(id);
            for neighbor in self.neighbor_ids(id) {
                self.update_vertex(neighbor);
            }
        }

        if any {
            trace!(
                "[LpaStar] map change dirtied {} queued vertices",
                self.store.open_len()
            );
        }
        any
    }

    /// The most recent path, goal-first.
    pub fn path(&self) -> &[Point2D] {
        &self.state.path
    }

    /// Vertices touched by update_vertex during the most recent call.
    pub fn expanded_nodes(&self) -> &[Point2D] {
        &self.state.expanded
    }

    /// The planner's view of the occupancy grid.
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Source cell (rhs pinned to zero).
    pub fn source(&self) -> GridCoord {
        self.graph.coord_of(self.source_id)
    }

    /// Goal cell (the query anchor).
    pub fn goal(&self) -> GridCoord {
        self.graph.coord_of(self.goal_id)
    }

    /// Recompute one vertex's lookahead and restore its queue membership.
    fn update_vertex(&mut self, u: NodeId) {
        let u_point = self.graph.graph().node(u).point;
        self.state.expanded.push(u_point);

        let mut node = self.store.node(u).clone();

        if u != self.source_id {
            node.rhs = f64::INFINITY;
            node.parent = None;
            for &p in &self.graph.graph().node(u).neighbors {
                let cost = self.store.node(p).g + self.edge_cost(p, u);
                if cost < node.rhs {
                    node.rhs = cost;
                    node.parent = Some(p);
                }
            }
            node.h = self.state.h(u_point);
            node.calc_key(self.km);
        }

        node.state = if node.is_consistent() {
            NodeState::Closed
        } else {
            NodeState::Open
        };
        self.store.update(node);
    }

    /// Traversal cost of the directed edge p -> u under current occupancy.
    fn edge_cost(&self, p: NodeId, u: NodeId) -> f64 {
        if self.grid.is_free(self.graph.coord_of(p)) && self.grid.is_free(self.graph.coord_of(u)) {
            self.graph
                .graph()
                .node(p)
                .point
                .distance(&self.graph.graph().node(u).point)
        } else {
            f64::INFINITY
        }
    }

    /// The goal key under the current heuristic baseline, computed fresh.
    fn anchor_key(&self) -> Key {
        let goal = self.store.node(self.goal_id);
        let h = self.state.h(self.graph.graph().node(self.goal_id).point);
        let m = goal.g.min(goal.rhs);
        Key::new(m + h + self.km, m)
    }

    fn neighbor_ids(&self, u: NodeId) -> Vec<NodeId> {
        self.graph.graph().node(u).neighbors.iter().copied().collect()
    }

    /// Walk from the goal to the source, re-relaxing each step against
    /// current edge costs so the emitted path reflects the grid as it is
    /// now, not as it was when a vertex was last expanded.
    fn assemble_path(&mut self) {
        self.state.path.clear();

        let mut current = self.goal_id;
        self.state.path.push(self.graph.graph().node(current).point);

        let max_steps = self.graph.graph().len();
        let mut steps = 0;

        while current != self.source_id {
            steps += 1;
            if steps > max_steps {
                warn!("[LpaStar] path assembly cycled; discarding path");
                self.state.path.clear();
                return;
            }

            let mut best: Option<(NodeId, f64)> = None;
            for p in self.neighbor_ids(current) {
                let cost = self.store.node(p).g + self.edge_cost(p, current);
                if best.map_or(true, |(_, c)| cost < c) {
                    best = Some((p, cost));
                }
            }

            match best {
                Some((p, cost)) if cost.is_finite() => {
                    let mut node = self.store.node(current).clone();
                    node.parent = Some(p);
                    self.store.update(node);

                    current = p;
                    self.state.path.push(self.graph.graph().node(current).point);
                }
                _ => {
                    warn!("[LpaStar] path assembly stranded at vertex {current}");
                    self.state.path.clear();
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astar::AStarPlanner;
    use crate::path_length;
    use kshetra_map::{Connectivity, OCCUPIED};

    const SQRT_2: f64 = std::f64::consts::SQRT_2;

    fn planner_on(
        grid: OccupancyGrid,
        source: (i32, i32),
        goal: (i32, i32),
    ) -> LpaStarPlanner {
        let graph = GridGraph::from_grid(&grid, Connectivity::Eight);
        LpaStarPlanner::new(
            graph,
            grid,
            GridCoord::new(source.0, source.1),
            GridCoord::new(goal.0, goal.1),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_mismatched_graph() {
        let grid = OccupancyGrid::new(5, 5, 1.0).unwrap();
        let other = OccupancyGrid::new(4, 4, 1.0).unwrap();
        let graph = GridGraph::from_grid(&other, Connectivity::Eight);
        let result =
            LpaStarPlanner::new(graph, grid, GridCoord::new(0, 0), GridCoord::new(3, 3));
        assert!(matches!(result, Err(PlanError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_rejects_out_of_bounds_endpoints() {
        let grid = OccupancyGrid::new(5, 5, 1.0).unwrap();
        let graph = GridGraph::from_grid(&grid, Connectivity::Eight);
        let result =
            LpaStarPlanner::new(graph, grid, GridCoord::new(0, 0), GridCoord::new(5, 5));
        assert!(matches!(result, Err(PlanError::OutOfBounds(_))));
    }

    #[test]
    fn test_static_grid_matches_astar() {
        // same 3x3 single-block world for both planners
        let mut grid = OccupancyGrid::new(3, 3, 1.0).unwrap();
        grid.set_occupancy(GridCoord::new(1, 1), OCCUPIED);

        let free_graph = GridGraph::from_free_cells(&grid, Connectivity::Eight);
        let mut astar = AStarPlanner::with_defaults(free_graph.graph());
        assert!(astar.compute_shortest_path(
            free_graph.id_at(GridCoord::new(0, 0)),
            free_graph.id_at(GridCoord::new(2, 2)),
        ));

        let mut lpa = planner_on(grid, (0, 0), (2, 2));
        assert!(lpa.compute_shortest_path());

        let astar_len = path_length(astar.path());
        let lpa_len = path_length(lpa.path());
        assert!((astar_len - lpa_len).abs() < 1e-9);
        assert!((lpa_len - (2.0 + SQRT_2)).abs() < 1e-9);
    }

    #[test]
    fn test_free_grid_diagonal() {
        let grid = OccupancyGrid::new(5, 5, 1.0).unwrap();
        let mut lpa = planner_on(grid, (0, 0), (4, 4));
        assert!(lpa.compute_shortest_path());
        assert!((path_length(lpa.path()) - 4.0 * SQRT_2).abs() < 1e-9);
        assert_eq!(lpa.path().len(), 5);

        // goal-first ordering
        let first = lpa.path()[0];
        assert!((first.x - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_replan_after_distant_change_reuses_everything() {
        let grid = OccupancyGrid::new(7, 7, 1.0).unwrap();
        let mut lpa = planner_on(grid, (0, 0), (6, 6));

        assert!(lpa.compute_shortest_path());
        let first_expanded = lpa.expanded_nodes().len();
        assert!(first_expanded > 0);

        // a corner cell nowhere near the optimal corridor
        assert!(lpa.map_change(&[(GridCoord::new(6, 0), OCCUPIED)]));
        assert!(lpa.compute_shortest_path());

        // nothing relevant changed: the repair touches almost nothing and
        // the path survives verbatim
        assert!(lpa.expanded_nodes().len() < first_expanded);
        assert!((path_length(lpa.path()) - 6.0 * SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_replan_detour_matches_fresh_search() {
        let grid = OccupancyGrid::new(5, 5, 1.0).unwrap();
        let mut lpa = planner_on(grid, (0, 0), (4, 4));

        assert!(lpa.compute_shortest_path());
        assert!((path_length(lpa.path()) - 4.0 * SQRT_2).abs() < 1e-9);

        // block most of column 2; only (2, 4) stays open
        let updates: Vec<(GridCoord, u8)> = (0..4)
            .map(|y| (GridCoord::new(2, y), OCCUPIED))
            .collect();
        assert!(lpa.map_change(&updates));
        assert!(lpa.compute_shortest_path());

        let detour = path_length(lpa.path());
        assert!(detour > 4.0 * SQRT_2 + 1e-9);

        // the path threads the (2, 4) gap and avoids every blocked cell
        for point in lpa.path() {
            let cell = lpa.grid().world_to_grid(*point);
            assert!(lpa.grid().is_free(cell));
        }

        // a from-scratch search on the mutated grid agrees on the cost
        let mut fresh = planner_on(lpa.grid().clone(), (0, 0), (4, 4));
        assert!(fresh.compute_shortest_path());
        assert!((path_length(fresh.path()) - detour).abs() < 1e-9);
    }

    #[test]
    fn test_map_change_reports_no_change() {
        let grid = OccupancyGrid::new(5, 5, 1.0).unwrap();
        let mut lpa = planner_on(grid, (0, 0), (4, 4));
        assert!(lpa.compute_shortest_path());

        // writing FREE over FREE changes nothing and dirties nothing
        assert!(!lpa.map_change(&[(GridCoord::new(2, 2), 0)]));
        assert!(lpa.expanded_nodes().is_empty());
    }

    #[test]
    fn test_no_path_after_sealing_wall() {
        let grid = OccupancyGrid::new(5, 5, 1.0).unwrap();
        let mut lpa = planner_on(grid, (0, 2), (4, 2));
        assert!(lpa.compute_shortest_path());

        let wall: Vec<(GridCoord, u8)> =
            (0..5).map(|y| (GridCoord::new(2, y), OCCUPIED)).collect();
        assert!(lpa.map_change(&wall));
        assert!(!lpa.compute_shortest_path());
        assert!(lpa.path().is_empty());

        // reopening one cell restores a route
        assert!(lpa.map_change(&[(GridCoord::new(2, 0), 0)]));
        assert!(lpa.compute_shortest_path());
        assert!(!lpa.path().is_empty());
    }

    #[test]
    fn test_rhs_lookahead_law() {
        let mut grid = OccupancyGrid::new(4, 4, 1.0).unwrap();
        grid.set_occupancy(GridCoord::new(2, 1), OCCUPIED);
        let mut lpa = planner_on(grid, (0, 0), (3, 3));
        assert!(lpa.compute_shortest_path());

        for node in lpa.graph.graph().iter() {
            if node.id == lpa.source_id {
                assert!((lpa.store.node(node.id).rhs - 0.0).abs() < 1e-12);
                continue;
            }
            let rhs = lpa.store.node(node.id).rhs;
            let expected = node
                .neighbors
                .iter()
                .map(|&p| lpa.store.node(p).g + lpa.edge_cost(p, node.id))
                .fold(f64::INFINITY, f64::min);
            if rhs.is_finite() || expected.is_finite() {
                assert!(
                    (rhs - expected).abs() < 1e-9,
                    "vertex {} rhs {} != lookahead {}",
                    node.id,
                    rhs,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_consistency_and_partition_at_termination() {
        let mut grid = OccupancyGrid::new(5, 5, 1.0).unwrap();
        grid.set_occupancy(GridCoord::new(2, 2), OCCUPIED);
        let mut lpa = planner_on(grid, (0, 0), (4, 4));
        assert!(lpa.compute_shortest_path());

        assert!(lpa.store.partition_intact());

        // every settled vertex is either consistent or keyed past the goal
        let anchor = lpa.anchor_key();
        for node in lpa.graph.graph().iter() {
            let record = lpa.store.node(node.id);
            assert!(
                record.is_consistent() || record.key.greater_than(&anchor),
                "vertex {} inconsistent below the goal key",
                node.id
            );
        }
    }
}
