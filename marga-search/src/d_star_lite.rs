//! D* Lite: LPA* with a moving query anchor.
//!
//! The search runs backward: the physical goal seeds the (g, rhs) store
//! and the robot's cell is the query anchor the heuristic measures
//! against. As the robot drives, [`DStarLitePlanner::update_robot_loc`]
//! shifts the anchor and folds the hop distance into the heuristic offset
//! `km`, which keeps every previously computed key a valid lower bound
//! without re-keying the heap.

use log::trace;

use kshetra_map::{GridCoord, GridGraph, OccupancyGrid, Point2D};

use crate::error::PlanError;
use crate::lpa_star::LpaStarPlanner;

/// Incremental planner for a robot replanning as it moves.
pub struct DStarLitePlanner {
    inner: LpaStarPlanner,
}

impl DStarLitePlanner {
    /// Create a planner with the robot at `robot` and the target at
    /// `goal`.
    ///
    /// Internally the roles are swapped: the target becomes the search
    /// source, the robot cell the anchor, so the (g, rhs) store survives
    /// robot motion untouched.
    pub fn new(
        graph: GridGraph,
        grid: OccupancyGrid,
        robot: GridCoord,
        goal: GridCoord,
    ) -> Result<Self, PlanError> {
        Ok(Self {
            inner: LpaStarPlanner::new(graph, grid, goal, robot)?,
        })
    }

    /// Move the query anchor to the robot's new cell.
    ///
    /// Accumulates the anchor displacement into `km` so keys computed
    /// before the move keep their relative order. No other search state is
    /// touched.
    ///
    /// # Panics
    /// Panics if `new_loc` is outside the grid.
    pub fn update_robot_loc(&mut self, new_loc: GridCoord) {
        let old_anchor = self.inner.state.goal_loc;

        let id = self.inner.graph.id_at(new_loc);
        self.inner.goal_id = id;
        self.inner.state.goal_loc = self.inner.graph.graph().node(id).point;

        let hop = old_anchor.distance(&self.inner.state.goal_loc);
        self.inner.km += hop;

        trace!(
            "[DStarLite] anchor -> ({}, {}), km += {:.3} (now {:.3})",
            new_loc.x,
            new_loc.y,
            hop,
            self.inner.km
        );
    }

    /// Repair the search until the robot's cell is settled.
    pub fn compute_shortest_path(&mut self) -> bool {
        self.inner.compute_shortest_path()
    }

    /// Apply occupancy updates; see [`LpaStarPlanner::map_change`].
    pub fn map_change(&mut self, updates: &[(GridCoord, u8)]) -> bool {
        self.inner.map_change(updates)
    }

    /// The most recent path, robot-first, ending at the physical goal.
    pub fn path(&self) -> &[Point2D] {
        self.inner.path()
    }

    /// Vertices touched during the most recent call.
    pub fn expanded_nodes(&self) -> &[Point2D] {
        self.inner.expanded_nodes()
    }

    /// The planner's view of the occupancy grid.
    pub fn grid(&self) -> &OccupancyGrid {
        self.inner.grid()
    }

    /// The robot's current cell (the query anchor).
    pub fn robot(&self) -> GridCoord {
        self.inner.goal()
    }

    /// The physical goal cell (the search source).
    pub fn goal(&self) -> GridCoord {
        self.inner.source()
    }
}
