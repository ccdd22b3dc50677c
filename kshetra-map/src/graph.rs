//! Search graphs over positioned nodes.
//!
//! A [`Graph`] is an ordered list of [`GraphNode`]s with dense ids and
//! symmetric neighbor sets; it is the input shape for the non-incremental
//! planners (roadmaps, visibility graphs). A [`GridGraph`] lays a graph
//! over an [`OccupancyGrid`], one node per cell with ids assigned by
//! row-major traversal, and is the input shape for the incremental
//! planners.

use std::collections::HashSet;

use crate::grid::OccupancyGrid;
use crate::point::{GridCoord, Point2D};

/// Dense node identifier.
pub type NodeId = usize;

/// A vertex of the search graph.
///
/// Immutable during a search: planners read the position and the neighbor
/// set, never write them.
#[derive(Clone, Debug)]
pub struct GraphNode {
    /// Unique dense id.
    pub id: NodeId,
    /// Position in world coordinates.
    pub point: Point2D,
    /// Ids of connected nodes.
    pub neighbors: HashSet<NodeId>,
}

impl GraphNode {
    /// Create an unconnected node.
    pub fn new(id: NodeId, point: Point2D) -> Self {
        Self {
            id,
            point,
            neighbors: HashSet::new(),
        }
    }

    /// Whether this node is connected to `other`.
    pub fn is_connected(&self, other: NodeId) -> bool {
        self.neighbors.contains(&other)
    }
}

/// An ordered sequence of graph nodes with dense ids.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a node, returning its id.
    pub fn add_node(&mut self, point: Point2D) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(GraphNode::new(id, point));
        id
    }

    /// Connect two nodes in both directions.
    ///
    /// # Panics
    /// Panics if either id is unknown.
    pub fn connect(&mut self, a: NodeId, b: NodeId) {
        assert!(a < self.nodes.len() && b < self.nodes.len(), "unknown node id");
        if a == b {
            return;
        }
        self.nodes[a].neighbors.insert(b);
        self.nodes[b].neighbors.insert(a);
    }

    /// Node by id.
    ///
    /// # Panics
    /// Panics if the id is unknown; a bad id here is a programming error.
    #[inline]
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    /// Node by id, if present.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }
}

/// Grid connectivity for graph construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
    /// Cardinal neighbors only.
    Four,
    /// Cardinal plus diagonal neighbors.
    Eight,
}

/// A graph laid over every cell of an occupancy grid.
///
/// Node ids follow row-major order (`id = y * width + x`); node positions
/// are cell centers in world coordinates.
#[derive(Clone, Debug)]
pub struct GridGraph {
    graph: Graph,
    width: usize,
    height: usize,
}

impl GridGraph {
    /// Build a graph connecting every neighboring cell pair, blocked or
    /// not. Incremental planners gate traversal by edge cost, so edges into
    /// currently blocked cells must exist for later occupancy changes to
    /// re-open them.
    pub fn from_grid(grid: &OccupancyGrid, connectivity: Connectivity) -> Self {
        Self::build(grid, connectivity, |_, _| true)
    }

    /// Build a graph connecting only free cell pairs. Suited to the
    /// non-incremental planners, which have no edge-cost gate.
    pub fn from_free_cells(grid: &OccupancyGrid, connectivity: Connectivity) -> Self {
        Self::build(grid, connectivity, |a, b| grid.is_free(a) && grid.is_free(b))
    }

    fn build<F>(grid: &OccupancyGrid, connectivity: Connectivity, mut link: F) -> Self
    where
        F: FnMut(GridCoord, GridCoord) -> bool,
    {
        let (width, height) = grid.dimensions();
        let mut graph = Graph::new();

        for y in 0..height {
            for x in 0..width {
                graph.add_node(grid.grid_to_world(GridCoord::new(x as i32, y as i32)));
            }
        }

        for y in 0..height {
            for x in 0..width {
                let coord = GridCoord::new(x as i32, y as i32);
                let id = y * width + x;
                let neighbors = match connectivity {
                    Connectivity::Four => coord.neighbors_4().to_vec(),
                    Connectivity::Eight => coord.neighbors_8().to_vec(),
                };
                for n in neighbors {
                    if grid.in_bounds(n) && link(coord, n) {
                        let nid = n.y as usize * width + n.x as usize;
                        graph.connect(id, nid);
                    }
                }
            }
        }

        Self {
            graph,
            width,
            height,
        }
    }

    /// The underlying graph.
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether a coordinate lies on this graph.
    #[inline]
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    /// Row-major node id of a cell.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn id_at(&self, coord: GridCoord) -> NodeId {
        assert!(
            self.contains(coord),
            "cell ({}, {}) outside {}x{} grid graph",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        coord.y as usize * self.width + coord.x as usize
    }

    /// Cell coordinate of a node id.
    #[inline]
    pub fn coord_of(&self, id: NodeId) -> GridCoord {
        GridCoord::new((id % self.width) as i32, (id / self.width) as i32)
    }
}
