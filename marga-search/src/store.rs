//! Combined vertex store: one owning arena, id-only containers.
//!
//! Every materialized [`SearchNode`] lives in the arena; the open heap
//! holds ids only. A node is on the heap exactly when its state tag says
//! `Open`: [`VertexStore::update`] re-syncs heap membership and key on
//! every write-back, so the open/standby partition can never be observed
//! half-moved. Standby is simply the arena minus the heap.

use std::collections::HashMap;

use kshetra_map::NodeId;

use crate::key::Key;
use crate::node::{NodeState, SearchNode};
use crate::open::OpenSet;

/// Arena of search nodes plus the open heap over them.
#[derive(Clone, Debug, Default)]
pub struct VertexStore {
    nodes: HashMap<NodeId, SearchNode>,
    open: OpenSet,
}

impl VertexStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store sized for `capacity` vertices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
            open: OpenSet::new(),
        }
    }

    /// Number of materialized vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no vertex is materialized.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of vertices on the open heap.
    #[inline]
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Whether the open heap is empty.
    #[inline]
    pub fn open_is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Whether a vertex is materialized.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Locate a vertex wherever it resides.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&SearchNode> {
        self.nodes.get(&id)
    }

    /// Locate a vertex, panicking on a miss.
    ///
    /// A missing vertex here means the caller holds a stale or foreign id;
    /// that is a programming error, not a recoverable condition.
    #[inline]
    pub fn node(&self, id: NodeId) -> &SearchNode {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| panic!("no search node for vertex {id}"))
    }

    /// Write a vertex back, keeping the heap in lockstep.
    ///
    /// Heap membership follows the node's state tag: an `Open` node is
    /// pushed or re-keyed as needed, anything else is evicted from the
    /// heap. This is the single mutation path, so a vertex moves between
    /// open and standby atomically.
    pub fn update(&mut self, node: SearchNode) {
        let id = node.id;
        let queued = self.open.contains(id);
        match node.state {
            NodeState::Open => {
                if queued {
                    self.open.update(id, node.key);
                } else {
                    self.open.push(node.key, id);
                }
            }
            NodeState::New | NodeState::Closed => {
                if queued {
                    self.open.remove(id);
                }
            }
        }
        self.nodes.insert(id, node);
    }

    /// Smallest queued entry without removing it.
    #[inline]
    pub fn peek_min(&self) -> Option<(Key, NodeId)> {
        self.open.peek()
    }

    /// Pop the minimum vertex off the heap and park it on standby.
    pub fn pop_min(&mut self) -> Option<(Key, NodeId)> {
        let (key, id) = self.open.pop()?;
        let node = self
            .nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("queued vertex {id} missing from arena"));
        node.state = NodeState::Closed;
        Some((key, id))
    }

    /// Drop all vertices and heap entries.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.open.clear();
    }

    /// Diagnostic: the heap and the state tags agree on membership.
    pub fn partition_intact(&self) -> bool {
        let tagged_open = self
            .nodes
            .values()
            .filter(|n| n.state == NodeState::Open)
            .count();
        tagged_open == self.open.len()
            && self
                .nodes
                .values()
                .all(|n| (n.state == NodeState::Open) == self.open.contains(n.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_node(id: NodeId, k1: f64) -> SearchNode {
        let mut node = SearchNode::new(id);
        node.g = k1;
        node.rhs = k1;
        node.h = 0.0;
        node.calc_key(0.0);
        node.state = NodeState::Open;
        node
    }

    #[test]
    fn test_update_routes_heap_membership() {
        let mut store = VertexStore::new();
        store.update(SearchNode::new(0));
        assert_eq!(store.open_len(), 0);

        store.update(open_node(0, 2.0));
        assert_eq!(store.open_len(), 1);
        assert!(store.partition_intact());

        // closing the node evicts it from the heap in the same call
        let mut node = store.node(0).clone();
        node.state = NodeState::Closed;
        store.update(node);
        assert_eq!(store.open_len(), 0);
        assert!(store.partition_intact());
    }

    #[test]
    fn test_pop_min_parks_on_standby() {
        let mut store = VertexStore::new();
        store.update(open_node(1, 3.0));
        store.update(open_node(2, 1.0));
        store.update(open_node(3, 2.0));

        let (_, id) = store.pop_min().unwrap();
        assert_eq!(id, 2);
        assert_eq!(store.node(2).state, NodeState::Closed);
        assert_eq!(store.len(), 3);
        assert_eq!(store.open_len(), 2);
        assert!(store.partition_intact());
    }

    #[test]
    fn test_rekey_open_node() {
        let mut store = VertexStore::new();
        store.update(open_node(1, 5.0));
        store.update(open_node(2, 6.0));

        let mut node = store.node(2).clone();
        node.g = 0.5;
        node.rhs = 0.5;
        node.calc_key(0.0);
        store.update(node);

        assert_eq!(store.peek_min().map(|(_, id)| id), Some(2));
        assert!(store.partition_intact());
    }

    #[test]
    #[should_panic(expected = "no search node")]
    fn test_missing_vertex_panics() {
        let store = VertexStore::new();
        store.node(7);
    }
}
