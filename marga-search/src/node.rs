//! Per-vertex search state.

use kshetra_map::NodeId;

use crate::key::{Key, EPSILON};

/// Where a vertex currently lives in the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// Never touched by the search.
    New,
    /// On the open heap.
    Open,
    /// Expanded (or parked on standby).
    Closed,
}

/// Mutable search record for one graph vertex.
///
/// `g` is the best known cost from the source, `rhs` the one-step
/// lookahead used by the incremental planners (the non-incremental ones
/// leave it at infinity and drive `g` directly). Costs start at
/// `f64::INFINITY`, which propagates correctly through the min/add
/// arithmetic in key derivation and edge relaxation.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Graph vertex this record belongs to.
    pub id: NodeId,
    /// Best known cost from the source.
    pub g: f64,
    /// One-step lookahead cost.
    pub rhs: f64,
    /// Heuristic to the goal.
    pub h: f64,
    /// Heap priority, derived by [`SearchNode::calc_key`].
    pub key: Key,
    /// Predecessor on the current best path.
    pub parent: Option<NodeId>,
    /// Container membership.
    pub state: NodeState,
}

impl SearchNode {
    /// Fresh record with all costs at infinity.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            g: f64::INFINITY,
            rhs: f64::INFINITY,
            h: f64::INFINITY,
            key: Key::INFINITE,
            parent: None,
            state: NodeState::New,
        }
    }

    /// Recompute the heap key from the current costs.
    ///
    /// `km` is the accumulated heuristic offset; zero for everything but
    /// D* Lite.
    pub fn calc_key(&mut self, km: f64) {
        let m = self.g.min(self.rhs);
        self.key = Key::new(m + self.h + km, m);
    }

    /// Local consistency: g equals rhs within tolerance.
    ///
    /// The exact-equality arm covers the infinity/infinity case, whose
    /// difference is NaN and must not reach the tolerance test.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.g == self.rhs || (self.g - self.rhs).abs() <= EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_consistent_at_infinity() {
        let node = SearchNode::new(3);
        assert!(node.g.is_infinite());
        assert!(node.rhs.is_infinite());
        assert!(node.is_consistent());
        assert!(node.parent.is_none());
        assert_eq!(node.state, NodeState::New);
    }

    #[test]
    fn test_calc_key_uses_min_of_g_and_rhs() {
        let mut node = SearchNode::new(0);
        node.g = 7.0;
        node.rhs = 3.0;
        node.h = 2.0;
        node.calc_key(0.0);
        assert!((node.key.k1 - 5.0).abs() < 1e-12);
        assert!((node.key.k2 - 3.0).abs() < 1e-12);

        node.calc_key(1.5);
        assert!((node.key.k1 - 6.5).abs() < 1e-12);
        assert!((node.key.k2 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_tolerance() {
        let mut node = SearchNode::new(0);
        node.g = 1.0;
        node.rhs = 1.0 + 1e-13;
        assert!(node.is_consistent());

        node.rhs = 1.0 + 1e-6;
        assert!(!node.is_consistent());

        node.g = f64::INFINITY;
        node.rhs = 4.0;
        assert!(!node.is_consistent());
    }
}
