//! Lexicographic priority keys with tolerant comparison.

/// Tolerance for cost and key comparisons.
///
/// Two k1 values closer than this are treated as equal and ordered by k2
/// instead. The same tolerance decides local consistency of a vertex.
pub const EPSILON: f64 = 1e-12;

/// Priority of a vertex on the open heap.
///
/// `k1 = min(g, rhs) + h + km` plays the role of the f-cost; `k2 = min(g,
/// rhs)` breaks ties. Every heap operation orders keys through
/// [`Key::less_than`], so the tolerant comparison is the only ordering the
/// heap ever sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key {
    /// Primary cost: min(g, rhs) + h + km.
    pub k1: f64,
    /// Tie-break cost: min(g, rhs).
    pub k2: f64,
}

impl Key {
    /// Key of an undiscovered vertex.
    pub const INFINITE: Key = Key {
        k1: f64::INFINITY,
        k2: f64::INFINITY,
    };

    /// Create a key from its components.
    #[inline]
    pub fn new(k1: f64, k2: f64) -> Self {
        Self { k1, k2 }
    }

    /// Strictly smaller priority: k1 decides outside the tolerance band,
    /// k2 inside it.
    #[inline]
    pub fn less_than(&self, other: &Key) -> bool {
        if (self.k1 - other.k1).abs() <= EPSILON {
            self.k2 < other.k2
        } else {
            self.k1 < other.k1
        }
    }

    /// Strictly larger priority.
    #[inline]
    pub fn greater_than(&self, other: &Key) -> bool {
        other.less_than(self)
    }

    /// Both components within tolerance.
    #[inline]
    pub fn approx_eq(&self, other: &Key) -> bool {
        (self.k1 - other.k1).abs() <= EPSILON && (self.k2 - other.k2).abs() <= EPSILON
    }
}
