//! Obstacle polygons and buffered segment intersection tests.
//!
//! The intersection test clips the query segment against each polygon edge
//! (Cyrus-Beck entering/leaving parameters) and additionally rejects
//! segments that pass within the buffer radius of a vertex, so a clearance
//! margin around obstacles is honored by line-of-sight checks.

use crate::error::MapError;
use crate::point::Point2D;

/// A convex obstacle polygon with counter-clockwise winding.
#[derive(Clone, Debug)]
pub struct Polygon {
    vertices: Vec<Point2D>,
}

impl Polygon {
    /// Create a polygon from vertices in counter-clockwise order.
    pub fn new(vertices: Vec<Point2D>) -> Result<Self, MapError> {
        if vertices.len() < 3 {
            return Err(MapError::DegeneratePolygon(vertices.len()));
        }
        Ok(Self { vertices })
    }

    /// Polygon vertices.
    #[inline]
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// Test whether the segment `a -> b`, inflated by `buffer`, intersects
    /// this polygon.
    ///
    /// Starts from the assumption of a collision and tries to prove
    /// separation: once the leaving parameter drops below the entering
    /// parameter the segment cannot cross the polygon interior. Vertex
    /// proximity within `buffer` re-establishes the collision regardless.
    pub fn intersects_segment(&self, a: Point2D, b: Point2D, buffer: f64) -> bool {
        let mut collides = true;

        let mut t_entering = 0.0_f64;
        let mut t_leaving = 1.0_f64;

        let n = self.vertices.len();
        for i in 0..n {
            let va = self.vertices[i];
            let vb = self.vertices[(i + 1) % n];

            // outward normal for counter-clockwise winding
            let normal = Point2D::new(vb.y - va.y, -(vb.x - va.x)).normalize();

            let segment = b - a;
            let to_start = a - va;

            let num = -normal.dot(&to_start);
            let den = normal.dot(&segment);

            if den == 0.0 {
                // parallel to this edge: outside its half-plane means
                // outside the polygon
                if num < 0.0 {
                    collides = false;
                }
            } else {
                let t = num / den;

                if den < 0.0 {
                    // potentially entering the polygon
                    t_entering = t_entering.max(t);
                } else {
                    // potentially leaving the polygon
                    t_leaving = t_leaving.min(t);
                }

                if t_leaving < t_entering {
                    collides = false;
                }
            }

            if point_near_segment(a, b, va, buffer) {
                return true;
            }
        }

        collides
    }
}

/// Whether point `p` lies within `radius` of the segment `a -> b`.
pub fn point_near_segment(a: Point2D, b: Point2D, p: Point2D, radius: f64) -> bool {
    let ab = b - a;
    let len_sq = ab.dot(&ab);

    let t = if len_sq > 0.0 {
        ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let closest = a + ab * t;
    closest.distance(&p) <= radius
}
