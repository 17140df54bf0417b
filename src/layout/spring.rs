//! Springs, one per graph edge.

use super::point::PointHandle;

/// A spring connecting two points.
///
/// Only the first edge between a pair of nodes gets a real spring. Every
/// further parallel edge gets a degenerate one (zero length, zero stiffness)
/// over the same point pair, so it can still be asked for its endpoints
/// without pulling twice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub point1: PointHandle,
    pub point2: PointHandle,
    /// Rest length.
    pub length: f32,
    /// Stiffness.
    pub k: f32,
}

impl Spring {
    pub fn new(point1: PointHandle, point2: PointHandle, length: f32, k: f32) -> Self {
        Self {
            point1,
            point2,
            length,
            k,
        }
    }

    /// A zero-force spring aliasing an existing point pair.
    pub fn degenerate(point1: PointHandle, point2: PointHandle) -> Self {
        Self::new(point1, point2, 0.0, 0.0)
    }

    /// Whether this spring contributes no force.
    pub fn is_degenerate(&self) -> bool {
        self.k == 0.0
    }
}
