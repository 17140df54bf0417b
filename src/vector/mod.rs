//! Fixed-dimension vector primitives for the simulation.
//!
//! The simulation engine is generic over the [`Vector`] capability set so the
//! same force and integration code drives both 2D and 3D layouts. The only
//! dimension-specific operations are the component-wise min/max used when
//! building bounding boxes.

mod vector2;
mod vector3;

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub};

use rand::Rng;

pub use vector2::Vector2;
pub use vector3::Vector3;

/// Half-width of the box random initial positions are drawn from.
pub const RANDOM_HALF_EXTENT: f32 = 5.0;

/// Capability set required by the simulation engine.
pub trait Vector:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Div<f32, Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + MulAssign<f32>
{
    /// Number of components.
    const DIM: usize;

    /// The zero vector.
    fn zero() -> Self;

    /// The vector with every component set to 1.0.
    fn identity() -> Self;

    /// A vector with every component drawn uniformly from
    /// `[-RANDOM_HALF_EXTENT, RANDOM_HALF_EXTENT)`.
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Euclidean length.
    fn magnitude(self) -> f32;

    /// Unit vector in the same direction.
    ///
    /// The zero vector normalizes to the zero vector.
    fn normalize(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            self / magnitude
        } else {
            Self::zero()
        }
    }

    /// Component-wise minimum.
    fn component_min(self, other: Self) -> Self;

    /// Component-wise maximum.
    fn component_max(self, other: Self) -> Self;

    /// Append the components in axis order (x, y[, z]) to a flat buffer.
    fn push_components(self, out: &mut Vec<f32>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vector2::zero().normalize(), Vector2::zero());
        assert_eq!(Vector3::zero().normalize(), Vector3::zero());
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = Vector2::new(3.0, 4.0).normalize();
        assert_close(v.magnitude(), 1.0);
        assert_close(v.x, 0.6);
        assert_close(v.y, 0.8);

        let w = Vector3::new(0.0, -2.0, 0.0).normalize();
        assert_eq!(w, Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_random_within_box() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let v = Vector3::random(&mut rng);
            let mut components = Vec::new();
            v.push_components(&mut components);
            for c in components {
                assert!((-RANDOM_HALF_EXTENT..RANDOM_HALF_EXTENT).contains(&c));
            }
        }
    }

    #[test]
    fn test_identity_and_components() {
        let mut flat = Vec::new();
        Vector2::identity().push_components(&mut flat);
        Vector3::identity().push_components(&mut flat);
        assert_eq!(flat, vec![1.0; 5]);
    }
}
