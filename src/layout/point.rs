//! Simulated particles, one per graph node.

use crate::vector::Vector;

/// Non-owning handle to a [`Point`] in the engine's point cache.
///
/// Springs hold handles instead of references so the cache keeps sole
/// ownership of every point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointHandle(pub(crate) usize);

/// A particle with position, velocity, accumulated acceleration and mass.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<V> {
    pub(crate) position: V,
    pub(crate) velocity: V,
    pub(crate) acceleration: V,
    mass: f32,
}

impl<V: Vector> Point<V> {
    /// Create a point at rest.
    pub fn new(position: V, mass: f32) -> Self {
        Self {
            position,
            velocity: V::zero(),
            acceleration: V::zero(),
            mass,
        }
    }

    /// Accumulate a force for the current step (a = F / m).
    ///
    /// `mass` must be non-zero.
    #[inline]
    pub fn apply_force(&mut self, force: V) {
        self.acceleration += force / self.mass;
    }

    pub fn position(&self) -> V {
        self.position
    }

    pub fn velocity(&self) -> V {
        self.velocity
    }

    pub fn acceleration(&self) -> V {
        self.acceleration
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Kinetic energy, 0.5 * m * |v|^2.
    pub fn kinetic_energy(&self) -> f32 {
        let speed = self.velocity.magnitude();
        0.5 * self.mass * speed * speed
    }

    /// Advance velocity by the accumulated acceleration, damp it, and clear
    /// the accumulator.
    pub(crate) fn integrate_velocity(&mut self, dt: f32, damping: f32) {
        self.velocity += self.acceleration * dt;
        self.velocity *= damping;
        self.acceleration = V::zero();
    }

    pub(crate) fn integrate_position(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}
