//! Simulation parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult, ensure_non_negative, ensure_positive};

/// Configuration for the spring-electrical simulation.
///
/// Deserializes from camelCase keys with every field optional, so a JS
/// caller can pass `{ repulsion: 800 }` and take defaults for the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Spring constant for the first edge between a node pair (default: 400).
    pub stiffness: f32,
    /// Coulomb constant for node-node repulsion (default: 400).
    /// Also scales the pull toward the origin.
    pub repulsion: f32,
    /// Velocity multiplier applied every step, in (0, 1) (default: 0.5).
    pub damping: f32,
    /// Total kinetic energy below which the layout counts as settled
    /// (default: 0.01).
    pub threshold: f32,
    /// Simulated time advanced per step (default: 0.03).
    pub physics_time_step: f32,
    /// Wall-clock delay between scheduled steps, in milliseconds (default: 10).
    pub tick_interval_ms: u32,
    /// Seed for initial point placement. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stiffness: 400.0,
            repulsion: 400.0,
            damping: 0.5,
            threshold: 0.01,
            physics_time_step: 0.03,
            tick_interval_ms: 10,
            seed: None,
        }
    }
}

impl LayoutConfig {
    /// Default parameters with the given stiffness, repulsion and damping.
    pub fn new(stiffness: f32, repulsion: f32, damping: f32) -> Self {
        Self {
            stiffness,
            repulsion,
            damping,
            ..Self::default()
        }
    }

    /// Builder-style seed setter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Wall-clock tick interval.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }

    /// Reject parameters the integrator cannot work with.
    pub fn validate(&self) -> LayoutResult<()> {
        ensure_non_negative("stiffness", self.stiffness)?;
        ensure_non_negative("repulsion", self.repulsion)?;
        ensure_non_negative("threshold", self.threshold)?;

        if !(self.damping.is_finite() && self.damping > 0.0 && self.damping < 1.0) {
            return Err(LayoutError::InvalidConfig {
                field: "damping",
                value: self.damping,
                reason: "must be in (0, 1)",
            });
        }
        ensure_positive("physics_time_step", self.physics_time_step)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = LayoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.physics_time_step, 0.03);
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_rejects_bad_damping() {
        for damping in [0.0, 1.0, -0.2, f32::NAN] {
            let config = LayoutConfig::new(400.0, 400.0, damping);
            assert!(
                matches!(
                    config.validate(),
                    Err(LayoutError::InvalidConfig { field: "damping", .. })
                ),
                "damping {damping} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_negative_and_non_finite() {
        let config = LayoutConfig {
            repulsion: -1.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LayoutConfig {
            physics_time_step: 0.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LayoutConfig {
            stiffness: f32::INFINITY,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_stiffness_allowed() {
        let config = LayoutConfig::new(0.0, 400.0, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_seed() {
        let config = LayoutConfig::default().with_seed(9);
        assert_eq!(config.seed, Some(9));
    }
}
