//! Axis-aligned bounding boxes around the simulated points.

use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// Half-extent of the box every bounding box starts from.
pub const DEFAULT_EXTENT: f32 = 2.0;

/// Fraction of the box's size added on every side.
pub const DEFAULT_PADDING: f32 = 0.07;

/// An axis-aligned box given by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox<V> {
    pub min: V,
    pub max: V,
}

impl<V: Vector> BoundingBox<V> {
    /// The unpadded default box, spanning `±DEFAULT_EXTENT` on every axis.
    pub fn default_extent() -> Self {
        Self {
            min: V::identity() * -DEFAULT_EXTENT,
            max: V::identity() * DEFAULT_EXTENT,
        }
    }

    /// Grow the default box to cover `positions`, then pad it by
    /// `DEFAULT_PADDING` of its size along each axis.
    pub fn enclosing(positions: impl IntoIterator<Item = V>) -> Self {
        let bounds = positions
            .into_iter()
            .fold(Self::default_extent(), |bounds, position| Self {
                min: bounds.min.component_min(position),
                max: bounds.max.component_max(position),
            });

        let padding = bounds.size() * DEFAULT_PADDING;
        Self {
            min: bounds.min - padding,
            max: bounds.max + padding,
        }
    }

    /// Size along each axis.
    pub fn size(&self) -> V {
        self.max - self.min
    }

    /// Whether `position` lies inside the box (boundary included).
    pub fn contains(&self, position: V) -> bool {
        self.min.component_min(position) == self.min && self.max.component_max(position) == self.max
    }
}
