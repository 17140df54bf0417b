//! Node identity and payload.
//!
//! The layout engine only needs two things from a node: a stable identity to
//! key its simulated point by, and a mass copied into that point when it is
//! first created.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Remains valid after other nodes are removed from the graph, so it can be
/// used as a long-lived cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Data record attached to every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    /// Mass of the simulated point. Must be positive.
    pub mass: f32,
    /// Optional display label, carried for renderers.
    pub label: Option<String>,
}

impl NodeData {
    /// Node data with the given mass and no label.
    pub fn with_mass(mass: f32) -> Self {
        Self { mass, label: None }
    }

    /// Attach a label.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            mass: 1.0,
            label: None,
        }
    }
}
