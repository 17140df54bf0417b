//! Edge identity and payload.
//!
//! Each edge carries the rest length of the spring the layout engine builds
//! for it. Parallel edges between the same pair of nodes are allowed; the
//! engine decides which of them actually pulls.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Stable edge identifier.
///
/// This ID remains valid even after other edges are removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
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

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// Data record attached to every edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeData {
    /// Rest length of the spring.
    pub length: f32,
    /// Optional display label, carried for renderers.
    pub label: Option<String>,
}

impl EdgeData {
    /// Edge data with the given rest length and no label.
    pub fn with_length(length: f32) -> Self {
        Self {
            length,
            label: None,
        }
    }
}

impl Default for EdgeData {
    fn default() -> Self {
        Self {
            length: 1.0,
            label: None,
        }
    }
}

/// A directed edge as seen from the graph's edge iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeEnds {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}
