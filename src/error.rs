//! Error types for layout construction and the WASM facade.
//!
//! A running simulation never fails: numeric corner cases are absorbed by the
//! force model itself. Errors only come from rejecting a configuration or from
//! referring to graph elements that do not exist.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while configuring or addressing a layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A configuration parameter is out of range
    #[error("invalid config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },

    /// The node is not part of the graph
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// A configuration object could not be decoded
    #[error("config decode error: {0}")]
    Config(String),
}

/// Result type for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Require `value` to be finite and strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> LayoutResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig {
            field,
            value,
            reason: "must be finite and positive",
        })
    }
}

/// Require `value` to be finite and not negative.
pub(crate) fn ensure_non_negative(field: &'static str, value: f32) -> LayoutResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig {
            field,
            value,
            reason: "must be finite and non-negative",
        })
    }
}
