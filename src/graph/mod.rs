//! Graph data structures consumed by the layout engine.
//!
//! This module provides the identifiers and data records for nodes and edges,
//! the [`GraphView`] trait the simulation reads through, and a petgraph-backed
//! [`Graph`] store implementing it.

mod edge;
mod node;
mod store;
mod view;

pub use edge::{EdgeData, EdgeEnds, EdgeId};
pub use node::{NodeData, NodeId};
pub use store::Graph;
pub use view::GraphView;
