//! Read-only view of a graph, as consumed by the layout engine.

use super::{EdgeData, EdgeEnds, EdgeId, NodeData, NodeId};

/// The graph collaborator the layout engine depends on.
///
/// Implementors must not change their node or edge sets while a simulation
/// step is in progress. Between steps they are free to grow or shrink;
/// the engine lazily creates state for new elements and tolerates stale
/// state for removed ones.
pub trait GraphView {
    /// All current nodes, in the graph's iteration order.
    fn nodes(&self) -> impl Iterator<Item = NodeId> + '_;

    /// All current edges, in the graph's iteration order.
    fn edges(&self) -> impl Iterator<Item = EdgeEnds> + '_;

    /// Data record for a node, if it exists.
    fn node_data(&self, id: NodeId) -> Option<&NodeData>;

    /// Data record for an edge, if it exists.
    fn edge_data(&self, id: EdgeId) -> Option<&EdgeData>;

    /// Edges directed from `source` to `target`, oldest first.
    fn edges_between(&self, source: NodeId, target: NodeId) -> Vec<EdgeId>;
}
