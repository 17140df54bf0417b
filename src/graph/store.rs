//! Graph - petgraph-backed node and edge storage.
//!
//! The Graph stores topology in petgraph's StableGraph so that petgraph
//! indices survive removals, and keeps its own stable NodeId/EdgeId maps on
//! top so callers never see petgraph indices at all.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};

use super::edge::{EdgeData, EdgeEnds, EdgeId};
use super::node::{NodeData, NodeId};
use super::view::GraphView;

/// Node weight stored inside the petgraph graph.
#[derive(Debug, Clone)]
struct NodeEntry {
    id: NodeId,
    data: NodeData,
}

/// Edge weight stored inside the petgraph graph.
#[derive(Debug, Clone)]
struct EdgeEntry {
    id: EdgeId,
    data: EdgeData,
}

/// Directed multigraph of nodes and edges with stable identifiers.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Node mass and edge rest length records
/// - ID mapping between stable IDs and internal indices
#[derive(Debug, Clone)]
pub struct Graph {
    /// The underlying graph structure.
    graph: StableGraph<NodeEntry, EdgeEntry, Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable EdgeId to petgraph EdgeIndex
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    /// Next node ID to assign
    next_node_id: u32,

    /// Next edge ID to assign
    next_edge_id: u32,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_id_to_index: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node with default data (mass 1.0).
    pub fn add_node(&mut self) -> NodeId {
        self.add_node_with(NodeData::default())
    }

    /// Add a node with the given data.
    pub fn add_node_with(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(NodeEntry { id, data });
        self.node_id_to_index.insert(id, index);
        id
    }

    /// Remove a node and all its connected edges.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_id_to_index.remove(&id) else {
            return false;
        };

        let incident: Vec<EdgeId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        for edge_id in incident {
            self.edge_id_to_index.remove(&edge_id);
        }

        self.graph.remove_node(index);
        true
    }

    /// Check whether a node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge with default data (rest length 1.0).
    ///
    /// Returns `None` if either endpoint does not exist.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        self.add_edge_with(source, target, EdgeData::default())
    }

    /// Add an edge with the given data.
    ///
    /// Returns `None` if either endpoint does not exist.
    pub fn add_edge_with(
        &mut self,
        source: NodeId,
        target: NodeId,
        data: EdgeData,
    ) -> Option<EdgeId> {
        let source_index = *self.node_id_to_index.get(&source)?;
        let target_index = *self.node_id_to_index.get(&target)?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self
            .graph
            .add_edge(source_index, target_index, EdgeEntry { id, data });
        self.edge_id_to_index.insert(id, index);
        Some(id)
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        match self.edge_id_to_index.remove(&id) {
            Some(index) => self.graph.remove_edge(index).is_some(),
            None => false,
        }
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get neighbors of a node (both directions, deduplicated).
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&index) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };

        let mut neighbors: Vec<NodeId> = self
            .graph
            .neighbors_undirected(index)
            .map(|n| self.graph[n].id)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Clear all nodes and edges, resetting the ID counters.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.edge_id_to_index.clear();
        self.next_node_id = 0;
        self.next_edge_id = 0;
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphView for Graph {
    fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .node_indices()
            .map(move |index| self.graph[index].id)
    }

    fn edges(&self) -> impl Iterator<Item = EdgeEnds> + '_ {
        self.graph.edge_references().map(move |edge| EdgeEnds {
            id: edge.weight().id,
            source: self.graph[edge.source()].id,
            target: self.graph[edge.target()].id,
        })
    }

    fn node_data(&self, id: NodeId) -> Option<&NodeData> {
        self.node_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
            .map(|entry| &entry.data)
    }

    fn edge_data(&self, id: EdgeId) -> Option<&EdgeData> {
        self.edge_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.edge_weight(index))
            .map(|entry| &entry.data)
    }

    fn edges_between(&self, source: NodeId, target: NodeId) -> Vec<EdgeId> {
        let (Some(&from), Some(&to)) = (
            self.node_id_to_index.get(&source),
            self.node_id_to_index.get(&target),
        ) else {
            return Vec::new();
        };

        let mut edges: Vec<EdgeId> = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|e| e.target() == to)
            .map(|e| e.weight().id)
            .collect();
        // petgraph walks adjacency lists newest-first; ids are handed out in
        // insertion order.
        edges.sort_unstable();
        edges
    }
}
