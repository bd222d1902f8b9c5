use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::config::GraphBackend;

use super::graph::{ConceptGraph, MemoryEdge, MemoryNode};

/// Backend delegating storage to `petgraph`.
///
/// petgraph walks a node's edges newest first; results are re-sorted by
/// edge index so ordering matches the adjacency backend.
#[derive(Clone, Debug, Default)]
pub struct PetGraphStore {
    graph: DiGraph<MemoryNode, MemoryEdge>,
    index: HashMap<String, NodeIndex>,
}

impl PetGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn directed(&self, concept: &str, direction: Direction) -> Vec<&MemoryEdge> {
        let Some(&idx) = self.index.get(concept) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|e| e.id().index());
        edges.into_iter().map(|e| e.weight()).collect()
    }
}

impl ConceptGraph for PetGraphStore {
    fn backend(&self) -> GraphBackend {
        GraphBackend::Petgraph
    }

    fn contains(&self, concept: &str) -> bool {
        self.index.contains_key(concept)
    }

    fn node(&self, concept: &str) -> Option<&MemoryNode> {
        self.index
            .get(concept)
            .and_then(|&i| self.graph.node_weight(i))
    }

    fn node_mut(&mut self, concept: &str) -> Option<&mut MemoryNode> {
        let idx = *self.index.get(concept)?;
        self.graph.node_weight_mut(idx)
    }

    fn insert_node(&mut self, node: MemoryNode) {
        if self.index.contains_key(&node.concept) {
            return;
        }
        let concept = node.concept.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(concept, idx);
    }

    fn insert_edge(&mut self, edge: MemoryEdge) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(&edge.source), self.index.get(&edge.target))
        else {
            return false;
        };
        self.graph.add_edge(a, b, edge);
        true
    }

    fn outgoing(&self, concept: &str) -> Vec<&MemoryEdge> {
        self.directed(concept, Direction::Outgoing)
    }

    fn incoming(&self, concept: &str) -> Vec<&MemoryEdge> {
        self.directed(concept, Direction::Incoming)
    }

    fn nodes(&self) -> Vec<&MemoryNode> {
        self.graph.raw_nodes().iter().map(|n| &n.weight).collect()
    }

    fn edges(&self) -> Vec<&MemoryEdge> {
        self.graph.raw_edges().iter().map(|e| &e.weight).collect()
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
