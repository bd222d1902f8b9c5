//! Storage seam for the associative concept graph.
//!
//! [`ConceptGraph`] is the contract both backends satisfy; traversal and
//! context queries live in [`AssociativeMemory`](super::AssociativeMemory)
//! and only use this trait, so they behave identically on either backend.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GraphBackend;

/// A concept node with its bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryNode {
    pub concept: String,
    pub node_type: String,
    pub created_at: String,
    pub last_accessed: String,
    pub access_count: u64,
    pub metadata: BTreeMap<String, Value>,
}

/// A directed, labelled, weighted edge. Parallel edges are allowed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryEdge {
    pub source: String,
    pub target: String,
    pub relation: String,
    pub weight: f64,
    pub created_at: String,
}

pub trait ConceptGraph: Send {
    fn backend(&self) -> GraphBackend;

    fn contains(&self, concept: &str) -> bool;

    fn node(&self, concept: &str) -> Option<&MemoryNode>;

    fn node_mut(&mut self, concept: &str) -> Option<&mut MemoryNode>;

    /// Insert a node. Callers check `contains` first; an existing node is kept.
    fn insert_node(&mut self, node: MemoryNode);

    /// Append an edge. Both endpoints must already exist; otherwise the
    /// edge is dropped and false is returned.
    fn insert_edge(&mut self, edge: MemoryEdge) -> bool;

    /// Edges leaving `concept`, oldest first.
    fn outgoing(&self, concept: &str) -> Vec<&MemoryEdge>;

    /// Edges arriving at `concept`, oldest first.
    fn incoming(&self, concept: &str) -> Vec<&MemoryEdge>;

    /// Every node in creation order.
    fn nodes(&self) -> Vec<&MemoryNode>;

    /// Every edge in creation order.
    fn edges(&self) -> Vec<&MemoryEdge>;

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;
}

/// Hand-rolled backend: node map plus one global edge list with per-node
/// outgoing and incoming position lists.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyGraph {
    nodes: Vec<MemoryNode>,
    index: HashMap<String, usize>,
    edges: Vec<MemoryEdge>,
    out_edges: HashMap<String, Vec<usize>>,
    in_edges: HashMap<String, Vec<usize>>,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn edges_at(&self, positions: Option<&Vec<usize>>) -> Vec<&MemoryEdge> {
        positions
            .map(|ps| ps.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }
}

impl ConceptGraph for AdjacencyGraph {
    fn backend(&self) -> GraphBackend {
        GraphBackend::Adjacency
    }

    fn contains(&self, concept: &str) -> bool {
        self.index.contains_key(concept)
    }

    fn node(&self, concept: &str) -> Option<&MemoryNode> {
        self.index.get(concept).map(|&i| &self.nodes[i])
    }

    fn node_mut(&mut self, concept: &str) -> Option<&mut MemoryNode> {
        self.index.get(concept).map(|&i| &mut self.nodes[i])
    }

    fn insert_node(&mut self, node: MemoryNode) {
        if self.index.contains_key(&node.concept) {
            return;
        }
        self.index.insert(node.concept.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    fn insert_edge(&mut self, edge: MemoryEdge) -> bool {
        if !self.contains(&edge.source) || !self.contains(&edge.target) {
            return false;
        }
        let pos = self.edges.len();
        self.out_edges.entry(edge.source.clone()).or_default().push(pos);
        self.in_edges.entry(edge.target.clone()).or_default().push(pos);
        self.edges.push(edge);
        true
    }

    fn outgoing(&self, concept: &str) -> Vec<&MemoryEdge> {
        self.edges_at(self.out_edges.get(concept))
    }

    fn incoming(&self, concept: &str) -> Vec<&MemoryEdge> {
        self.edges_at(self.in_edges.get(concept))
    }

    fn nodes(&self) -> Vec<&MemoryNode> {
        self.nodes.iter().collect()
    }

    fn edges(&self) -> Vec<&MemoryEdge> {
        self.edges.iter().collect()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
