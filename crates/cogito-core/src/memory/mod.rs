//! Associative memory: a directed concept graph plus the fractal loops.
//!
//! The graph sits behind [`ConceptGraph`] so the hand-rolled adjacency
//! store and the petgraph-backed store are interchangeable at
//! construction time. Timestamps come from an injected [`Clock`].

pub mod graph;
pub mod loops;
pub mod petgraph_store;
pub mod vocabulary;

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{GraphBackend, MemoryConfig};
use crate::constants::{GENESIS_CONCEPT, INDIRECT_RELEVANCE};
use crate::snapshot::{LoopsSnapshot, MemorySnapshot};
use crate::time::{Clock, SystemClock};

pub use graph::{AdjacencyGraph, ConceptGraph, MemoryEdge, MemoryNode};
pub use loops::{
    BoundedLoop, Compression, EssencePrinciple, ExperienceRecord, FractalLoops, IdentityFragment,
};
pub use petgraph_store::PetGraphStore;
pub use vocabulary::{StellarType, frequency};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// One edge touching a concept, seen from that concept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// The node at the other end of the edge.
    pub node: String,
    pub relation: String,
    pub direction: Direction,
    pub weight: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStatistics {
    pub nodes: usize,
    pub edges: usize,
    pub experiences: usize,
    pub identity_fragments: usize,
    pub essence_principles: usize,
}

pub struct AssociativeMemory {
    graph: Box<dyn ConceptGraph>,
    loops: FractalLoops,
    clock: Box<dyn Clock>,
    config: MemoryConfig,
}

impl fmt::Debug for AssociativeMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociativeMemory")
            .field("backend", &self.graph.backend())
            .field("statistics", &self.statistics())
            .finish()
    }
}

impl Default for AssociativeMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl AssociativeMemory {
    /// Memory stamped by the wall clock.
    pub fn new(config: MemoryConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: MemoryConfig, clock: Box<dyn Clock>) -> Self {
        let graph: Box<dyn ConceptGraph> = match config.backend {
            GraphBackend::Adjacency => Box::new(AdjacencyGraph::new()),
            GraphBackend::Petgraph => Box::new(PetGraphStore::new()),
        };
        let mut memory = Self {
            graph,
            loops: FractalLoops::new(&config),
            clock,
            config,
        };
        memory.add_concept(GENESIS_CONCEPT, "event", None);
        memory
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn backend(&self) -> GraphBackend {
        self.graph.backend()
    }

    /// Create `concept`, or touch it if it already exists.
    ///
    /// Touching bumps the access count and refreshes `last_accessed`;
    /// `node_type` and `metadata` are only taken on creation. Returns true
    /// when the node was created.
    pub fn add_concept(
        &mut self,
        concept: &str,
        node_type: &str,
        metadata: Option<BTreeMap<String, Value>>,
    ) -> bool {
        let now = self.clock.now_iso8601();
        if let Some(node) = self.graph.node_mut(concept) {
            node.access_count += 1;
            node.last_accessed = now;
            return false;
        }
        self.graph.insert_node(MemoryNode {
            concept: concept.to_string(),
            node_type: node_type.to_string(),
            created_at: now.clone(),
            last_accessed: now,
            access_count: 1,
            metadata: metadata.unwrap_or_default(),
        });
        true
    }

    /// Append a directed edge, creating or touching both endpoints.
    ///
    /// Duplicate edges are kept. Negative weights are clamped to zero.
    pub fn add_causal_link(&mut self, source: &str, target: &str, relation: &str, weight: f64) {
        self.add_concept(source, "concept", None);
        self.add_concept(target, "concept", None);
        let weight = if weight.is_nan() { 0.0 } else { weight.max(0.0) };
        let edge = MemoryEdge {
            source: source.to_string(),
            target: target.to_string(),
            relation: relation.to_string(),
            weight,
            created_at: self.clock.now_iso8601(),
        };
        self.graph.insert_edge(edge);
    }

    /// Concepts reachable from `concept` within `depth` outgoing hops.
    ///
    /// Breadth-first, so each concept appears once at its shortest hop
    /// distance. Direct successors carry the weight of the first edge to
    /// them; anything further away gets a flat indirect relevance. The start
    /// concept is never included.
    pub fn get_related_concepts(&self, concept: &str, depth: usize) -> Vec<(String, f64)> {
        if !self.graph.contains(concept) {
            return Vec::new();
        }

        let mut related = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([concept]);
        let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(concept, 0)]);

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= depth {
                continue;
            }
            for edge in self.graph.outgoing(current) {
                let target = edge.target.as_str();
                if !visited.insert(target) {
                    continue;
                }
                let relevance = if hops == 0 {
                    edge.weight
                } else {
                    INDIRECT_RELEVANCE
                };
                related.push((target.to_string(), relevance));
                queue.push_back((target, hops + 1));
            }
        }
        related
    }

    /// One-hop neighbourhood in both directions: outgoing edges first.
    pub fn get_context(&self, concept: &str) -> Vec<ContextEntry> {
        let outgoing = self.graph.outgoing(concept).into_iter().map(|e| ContextEntry {
            node: e.target.clone(),
            relation: e.relation.clone(),
            direction: Direction::Outgoing,
            weight: e.weight,
        });
        let incoming = self.graph.incoming(concept).into_iter().map(|e| ContextEntry {
            node: e.source.clone(),
            relation: e.relation.clone(),
            direction: Direction::Incoming,
            weight: e.weight,
        });
        outgoing.chain(incoming).collect()
    }

    /// Record an experience and run any compression it triggers.
    pub fn add_experience(&mut self, content: &str, role: &str) -> Compression {
        let now = self.clock.now_iso8601();
        self.loops.add_experience(content, role, &now)
    }

    pub fn get_stellar_type(&self, concept: &str) -> StellarType {
        self.graph
            .node(concept)
            .map_or(StellarType::Unknown, |n| {
                StellarType::from_access_count(n.access_count)
            })
    }

    pub fn get_frequency(&self, concept: &str) -> f64 {
        frequency(concept)
    }

    pub fn has_concept(&self, concept: &str) -> bool {
        self.graph.contains(concept)
    }

    pub fn get_concept(&self, concept: &str) -> Option<&MemoryNode> {
        self.graph.node(concept)
    }

    pub fn statistics(&self) -> MemoryStatistics {
        MemoryStatistics {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            experiences: self.loops.experience.len(),
            identity_fragments: self.loops.identity.len(),
            essence_principles: self.loops.essence.len(),
        }
    }

    /// The newest `n` experiences, oldest first.
    pub fn recent_experiences(&self, n: usize) -> Vec<&ExperienceRecord> {
        let len = self.loops.experience.len();
        self.loops.experience.iter().skip(len.saturating_sub(n)).collect()
    }

    pub fn loops(&self) -> &FractalLoops {
        &self.loops
    }

    pub fn experience_loop(&self) -> &BoundedLoop<ExperienceRecord> {
        &self.loops.experience
    }

    pub fn identity_loop(&self) -> &BoundedLoop<IdentityFragment> {
        &self.loops.identity
    }

    pub fn essence_loop(&self) -> &BoundedLoop<EssencePrinciple> {
        &self.loops.essence
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            backend: self.graph.backend(),
            nodes: self.graph.nodes().into_iter().cloned().collect(),
            edges: self.graph.edges().into_iter().cloned().collect(),
            loops: LoopsSnapshot {
                experience: self.loops.experience.iter().cloned().collect(),
                identity: self.loops.identity.iter().cloned().collect(),
                essence: self.loops.essence.iter().cloned().collect(),
            },
        }
    }
}
