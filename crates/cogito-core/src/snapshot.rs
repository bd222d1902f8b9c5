//! Plain JSON snapshots of the engine, the memory and a whole mind.
//!
//! Wire structs are kept apart from the domain types. Amplitudes are
//! written as `[re, im]` pairs keyed by basis name. Reaction rules are
//! closures and are not part of any snapshot.

use std::collections::BTreeMap;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GraphBackend;
use crate::engine::ResonanceEngine;
use crate::error::Result;
use crate::memory::{EssencePrinciple, ExperienceRecord, IdentityFragment, MemoryEdge, MemoryNode};
use crate::mind::Mind;
use crate::state::{Basis, Probabilities, StateVector};
use crate::thought::Thought;
use crate::unit::CognitiveUnit;

pub const CURRENT_VERSION: &str = "0.1.0";

// --- Wire format types ---

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeSnapshot {
    pub concrete: [f64; 2],
    pub relational: [f64; 2],
    pub contextual: [f64; 2],
    pub transcendent: [f64; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub amplitudes: AmplitudeSnapshot,
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Derived; ignored when reading a state back.
    pub probabilities: Probabilities,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: String,
    pub name: String,
    pub value: Value,
    #[serde(default)]
    pub content: BTreeMap<Basis, String>,
    #[serde(default)]
    pub observers: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub has_rule: bool,
    pub state: StateSnapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub version: String,
    pub global_dimension_scale: f64,
    pub node_count: usize,
    pub link_count: usize,
    pub nodes: Vec<UnitSnapshot>,
    /// source id → target ids, in link creation order.
    pub links: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopsSnapshot {
    pub experience: Vec<ExperienceRecord>,
    pub identity: Vec<IdentityFragment>,
    pub essence: Vec<EssencePrinciple>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub backend: GraphBackend,
    pub nodes: Vec<MemoryNode>,
    pub edges: Vec<MemoryEdge>,
    pub loops: LoopsSnapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MindSnapshot {
    pub version: String,
    pub engine: EngineSnapshot,
    pub memory: MemorySnapshot,
    #[serde(default)]
    pub recent_thoughts: Vec<Thought>,
}

// --- Conversion: Domain → Wire ---

impl From<&StateVector> for StateSnapshot {
    fn from(state: &StateVector) -> Self {
        let pair = |b: Basis| {
            let c = state.amplitude(b);
            [c.re, c.im]
        };
        Self {
            amplitudes: AmplitudeSnapshot {
                concrete: pair(Basis::Concrete),
                relational: pair(Basis::Relational),
                contextual: pair(Basis::Contextual),
                transcendent: pair(Basis::Transcendent),
            },
            w: state.w,
            x: state.x,
            y: state.y,
            z: state.z,
            probabilities: state.probabilities(),
        }
    }
}

impl From<&CognitiveUnit> for UnitSnapshot {
    fn from(unit: &CognitiveUnit) -> Self {
        Self {
            id: unit.id.clone(),
            name: unit.name.clone(),
            value: unit.value().clone(),
            content: unit.content.clone(),
            observers: unit.observers().map(str::to_string).collect(),
            sources: unit.sources().map(str::to_string).collect(),
            has_rule: unit.has_rule(),
            state: StateSnapshot::from(unit.state()),
        }
    }
}

impl From<&ResonanceEngine> for EngineSnapshot {
    fn from(engine: &ResonanceEngine) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            global_dimension_scale: engine.dimension_scale(),
            node_count: engine.len(),
            link_count: engine.link_count(),
            nodes: engine.units().map(UnitSnapshot::from).collect(),
            links: engine
                .links()
                .map(|(source, targets)| (source.to_string(), targets.to_vec()))
                .collect(),
        }
    }
}

impl MindSnapshot {
    pub fn from_mind(mind: &Mind) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            engine: EngineSnapshot::from(mind.engine()),
            memory: mind.memory().snapshot(),
            recent_thoughts: mind.recent_thoughts().cloned().collect(),
        }
    }
}

// --- Conversion: Wire → Domain ---

impl StateVector {
    /// Rebuild a state from its snapshot. Probabilities are recomputed
    /// from the amplitudes, which are re-normalized.
    pub fn from_snapshot(snapshot: &StateSnapshot) -> Self {
        let a = &snapshot.amplitudes;
        let c = |[re, im]: [f64; 2]| Complex64::new(re, im);
        let mut state = StateVector::new([
            c(a.concrete),
            c(a.relational),
            c(a.contextual),
            c(a.transcendent),
        ]);
        state.w = snapshot.w;
        state.x = snapshot.x;
        state.y = snapshot.y;
        state.z = snapshot.z;
        state
    }
}

/// Read a single state vector from JSON.
pub fn import_state(json: &str) -> Result<StateVector> {
    let snapshot: StateSnapshot = serde_json::from_str(json)?;
    Ok(StateVector::from_snapshot(&snapshot))
}

/// Serialize a mind to pretty JSON.
pub fn export_json(mind: &Mind) -> Result<String> {
    Ok(serde_json::to_string_pretty(&MindSnapshot::from_mind(mind))?)
}
