//! Cogito: a simulated cognitive state.
//!
//! Text stimuli become transient four-basis state vectors, resonate against
//! a vocabulary of concept units, and condense into ranked thoughts. An
//! associative memory keeps a directed concept graph and compresses raw
//! experiences into identity fragments and essence principles.
//!
//! Zero I/O: timestamps come through [`time::Clock`] and randomness through
//! any `rand::Rng` the caller supplies.

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod instincts;
pub mod memory;
pub mod mind;
pub mod snapshot;
pub mod state;
pub mod thought;
pub mod time;
pub mod unit;

pub use config::{Config, EngineConfig, EssenceMode, GraphBackend, MemoryConfig, MindConfig};
pub use engine::{ResonanceEngine, ResonancePattern, StepReport};
pub use error::{CoreError, Result};
pub use memory::{
    AssociativeMemory, Compression, ContextEntry, Direction, MemoryStatistics, StellarType,
};
pub use mind::{DreamReport, Imagination, MemorySummary, Mind, Reasoning, Recall};
pub use snapshot::{CURRENT_VERSION, MindSnapshot, StateSnapshot, export_json, import_state};
pub use state::{Basis, CollapseMode, Probabilities, StateVector};
pub use thought::{Mood, Thought, Wave};
pub use time::{Clock, ManualClock, SystemClock};
pub use unit::{CognitiveUnit, Propagation, ReactionRule, Telemetry, UnitGraph};
