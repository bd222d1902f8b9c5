//! Tunables for the engine, the memory and the orchestrating mind.
//!
//! Every field has a default, so an empty TOML document is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub memory: MemoryConfig,
    pub mind: MindConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of an amplitude gap moved along a link per unit time.
    pub diffusion_rate: f64,
    /// Fraction of total amplitude lost per unit time.
    pub decay_rate: f64,
    /// Total amplitude above which a unit counts as active.
    pub active_threshold: f64,
    /// Chance that an unlinked pair of active units gets linked per pass.
    pub hebbian_link_probability: f64,
    /// Concepts kept in a thought's core.
    pub top_n: usize,
    pub seed_instincts: bool,
    pub initial_dimension_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            diffusion_rate: 0.1,
            decay_rate: 0.05,
            active_threshold: 1.5,
            hebbian_link_probability: 0.10,
            top_n: 3,
            seed_instincts: true,
            initial_dimension_scale: 1.0,
        }
    }
}

/// Storage behind the associative concept graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphBackend {
    /// Hand-rolled adjacency lists.
    #[default]
    Adjacency,
    /// `petgraph::graph::DiGraph`.
    Petgraph,
}

/// How identity fragments are compressed into essence principles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EssenceMode {
    /// A fixed self-description regardless of input.
    #[default]
    Constant,
    /// Joins the fragments' summaries.
    Digest,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub backend: GraphBackend,
    pub experience_capacity: usize,
    pub identity_capacity: usize,
    pub essence_capacity: usize,
    pub identity_summary_max_chars: usize,
    pub essence_mode: EssenceMode,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: GraphBackend::Adjacency,
            experience_capacity: 10,
            identity_capacity: 5,
            essence_capacity: 3,
            identity_summary_max_chars: 30,
            essence_mode: EssenceMode::Constant,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MindConfig {
    /// Time step applied after every processed stimulus.
    pub step_dt: f64,
    pub max_recent_thoughts: usize,
    /// Fixed RNG seed; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for MindConfig {
    fn default() -> Self {
        Self {
            step_dt: 0.1,
            max_recent_thoughts: 10,
            seed: None,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let e = &self.engine;
        non_negative("engine.diffusion_rate", e.diffusion_rate)?;
        non_negative("engine.decay_rate", e.decay_rate)?;
        non_negative("engine.active_threshold", e.active_threshold)?;
        if !(0.0..=1.0).contains(&e.hebbian_link_probability) {
            return Err(CoreError::InvalidConfig(format!(
                "engine.hebbian_link_probability must be in [0, 1], got {}",
                e.hebbian_link_probability
            )));
        }
        if !(0.0..=crate::constants::MAX_DIMENSION).contains(&e.initial_dimension_scale) {
            return Err(CoreError::InvalidConfig(format!(
                "engine.initial_dimension_scale must be in [0, 3], got {}",
                e.initial_dimension_scale
            )));
        }

        let m = &self.memory;
        for (name, cap) in [
            ("memory.experience_capacity", m.experience_capacity),
            ("memory.identity_capacity", m.identity_capacity),
            ("memory.essence_capacity", m.essence_capacity),
        ] {
            if cap == 0 {
                return Err(CoreError::InvalidConfig(format!("{name} must be at least 1")));
            }
        }

        non_negative("mind.step_dt", self.mind.step_dt)?;
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}
