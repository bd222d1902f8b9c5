//! The orchestrating caller: one engine, one memory, one RNG.
//!
//! `Mind` owns every mutable piece of the cognitive state, so a host needs
//! exactly one exclusive handle to drive it.

use std::collections::{BTreeMap, VecDeque};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::{ResonanceEngine, StepReport};
use crate::error::Result;
use crate::memory::{
    AssociativeMemory, ContextEntry, EssencePrinciple, ExperienceRecord, MemoryStatistics,
    StellarType,
};
use crate::snapshot::MindSnapshot;
use crate::thought::{Mood, Thought};
use crate::time::Clock;

/// Relation used when linking consecutive core concepts of a thought.
pub const RESONATES_WITH: &str = "resonates_with";
const REASONING_DEPTH: usize = 3;
const IMAGINE_DT: f64 = 0.2;
const SUMMARY_EXPERIENCES: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recall {
    pub concept: String,
    pub context: Vec<ContextEntry>,
    pub related: Vec<(String, f64)>,
    pub stellar_type: StellarType,
    pub frequency: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub premise_concept: Option<String>,
    pub question_concept: Option<String>,
    /// `[premise, question]` when the question's concept is reachable from
    /// the premise's within three hops, else empty.
    pub path: Vec<String>,
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Imagination {
    pub scenario: String,
    pub thought: Thought,
    pub steps: usize,
    pub amplitude_before: f64,
    pub amplitude_after: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DreamReport {
    pub tick: u64,
    pub links_created: usize,
    /// Mood counts over the recent thoughts.
    pub patterns: BTreeMap<Mood, usize>,
    pub statistics: MemoryStatistics,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub statistics: MemoryStatistics,
    pub recent_experiences: Vec<ExperienceRecord>,
    pub essence_principles: Vec<EssencePrinciple>,
}

#[derive(Debug)]
pub struct Mind {
    config: Config,
    engine: ResonanceEngine,
    memory: AssociativeMemory,
    rng: StdRng,
    recent: VecDeque<Thought>,
    tick: u64,
}

impl Mind {
    /// Validate `config` and build a mind stamped by the wall clock.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let memory = AssociativeMemory::new(config.memory.clone());
        Ok(Self::assemble(config, memory))
    }

    /// Like [`Mind::new`] with an explicit clock for memory timestamps.
    pub fn with_clock(config: Config, clock: Box<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let memory = AssociativeMemory::with_clock(config.memory.clone(), clock);
        Ok(Self::assemble(config, memory))
    }

    fn assemble(config: Config, memory: AssociativeMemory) -> Self {
        let rng = match config.mind.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            engine: ResonanceEngine::new(config.engine.clone()),
            memory,
            rng,
            recent: VecDeque::with_capacity(config.mind.max_recent_thoughts),
            tick: 0,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &ResonanceEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ResonanceEngine {
        &mut self.engine
    }

    pub fn memory(&self) -> &AssociativeMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut AssociativeMemory {
        &mut self.memory
    }

    /// Thoughts from `process`, oldest first.
    pub fn recent_thoughts(&self) -> impl DoubleEndedIterator<Item = &Thought> {
        self.recent.iter()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Full cycle for one stimulus: resonate, remember, link the core
    /// concepts in rank order, then advance the engine one step.
    pub fn process(&mut self, text: &str, intensity: f64) -> Thought {
        self.tick += 1;
        let thought = self.engine.process_input(text, intensity, &mut self.rng);

        if self.config.mind.max_recent_thoughts > 0 {
            if self.recent.len() >= self.config.mind.max_recent_thoughts {
                self.recent.pop_front();
            }
            self.recent.push_back(thought.clone());
        }

        self.memory.add_experience(text, "input");
        for pair in thought.core_concepts.windows(2) {
            let (source, weight) = &pair[0];
            let (target, _) = &pair[1];
            self.memory
                .add_causal_link(source, target, RESONATES_WITH, *weight);
        }

        let report = self.engine.step(self.config.mind.step_dt);
        tracing::debug!(tick = self.tick, thought = %thought, transfers = report.transfers, "processed");
        thought
    }

    /// Resonate without remembering or advancing time.
    pub fn think(&mut self, text: &str) -> Thought {
        self.engine.process_input(text, 1.0, &mut self.rng)
    }

    /// Explicit memory link.
    pub fn remember(&mut self, source: &str, target: &str, relation: &str, weight: f64) {
        self.memory.add_causal_link(source, target, relation, weight);
    }

    pub fn recall(&self, concept: &str) -> Recall {
        Recall {
            concept: concept.to_string(),
            context: self.memory.get_context(concept),
            related: self.memory.get_related_concepts(concept, 1),
            stellar_type: self.memory.get_stellar_type(concept),
            frequency: self.memory.get_frequency(concept),
        }
    }

    /// Process the premise, think the question, and check whether the
    /// question's top concept is reachable from the premise's in memory.
    pub fn reason(&mut self, premise: &str, question: &str) -> Reasoning {
        let premise_thought = self.process(premise, 1.0);
        let question_thought = self.think(question);

        let premise_concept = premise_thought.top_concept().map(str::to_string);
        let question_concept = question_thought.top_concept().map(str::to_string);

        let mut path = Vec::new();
        if let (Some(start), Some(end)) = (&premise_concept, &question_concept) {
            let reachable = self
                .memory
                .get_related_concepts(start, REASONING_DEPTH)
                .iter()
                .any(|(c, _)| c == end);
            if reachable {
                path = vec![start.clone(), end.clone()];
            }
        }

        Reasoning {
            premise_concept,
            question_concept,
            confidence: if path.is_empty() { 0.2 } else { 0.5 },
            path,
        }
    }

    /// Think the scenario, then let the engine evolve for `steps` steps.
    pub fn imagine(&mut self, scenario: &str, steps: usize) -> Imagination {
        let thought = self.think(scenario);
        let amplitude_before = self.engine.total_amplitude();
        let mut last = StepReport::default();
        for _ in 0..steps {
            last = self.engine.step(IMAGINE_DT);
        }
        tracing::debug!(steps, decayed = last.decayed, "imagined");
        Imagination {
            scenario: scenario.to_string(),
            thought,
            steps,
            amplitude_before,
            amplitude_after: self.engine.total_amplitude(),
        }
    }

    /// Consolidate: one Hebbian pass plus a mood histogram of recent thoughts.
    pub fn dream(&mut self) -> DreamReport {
        let links_created = self.engine.dream(&mut self.rng);
        let mut patterns = BTreeMap::new();
        for thought in &self.recent {
            *patterns.entry(thought.mood).or_insert(0) += 1;
        }
        tracing::info!(links_created, "dream");
        DreamReport {
            tick: self.tick,
            links_created,
            patterns,
            statistics: self.memory.statistics(),
        }
    }

    pub fn memory_summary(&self) -> MemorySummary {
        MemorySummary {
            statistics: self.memory.statistics(),
            recent_experiences: self
                .memory
                .recent_experiences(SUMMARY_EXPERIENCES)
                .into_iter()
                .cloned()
                .collect(),
            essence_principles: self.memory.essence_loop().iter().cloned().collect(),
        }
    }

    pub fn snapshot(&self) -> MindSnapshot {
        MindSnapshot::from_mind(self)
    }
}
