use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::constants::{
    BASIS_WEIGHT, DIMENSION_WEIGHT, DORMANT_AMPLITUDES, DORMANT_DIMENSION, MAX_DIMENSION,
    SPATIAL_EPSILON, SPATIAL_WEIGHT, STIMULUS_AMPLITUDES, STIMULUS_DIMENSION,
};
use crate::error::{CoreError, Result};
use crate::instincts::instincts;
use crate::snapshot::EngineSnapshot;
use crate::state::StateVector;
use crate::thought::{Mood, Thought, Wave};
use crate::unit::{CognitiveUnit, Propagation, ReactionRule, UnitGraph};

/// Resonance score per concept id, in the engine's insertion order.
pub type ResonancePattern = Vec<(String, f64)>;

/// What one call to [`ResonanceEngine::step`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Links along which amplitude moved.
    pub transfers: usize,
    /// Total amplitude moved by diffusion.
    pub transferred: f64,
    /// Total amplitude removed by decay (before re-normalization).
    pub decayed: f64,
}

/// Owns the concept units, the directed psionic links between them and the
/// global dimensional scale.
///
/// Every link in `links` is also wired as an observer relation on the
/// units, so a value change on the source reaches the target.
#[derive(Debug)]
pub struct ResonanceEngine {
    config: EngineConfig,
    units: UnitGraph,
    links: BTreeMap<String, Vec<String>>,
    dimension_scale: f64,
}

impl Default for ResonanceEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ResonanceEngine {
    /// Engine seeded with the instinct concepts when the config asks for it.
    pub fn new(config: EngineConfig) -> Self {
        let mut engine = Self {
            dimension_scale: config.initial_dimension_scale,
            config,
            units: UnitGraph::new(),
            links: BTreeMap::new(),
        };
        if engine.config.seed_instincts {
            for (id, state) in instincts() {
                engine.units.insert(CognitiveUnit::new(id).with_state(state));
            }
        }
        engine
    }

    /// Engine with default tunables and no concepts.
    pub fn empty() -> Self {
        Self::new(EngineConfig {
            seed_instincts: false,
            ..EngineConfig::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn dimension_scale(&self) -> f64 {
        self.dimension_scale
    }

    pub fn units(&self) -> impl Iterator<Item = &CognitiveUnit> {
        self.units.iter()
    }

    pub fn unit(&self, id: &str) -> Option<&CognitiveUnit> {
        self.units.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&CognitiveUnit> {
        self.units
            .get(id)
            .ok_or_else(|| CoreError::UnknownConcept(id.to_string()))
    }

    /// Add a concept. Without a state it starts dormant: Concrete-leaning at
    /// w = 0.5 with a random orientation. Returns false if the id exists.
    pub fn add_node(
        &mut self,
        id: &str,
        initial_state: Option<StateVector>,
        rng: &mut impl Rng,
    ) -> bool {
        if self.units.contains(id) {
            return false;
        }
        let state = initial_state.unwrap_or_else(|| {
            StateVector::from_real(DORMANT_AMPLITUDES)
                .with_dimension(DORMANT_DIMENSION)
                .with_random_orientation(rng)
        });
        self.units.insert(CognitiveUnit::new(id).with_state(state))
    }

    /// Create a directed link `source → target` and wire the target to
    /// react to the source. Silently skipped (returns false) when either
    /// id is unknown.
    pub fn entangle(&mut self, source: &str, target: &str, rule: Option<ReactionRule>) -> bool {
        if let Err(e) = self.units.connect(source, target, rule) {
            tracing::debug!(source, target, error = %e, "entangle skipped");
            return false;
        }
        self.links
            .entry(source.to_string())
            .or_default()
            .push(target.to_string());
        true
    }

    pub fn links_from(&self, id: &str) -> &[String] {
        self.links.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn link_count(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }

    pub fn is_linked(&self, source: &str, target: &str) -> bool {
        self.links_from(source).iter().any(|t| t == target)
    }

    /// Set a concept's value and let it ripple through its observers.
    pub fn set_value(&mut self, id: &str, value: Value, cause: &str) -> Result<Propagation> {
        self.units.set_value(id, value, cause)
    }

    /// Resonance between two units in [0, 1]: basis alignment (0.5),
    /// dimensional closeness (0.3) and non-negative spatial cosine (0.2).
    pub fn calculate_resonance(a: &CognitiveUnit, b: &CognitiveUnit) -> f64 {
        let (sa, sb) = (a.state(), b.state());

        let basis_alignment = sa.probabilities().dot(&sb.probabilities());

        let dimension_similarity = 1.0 / (1.0 + (sa.w - sb.w).abs());

        let dot: f64 = sa
            .orientation()
            .iter()
            .zip(sb.orientation())
            .map(|(p, q)| p * q)
            .sum();
        let norms = (sa.orientation_norm() + SPATIAL_EPSILON) * (sb.orientation_norm() + SPATIAL_EPSILON);
        let spatial_alignment = (dot / norms).max(0.0);

        BASIS_WEIGHT * basis_alignment
            + DIMENSION_WEIGHT * dimension_similarity
            + SPATIAL_WEIGHT * spatial_alignment
    }

    /// Resonance between two stored concepts.
    pub fn resonance_between(&self, a: &str, b: &str) -> Result<f64> {
        Ok(Self::calculate_resonance(self.require(a)?, self.require(b)?))
    }

    /// Ring every stored concept with one stimulus.
    ///
    /// The stimulus becomes a transient Contextual-biased unit at w = 2 with
    /// a random orientation; each score is scaled by the wave's intensity.
    pub fn calculate_global_resonance(&self, wave: &Wave, rng: &mut impl Rng) -> ResonancePattern {
        let stimulus = CognitiveUnit::with_value(
            "transient_wave",
            Value::String(wave.source_text.clone()),
        )
        .with_state(
            StateVector::from_real(STIMULUS_AMPLITUDES)
                .with_dimension(STIMULUS_DIMENSION)
                .with_random_orientation(rng),
        );

        self.units
            .iter()
            .map(|unit| {
                let score = Self::calculate_resonance(&stimulus, unit) * wave.intensity;
                (unit.id.clone(), score)
            })
            .collect()
    }

    /// Condense a resonance pattern into a ranked thought.
    ///
    /// The sort is stable, so equal scores keep the pattern's order.
    pub fn observe_pattern(source_text: &str, pattern: &[(String, f64)], top_n: usize) -> Thought {
        if pattern.is_empty() {
            return Thought::empty(source_text);
        }

        let mut ranked = pattern.to_vec();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let core: Vec<(String, f64)> = ranked.iter().take(top_n).cloned().collect();
        let intensity = if core.is_empty() {
            0.0
        } else {
            core.iter().map(|(_, s)| s).sum::<f64>() / core.len() as f64
        };

        let clarity = if ranked.len() >= 2 {
            ((ranked[0].1 - ranked[1].1) * 2.0).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let mood = Mood::from_concept(core.first().map(|(id, _)| id.as_str()).unwrap_or(""));

        Thought {
            source_wave: source_text.to_string(),
            core_concepts: core,
            intensity,
            clarity,
            mood,
        }
    }

    /// Resonate a stimulus against every concept and observe the result.
    pub fn process_input(&self, text: &str, intensity: f64, rng: &mut impl Rng) -> Thought {
        let wave = Wave::new(text, intensity);
        let pattern = self.calculate_global_resonance(&wave, rng);
        Self::observe_pattern(text, &pattern, self.config.top_n)
    }

    /// Advance time by `dt`: diffusion along links, then decay.
    ///
    /// Diffusion is computed against the amplitudes at the start of the
    /// step and applied afterwards, so link order does not matter.
    pub fn step(&mut self, dt: f64) -> StepReport {
        let mut report = StepReport::default();
        let rate = self.config.diffusion_rate * dt;

        let totals: HashMap<&str, f64> = self
            .units
            .iter()
            .map(|u| (u.id.as_str(), u.state().total_amplitude()))
            .collect();

        let mut deltas: BTreeMap<String, f64> = BTreeMap::new();
        for (source, targets) in &self.links {
            let Some(&source_amp) = totals.get(source.as_str()) else {
                continue;
            };
            for target in targets {
                let Some(&target_amp) = totals.get(target.as_str()) else {
                    continue;
                };
                if source_amp > target_amp {
                    let amount = (source_amp - target_amp) * rate;
                    *deltas.entry(source.clone()).or_default() -= amount;
                    *deltas.entry(target.clone()).or_default() += amount;
                    report.transfers += 1;
                    report.transferred += amount;
                }
            }
        }

        for (id, delta) in &deltas {
            if let Some(unit) = self.units.get_mut(id) {
                unit.adjust_amplitude(*delta);
            }
        }

        let decay = self.config.decay_rate * dt;
        for unit in self.units.iter_mut() {
            let loss = unit.state().total_amplitude() * decay;
            unit.adjust_amplitude(-loss);
            report.decayed += loss;
        }

        tracing::debug!(
            dt,
            transfers = report.transfers,
            transferred = report.transferred,
            decayed = report.decayed,
            "engine step"
        );
        report
    }

    /// Move the global dimensional scale (clamped to [0, 3]) and force
    /// every unit's `w` to it.
    pub fn shift_dimension(&mut self, delta_w: f64) {
        self.dimension_scale = (self.dimension_scale + delta_w).clamp(0.0, MAX_DIMENSION);
        for unit in self.units.iter_mut() {
            unit.set_dimension(self.dimension_scale);
        }
    }

    /// Ids of units whose total amplitude exceeds the active threshold.
    pub fn active_units(&self) -> Vec<String> {
        self.units
            .iter()
            .filter(|u| u.state().total_amplitude() > self.config.active_threshold)
            .map(|u| u.id.clone())
            .collect()
    }

    /// Link co-active units: each unordered pair of active units not yet
    /// linked in either direction gets a link with the configured
    /// probability. Returns the number of links created.
    pub fn hebbian_update(&mut self, rng: &mut impl Rng) -> usize {
        let active = self.active_units();
        let mut created = 0;
        for (i, source) in active.iter().enumerate() {
            for target in &active[i + 1..] {
                if self.is_linked(source, target) || self.is_linked(target, source) {
                    continue;
                }
                if rng.random::<f64>() < self.config.hebbian_link_probability
                    && self.entangle(source, target, None)
                {
                    tracing::info!(source = %source, target = %target, "hebbian link");
                    created += 1;
                }
            }
        }
        created
    }

    /// Consolidation without input: one Hebbian pass.
    pub fn dream(&mut self, rng: &mut impl Rng) -> usize {
        self.hebbian_update(rng)
    }

    /// Sum of every unit's total amplitude.
    pub fn total_amplitude(&self) -> f64 {
        self.units.iter().map(|u| u.state().total_amplitude()).sum()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Basis;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use serde_json::json;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn engine_with(config: EngineConfig) -> ResonanceEngine {
        ResonanceEngine::new(EngineConfig {
            seed_instincts: false,
            ..config
        })
    }

    /// Spread state: total amplitude ≈ 1.83, above the active threshold.
    fn active_state() -> StateVector {
        StateVector::from_real([0.1, 0.2, 0.3, 0.4])
    }

    fn unit(state: StateVector) -> CognitiveUnit {
        CognitiveUnit::new("u").with_state(state)
    }

    #[test]
    fn test_instincts_seeded_by_default() {
        let engine = ResonanceEngine::default();
        assert!(engine.unit("SELF").is_some());
        assert!(engine.unit("love").is_some());
        assert_eq!(engine.link_count(), 0);
        assert!(ResonanceEngine::empty().is_empty());
    }

    #[test]
    fn test_add_node_default_state() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::empty();
        assert!(engine.add_node("stone", None, &mut rng));
        let s = *engine.unit("stone").unwrap().state();
        assert_eq!(s.dominant_basis(), Basis::Concrete);
        assert_eq!(s.w, 0.5);
        assert!((0.0..1.0).contains(&s.x));
    }

    #[test]
    fn test_add_node_existing_is_noop() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::empty();
        engine.add_node("a", Some(StateVector::pure(Basis::Relational)), &mut rng);
        assert!(!engine.add_node("a", Some(StateVector::pure(Basis::Transcendent)), &mut rng));
        assert_eq!(engine.unit("a").unwrap().state().dominant_basis(), Basis::Relational);
    }

    #[test]
    fn test_add_node_normalizes_given_state() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::empty();
        let zero = StateVector::new([num_complex::Complex64::new(0.0, 0.0); 4]);
        engine.add_node("raw", Some(zero), &mut rng);
        let state = engine.unit("raw").unwrap().state();
        assert!((state.probabilities().sum() - 1.0).abs() < 1e-9);
        assert_eq!(state.dominant_basis(), Basis::Concrete);
    }

    #[test]
    fn test_entangle_records_link_and_wiring() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::empty();
        engine.add_node("rain", None, &mut rng);
        engine.add_node("wet", None, &mut rng);

        assert!(engine.entangle("rain", "wet", None));
        assert_eq!(engine.links_from("rain"), ["wet".to_string()]);
        let rain = engine.unit("rain").unwrap();
        assert_eq!(rain.observers().collect::<Vec<_>>(), vec!["wet"]);
        // Without a rule the target mirrors the source's value.
        assert_eq!(engine.unit("wet").unwrap().value(), &json!("rain"));
    }

    #[test]
    fn test_entangle_unknown_is_noop() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::empty();
        engine.add_node("a", None, &mut rng);
        assert!(!engine.entangle("a", "ghost", None));
        assert!(!engine.entangle("ghost", "a", None));
        assert_eq!(engine.link_count(), 0);
        assert_eq!(engine.unit("a").unwrap().observers().count(), 0);
    }

    #[test]
    fn test_set_value_unknown_is_error() {
        let mut engine = ResonanceEngine::empty();
        assert!(matches!(
            engine.set_value("ghost", json!(1), "test"),
            Err(CoreError::UnknownConcept(_))
        ));
    }

    #[test]
    fn test_resonance_identical_units() {
        let s = StateVector::pure(Basis::Contextual)
            .with_dimension(2.0)
            .with_orientation(1.0, 0.0, 0.0);
        let r = ResonanceEngine::calculate_resonance(&unit(s), &unit(s));
        assert!((r - 1.0).abs() < 1e-6, "expected ~1, got {r}");
    }

    #[test]
    fn test_resonance_opposites() {
        let a = StateVector::pure(Basis::Concrete)
            .with_dimension(0.0)
            .with_orientation(1.0, 0.0, 0.0);
        let b = StateVector::pure(Basis::Transcendent)
            .with_dimension(3.0)
            .with_orientation(-1.0, 0.0, 0.0);
        let r = ResonanceEngine::calculate_resonance(&unit(a), &unit(b));
        // Only the dimensional term contributes: 0.3 * 1/(1+3).
        assert!((r - 0.075).abs() < 1e-12, "got {r}");
    }

    #[test]
    fn test_resonance_zero_orientation_is_finite() {
        let a = StateVector::default();
        let b = StateVector::default().with_orientation(0.0, 1.0, 0.0);
        let r = ResonanceEngine::calculate_resonance(&unit(a), &unit(b));
        assert!(r.is_finite());
        assert!((r - 0.8).abs() < 1e-9, "basis 1.0 * 0.5 + dimension 0.3, got {r}");
    }

    #[test]
    fn test_resonance_between_unknown() {
        let engine = ResonanceEngine::empty();
        assert!(engine.resonance_between("a", "b").is_err());
    }

    #[test]
    fn test_global_resonance_scales_with_intensity() {
        let engine = ResonanceEngine::default();
        let once = engine.calculate_global_resonance(&Wave::new("hello", 1.0), &mut rng());
        let twice = engine.calculate_global_resonance(&Wave::new("hello", 2.0), &mut rng());
        let silent = engine.calculate_global_resonance(&Wave::new("hello", -1.0), &mut rng());

        assert_eq!(once.len(), engine.len());
        for ((id1, s1), (id2, s2)) in once.iter().zip(&twice) {
            assert_eq!(id1, id2);
            assert!((2.0 * s1 - s2).abs() < 1e-12);
        }
        assert!(silent.iter().all(|(_, s)| *s == 0.0));
    }

    #[test]
    fn test_observe_pattern_empty() {
        let t = ResonanceEngine::observe_pattern("nothing", &[], 3);
        assert_eq!(t.mood, Mood::Empty);
        assert_eq!(t.intensity, 0.0);
        assert_eq!(t.clarity, 0.0);
        assert!(t.core_concepts.is_empty());
    }

    #[test]
    fn test_observe_pattern_single() {
        let t = ResonanceEngine::observe_pattern("x", &[("love".into(), 0.4)], 3);
        assert_eq!(t.core_concepts, vec![("love".to_string(), 0.4)]);
        assert_eq!(t.clarity, 1.0);
        assert!((t.intensity - 0.4).abs() < 1e-12);
        assert_eq!(t.mood, Mood::Positive);
    }

    #[test]
    fn test_observe_pattern_ranking_and_ties() {
        let pattern = vec![
            ("Hunger".to_string(), 0.5),
            ("Move".to_string(), 0.9),
            ("Eat".to_string(), 0.5),
            ("Rest".to_string(), 0.2),
        ];
        let t = ResonanceEngine::observe_pattern("x", &pattern, 3);
        let ids: Vec<&str> = t.core_concepts.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["Move", "Hunger", "Eat"]);
        assert!((t.intensity - (0.9 + 0.5 + 0.5) / 3.0).abs() < 1e-12);
        assert!((t.clarity - 0.8).abs() < 1e-12);
        assert_eq!(t.mood, Mood::Active);
    }

    #[test]
    fn test_observe_pattern_clarity_clamped() {
        let pattern = vec![("a".to_string(), 2.0), ("b".to_string(), 0.1)];
        let t = ResonanceEngine::observe_pattern("x", &pattern, 1);
        assert_eq!(t.clarity, 1.0);
        assert_eq!(t.core_concepts.len(), 1);
    }

    #[test]
    fn test_step_diffusion_amount() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::empty();
        engine.add_node("hot", Some(active_state()), &mut rng);
        engine.add_node("cold", Some(StateVector::pure(Basis::Concrete)), &mut rng);
        engine.entangle("hot", "cold", None);

        let gap = engine.unit("hot").unwrap().state().total_amplitude() - 1.0;
        let report = engine.step(0.5);
        assert_eq!(report.transfers, 1);
        assert!((report.transferred - gap * 0.1 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_step_no_flow_uphill() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::empty();
        engine.add_node("cold", Some(StateVector::pure(Basis::Concrete)), &mut rng);
        engine.add_node("hot", Some(active_state()), &mut rng);
        engine.entangle("cold", "hot", None);
        assert_eq!(engine.step(1.0).transfers, 0);
    }

    #[test]
    fn test_step_preserves_normalization() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::default();
        for (a, b) in [("SELF", "Hunger"), ("꿈", "Eat"), ("Rest", "SELF")] {
            engine.entangle(a, b, None);
        }
        for _ in 0..20 {
            engine.step(0.3);
            engine.hebbian_update(&mut rng);
        }
        for u in engine.units() {
            let sum = u.state().probabilities().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} drifted: {sum}", u.id);
        }
    }

    #[test]
    fn test_step_full_decay_resets_to_ground() {
        let mut rng = rng();
        let mut engine = ResonanceEngine::empty();
        engine.add_node("SELF", Some(active_state()), &mut rng);
        engine.step(20.0);
        let s = *engine.unit("SELF").unwrap().state();
        assert_eq!(s.dominant_basis(), Basis::Concrete);
        assert!((s.total_amplitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shift_dimension_clamps_and_overwrites() {
        let mut engine = ResonanceEngine::default();
        engine.shift_dimension(5.0);
        assert_eq!(engine.dimension_scale(), 3.0);
        assert!(engine.units().all(|u| u.state().w == 3.0));

        engine.shift_dimension(-10.0);
        assert_eq!(engine.dimension_scale(), 0.0);
        assert!(engine.units().all(|u| u.state().w == 0.0));
    }

    #[test]
    fn test_hebbian_links_active_pairs_only() {
        let mut rng = rng();
        let mut engine = engine_with(EngineConfig {
            hebbian_link_probability: 1.0,
            ..EngineConfig::default()
        });
        engine.add_node("a", Some(active_state()), &mut rng);
        engine.add_node("b", Some(active_state()), &mut rng);
        engine.add_node("dormant", None, &mut rng);

        assert_eq!(engine.hebbian_update(&mut rng), 1);
        assert!(engine.is_linked("a", "b"));
        assert!(engine.links_from("dormant").is_empty());
    }

    #[test]
    fn test_hebbian_idempotent_when_all_linked() {
        let mut rng = rng();
        let mut engine = engine_with(EngineConfig {
            hebbian_link_probability: 1.0,
            ..EngineConfig::default()
        });
        for id in ["a", "b", "c"] {
            engine.add_node(id, Some(active_state()), &mut rng);
        }
        assert_eq!(engine.hebbian_update(&mut rng), 3);
        let before = engine.link_count();
        assert_eq!(engine.hebbian_update(&mut rng), 0);
        assert_eq!(engine.link_count(), before);
    }

    #[test]
    fn test_hebbian_respects_reverse_links() {
        let mut rng = rng();
        let mut engine = engine_with(EngineConfig {
            hebbian_link_probability: 1.0,
            ..EngineConfig::default()
        });
        engine.add_node("a", Some(active_state()), &mut rng);
        engine.add_node("b", Some(active_state()), &mut rng);
        engine.entangle("b", "a", None);
        assert_eq!(engine.dream(&mut rng), 0);
    }

    #[test]
    fn test_hebbian_zero_probability() {
        let mut rng = rng();
        let mut engine = engine_with(EngineConfig {
            hebbian_link_probability: 0.0,
            ..EngineConfig::default()
        });
        engine.add_node("a", Some(active_state()), &mut rng);
        engine.add_node("b", Some(active_state()), &mut rng);
        assert_eq!(engine.hebbian_update(&mut rng), 0);
    }

    #[test]
    fn test_process_input_uses_top_n() {
        let mut rng = rng();
        let engine = ResonanceEngine::default();
        let t = engine.process_input("a quiet evening", 1.0, &mut rng);
        assert_eq!(t.core_concepts.len(), 3);
        assert!(t.core_concepts[0].1 >= t.core_concepts[1].1);
        assert!(t.intensity > 0.0 && t.intensity <= 1.0);
    }
}
