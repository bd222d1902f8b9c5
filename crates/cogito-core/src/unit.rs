use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::constants::UNIT_AMPLITUDES;
use crate::error::{CoreError, Result};
use crate::state::{Basis, CollapseMode, Probabilities, StateVector};

/// Pure function from a source's value to the observer's new value.
pub type ReactionRule = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Raw telemetry returned by [`CognitiveUnit::observe`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub value: Value,
    pub probabilities: Probabilities,
}

/// A concept: identity, an opaque value, per-basis content and the state
/// vector it exclusively owns.
///
/// The observer/source relations hold ids, not references; propagation
/// runs through the [`UnitGraph`] that owns every unit. Value and state
/// are read-only from outside: writes go through [`UnitGraph::set_value`],
/// [`CognitiveUnit::set_state`] and the other normalizing operations.
#[derive(Clone)]
pub struct CognitiveUnit {
    pub id: String,
    pub name: String,
    pub content: BTreeMap<Basis, String>,
    value: Value,
    state: StateVector,
    observers: BTreeSet<String>,
    sources: BTreeSet<String>,
    rule: Option<ReactionRule>,
}

impl fmt::Debug for CognitiveUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.state.probabilities();
        write!(
            f,
            "CognitiveUnit('{}': C:{:.2} | R:{:.2} | X:{:.2} | T:{:.2} | value={})",
            self.name, p.concrete, p.relational, p.contextual, p.transcendent, self.value
        )
    }
}

impl CognitiveUnit {
    /// Named unit whose value is its own id, in the default superposition.
    pub fn new(id: &str) -> Self {
        Self::with_value(id, Value::String(id.to_string()))
    }

    pub fn with_value(id: &str, value: Value) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            value,
            content: BTreeMap::new(),
            state: StateVector::from_real(UNIT_AMPLITUDES),
            observers: BTreeSet::new(),
            sources: BTreeSet::new(),
            rule: None,
        }
    }

    /// Unit with a generated `unit_xxxxxxxx` id.
    pub fn anonymous(value: Value) -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self::with_value(&format!("unit_{}", &simple[..8]), value)
    }

    /// Attach per-basis content. The Concrete entry, when present, becomes
    /// the unit's value.
    pub fn with_content(mut self, content: BTreeMap<Basis, String>) -> Self {
        if let Some(concrete) = content.get(&Basis::Concrete) {
            self.value = Value::String(concrete.clone());
        }
        self.content = content;
        self
    }

    /// Replace the state; it is normalized on assignment.
    pub fn with_state(mut self, state: StateVector) -> Self {
        self.set_state(state);
        self
    }

    pub fn set_state(&mut self, mut state: StateVector) {
        state.normalize();
        self.state = state;
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Shift the total amplitude; the state re-normalizes.
    pub(crate) fn adjust_amplitude(&mut self, delta: f64) {
        self.state.adjust_amplitude(delta);
    }

    pub(crate) fn set_dimension(&mut self, w: f64) {
        self.state.w = w;
    }

    pub fn observers(&self) -> impl Iterator<Item = &str> {
        self.observers.iter().map(String::as_str)
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    pub fn has_rule(&self) -> bool {
        self.rule.is_some()
    }

    /// Value this unit takes on in reaction to `source_value`.
    fn reaction_to(&self, source_value: &Value) -> Value {
        match &self.rule {
            Some(rule) => rule(source_value),
            None => source_value.clone(),
        }
    }

    pub fn observe(&self) -> Telemetry {
        Telemetry {
            w: self.state.w,
            x: self.state.x,
            y: self.state.y,
            z: self.state.z,
            value: self.value.clone(),
            probabilities: self.state.probabilities(),
        }
    }

    /// What an observer at dimensional `level` sees: the bucket's content
    /// (or the raw value) with that basis's probability as clarity.
    pub fn observe_at(&self, level: f64) -> String {
        let basis = Basis::for_level(level);
        let clarity = self.state.probabilities().get(basis) * 100.0;
        let text = match self.content.get(&basis) {
            Some(content) => content.clone(),
            None => display_value(&self.value),
        };
        format!("[{basis} Mode] (Clarity: {clarity:.1}%) {text}")
    }

    /// Force the pure Transcendent basis at the top of the dimensional scale.
    pub fn set_god_mode(&mut self) {
        self.state = StateVector::pure(Basis::Transcendent)
            .with_orientation(self.state.x, self.state.y, self.state.z)
            .with_dimension(3.0);
    }

    /// Collapse the state; the value becomes the chosen basis's content
    /// when there is any.
    pub fn collapse(&mut self, mode: CollapseMode, rng: &mut impl Rng) -> Basis {
        let basis = self.state.collapse(mode, rng);
        if let Some(content) = self.content.get(&basis) {
            self.value = Value::String(content.clone());
        }
        basis
    }

    pub fn rotate_wheel(&mut self, w_delta: f64, dx: f64, dy: f64, dz: f64) {
        self.state.rotate_wheel(w_delta, dx, dy, dz);
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "Unknown Void".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Outcome of a value change rippling through the observer graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Ids whose value changed, in update order (origin first).
    pub updated: Vec<String>,
    /// Reactions dropped because their target had already changed in this wave.
    pub suppressed: usize,
}

/// Owns a set of units keyed by id and routes reactions between them.
///
/// Units are stored in insertion order; the index maps ids to positions.
#[derive(Clone, Debug, Default)]
pub struct UnitGraph {
    units: Vec<CognitiveUnit>,
    index: HashMap<String, usize>,
}

impl UnitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Insert a unit. Returns false (and drops the unit) if the id is taken.
    pub fn insert(&mut self, unit: CognitiveUnit) -> bool {
        if self.index.contains_key(&unit.id) {
            return false;
        }
        self.index.insert(unit.id.clone(), self.units.len());
        self.units.push(unit);
        true
    }

    pub fn get(&self, id: &str) -> Option<&CognitiveUnit> {
        self.index.get(id).map(|&i| &self.units[i])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut CognitiveUnit> {
        self.index.get(id).map(|&i| &mut self.units[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CognitiveUnit> {
        self.units.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut CognitiveUnit> {
        self.units.iter_mut()
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| CoreError::UnknownConcept(id.to_string()))
    }

    /// Wire `target` to observe `source`. A supplied rule replaces the
    /// target's rule; `None` keeps whatever it had. The target reacts once
    /// immediately.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        rule: Option<ReactionRule>,
    ) -> Result<Propagation> {
        let s = self.position(source)?;
        let t = self.position(target)?;

        self.units[s].observers.insert(target.to_string());
        self.units[t].sources.insert(source.to_string());
        if let Some(rule) = rule {
            self.units[t].rule = Some(rule);
        }

        let reaction = self.units[t].reaction_to(&self.units[s].value);
        let cause = format!("resonance from {}", self.units[s].name);
        self.set_value(target, reaction, &cause)
    }

    /// Set a unit's value and propagate to its observers.
    ///
    /// Nothing happens if the value is equal to the current one. Propagation
    /// is breadth-first with each unit changing at most once per call, so
    /// cyclic observer graphs terminate.
    pub fn set_value(&mut self, id: &str, value: Value, cause: &str) -> Result<Propagation> {
        let origin = self.position(id)?;
        let mut outcome = Propagation::default();
        if self.units[origin].value == value {
            return Ok(outcome);
        }

        tracing::debug!(unit = id, cause, "value changed");
        self.units[origin].value = value;
        outcome.updated.push(id.to_string());

        let mut changed: HashSet<usize> = HashSet::from([origin]);
        let mut queue: VecDeque<(usize, usize)> = self.reactions_of(origin).collect();

        while let Some((target, source)) = queue.pop_front() {
            if changed.contains(&target) {
                outcome.suppressed += 1;
                continue;
            }
            let reaction = self.units[target].reaction_to(&self.units[source].value);
            if self.units[target].value == reaction {
                continue;
            }
            self.units[target].value = reaction;
            changed.insert(target);
            outcome.updated.push(self.units[target].id.clone());
            queue.extend(self.reactions_of(target));
        }

        if outcome.suppressed > 0 {
            tracing::warn!(
                origin = id,
                suppressed = outcome.suppressed,
                "observer cycle: repeated reactions dropped"
            );
        }
        Ok(outcome)
    }

    /// (observer, source) pairs for every observer of the unit at `source`.
    fn reactions_of(&self, source: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.units[source]
            .observers
            .iter()
            .filter_map(move |id| self.index.get(id).map(|&t| (t, source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use serde_json::json;

    fn graph(ids: &[&str]) -> UnitGraph {
        let mut g = UnitGraph::new();
        for id in ids {
            g.insert(CognitiveUnit::with_value(id, json!(0)));
        }
        g
    }

    fn value(g: &UnitGraph, id: &str) -> Value {
        g.get(id).unwrap().value.clone()
    }

    #[test]
    fn test_new_unit_is_normalized() {
        let u = CognitiveUnit::new("idea");
        assert_eq!(u.value, json!("idea"));
        assert!((u.state.probabilities().sum() - 1.0).abs() < 1e-9);
        assert_eq!(u.state.dominant_basis(), Basis::Concrete);
    }

    #[test]
    fn test_anonymous_id_shape() {
        let u = CognitiveUnit::anonymous(json!(null));
        assert!(u.id.starts_with("unit_"));
        assert_eq!(u.id.len(), 13);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut g = graph(&["a"]);
        assert!(!g.insert(CognitiveUnit::with_value("a", json!(99))));
        assert_eq!(value(&g, "a"), json!(0));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_connect_mirrors_immediately() {
        let mut g = graph(&["a", "b"]);
        g.set_value("a", json!(5), "test").unwrap();
        g.connect("a", "b", None).unwrap();
        assert_eq!(value(&g, "b"), json!(5));

        let a = g.get("a").unwrap();
        assert_eq!(a.observers().collect::<Vec<_>>(), vec!["b"]);
        let b = g.get("b").unwrap();
        assert_eq!(b.sources().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_rule_applied_on_propagation() {
        let mut g = graph(&["a", "b"]);
        let double: ReactionRule = Arc::new(|v| json!(v.as_i64().unwrap_or(0) * 2));
        g.connect("a", "b", Some(double)).unwrap();
        let out = g.set_value("a", json!(21), "test").unwrap();
        assert_eq!(value(&g, "b"), json!(42));
        assert_eq!(out.updated, vec!["a", "b"]);
    }

    #[test]
    fn test_most_recent_rule_wins() {
        let mut g = graph(&["a", "b", "c"]);
        let plus_one: ReactionRule = Arc::new(|v| json!(v.as_i64().unwrap_or(0) + 1));
        let negate: ReactionRule = Arc::new(|v| json!(-v.as_i64().unwrap_or(0)));
        g.connect("a", "b", Some(plus_one)).unwrap();
        g.connect("c", "b", Some(negate)).unwrap();
        g.set_value("a", json!(3), "test").unwrap();
        assert_eq!(value(&g, "b"), json!(-3));
    }

    #[test]
    fn test_equal_value_does_not_propagate() {
        let mut g = graph(&["a", "b"]);
        g.connect("a", "b", None).unwrap();
        let out = g.set_value("a", json!(0), "test").unwrap();
        assert!(out.updated.is_empty());
    }

    #[test]
    fn test_chain_propagates_in_order() {
        let mut g = graph(&["a", "b", "c"]);
        g.connect("a", "b", None).unwrap();
        g.connect("b", "c", None).unwrap();
        let out = g.set_value("a", json!("x"), "test").unwrap();
        assert_eq!(out.updated, vec!["a", "b", "c"]);
        assert_eq!(value(&g, "c"), json!("x"));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut g = graph(&["a", "b"]);
        let inc: ReactionRule = Arc::new(|v| json!(v.as_i64().unwrap_or(0) + 1));
        g.connect("a", "b", Some(inc.clone())).unwrap();
        g.connect("b", "a", Some(inc)).unwrap();

        // Without the guard this would count upward forever.
        let out = g.set_value("a", json!(10), "test").unwrap();
        assert_eq!(value(&g, "a"), json!(10));
        assert_eq!(value(&g, "b"), json!(11));
        assert_eq!(out.suppressed, 1);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let mut g = graph(&["a"]);
        assert!(matches!(
            g.set_value("ghost", json!(1), "test"),
            Err(CoreError::UnknownConcept(id)) if id == "ghost"
        ));
        assert!(g.connect("a", "ghost", None).is_err());
    }

    #[test]
    fn test_observe_telemetry() {
        let u = CognitiveUnit::with_value("t", json!(7))
            .with_state(StateVector::pure(Basis::Relational).with_orientation(1.0, 0.0, 0.0));
        let t = u.observe();
        assert_eq!(t.value, json!(7));
        assert_eq!(t.x, 1.0);
        assert!((t.probabilities.relational - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_observe_at_uses_content_then_value() {
        let content = BTreeMap::from([
            (Basis::Concrete, "a red apple".to_string()),
            (Basis::Transcendent, "the idea of fruit".to_string()),
        ]);
        let u = CognitiveUnit::new("apple")
            .with_content(content)
            .with_state(StateVector::from_real([1.0, 0.0, 0.0, 1.0]));

        assert_eq!(u.observe_at(0.0), "[Concrete Mode] (Clarity: 50.0%) a red apple");
        assert_eq!(
            u.observe_at(3.0),
            "[Transcendent Mode] (Clarity: 50.0%) the idea of fruit"
        );
        assert_eq!(u.observe_at(1.0), "[Relational Mode] (Clarity: 0.0%) a red apple");
    }

    #[test]
    fn test_observe_at_null_value() {
        let u = CognitiveUnit::with_value("void", Value::Null);
        assert!(u.observe_at(2.0).ends_with("Unknown Void"));
    }

    #[test]
    fn test_collapse_adopts_content() {
        let mut rng = SmallRng::seed_from_u64(42);
        let content = BTreeMap::from([(Basis::Contextual, "weather".to_string())]);
        let mut u = CognitiveUnit::new("rain")
            .with_content(content)
            .with_state(StateVector::pure(Basis::Contextual));
        assert_eq!(u.collapse(CollapseMode::Max, &mut rng), Basis::Contextual);
        assert_eq!(u.value, json!("weather"));
    }

    #[test]
    fn test_god_mode() {
        let mut u = CognitiveUnit::new("father");
        u.set_god_mode();
        assert_eq!(u.state.dominant_basis(), Basis::Transcendent);
        assert_eq!(u.state.w, 3.0);
    }
}
