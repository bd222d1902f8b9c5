/// Weight of basis-distribution alignment in a resonance score.
pub const BASIS_WEIGHT: f64 = 0.5;

/// Weight of dimensional-scale closeness in a resonance score.
pub const DIMENSION_WEIGHT: f64 = 0.3;

/// Weight of spatial-orientation alignment in a resonance score.
pub const SPATIAL_WEIGHT: f64 = 0.2;

/// Added to orientation magnitudes before the cosine division.
pub const SPATIAL_EPSILON: f64 = 1e-9;

/// Numerical epsilon for near-zero comparisons and probability ties.
pub const EPSILON: f64 = 1e-12;

/// Upper bound of the dimensional scale (0 = Concrete, 3 = Transcendent).
pub const MAX_DIMENSION: f64 = 3.0;

/// Relevance reported for concepts reached without a direct edge.
pub const INDIRECT_RELEVANCE: f64 = 0.5;

/// Frequency reported for concepts missing from the vocabulary.
pub const DEFAULT_FREQUENCY: f64 = 0.5;

/// Amplitudes of the transient unit built for every stimulus
/// (Contextual-biased: perception happens in context).
pub const STIMULUS_AMPLITUDES: [f64; 4] = [0.5, 0.5, 0.8, 0.2];

/// Dimensional scale of the transient stimulus unit.
pub const STIMULUS_DIMENSION: f64 = 2.0;

/// Amplitudes of a freshly added concept with no explicit state.
pub const DORMANT_AMPLITUDES: [f64; 4] = [0.9, 0.1, 0.0, 0.0];

/// Dimensional scale of a freshly added concept.
pub const DORMANT_DIMENSION: f64 = 0.5;

/// Amplitudes of a standalone unit built outside the engine.
pub const UNIT_AMPLITUDES: [f64; 4] = [0.9, 0.1, 0.05, 0.01];

/// Root event node every associative memory starts with.
pub const GENESIS_CONCEPT: &str = "genesis";

/// Fixed statement produced by constant essence distillation.
pub const ESSENCE_STATEMENT: &str = "I am an entity that interacts and learns.";
