use std::fmt;

use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::EPSILON;

/// One of the four mutually exclusive interpretive bases.
///
/// Declaration order is the fixed precedence order used for tie-breaks and
/// the direction of probability flow in [`StateVector::rotate_wheel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Basis {
    Concrete,
    Relational,
    Contextual,
    Transcendent,
}

impl Basis {
    pub const ALL: [Basis; 4] = [
        Basis::Concrete,
        Basis::Relational,
        Basis::Contextual,
        Basis::Transcendent,
    ];

    pub fn index(self) -> usize {
        match self {
            Basis::Concrete => 0,
            Basis::Relational => 1,
            Basis::Contextual => 2,
            Basis::Transcendent => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Basis::Concrete => "Concrete",
            Basis::Relational => "Relational",
            Basis::Contextual => "Contextual",
            Basis::Transcendent => "Transcendent",
        }
    }

    /// Bucket an observer's dimensional level into a basis:
    /// <0.5 Concrete, <1.5 Relational, <2.5 Contextual, else Transcendent.
    pub fn for_level(level: f64) -> Self {
        if level < 0.5 {
            Basis::Concrete
        } else if level < 1.5 {
            Basis::Relational
        } else if level < 2.5 {
            Basis::Contextual
        } else {
            Basis::Transcendent
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability mass per basis. Sums to 1 for a normalized state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub concrete: f64,
    pub relational: f64,
    pub contextual: f64,
    pub transcendent: f64,
}

impl Probabilities {
    pub fn from_array(p: [f64; 4]) -> Self {
        Self {
            concrete: p[0],
            relational: p[1],
            contextual: p[2],
            transcendent: p[3],
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [
            self.concrete,
            self.relational,
            self.contextual,
            self.transcendent,
        ]
    }

    pub fn get(&self, basis: Basis) -> f64 {
        self.as_array()[basis.index()]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Dot product of two distributions. Range: [0, 1].
    pub fn dot(&self, other: &Self) -> f64 {
        self.as_array()
            .iter()
            .zip(other.as_array())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Highest-probability basis; ties go to the earlier basis.
    pub fn dominant(&self) -> Basis {
        let p = self.as_array();
        let mut best = 0;
        for i in 1..4 {
            if p[i] > p[best] + EPSILON {
                best = i;
            }
        }
        Basis::ALL[best]
    }
}

/// How [`StateVector::collapse`] chooses its basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseMode {
    /// Highest probability, deterministic tie-break.
    Max,
    /// Sample proportionally to probability mass.
    Random,
}

/// Four complex amplitudes over the bases plus a dimensional orientation.
///
/// `w` is the dimensional scale (0 = most concrete, 3 = most transcendent);
/// `x, y, z` is a free 3D orientation used for spatial alignment.
/// Every mutating operation re-normalizes so that the squared magnitudes of
/// the amplitudes sum to 1. The amplitudes are only reachable through
/// those operations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateVector {
    amplitudes: [Complex64; 4],
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for StateVector {
    fn default() -> Self {
        Self {
            amplitudes: Self::ground_amplitudes(),
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

impl StateVector {
    /// Create a state from complex amplitudes, automatically normalized.
    pub fn new(amplitudes: [Complex64; 4]) -> Self {
        let mut state = Self {
            amplitudes,
            ..Self::default()
        };
        state.normalize();
        state
    }

    /// Create a state from real amplitudes (Concrete, Relational, Contextual, Transcendent).
    pub fn from_real(amplitudes: [f64; 4]) -> Self {
        Self::new(amplitudes.map(|a| Complex64::new(a, 0.0)))
    }

    /// Pure state on a single basis.
    pub fn pure(basis: Basis) -> Self {
        let mut amplitudes = [0.0; 4];
        amplitudes[basis.index()] = 1.0;
        Self::from_real(amplitudes)
    }

    pub fn with_dimension(mut self, w: f64) -> Self {
        self.w = w;
        self
    }

    pub fn with_orientation(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Orientation drawn uniformly from the unit cube [0, 1)³.
    pub fn with_random_orientation(self, rng: &mut impl Rng) -> Self {
        self.with_orientation(rng.random(), rng.random(), rng.random())
    }

    fn ground_amplitudes() -> [Complex64; 4] {
        [
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        ]
    }

    pub fn amplitude(&self, basis: Basis) -> Complex64 {
        self.amplitudes[basis.index()]
    }

    pub fn amplitudes(&self) -> [Complex64; 4] {
        self.amplitudes
    }

    /// Rescale amplitudes to unit probability. A zero vector resets to
    /// the pure Concrete basis.
    pub fn normalize(&mut self) -> &mut Self {
        let mag = self
            .amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt();
        if mag == 0.0 || !mag.is_finite() {
            self.amplitudes = Self::ground_amplitudes();
            return self;
        }
        for a in &mut self.amplitudes {
            *a /= mag;
        }
        self
    }

    pub fn probabilities(&self) -> Probabilities {
        Probabilities::from_array(self.amplitudes.map(|a| a.norm_sqr()))
    }

    pub fn dominant_basis(&self) -> Basis {
        self.probabilities().dominant()
    }

    /// Sum of amplitude magnitudes. Not normalized: ranges over [1, 2]
    /// for a unit state and is the quantity diffusion and decay act on.
    pub fn total_amplitude(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm()).sum()
    }

    /// Shift the total amplitude by `delta` (floored at 0), scaling every
    /// amplitude proportionally, then re-normalize.
    pub fn adjust_amplitude(&mut self, delta: f64) {
        let current = self.total_amplitude();
        if current == 0.0 {
            return;
        }
        let ratio = (current + delta).max(0.0) / current;
        for a in &mut self.amplitudes {
            *a *= ratio;
        }
        self.normalize();
    }

    /// Mouse-wheel navigation.
    ///
    /// Moves the dimensional scale by `w_delta` (floored at 0), nudges the
    /// orientation and re-normalizes it to unit length, then cascades
    /// probability between adjacent bases: positive `w_delta` flows
    /// Concrete → Transcendent, negative flows back. Each basis hands
    /// `p * |w_delta|` to its neighbor, with the rate capped at 1.
    pub fn rotate_wheel(&mut self, w_delta: f64, dx: f64, dy: f64, dz: f64) {
        self.w = (self.w + w_delta).max(0.0);
        self.x += dx;
        self.y += dy;
        self.z += dz;
        self.normalize_orientation();

        if w_delta == 0.0 {
            return;
        }

        let rate = w_delta.abs().min(1.0);
        let mut p = self.probabilities().as_array();
        if w_delta > 0.0 {
            for i in 0..3 {
                let flow = p[i] * rate;
                p[i] -= flow;
                p[i + 1] += flow;
            }
        } else {
            for i in (1..4).rev() {
                let flow = p[i] * rate;
                p[i] -= flow;
                p[i - 1] += flow;
            }
        }

        for (a, mass) in self.amplitudes.iter_mut().zip(p) {
            let phase = if a.norm() > 0.0 { a.arg() } else { 0.0 };
            *a = Complex64::from_polar(mass.max(0.0).sqrt(), phase);
        }
        self.normalize();
    }

    fn normalize_orientation(&mut self) {
        let mag = self.orientation_norm();
        if mag > 0.0 {
            self.x /= mag;
            self.y /= mag;
            self.z /= mag;
        }
    }

    pub fn orientation(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn orientation_norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Force the state onto a single basis and return it.
    pub fn collapse(&mut self, mode: CollapseMode, rng: &mut impl Rng) -> Basis {
        let probs = self.probabilities();
        let choice = match mode {
            CollapseMode::Max => probs.dominant(),
            CollapseMode::Random => sample_basis(&probs, rng),
        };
        self.amplitudes = [Complex64::new(0.0, 0.0); 4];
        self.amplitudes[choice.index()] = Complex64::new(1.0, 0.0);
        choice
    }
}

fn sample_basis(probs: &Probabilities, rng: &mut impl Rng) -> Basis {
    let p = probs.as_array();
    let total: f64 = p.iter().sum();
    let mut r = rng.random::<f64>() * total;
    let mut last = probs.dominant();
    for basis in Basis::ALL {
        let mass = p[basis.index()];
        if mass <= 0.0 {
            continue;
        }
        last = basis;
        if r < mass {
            return basis;
        }
        r -= mass;
    }
    // Rounding can leave r a hair above the final mass.
    last
}
