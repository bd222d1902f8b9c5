//! Property tests for the state vector and the resonance measure.

use cogito_core::{Basis, CognitiveUnit, CollapseMode, ResonanceEngine, StateVector};
use num_complex::Complex64;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn amplitude() -> impl Strategy<Value = Complex64> {
    (-10.0..10.0f64, -10.0..10.0f64).prop_map(|(re, im)| Complex64::new(re, im))
}

fn state() -> impl Strategy<Value = StateVector> {
    (
        prop::array::uniform4(amplitude()),
        0.0..3.0f64,
        prop::array::uniform3(-1.0..1.0f64),
    )
        .prop_map(|(amps, w, [x, y, z])| {
            StateVector::new(amps)
                .with_dimension(w)
                .with_orientation(x, y, z)
        })
}

/// One mutation of a state vector.
#[derive(Clone, Debug)]
enum Op {
    Rotate(f64, [f64; 3]),
    Adjust(f64),
    Collapse(CollapseMode),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-5.0..5.0f64, prop::array::uniform3(-2.0..2.0f64)).prop_map(|(w, d)| Op::Rotate(w, d)),
        (-5.0..5.0f64).prop_map(Op::Adjust),
        prop_oneof![Just(CollapseMode::Max), Just(CollapseMode::Random)].prop_map(Op::Collapse),
    ]
}

fn unit(id: &str, state: StateVector) -> CognitiveUnit {
    CognitiveUnit::new(id).with_state(state)
}

proptest! {
    #[test]
    fn normalized_probabilities_sum_to_one(s in state()) {
        let sum = s.probabilities().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "sum = {sum}");
    }

    #[test]
    fn rotate_wheel_keeps_normalization(
        s in state(),
        w_delta in -5.0..5.0f64,
        d in prop::array::uniform3(-2.0..2.0f64),
    ) {
        let mut s = s;
        s.rotate_wheel(w_delta, d[0], d[1], d[2]);
        let sum = s.probabilities().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "sum = {sum}");
        prop_assert!(s.w >= 0.0);
        let n = s.orientation_norm();
        prop_assert!(n == 0.0 || (n - 1.0).abs() < 1e-9, "orientation norm = {n}");
    }

    #[test]
    fn adjust_amplitude_keeps_normalization(s in state(), delta in -5.0..5.0f64) {
        let mut s = s;
        s.adjust_amplitude(delta);
        prop_assert!((s.probabilities().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mixed_operations_keep_normalization(
        s in state(),
        ops in prop::collection::vec(op(), 1..20),
        seed in any::<u64>(),
    ) {
        let mut s = s;
        let mut rng = SmallRng::seed_from_u64(seed);
        for (i, op) in ops.iter().enumerate() {
            match *op {
                Op::Rotate(w, [dx, dy, dz]) => s.rotate_wheel(w, dx, dy, dz),
                Op::Adjust(delta) => s.adjust_amplitude(delta),
                Op::Collapse(mode) => {
                    s.collapse(mode, &mut rng);
                }
            }
            let sum = s.probabilities().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "after op {i} ({op:?}): sum = {sum}");
            prop_assert!(s.w >= 0.0);
        }
    }

    #[test]
    fn resonance_is_symmetric(a in state(), b in state()) {
        let (ua, ub) = (unit("a", a), unit("b", b));
        let ab = ResonanceEngine::calculate_resonance(&ua, &ub);
        let ba = ResonanceEngine::calculate_resonance(&ub, &ua);
        prop_assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn resonance_is_bounded(a in state(), b in state()) {
        let r = ResonanceEngine::calculate_resonance(&unit("a", a), &unit("b", b));
        prop_assert!(r.is_finite());
        prop_assert!((0.0..=1.0 + 1e-9).contains(&r), "resonance = {r}");
    }

    #[test]
    fn dominant_basis_has_max_probability(s in state()) {
        let p = s.probabilities();
        let dominant = p.get(s.dominant_basis());
        for b in Basis::ALL {
            prop_assert!(dominant + 1e-12 >= p.get(b));
        }
    }
}
