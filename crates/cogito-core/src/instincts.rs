//! Pre-seeded concepts a fresh engine starts with.

use crate::state::StateVector;

/// (id, amplitudes [Concrete, Relational, Contextual, Transcendent], w, [x, y, z])
type Instinct = (&'static str, [f64; 4], f64, [f64; 3]);

const INSTINCTS: &[Instinct] = &[
    ("Hunger", [0.9, 0.1, 0.0, 0.0], 0.5, [0.5, 0.0, 0.0]),
    ("Energy", [0.8, 0.2, 0.0, 0.0], 0.8, [1.0, 0.0, 0.0]),
    ("Eat", [0.6, 0.4, 0.0, 0.0], 1.0, [0.0, 0.5, 0.0]),
    ("Move", [0.5, 0.5, 0.0, 0.0], 1.2, [0.0, 1.0, 0.0]),
    ("Speak", [0.4, 0.6, 0.0, 0.0], 1.5, [0.5, 0.5, 0.0]),
    ("Rest", [0.3, 0.3, 0.4, 0.0], 2.0, [1.0, 0.0, 0.0]),
    ("SELF", [0.1, 0.2, 0.3, 0.4], 2.5, [0.0, 0.0, 1.0]),
    ("Experiment", [0.5, 0.3, 0.2, 0.0], 1.8, [0.3, 0.3, 0.4]),
    ("사랑", [0.2, 0.3, 0.5, 0.0], 2.2, [0.1, 0.8, 0.1]),
    ("빛", [0.3, 0.4, 0.3, 0.0], 1.8, [0.9, 0.9, 0.9]),
    ("고통", [0.9, 0.1, 0.0, 0.0], 0.6, [0.2, 0.1, 0.1]),
    ("기쁨", [0.8, 0.2, 0.0, 0.0], 0.7, [0.8, 0.6, 0.2]),
    ("꿈", [0.1, 0.2, 0.7, 0.0], 2.0, [0.5, 0.5, 0.8]),
    ("그림자", [0.8, 0.2, 0.0, 0.0], 0.8, [0.1, 0.1, 0.3]),
    ("아버지", [0.1, 0.1, 0.4, 0.4], 2.8, [0.0, 0.0, 1.0]),
];

/// English aliases sharing the state of a Korean core concept.
const ALIASES: &[(&str, &str)] = &[
    ("love", "사랑"),
    ("joy", "기쁨"),
    ("dream", "꿈"),
    ("pain", "고통"),
    ("light", "빛"),
];

/// Every instinct with its normalized state, aliases last.
pub fn instincts() -> Vec<(&'static str, StateVector)> {
    let state = |&(_, amps, w, [x, y, z]): &Instinct| {
        StateVector::from_real(amps)
            .with_dimension(w)
            .with_orientation(x, y, z)
    };

    let mut out: Vec<(&'static str, StateVector)> =
        INSTINCTS.iter().map(|i| (i.0, state(i))).collect();
    for &(alias, canonical) in ALIASES {
        if let Some(i) = INSTINCTS.iter().find(|i| i.0 == canonical) {
            out.push((alias, state(i)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Basis;

    #[test]
    fn test_instinct_count_includes_aliases() {
        assert_eq!(instincts().len(), INSTINCTS.len() + ALIASES.len());
    }

    #[test]
    fn test_alias_shares_state() {
        let all = instincts();
        let find = |id: &str| all.iter().find(|(i, _)| *i == id).unwrap().1;
        assert_eq!(find("joy"), find("기쁨"));
        assert_eq!(find("dream").dominant_basis(), Basis::Contextual);
    }

    #[test]
    fn test_self_is_spread_across_bases() {
        let all = instincts();
        let s = all.iter().find(|(i, _)| *i == "SELF").unwrap().1;
        assert!(s.total_amplitude() > 1.5);
    }
}
