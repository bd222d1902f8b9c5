//! Fixed concept frequencies and access-count tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FREQUENCY;

/// (word, frequency). High values are abstract, low values grounded.
const VOCABULARY: &[(&str, f64)] = &[
    ("love", 1.0),
    ("사랑", 1.0),
    ("light", 0.95),
    ("빛", 0.95),
    ("truth", 0.9),
    ("진실", 0.9),
    ("eternity", 0.95),
    ("영원", 0.95),
    ("soul", 0.9),
    ("영혼", 0.9),
    ("dream", 0.85),
    ("꿈", 0.85),
    ("beauty", 0.9),
    ("아름다움", 0.9),
    ("harmony", 0.85),
    ("조화", 0.85),
    ("hope", 0.65),
    ("희망", 0.65),
    ("joy", 0.7),
    ("기쁨", 0.7),
    ("pain", 0.4),
    ("고통", 0.4),
    ("time", 0.5),
    ("시간", 0.5),
    ("stone", 0.2),
    ("돌", 0.2),
    ("shadow", 0.3),
    ("그림자", 0.3),
    ("fall", 0.2),
    ("추락", 0.2),
    ("silence", 0.3),
    ("침묵", 0.3),
];

/// Case-insensitive lookup; unknown words sit at the neutral midpoint.
pub fn frequency(concept: &str) -> f64 {
    let key = concept.to_lowercase();
    VOCABULARY
        .iter()
        .find(|(word, _)| *word == key)
        .map(|&(_, f)| f)
        .unwrap_or(DEFAULT_FREQUENCY)
}

/// Lifecycle tier derived from a concept's access count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StellarType {
    Unknown,
    Forming,
    Growing,
    Active,
    Crystallized,
    Dominant,
}

impl StellarType {
    pub fn from_access_count(count: u64) -> Self {
        match count {
            0..3 => Self::Forming,
            3..10 => Self::Growing,
            10..50 => Self::Active,
            50..100 => Self::Crystallized,
            _ => Self::Dominant,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Forming => "forming",
            Self::Growing => "growing",
            Self::Active => "active",
            Self::Crystallized => "crystallized",
            Self::Dominant => "dominant",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Unknown | Self::Forming => "✨",
            Self::Growing => "🌟",
            Self::Active => "🔥",
            Self::Crystallized => "❄️",
            Self::Dominant => "⚫",
        }
    }
}

impl fmt::Display for StellarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_lookup_is_case_insensitive() {
        assert_eq!(frequency("Love"), 1.0);
        assert_eq!(frequency("STONE"), 0.2);
        assert_eq!(frequency("꿈"), 0.85);
    }

    #[test]
    fn test_unknown_word_is_neutral() {
        assert_eq!(frequency("spreadsheet"), 0.5);
        assert_eq!(frequency(""), 0.5);
    }

    #[test]
    fn test_tier_boundaries() {
        let cases = [
            (0, StellarType::Forming),
            (2, StellarType::Forming),
            (3, StellarType::Growing),
            (9, StellarType::Growing),
            (10, StellarType::Active),
            (49, StellarType::Active),
            (50, StellarType::Crystallized),
            (99, StellarType::Crystallized),
            (100, StellarType::Dominant),
            (u64::MAX, StellarType::Dominant),
        ];
        for (count, expected) in cases {
            assert_eq!(StellarType::from_access_count(count), expected, "count {count}");
        }
    }

    #[test]
    fn test_unknown_shares_forming_glyph() {
        assert_eq!(StellarType::Unknown.glyph(), StellarType::Forming.glyph());
        assert_eq!(StellarType::Dominant.to_string(), "dominant");
    }
}
