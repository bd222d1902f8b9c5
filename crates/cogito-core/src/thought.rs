use std::fmt;

use serde::{Deserialize, Serialize};

/// A stimulus: source text plus a non-negative intensity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub source_text: String,
    pub intensity: f64,
}

impl Wave {
    /// Negative (or NaN) intensity is clamped to 0.
    pub fn new(source_text: &str, intensity: f64) -> Self {
        Self {
            source_text: source_text.to_string(),
            intensity: if intensity > 0.0 { intensity } else { 0.0 },
        }
    }
}

/// Coarse tone of a thought, read off its top concept's id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Empty,
    Positive,
    Negative,
    Active,
    Contemplative,
    Neutral,
}

const POSITIVE: &[&str] = &["love", "joy", "hope", "light", "사랑", "기쁨", "희망", "빛"];
const NEGATIVE: &[&str] = &[
    "pain", "fear", "sadness", "shadow", "고통", "두려움", "슬픔", "그림자",
];
const ACTION: &[&str] = &["move", "speak", "eat", "experiment"];
const ABSTRACT: &[&str] = &["dream", "self", "꿈", "아버지"];

impl Mood {
    /// Keyword-substring classification, checked positive → negative →
    /// action → abstract. Not a sentiment model.
    pub fn from_concept(concept: &str) -> Self {
        let lower = concept.to_lowercase();
        let hit = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if hit(POSITIVE) {
            Mood::Positive
        } else if hit(NEGATIVE) {
            Mood::Negative
        } else if hit(ACTION) {
            Mood::Active
        } else if hit(ABSTRACT) {
            Mood::Contemplative
        } else {
            Mood::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Empty => "empty",
            Mood::Positive => "positive",
            Mood::Negative => "negative",
            Mood::Active => "active",
            Mood::Contemplative => "contemplative",
            Mood::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranked summary of one stimulus resonating against every known concept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub source_wave: String,
    /// (concept id, score), highest first.
    pub core_concepts: Vec<(String, f64)>,
    /// Mean score of the core concepts.
    pub intensity: f64,
    /// Gap between the two best scores, doubled and clamped to [0, 1].
    pub clarity: f64,
    pub mood: Mood,
}

impl Thought {
    pub fn empty(source_wave: &str) -> Self {
        Self {
            source_wave: source_wave.to_string(),
            core_concepts: Vec::new(),
            intensity: 0.0,
            clarity: 0.0,
            mood: Mood::Empty,
        }
    }

    pub fn top_concept(&self) -> Option<&str> {
        self.core_concepts.first().map(|(id, _)| id.as_str())
    }
}

impl fmt::Display for Thought {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.top_concept() {
            None => write!(f, "Thought(from: '{}', mood: empty)", self.source_wave),
            Some(top) => write!(
                f,
                "Thought(about: '{top}', intensity: {:.2}, clarity: {:.2}, mood: {})",
                self.intensity, self.clarity, self.mood
            ),
        }
    }
}
