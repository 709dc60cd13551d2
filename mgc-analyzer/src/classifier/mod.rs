//! Rule-based genre classification
//!
//! A fixed point-scoring table turns a [`FeatureVector`] into a genre label and
//! a coarse confidence tier. No model, no state: the same features always give
//! the same answer.

pub mod rules;

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::features::FeatureVector;

/// Human-readable model name reported by the API
pub const MODEL_NAME: &str = "Fast Rule-Based Classification";

/// The eight genres, in the order used to break score ties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    Electronic,
    Rock,
    Pop,
    HipHop,
    Jazz,
    Classical,
    Country,
    Blues,
}

impl Genre {
    /// Every genre in enumeration (tie-break) order
    pub const ALL: [Genre; 8] = [
        Genre::Electronic,
        Genre::Rock,
        Genre::Pop,
        Genre::HipHop,
        Genre::Jazz,
        Genre::Classical,
        Genre::Country,
        Genre::Blues,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Genre::Electronic => "Electronic",
            Genre::Rock => "Rock",
            Genre::Pop => "Pop",
            Genre::HipHop => "Hip Hop",
            Genre::Jazz => "Jazz",
            Genre::Classical => "Classical",
            Genre::Country => "Country",
            Genre::Blues => "Blues",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Genre {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Confidence tier derived from the winning margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// margin ≥ 4 → High, margin ≥ 2 → Medium, otherwise Low
    pub fn from_margin(margin: i32) -> Self {
        if margin >= 4 {
            Confidence::High
        } else if margin >= 2 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        };
        f.write_str(label)
    }
}

/// Per-genre point accumulators for one scoring pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenreScores([i32; 8]);

impl GenreScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, genre: Genre, points: i32) {
        self.0[genre.index()] += points;
    }

    pub fn get(&self, genre: Genre) -> i32 {
        self.0[genre.index()]
    }

    /// Scores in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (Genre, i32)> + '_ {
        Genre::ALL.iter().map(move |&g| (g, self.get(g)))
    }

    /// Highest-scoring genre; ties go to the genre listed first in [`Genre::ALL`]
    pub fn best(&self) -> (Genre, i32) {
        let mut best = (Genre::ALL[0], self.get(Genre::ALL[0]));
        for (genre, score) in self.iter().skip(1) {
            if score > best.1 {
                best = (genre, score);
            }
        }
        best
    }

    /// Lead of the best genre over the highest of the other seven
    pub fn margin(&self) -> i32 {
        let (best, best_score) = self.best();
        let runner_up = self
            .iter()
            .filter(|&(g, _)| g != best)
            .map(|(_, s)| s)
            .max()
            .unwrap_or(0);
        best_score - runner_up
    }
}

impl Serialize for GenreScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Genre::ALL.len()))?;
        for (genre, score) in self.iter() {
            map.serialize_entry(genre.label(), &score)?;
        }
        map.end()
    }
}

/// Outcome of classifying one feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub genre: Genre,
    pub confidence: Confidence,
    /// Raw score of the winning genre
    pub score: i32,
    /// Full accumulator table behind the decision
    pub scores: GenreScores,
}

/// Classify a feature vector with the fixed rule table
pub fn classify(features: &FeatureVector) -> ClassificationResult {
    let scores = rules::score(features);
    let (genre, score) = scores.best();
    let confidence = Confidence::from_margin(scores.margin());

    tracing::debug!(
        genre = %genre,
        confidence = %confidence,
        score,
        margin = scores.margin(),
        "Genre classified"
    );

    ClassificationResult {
        genre,
        confidence,
        score,
        scores,
    }
}
