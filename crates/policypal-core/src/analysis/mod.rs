use std::fmt;

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod highlight;
pub mod scorer;

/// Byte span within the analysed text `(start, end)` where `start <= end`.
pub type Span = (usize, usize);

/// Upper bound of every risk score.
pub const MAX_SCORE: u8 = 100;

/// Thresholds that map numeric scores into coverage-strength labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageThresholds {
    pub strong: u8,
    pub moderate: u8,
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        Self {
            strong: 80,
            moderate: 50,
        }
    }
}

/// Qualitative bucket for a policy's coverage strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLabel {
    Strong,
    Moderate,
    Weak,
}

impl CoverageLabel {
    /// Map a risk score (0..=100) into a coverage label.
    pub fn from_score(score: u8) -> Self {
        Self::from_score_with_thresholds(score, &CoverageThresholds::default())
    }

    /// Map a risk score using caller-provided thresholds.
    pub fn from_score_with_thresholds(score: u8, thresholds: &CoverageThresholds) -> Self {
        debug_assert!(score <= MAX_SCORE, "risk score {score} outside 0..=100");
        if score >= thresholds.strong {
            Self::Strong
        } else if score >= thresholds.moderate {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
        }
    }
}

impl fmt::Display for CoverageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog term that occurs at least once in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermHit {
    pub term: String,
    /// ASCII case-insensitive occurrences of this term; a plural occurrence
    /// also counts toward its singular.
    pub occurrences: usize,
}

/// Explainable result of scoring a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub label: CoverageLabel,
    /// Matched terms in catalog order.
    pub hits: Vec<TermHit>,
    pub penalty_per_hit: u8,
    pub text_chars: usize,
}

impl RiskAssessment {
    /// Number of distinct catalog terms present in the document.
    pub fn risky_hits(&self) -> usize {
        self.hits.len()
    }

    /// Share of the score lost to risky terms, the complement of `score`.
    pub fn risk_impact(&self) -> u8 {
        MAX_SCORE - self.score
    }
}
