use tracing::{debug, instrument, trace};

use super::{catalog::TermCatalog, CoverageLabel, CoverageThresholds, RiskAssessment, TermHit};

/// Heuristic coverage-strength scorer backed by a [`TermCatalog`].
///
/// A document starts at 100 and loses `floor(100 / catalog_len)` points for
/// every distinct catalog term it contains as a case-insensitive substring,
/// floored at zero. Repeated occurrences of the same term do not lower the
/// score further, and each term is tested on its own, so `exclusions` hits
/// both `exclusion` and `exclusions`.
#[derive(Debug, Clone)]
pub struct RiskScorer<'c> {
    catalog: &'c TermCatalog,
    thresholds: CoverageThresholds,
}

impl Default for RiskScorer<'static> {
    fn default() -> Self {
        Self::new(TermCatalog::standard())
    }
}

impl<'c> RiskScorer<'c> {
    pub fn new(catalog: &'c TermCatalog) -> Self {
        Self::with_thresholds(catalog, CoverageThresholds::default())
    }

    pub fn with_thresholds(catalog: &'c TermCatalog, thresholds: CoverageThresholds) -> Self {
        Self {
            catalog,
            thresholds,
        }
    }

    pub fn catalog(&self) -> &TermCatalog {
        self.catalog
    }

    /// Score a document in `0..=100`; higher means fewer risky terms.
    pub fn score(&self, text: &str) -> u8 {
        let counts = self.term_counts(text);
        let risky_hits = counts.iter().filter(|count| **count > 0).count();
        self.score_for_hits(risky_hits)
    }

    pub fn label(&self, text: &str) -> CoverageLabel {
        CoverageLabel::from_score_with_thresholds(self.score(text), &self.thresholds)
    }

    /// Score a document and report which terms caused the deductions.
    #[instrument(name = "assess_text", skip(self, text), fields(text_len = text.len()))]
    pub fn assess(&self, text: &str) -> RiskAssessment {
        let counts = self.term_counts(text);
        let hits: Vec<TermHit> = self
            .catalog
            .terms()
            .iter()
            .zip(counts)
            .filter(|(_, occurrences)| *occurrences > 0)
            .map(|(term, occurrences)| TermHit {
                term: term.clone(),
                occurrences,
            })
            .collect();
        let score = self.score_for_hits(hits.len());
        debug!(risky_hits = hits.len(), score, "assessment completed");
        RiskAssessment {
            score,
            label: CoverageLabel::from_score_with_thresholds(score, &self.thresholds),
            hits,
            penalty_per_hit: self.catalog.penalty_per_hit(),
            text_chars: text.chars().count(),
        }
    }

    fn score_for_hits(&self, risky_hits: usize) -> u8 {
        let penalty = risky_hits.saturating_mul(self.catalog.penalty_per_hit() as usize);
        100usize.saturating_sub(penalty) as u8
    }

    /// Per-term occurrence counts in catalog order. Occurrences of different
    /// terms may overlap.
    fn term_counts(&self, text: &str) -> Vec<usize> {
        let mut counts = vec![0usize; self.catalog.len()];
        for mat in self.catalog.automaton().find_overlapping_iter(text) {
            counts[mat.pattern().as_usize()] += 1;
        }
        trace!(?counts, "term counts computed");
        counts
    }
}

/// Score `text` against the standard catalog.
pub fn score(text: &str) -> u8 {
    RiskScorer::default().score(text)
}
