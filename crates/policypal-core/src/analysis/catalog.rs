use std::collections::HashSet;

use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CatalogError;

/// Risky insurance vocabulary, in highlight priority order.
pub const STANDARD_TERMS: [&str; 11] = [
    "exclusion",
    "exclusions",
    "limitation",
    "limitations",
    "pre-existing condition",
    "contestable",
    "suicide",
    "waiting period",
    "not covered",
    "void",
    "termination",
];

static STANDARD: Lazy<TermCatalog> =
    Lazy::new(|| TermCatalog::new(STANDARD_TERMS).expect("built-in term catalog is valid"));

/// Ordered, immutable list of risky terms shared by the scorer and the highlighter.
///
/// Both matchers are compiled once at construction and fold ASCII case only,
/// so a term is scored exactly where it can also be highlighted.
#[derive(Debug, Clone)]
pub struct TermCatalog {
    terms: Vec<String>,
    /// Overlapping, ASCII case-insensitive matcher; pattern ids index into `terms`.
    automaton: AhoCorasick,
    /// One capture group per term, alternated in catalog order.
    pattern: Regex,
}

impl TermCatalog {
    /// The built-in eleven-term catalog.
    pub fn standard() -> &'static TermCatalog {
        &STANDARD
    }

    /// Build a catalog from caller-provided terms, validating invariants first.
    pub fn new<I, S>(terms: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for (index, term) in terms.iter().enumerate() {
            if term.trim().is_empty() {
                return Err(CatalogError::BlankTerm { index });
            }
            if !seen.insert(term.to_ascii_lowercase()) {
                return Err(CatalogError::DuplicateTerm { term: term.clone() });
            }
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .ascii_case_insensitive(true)
            .build(&terms)
            .map_err(|err| CatalogError::Compile {
                reason: err.to_string(),
            })?;

        let alternation = terms
            .iter()
            .map(|term| format!("({})", ascii_fold_pattern(term)))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&alternation).map_err(|err| CatalogError::Compile {
            reason: err.to_string(),
        })?;

        Ok(Self {
            terms,
            automaton,
            pattern,
        })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Points deducted for every distinct term present: `floor(100 / len)`.
    pub fn penalty_per_hit(&self) -> u8 {
        (100 / self.terms.len()) as u8
    }

    pub(crate) fn automaton(&self) -> &AhoCorasick {
        &self.automaton
    }

    pub(crate) fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

/// Escaped regex for `term` in which ASCII letters match either case and
/// every other character matches only itself.
fn ascii_fold_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() * 4);
    let mut buf = [0u8; 4];
    for ch in term.chars() {
        if ch.is_ascii_alphabetic() {
            pattern.push('[');
            pattern.push(ch.to_ascii_lowercase());
            pattern.push(ch.to_ascii_uppercase());
            pattern.push(']');
        } else {
            pattern.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
        }
    }
    pattern
}
