use policypal_core::analysis::catalog::STANDARD_TERMS;
use policypal_core::analysis::highlight::{self, HTML_CLOSE, HTML_OPEN};
use policypal_core::analysis::scorer::score;
use policypal_core::prompts::{comparison_prompt, COMPARISON_PREFIX_CHARS};
use policypal_core::{CoverageLabel, Highlighter, Marker, RiskScorer};
use proptest::prelude::*;

/// ASCII text without vowels cannot contain any catalog term.
fn term_free_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[b-df-hj-np-tv-zB-DF-HJ-NP-TV-Z0-9 ,.;:\\-\n]{0,200}").unwrap()
}

/// ASCII prose that may or may not contain catalog terms.
fn ascii_text() -> impl Strategy<Value = String> {
    let filler = proptest::string::string_regex("[a-zA-Z ,.\\-]{0,40}").unwrap();
    let term = proptest::sample::select(STANDARD_TERMS.to_vec());
    proptest::collection::vec((filler, proptest::option::of(term)), 0..8).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(filler, term)| format!("{filler}{}", term.unwrap_or_default()))
            .collect()
    })
}

fn apply_casing(term: &str, mask: &[bool]) -> String {
    term.chars()
        .zip(mask.iter().cycle())
        .map(|(ch, upper)| if *upper { ch.to_ascii_uppercase() } else { ch })
        .collect()
}

proptest! {
    #[test]
    fn term_free_text_scores_full_marks(text in term_free_text()) {
        prop_assert_eq!(score(&text), 100);
    }

    #[test]
    fn all_terms_in_any_casing_score_one(
        mask in proptest::collection::vec(any::<bool>(), 1..32),
        separator in proptest::string::string_regex("[0-9 ,.;]{1,4}").unwrap(),
    ) {
        let text = STANDARD_TERMS
            .iter()
            .map(|term| apply_casing(term, &mask))
            .collect::<Vec<_>>()
            .join(&separator);
        prop_assert_eq!(score(&text), 100 - 11 * (100 / 11));
        prop_assert_eq!(score(&text), 1);
    }

    #[test]
    fn scoring_ignores_case(text in ascii_text()) {
        let base = score(&text);
        prop_assert_eq!(base, score(&text.to_uppercase()));
        prop_assert_eq!(base, score(&text.to_lowercase()));
    }

    #[test]
    fn score_stays_in_range_and_labels_are_total(text in ascii_text()) {
        let value = score(&text);
        prop_assert!(value <= 100);
        let label = CoverageLabel::from_score(value);
        let expected = if value >= 80 {
            CoverageLabel::Strong
        } else if value >= 50 {
            CoverageLabel::Moderate
        } else {
            CoverageLabel::Weak
        };
        prop_assert_eq!(label, expected);
    }

    #[test]
    fn every_highlighted_term_is_scored(text in ascii_text()) {
        let scored: Vec<String> = RiskScorer::default()
            .assess(&text)
            .hits
            .into_iter()
            .map(|hit| hit.term)
            .collect();
        for found in Highlighter::default().highlights(&text) {
            prop_assert!(scored.contains(&found.term), "{} not scored", found.term);
        }
    }

    #[test]
    fn highlight_is_identity_without_terms(text in term_free_text()) {
        prop_assert_eq!(highlight::highlight(&text), text);
    }

    #[test]
    fn stripping_markers_recovers_input(text in ascii_text()) {
        let highlighted = highlight::highlight(&text);
        prop_assert_eq!(
            highlighted.replace(HTML_OPEN, "").replace(HTML_CLOSE, ""),
            text.clone()
        );
        prop_assert_eq!(Marker::Html.strip(&highlighted), text);
    }

    #[test]
    fn comparison_embeds_exact_prefixes(
        first in proptest::string::string_regex("[a-z]{0,1500}").unwrap(),
        second in proptest::string::string_regex("[a-z]{0,1500}").unwrap(),
    ) {
        let prompt = comparison_prompt(&first, &second);
        let head = |s: &str| s.chars().take(COMPARISON_PREFIX_CHARS).collect::<String>();
        let expected = format!("Policy 1:\n{}\n\nPolicy 2:\n{}\n\n", head(&first), head(&second));
        prop_assert!(prompt.contains(&expected));
    }
}
