use std::{fs, path::PathBuf};

use policypal_core::{
    extract::normalize_whitespace, CoverageLabel, Highlighter, Marker, RiskScorer, TermCatalog,
};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()))
}

fn hit_terms(text: &str) -> Vec<String> {
    RiskScorer::default()
        .assess(text)
        .hits
        .into_iter()
        .map(|hit| hit.term)
        .collect()
}

#[test]
fn strong_home_policy() {
    let text = fixture("strong_home_policy.txt");
    let report = RiskScorer::default().assess(&text);
    assert_eq!(report.score, 82);
    assert_eq!(report.label, CoverageLabel::Strong);
    assert_eq!(hit_terms(&text), vec!["exclusion", "exclusions"]);
}

#[test]
fn moderate_life_policy() {
    let text = fixture("moderate_life_policy.txt");
    let report = RiskScorer::default().assess(&text);
    assert_eq!(report.score, 64);
    assert_eq!(report.label, CoverageLabel::Moderate);
    assert_eq!(
        hit_terms(&text),
        vec!["contestable", "suicide", "void", "termination"]
    );
}

#[test]
fn weak_health_policy() {
    let text = fixture("weak_health_policy.txt");
    let report = RiskScorer::default().assess(&text);
    assert_eq!(report.score, 1);
    assert_eq!(report.label, CoverageLabel::Weak);
    assert_eq!(report.risky_hits(), 11);
    let limitations = report
        .hits
        .iter()
        .find(|hit| hit.term == "limitations")
        .expect("limitations should be hit");
    assert_eq!(limitations.occurrences, 2);
}

#[test]
fn highlighted_terms_are_all_scored() {
    let scorer = RiskScorer::default();
    let highlighter = Highlighter::default();
    for name in [
        "strong_home_policy.txt",
        "moderate_life_policy.txt",
        "weak_health_policy.txt",
    ] {
        let text = fixture(name);
        let scored = hit_terms(&text);
        for found in highlighter.highlights(&text) {
            assert!(scored.contains(&found.term), "{name}: {}", found.term);
        }
        assert_eq!(scorer.score(&text), scorer.score(&text.to_uppercase()), "{name}");
    }
}

#[test]
fn normalization_does_not_change_scores() {
    for name in [
        "strong_home_policy.txt",
        "moderate_life_policy.txt",
        "weak_health_policy.txt",
    ] {
        let raw = fixture(name);
        let scorer = RiskScorer::default();
        assert_eq!(
            scorer.score(&raw),
            scorer.score(&normalize_whitespace(&raw)),
            "{name}"
        );
    }
}

#[test]
fn highlighted_fixture_marks_every_scored_term() {
    let text = fixture("weak_health_policy.txt");
    let highlighter = Highlighter::with_marker(TermCatalog::standard(), Marker::Markdown);
    let out = highlighter.highlight(&text);
    for needle in [
        "**Exclusion**s",
        "**NOT COVERED**",
        "**pre-existing condition**",
        "**waiting period**",
        "**Limitation**s",
        "**void**",
        "**contestable**",
        "**Suicide**",
        "**termination**",
    ] {
        assert!(out.contains(needle), "missing {needle}");
    }
    assert_eq!(Marker::Markdown.strip(&out), text);
}
