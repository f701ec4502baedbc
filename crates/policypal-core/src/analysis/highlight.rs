use colored::Colorize;
use regex::Captures;
use serde::Serialize;

use super::{catalog::TermCatalog, Span};

/// Visual emphasis applied around matched terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Marker {
    /// `<span class="highlight-text">…</span>`, for HTML views.
    #[default]
    Html,
    /// `**…**`
    Markdown,
    /// Bold red terminal text; falls back to plain text when colour is disabled.
    Ansi,
}

pub const HTML_OPEN: &str = r#"<span class="highlight-text">"#;
pub const HTML_CLOSE: &str = "</span>";

impl Marker {
    pub fn wrap(&self, matched: &str) -> String {
        match self {
            Self::Html => format!("{HTML_OPEN}{matched}{HTML_CLOSE}"),
            Self::Markdown => format!("**{matched}**"),
            Self::Ansi => matched.red().bold().to_string(),
        }
    }

    /// Remove this marker's delimiters, recovering the original text for
    /// inputs that did not already contain them.
    pub fn strip(&self, highlighted: &str) -> String {
        match self {
            Self::Html => highlighted.replace(HTML_OPEN, "").replace(HTML_CLOSE, ""),
            Self::Markdown => highlighted.replace("**", ""),
            Self::Ansi => strip_ansi(highlighted),
        }
    }
}

/// A single highlighted occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// Catalog entry that matched.
    pub term: String,
    pub span: Span,
    /// Matched text with its original casing.
    pub text: String,
}

/// Marks catalog terms inside free text.
///
/// Matching folds ASCII case only, is leftmost-first in catalog order and
/// non-overlapping: at a given position the earliest listed term wins, so
/// `exclusions` is marked as `exclusion` followed by a plain `s`.
#[derive(Debug, Clone)]
pub struct Highlighter<'c> {
    catalog: &'c TermCatalog,
    marker: Marker,
}

impl Default for Highlighter<'static> {
    fn default() -> Self {
        Self::new(TermCatalog::standard())
    }
}

impl<'c> Highlighter<'c> {
    pub fn new(catalog: &'c TermCatalog) -> Self {
        Self::with_marker(catalog, Marker::default())
    }

    pub fn with_marker(catalog: &'c TermCatalog, marker: Marker) -> Self {
        Self { catalog, marker }
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Copy of `text` with every catalog term wrapped in the marker; all other
    /// bytes are left untouched.
    pub fn highlight(&self, text: &str) -> String {
        self.catalog
            .pattern()
            .replace_all(text, |caps: &Captures| self.marker.wrap(&caps[0]))
            .into_owned()
    }

    /// Matched occurrences in document order.
    pub fn highlights(&self, text: &str) -> Vec<Highlight> {
        self.catalog
            .pattern()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let index = (1..caps.len()).find(|idx| caps.get(*idx).is_some())? - 1;
                Some(Highlight {
                    term: self.catalog.terms()[index].clone(),
                    span: (whole.start(), whole.end()),
                    text: whole.as_str().to_string(),
                })
            })
            .collect()
    }
}

/// Highlight `text` against the standard catalog using HTML spans.
pub fn highlight(text: &str) -> String {
    Highlighter::default().highlight(text)
}

fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_waiting_period_and_keeps_rest() {
        assert_eq!(
            highlight("Waiting period applies."),
            r#"<span class="highlight-text">Waiting period</span> applies."#
        );
    }

    #[test]
    fn leaves_text_without_terms_untouched() {
        let text = "Covers  fire,\ttheft\nand flood.";
        assert_eq!(highlight(text), text);
    }

    #[test]
    fn earliest_catalog_entry_wins_at_a_position() {
        assert_eq!(
            highlight("Exclusions"),
            r#"<span class="highlight-text">Exclusion</span>s"#
        );
    }

    #[test]
    fn preserves_original_casing_inside_marker() {
        let highlighter = Highlighter::with_marker(TermCatalog::standard(), Marker::Markdown);
        assert_eq!(
            highlighter.highlight("Policy is VOID if NOT Covered."),
            "Policy is **VOID** if **NOT Covered**."
        );
    }

    #[test]
    fn stripping_markers_recovers_input() {
        let text = "Suicide within two years; pre-existing condition excluded; termination.";
        for marker in [Marker::Html, Marker::Markdown] {
            let highlighter = Highlighter::with_marker(TermCatalog::standard(), marker);
            assert_eq!(marker.strip(&highlighter.highlight(text)), text);
        }
    }

    #[test]
    fn ansi_marker_round_trips_through_strip() {
        let highlighter = Highlighter::with_marker(TermCatalog::standard(), Marker::Ansi);
        let text = "Contestable for two years.";
        let out = highlighter.highlight(text);
        assert!(out.contains("Contestable"));
        assert_eq!(Marker::Ansi.strip(&out), text);
    }

    #[test]
    fn reports_matched_terms_and_spans() {
        let found = Highlighter::default().highlights("A void clause. Termination!");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].term, "void");
        assert_eq!(found[0].span, (2, 6));
        assert_eq!(found[1].term, "termination");
        assert_eq!(found[1].text, "Termination");
    }

    #[test]
    fn unicode_case_folding_is_not_applied() {
        assert_eq!(highlight("\u{17f}uicide"), "\u{17f}uicide");
    }

    #[test]
    fn handles_multibyte_text_around_matches() {
        let text = "Prämie: void – naïve clause";
        let out = highlight(text);
        assert!(out.starts_with("Prämie: <span"));
        assert!(out.ends_with("– naïve clause"));
    }
}
