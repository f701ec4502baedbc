use std::fmt::Write;

use serde::Serialize;

use crate::assistant::PolicyStanding;
#[cfg(feature = "compare")]
use crate::compare::ComparisonOutcome;
use crate::prompts::AdvisorProfile;

pub mod pdf;

pub use pdf::render_pdf;

/// Format styles supported by [`render_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Label/value line shown under a report title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataLine {
    pub label: String,
    pub value: String,
}

/// Headed block of body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: Option<String>,
    pub body: String,
}

/// Renderer-neutral report: a title, metadata lines and body sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub metadata: Vec<MetadataLine>,
    pub sections: Vec<Section>,
}

impl ReportDocument {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            metadata: Vec::new(),
            sections: Vec::new(),
        }
    }

    fn meta(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetadataLine {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    fn section(mut self, heading: Option<&str>, body: impl Into<String>) -> Self {
        self.sections.push(Section {
            heading: heading.map(str::to_string),
            body: body.into(),
        });
        self
    }

    /// Summary download: coverage strength, score and the generated summary.
    pub fn summary(standing: &PolicyStanding, summary: &str) -> Self {
        Self::new("PolicyPal - Insurance Summary Report")
            .meta("Policy", format!("{} ({})", standing.slot, standing.source))
            .meta("Coverage Strength", standing.assessment.label.as_str())
            .meta("Risk Score", format!("{}/100", standing.assessment.score))
            .section(Some("Simplified Policy Summary"), summary)
    }

    /// Coverage-strength breakdown for every uploaded policy.
    pub fn coverage(standings: &[PolicyStanding]) -> Self {
        let mut report = Self::new("PolicyPal - Coverage Strength Analysis");
        for standing in standings {
            let assessment = &standing.assessment;
            let risky_terms = if assessment.hits.is_empty() {
                "No risky terms found.".to_string()
            } else {
                let terms: Vec<_> = assessment
                    .hits
                    .iter()
                    .map(|hit| format!("{} (x{})", hit.term, hit.occurrences))
                    .collect();
                format!("Risky terms: {}", terms.join(", "))
            };
            let body = format!(
                "Risk Score: {}/100 (risky terms impact {}%)\nCoverage Strength: {}\n{}",
                assessment.score,
                assessment.risk_impact(),
                assessment.label,
                risky_terms
            );
            let heading = format!("{} - {}", standing.slot, standing.source);
            report = report.section(Some(&heading), body);
        }
        report
    }

    pub fn claim_letter(letter: &str) -> Self {
        Self::new("PolicyPal - Claim Form Draft").section(None, letter)
    }

    pub fn recommendation(profile: &AdvisorProfile, recommendation: &str) -> Self {
        Self::new("InsureWise - Insurance Recommendation Report")
            .meta("Age", profile.age.to_string())
            .meta("Income", format!("₹{}", profile.monthly_income))
            .meta("Family Members", profile.family_members.to_string())
            .section(Some("Goals"), profile.goals.as_str())
            .section(Some("Recommendation"), recommendation)
    }

    #[cfg(feature = "compare")]
    pub fn comparison(outcome: &ComparisonOutcome) -> Self {
        let mut report = Self::new("PolicyPal - Policy Comparison Report");
        for standing in [&outcome.first, &outcome.second] {
            report = report.meta(
                format!("{} ({})", standing.slot, standing.source),
                format!(
                    "Risk Score {}/100, {} coverage",
                    standing.assessment.score, standing.assessment.label
                ),
            );
        }
        report.section(Some("AI-Powered Comparison"), outcome.display_text())
    }
}

/// Produce a report string using the desired format.
pub fn render_report(report: &ReportDocument, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(report),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn render_human(report: &ReportDocument) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", report.title)?;
    writeln!(out, "{}", "=".repeat(report.title.chars().count()))?;
    for line in &report.metadata {
        writeln!(out, "{}: {}", line.label, line.value)?;
    }
    for section in &report.sections {
        writeln!(out)?;
        if let Some(heading) = &section.heading {
            writeln!(out, "{heading}:")?;
        }
        writeln!(out, "{}", section.body.trim_end())?;
    }
    Ok(out)
}
