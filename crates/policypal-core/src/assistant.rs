use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::analysis::{scorer::RiskScorer, RiskAssessment};
use crate::error::PolicyError;
use crate::llm::LlmGateway;
use crate::prompts::{self, AdvisorProfile};
use crate::session::{Document, Session, Slot};

/// Locally computed coverage standing of one uploaded policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyStanding {
    pub slot: Slot,
    pub source: String,
    pub assessment: RiskAssessment,
}

impl PolicyStanding {
    pub fn assess(document: &Document, scorer: &RiskScorer<'_>) -> Self {
        Self {
            slot: document.slot(),
            source: document.source().to_string(),
            assessment: scorer.assess(document.text()),
        }
    }
}

/// Standings for every uploaded policy, or guidance when none is loaded.
pub fn coverage_overview(
    session: &Session,
    scorer: &RiskScorer<'_>,
) -> Result<Vec<PolicyStanding>, PolicyError> {
    let standings: Vec<_> = session
        .documents()
        .map(|doc| PolicyStanding::assess(doc, scorer))
        .collect();
    if standings.is_empty() {
        return Err(PolicyError::MissingDocument(Slot::First));
    }
    Ok(standings)
}

/// Generation-backed actions over a session: summaries, answers, claim
/// letters and plan recommendations.
///
/// Every action builds its prompt locally and hands it to the gateway once;
/// gateway failures come back as [`PolicyError::Gateway`] and leave the
/// session untouched.
pub struct PolicyAssistant<G> {
    gateway: G,
}

impl<G: LlmGateway> PolicyAssistant<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Summarise the policy in `slot` and cache the result in the session.
    #[instrument(name = "summarize_policy", skip(self, session))]
    pub async fn summarize<'s>(
        &self,
        session: &'s mut Session,
        slot: Slot,
    ) -> Result<&'s str, PolicyError> {
        let prompt = prompts::summary_prompt(session.document(slot)?.text());
        let summary = self.run(&prompt, "summary").await?;
        session.set_summary(slot, summary)?;
        Ok(session.summary(slot).unwrap_or_default())
    }

    #[instrument(name = "ask_policy", skip(self, session, question))]
    pub async fn ask(
        &self,
        session: &Session,
        slot: Slot,
        question: &str,
    ) -> Result<String, PolicyError> {
        if question.trim().is_empty() {
            return Err(PolicyError::EmptyInput("question"));
        }
        let prompt = prompts::question_prompt(session.document(slot)?.text(), question);
        self.run(&prompt, "answer").await
    }

    pub async fn draft_claim_letter(&self, incident: &str) -> Result<String, PolicyError> {
        if incident.trim().is_empty() {
            return Err(PolicyError::EmptyInput("incident description"));
        }
        self.run(&prompts::claim_letter_prompt(incident), "claim letter")
            .await
    }

    pub async fn recommend(&self, profile: &AdvisorProfile) -> Result<String, PolicyError> {
        profile.validate()?;
        self.run(&prompts::recommendation_prompt(profile), "recommendation")
            .await
    }

    async fn run(&self, prompt: &str, artifact: &'static str) -> Result<String, PolicyError> {
        match self.gateway.generate(prompt).await {
            Ok(text) => {
                info!(artifact, chars = text.chars().count(), "generation received");
                Ok(text)
            }
            Err(err) => {
                warn!(artifact, error = %err, "generation failed");
                Err(err.into())
            }
        }
    }
}
