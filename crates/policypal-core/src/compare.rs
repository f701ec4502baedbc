use tracing::{debug, instrument, warn};

use crate::analysis::scorer::RiskScorer;
use crate::assistant::PolicyStanding;
use crate::error::{GatewayError, PolicyError};
use crate::llm::LlmGateway;
use crate::prompts;
use crate::session::Session;

/// Deterministic half of a comparison: local standings plus the prompt that
/// will be sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPlan {
    pub first: PolicyStanding,
    pub second: PolicyStanding,
    pub prompt: String,
}

/// Result of a comparison. The local standings are always present; the
/// generated text is absent when the gateway failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonOutcome {
    pub first: PolicyStanding,
    pub second: PolicyStanding,
    pub response: Result<String, GatewayError>,
}

impl ComparisonOutcome {
    /// Gateway text unchanged, or the user-facing failure message.
    pub fn display_text(&self) -> String {
        match &self.response {
            Ok(text) => text.clone(),
            Err(err) => PolicyError::Gateway(err.clone()).user_message(),
        }
    }

    /// Slot with the higher local score, `None` on a tie.
    pub fn stronger(&self) -> Option<&PolicyStanding> {
        let (a, b) = (self.first.assessment.score, self.second.assessment.score);
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(&self.first),
            std::cmp::Ordering::Less => Some(&self.second),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Scores two uploaded policies locally and asks the gateway for a
/// qualitative side-by-side comparison.
///
/// The orchestrator performs exactly one gateway call and passes its text
/// through untouched; it adds no retries, timeouts or validation of its own.
pub struct ComparisonOrchestrator<'c, G> {
    gateway: G,
    scorer: RiskScorer<'c>,
}

impl<G: LlmGateway> ComparisonOrchestrator<'static, G> {
    pub fn new(gateway: G) -> Self {
        Self::with_scorer(gateway, RiskScorer::default())
    }
}

impl<'c, G: LlmGateway> ComparisonOrchestrator<'c, G> {
    pub fn with_scorer(gateway: G, scorer: RiskScorer<'c>) -> Self {
        Self { gateway, scorer }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Build the comparison without contacting the gateway.
    pub fn plan(&self, session: &Session) -> Result<ComparisonPlan, PolicyError> {
        let (first, second) = session.pair()?;
        let prompt = prompts::comparison_prompt(first.text(), second.text());
        Ok(ComparisonPlan {
            first: PolicyStanding::assess(first, &self.scorer),
            second: PolicyStanding::assess(second, &self.scorer),
            prompt,
        })
    }

    /// Compare the two uploaded policies. Fails only with
    /// [`PolicyError::MissingDocument`]; gateway errors are carried inside the
    /// outcome.
    #[instrument(name = "compare_policies", skip(self, session))]
    pub async fn compare(&self, session: &Session) -> Result<ComparisonOutcome, PolicyError> {
        let plan = self.plan(session)?;
        debug!(
            first_score = plan.first.assessment.score,
            second_score = plan.second.assessment.score,
            prompt_len = plan.prompt.len(),
            "comparison planned"
        );
        let response = self.gateway.generate(&plan.prompt).await;
        if let Err(err) = &response {
            warn!(error = %err, "comparison generation failed");
        }
        Ok(ComparisonOutcome {
            first: plan.first,
            second: plan.second,
            response,
        })
    }
}
