pub mod analysis;
pub mod assistant;
#[cfg(feature = "compare")]
pub mod compare;
pub mod error;
pub mod extract;
pub mod llm;
pub mod prompts;
pub mod report;
pub mod session;

pub use analysis::{
    catalog::TermCatalog,
    highlight::{Highlight, Highlighter, Marker},
    scorer::RiskScorer,
    CoverageLabel, CoverageThresholds, RiskAssessment, Span, TermHit,
};
pub use assistant::{coverage_overview, PolicyAssistant, PolicyStanding};
#[cfg(feature = "compare")]
pub use compare::{ComparisonOrchestrator, ComparisonOutcome, ComparisonPlan};
pub use error::{CatalogError, GatewayError, PolicyError};
pub use llm::{build_gateway, GatewaySettings, LlmGateway, NoopGateway, OllamaGateway};
pub use prompts::AdvisorProfile;
pub use report::{render_pdf, render_report, OutputFormat, ReportDocument};
pub use session::{Document, Session, Slot};
