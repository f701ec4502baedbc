use serde::Serialize;
use thiserror::Error;

use crate::session::Slot;

/// Failures raised while talking to the text-generation service.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayError {
    #[error("failed to reach generation service: {reason}")]
    Transport { reason: String },
    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation service response could not be decoded: {reason}")]
    Decode { reason: String },
    #[error("generation service is not configured: {reason}")]
    Unavailable { reason: String },
}

/// Errors emitted while validating a term catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogError {
    #[error("term catalog must contain at least one term")]
    Empty,
    #[error("catalog term at position {index} must not be blank")]
    BlankTerm { index: usize },
    #[error("catalog term `{term}` is listed more than once")]
    DuplicateTerm { term: String },
    #[error("term catalog could not be compiled: {reason}")]
    Compile { reason: String },
}

/// Top-level error for session and analysis operations.
///
/// Every variant is recoverable: callers render it as a message and keep the
/// session as it was before the failing action.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("{0} has not been uploaded yet")]
    MissingDocument(Slot),
    #[error("uploaded file is not a readable policy document: {0}")]
    MalformedInput(String),
    #[error(transparent)]
    InvalidCatalog(#[from] CatalogError),
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),
    #[error("invalid advisor profile: {0}")]
    InvalidProfile(String),
    #[error("failed to render report: {0}")]
    Render(String),
}

impl PolicyError {
    /// Message shown on the interactive surface in place of a failed result.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingDocument(_) => "Please upload a policy first.".to_string(),
            other => format!("Error: {other}"),
        }
    }
}
