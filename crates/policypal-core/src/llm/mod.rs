mod ollama;
mod settings;

use std::str::FromStr;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::error::GatewayError;

pub use ollama::OllamaGateway;
pub use settings::GatewaySettings;

/// Text returned in place of a generation when the service answers without one.
pub const NO_RESPONSE_SENTINEL: &str = "Error: No response from model.";

/// Capability for turning a prompt into free-form text.
///
/// Implementations make no promise about the content; callers treat the
/// returned string as opaque.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

#[async_trait]
impl<G: LlmGateway + ?Sized> LlmGateway for Box<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<G: LlmGateway + ?Sized> LlmGateway for std::sync::Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        (**self).generate(prompt).await
    }
}

/// Offline gateway that answers every prompt with a fixed notice.
#[derive(Debug, Default, Clone)]
pub struct NoopGateway;

pub const NOOP_RESPONSE: &str =
    "LLM features are disabled; configure an Ollama endpoint to receive generated text.";

#[async_trait]
impl LlmGateway for NoopGateway {
    async fn generate(&self, _prompt: &str) -> Result<String, GatewayError> {
        Ok(NOOP_RESPONSE.to_string())
    }
}

/// Supported gateway backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    Noop,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "noop" => Ok(Self::Noop),
            other => bail!("unsupported LLM provider `{other}` (expected `ollama` or `noop`)"),
        }
    }
}

/// Build the gateway selected by `settings.provider`.
pub fn build_gateway(settings: &GatewaySettings) -> Result<Box<dyn LlmGateway>> {
    match settings.provider.parse::<ProviderKind>()? {
        ProviderKind::Ollama => Ok(Box::new(OllamaGateway::new(settings)?)),
        ProviderKind::Noop => Ok(Box::new(NoopGateway)),
    }
}
