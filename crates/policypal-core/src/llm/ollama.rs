use super::{GatewaySettings, LlmGateway, NO_RESPONSE_SENTINEL};
use crate::error::GatewayError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Gateway for an Ollama-compatible `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaGateway {
    http: Client,
    url: String,
    model: String,
    max_retries: u32,
}

impl OllamaGateway {
    pub fn new(settings: &GatewaySettings) -> Result<Self> {
        let url = format!(
            "{}/api/generate",
            settings.endpoint_or_default().trim_end_matches('/')
        );
        let mut builder = Client::builder().user_agent("policypal/0.3");
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build Ollama HTTP client")?;
        Ok(Self {
            http,
            url,
            model: settings.model_or_default().to_string(),
            max_retries: settings.max_retries,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    #[instrument(name = "ollama_generate", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let payload = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let mut attempt = 0u32;
        let mut backoff = Duration::from_millis(200);
        loop {
            let response = self.http.post(&self.url).json(&payload).send().await;

            let failure = match response {
                Ok(resp) if resp.status().is_success() => {
                    let body: GenerateResponse =
                        resp.json().await.map_err(|err| GatewayError::Decode {
                            reason: err.to_string(),
                        })?;
                    debug!(attempt, "generation completed");
                    return Ok(body
                        .response
                        .unwrap_or_else(|| NO_RESPONSE_SENTINEL.to_string()));
                }
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    GatewayError::Status { status, body }
                }
                Err(err) => GatewayError::Transport {
                    reason: err.to_string(),
                },
            };

            if attempt >= self.max_retries {
                warn!(attempt, error = %failure, "generation failed");
                return Err(failure);
            }
            debug!(attempt, error = %failure, "retrying generation");
            sleep(backoff).await;
            backoff = (backoff * 2).min(Duration::from_secs(5));
            attempt += 1;
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}
