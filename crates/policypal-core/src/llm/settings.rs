use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_PROVIDER: &str = "ollama";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "mistral";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the text-generation gateway.
///
/// Deserializable so the CLI can layer a config file underneath the
/// environment; missing fields fall back to the local Ollama defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub provider: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// Request timeout; zero disables it. Read as whole seconds from config
    /// files and the environment.
    #[serde(rename = "timeout_secs", deserialize_with = "deserialize_secs")]
    pub timeout: Option<Duration>,
    pub max_retries: u32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            endpoint: None,
            model: None,
            timeout: None,
            max_retries: 0,
        }
    }
}

impl GatewaySettings {
    const PROVIDER_ENV: &'static str = "POLICYPAL_PROVIDER";
    const ENDPOINT_ENV: &'static str = "POLICYPAL_ENDPOINT";
    const MODEL_ENV: &'static str = "POLICYPAL_MODEL";
    const TIMEOUT_ENV: &'static str = "POLICYPAL_TIMEOUT_SECS";
    const RETRIES_ENV: &'static str = "POLICYPAL_MAX_RETRIES";

    /// Load settings from environment variables.
    ///
    /// * `POLICYPAL_PROVIDER`: `ollama` (default) or `noop`.
    /// * `POLICYPAL_ENDPOINT`: base URL of the generation service.
    /// * `POLICYPAL_MODEL`: model name (default: `mistral`).
    /// * `POLICYPAL_TIMEOUT_SECS` / `POLICYPAL_MAX_RETRIES`.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(std::env::vars().collect())
    }

    /// Apply environment-style overrides on top of `self`.
    pub fn overlay(mut self, vars: HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(provider) = get(Self::PROVIDER_ENV) {
            self.provider = provider;
        }
        if let Some(endpoint) = get(Self::ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Some(model) = get(Self::MODEL_ENV) {
            self.model = Some(model);
        }
        if let Some(raw) = get(Self::TIMEOUT_ENV) {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds", Self::TIMEOUT_ENV))?;
            self.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(raw) = get(Self::RETRIES_ENV) {
            self.max_retries = raw
                .parse::<u32>()
                .with_context(|| format!("{} must be a non-negative integer", Self::RETRIES_ENV))?;
        }
        Ok(self)
    }

    pub fn endpoint_or_default(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn model_or_default(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Effective timeout; `None` means wait indefinitely.
    pub fn timeout(&self) -> Option<Duration> {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        (!timeout.is_zero()).then_some(timeout)
    }
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_to_local_ollama() {
        let settings = GatewaySettings::default().overlay(HashMap::new()).unwrap();
        assert_eq!(settings.provider, "ollama");
        assert_eq!(settings.endpoint_or_default(), "http://localhost:11434");
        assert_eq!(settings.model_or_default(), "mistral");
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn environment_overrides_values() {
        let settings = GatewaySettings::default()
            .overlay(vars(&[
                ("POLICYPAL_PROVIDER", "noop"),
                ("POLICYPAL_ENDPOINT", "http://gpu-box:11434"),
                ("POLICYPAL_MODEL", "llama2:7b"),
                ("POLICYPAL_TIMEOUT_SECS", "45"),
                ("POLICYPAL_MAX_RETRIES", "3"),
            ]))
            .unwrap();
        assert_eq!(settings.provider, "noop");
        assert_eq!(settings.endpoint.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(settings.model_or_default(), "llama2:7b");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(45)));
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn blank_values_are_ignored() {
        let base = GatewaySettings {
            model: Some("phi3".into()),
            ..GatewaySettings::default()
        };
        let settings = base.overlay(vars(&[("POLICYPAL_MODEL", "  ")])).unwrap();
        assert_eq!(settings.model.as_deref(), Some("phi3"));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let settings = GatewaySettings::default()
            .overlay(vars(&[("POLICYPAL_TIMEOUT_SECS", "0")]))
            .unwrap();
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn rejects_unparseable_retries() {
        let err = GatewaySettings::default()
            .overlay(vars(&[("POLICYPAL_MAX_RETRIES", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("POLICYPAL_MAX_RETRIES"));
    }

    #[test]
    fn deserializes_partial_tables() {
        let settings: GatewaySettings =
            serde_json::from_str(r#"{"model": "llama2:7b", "timeout_secs": 10}"#).unwrap();
        assert_eq!(settings.provider, "ollama");
        assert_eq!(settings.model_or_default(), "llama2:7b");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn sub_second_timeouts_are_kept() {
        let settings = GatewaySettings {
            timeout: Some(Duration::from_millis(500)),
            ..GatewaySettings::default()
        };
        assert_eq!(settings.timeout(), Some(Duration::from_millis(500)));
        let disabled = GatewaySettings {
            timeout: Some(Duration::ZERO),
            ..GatewaySettings::default()
        };
        assert_eq!(disabled.timeout(), None);
    }
}
