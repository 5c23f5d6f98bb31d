//! Builds agents, providers and verifiers from configuration.
//!
//! Credential priority: secret.json > environment variables. Missing
//! credentials do not fail here; the resulting agent reports them on first
//! use so the affected session shows the problem.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use citeflow_core::config::{ApiKeyConfig, CiteflowConfig, ProviderBackend, SecretConfig};

use crate::agent::{TextAgent, UnconfiguredAgent};
use crate::claude_api_agent::{ClaudeApiAgent, DEFAULT_CLAUDE_MODEL};
use crate::gemini_api_agent::{DEFAULT_GEMINI_MODEL, GeminiApiAgent};
use crate::openai_api_agent::{DEFAULT_OPENAI_MODEL, OpenAIApiAgent};
use crate::reference_agent::{LlmReferenceProvider, LlmReferenceVerifier};

/// Environment variables consulted when secret.json has no entry.
fn env_names(backend: ProviderBackend) -> (&'static str, &'static str) {
    match backend {
        ProviderBackend::GeminiApi => ("GEMINI_API_KEY", "GEMINI_MODEL_NAME"),
        ProviderBackend::ClaudeApi => ("ANTHROPIC_API_KEY", "CLAUDE_MODEL_NAME"),
        ProviderBackend::OpenAiApi => ("OPENAI_API_KEY", "OPENAI_MODEL_NAME"),
    }
}

fn default_model(backend: ProviderBackend) -> &'static str {
    match backend {
        ProviderBackend::GeminiApi => DEFAULT_GEMINI_MODEL,
        ProviderBackend::ClaudeApi => DEFAULT_CLAUDE_MODEL,
        ProviderBackend::OpenAiApi => DEFAULT_OPENAI_MODEL,
    }
}

/// Resolves credentials for `backend` from secrets, then the environment.
fn resolve_credentials(backend: ProviderBackend, secrets: &SecretConfig) -> Option<ApiKeyConfig> {
    if let Some(config) = secrets.for_backend(backend) {
        if !config.api_key.trim().is_empty() {
            return Some(config.clone());
        }
    }
    let (key_var, model_var) = env_names(backend);
    let api_key = env::var(key_var).ok().filter(|k| !k.trim().is_empty())?;
    Some(ApiKeyConfig {
        api_key,
        model_name: env::var(model_var).ok(),
    })
}

/// Builds the text agent for the configured backend.
///
/// `grounded` enables search grounding where the backend supports it.
pub fn build_agent(config: &CiteflowConfig, secrets: &SecretConfig, grounded: bool) -> Arc<dyn TextAgent> {
    let backend = config.provider.backend;
    let Some(credentials) = resolve_credentials(backend, secrets) else {
        let (key_var, _) = env_names(backend);
        tracing::warn!(?backend, "No API key configured");
        return Arc::new(UnconfiguredAgent::new(format!(
            "{key_var} not found in secret.json or environment variables"
        )));
    };

    let model = config
        .provider
        .model
        .clone()
        .or(credentials.model_name)
        .unwrap_or_else(|| default_model(backend).to_string());
    let timeout = Duration::from_secs(config.provider.timeout_secs.max(1));

    match backend {
        ProviderBackend::GeminiApi => Arc::new(
            GeminiApiAgent::new(credentials.api_key, model)
                .with_google_search(grounded)
                .with_timeout(timeout),
        ),
        ProviderBackend::ClaudeApi => {
            Arc::new(ClaudeApiAgent::new(credentials.api_key, model).with_timeout(timeout))
        }
        ProviderBackend::OpenAiApi => {
            Arc::new(OpenAIApiAgent::new(credentials.api_key, model).with_timeout(timeout))
        }
    }
}

/// Builds the reference provider and, when enabled, the verifier.
pub fn build_reference_backends(
    config: &CiteflowConfig,
    secrets: &SecretConfig,
) -> (LlmReferenceProvider, Option<LlmReferenceVerifier>) {
    let provider = LlmReferenceProvider::new(build_agent(config, secrets, false));
    let verifier = config
        .search
        .verify
        .then(|| LlmReferenceVerifier::new(build_agent(config, secrets, true)));
    (provider, verifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRequest;

    #[test]
    fn test_secret_entry_wins() {
        let secrets = SecretConfig {
            claude: Some(ApiKeyConfig {
                api_key: "from-secret".to_string(),
                model_name: None,
            }),
            ..Default::default()
        };
        let creds = resolve_credentials(ProviderBackend::ClaudeApi, &secrets).unwrap();
        assert_eq!(creds.api_key, "from-secret");
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_on_use() {
        // Blank key in secrets and a variable name nobody sets in tests.
        let secrets = SecretConfig {
            gemini: Some(ApiKeyConfig {
                api_key: "  ".to_string(),
                model_name: None,
            }),
            ..Default::default()
        };
        if env::var("GEMINI_API_KEY").is_ok() {
            return;
        }
        let agent = build_agent(&CiteflowConfig::default(), &secrets, false);
        let err = agent.execute(AgentRequest::new("q")).await.unwrap_err();
        assert!(err.is_provider());
    }

    #[test]
    fn test_verifier_follows_config() {
        let mut config = CiteflowConfig::default();
        config.search.verify = false;
        let (_, verifier) = build_reference_backends(&config, &SecretConfig::default());
        assert!(verifier.is_none());
    }
}
