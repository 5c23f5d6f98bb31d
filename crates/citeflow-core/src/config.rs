//! Configuration models.
//!
//! `CiteflowConfig` mirrors `config.toml`; `SecretConfig` mirrors
//! `secret.json`. Loading lives in `citeflow-infrastructure`.

use serde::{Deserialize, Serialize};

use crate::search::{Priority, SearchPreferences};

/// Root of `config.toml`. Every field has a default.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CiteflowConfig {
    pub search: SearchSettings,
    pub provider: ProviderSettings,
}

/// `[search]` table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub num_references: usize,
    pub priority: Priority,
    /// Candidates requested by a primary fetch.
    pub candidate_count: usize,
    /// Candidates requested by a refill or "more results" fetch.
    pub refill_count: usize,
    /// Run the verification pass after each fetch.
    pub verify: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            num_references: 3,
            priority: Priority::Newest,
            candidate_count: 10,
            refill_count: 5,
            verify: true,
        }
    }
}

impl SearchSettings {
    /// Preferences seeded from the configured defaults.
    pub fn default_preferences(&self) -> SearchPreferences {
        SearchPreferences {
            num_references: self.num_references,
            priority: self.priority,
            ..Default::default()
        }
        .normalized()
    }
}

/// Which text-generation API backs the reference provider.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderBackend {
    #[default]
    GeminiApi,
    ClaudeApi,
    OpenAiApi,
}

impl std::str::FromStr for ProviderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini_api" | "gemini" => Ok(Self::GeminiApi),
            "claude_api" | "claude" => Ok(Self::ClaudeApi),
            "open_ai_api" | "openai" => Ok(Self::OpenAiApi),
            _ => Err(format!(
                "Unsupported backend: {}. Supported: gemini_api, claude_api, open_ai_api",
                s
            )),
        }
    }
}

/// `[provider]` table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderSettings {
    pub backend: ProviderBackend,
    /// Model override; the backend default is used when absent.
    pub model: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            backend: ProviderBackend::default(),
            model: None,
            timeout_secs: 60,
        }
    }
}

/// Root structure of `secret.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<ApiKeyConfig>,
    #[serde(default)]
    pub claude: Option<ApiKeyConfig>,
    #[serde(default)]
    pub openai: Option<ApiKeyConfig>,
}

impl SecretConfig {
    /// Credentials for `backend`, if configured.
    pub fn for_backend(&self, backend: ProviderBackend) -> Option<&ApiKeyConfig> {
        match backend {
            ProviderBackend::GeminiApi => self.gemini.as_ref(),
            ProviderBackend::ClaudeApi => self.claude.as_ref(),
            ProviderBackend::OpenAiApi => self.openai.as_ref(),
        }
    }
}

/// API credentials for one backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiKeyConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CiteflowConfig = toml::from_str(
            r#"
            [search]
            num_references = 9
            priority = "most_cited"

            [provider]
            backend = "claude_api"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.candidate_count, 10);
        assert_eq!(config.search.priority, Priority::MostCited);
        assert_eq!(config.provider.backend, ProviderBackend::ClaudeApi);
        assert_eq!(config.provider.timeout_secs, 60);
        // Clamped when turned into preferences.
        assert_eq!(config.search.default_preferences().num_references, 5);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("openai".parse::<ProviderBackend>(), Ok(ProviderBackend::OpenAiApi));
        assert!("mystery".parse::<ProviderBackend>().is_err());
    }
}
