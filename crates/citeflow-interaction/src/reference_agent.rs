//! Reference provider and verifier backed by a text-generation agent.

use std::sync::Arc;

use async_trait::async_trait;
use citeflow_core::error::Result;
use citeflow_core::provider::{ReferenceProvider, ReferenceVerifier};
use citeflow_core::reference::{RawCandidate, Reference, parse_candidates};
use citeflow_core::search::ReferenceQuery;
use tracing::{debug, info};

use crate::agent::{AgentRequest, TextAgent};
use crate::prompt::{
    SEARCH_SYSTEM_PROMPT, VERIFY_SYSTEM_PROMPT, build_search_prompt, build_verification_prompt,
};

/// Asks an LLM for candidate references and recovers them from its output.
#[derive(Clone)]
pub struct LlmReferenceProvider {
    agent: Arc<dyn TextAgent>,
}

impl LlmReferenceProvider {
    pub fn new(agent: Arc<dyn TextAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl ReferenceProvider for LlmReferenceProvider {
    async fn search(&self, query: &ReferenceQuery) -> Result<Vec<Reference>> {
        let request = AgentRequest::new(build_search_prompt(query))
            .with_system(SEARCH_SYSTEM_PROMPT)
            .with_model(Some(query.preferences.model.as_str()));

        info!(
            agent = self.agent.expertise(),
            requested = query.requested_count,
            excluded = query.exclude_titles.len(),
            "Requesting references"
        );
        let raw = self.agent.execute(request).await?;
        debug!(len = raw.len(), "Received reference payload");

        let references: Vec<Reference> = parse_candidates(&raw)?
            .into_iter()
            .map(RawCandidate::into_reference)
            .filter(|r| !r.title.is_empty())
            .collect();
        Ok(references)
    }
}

/// Asks an LLM which candidates are real, returning corrected metadata.
#[derive(Clone)]
pub struct LlmReferenceVerifier {
    agent: Arc<dyn TextAgent>,
    model: Option<String>,
}

impl LlmReferenceVerifier {
    pub fn new(agent: Arc<dyn TextAgent>) -> Self {
        Self { agent, model: None }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[async_trait]
impl ReferenceVerifier for LlmReferenceVerifier {
    async fn verify(&self, candidates: &[Reference]) -> Result<Vec<RawCandidate>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let request = AgentRequest::new(build_verification_prompt(candidates))
            .with_system(VERIFY_SYSTEM_PROMPT)
            .with_model(self.model.as_deref());

        let raw = self.agent.execute(request).await?;
        parse_candidates(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeflow_core::error::CiteError;
    use citeflow_core::search::{SearchPreferences, SelectionContext};
    use std::sync::Mutex;

    struct CannedAgent {
        reply: std::result::Result<String, CiteError>,
        seen: Mutex<Vec<AgentRequest>>,
    }

    impl CannedAgent {
        fn new(reply: std::result::Result<&str, CiteError>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextAgent for CannedAgent {
        fn expertise(&self) -> &str {
            "canned"
        }

        async fn execute(&self, request: AgentRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    fn query(model: &str) -> ReferenceQuery {
        let context = SelectionContext::new("doc", "claim", "").unwrap();
        let prefs = SearchPreferences {
            model: model.to_string(),
            ..Default::default()
        };
        ReferenceQuery::new(context, prefs, 5)
    }

    #[tokio::test]
    async fn test_provider_parses_fenced_output_and_drops_untitled() {
        let agent = CannedAgent::new(Ok(
            "```json\n[{\"title\":\"A\",\"year\":2020},{\"summary\":\"no title\"},{\"title\":\"B\"}]\n```",
        ));
        let provider = LlmReferenceProvider::new(agent.clone());

        let refs = provider.search(&query("gemini-2.5-pro")).await.unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].year, "2020");
        let seen = agent.seen.lock().unwrap();
        assert_eq!(seen[0].model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(seen[0].system.as_deref(), Some(SEARCH_SYSTEM_PROMPT));
    }

    #[tokio::test]
    async fn test_provider_surfaces_malformed_payload() {
        let provider = LlmReferenceProvider::new(CannedAgent::new(Ok("Sorry, no idea.")));
        let err = provider.search(&query("")).await.unwrap_err();
        assert!(err.is_malformed_payload());
    }

    #[tokio::test]
    async fn test_verifier_skips_call_for_empty_input() {
        let agent = CannedAgent::new(Err(CiteError::provider("should not be called")));
        let verifier = LlmReferenceVerifier::new(agent.clone());

        assert!(verifier.verify(&[]).await.unwrap().is_empty());
        assert!(agent.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verifier_returns_confirmed_records() {
        let agent = CannedAgent::new(Ok(r#"[{"title":"A","url":"https://a"}]"#));
        let verifier = LlmReferenceVerifier::new(agent).with_model("gemini-2.5-flash");

        let confirmed = verifier
            .verify(&[Reference {
                title: "A".into(),
                ..Default::default()
            }])
            .await
            .unwrap();

        assert_eq!(confirmed[0].url.as_deref(), Some("https://a"));
    }
}
