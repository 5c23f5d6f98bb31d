use std::collections::HashSet;
use std::sync::Arc;

use citeflow_core::config::SearchSettings;
use citeflow_core::disapproval::DisapprovalRecord;
use citeflow_core::error::Result;
use citeflow_core::provider::{ReferenceProvider, ReferenceVerifier};
use citeflow_core::reference::{Reference, merge_or_keep};
use citeflow_core::search::{ReferenceQuery, SearchPreferences, SelectionContext};
use tracing::debug;

pub const DEFAULT_CANDIDATE_COUNT: usize = 10;
pub const DEFAULT_REFILL_COUNT: usize = 5;

/// Drops later references whose normalized title was already seen.
///
/// Untitled references are kept; they cannot collide with anything.
pub fn dedupe_by_title(candidates: Vec<Reference>) -> Vec<Reference> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|r| {
            let key = r.normalized_title();
            key.is_empty() || seen.insert(key)
        })
        .collect()
}

/// Fetch, dedupe and verify. Ranking and splitting belong to the session.
#[derive(Clone)]
pub struct ReferencePipeline {
    provider: Arc<dyn ReferenceProvider>,
    verifier: Option<Arc<dyn ReferenceVerifier>>,
    candidate_count: usize,
    refill_count: usize,
}

impl ReferencePipeline {
    pub fn new(provider: Arc<dyn ReferenceProvider>) -> Self {
        Self {
            provider,
            verifier: None,
            candidate_count: DEFAULT_CANDIDATE_COUNT,
            refill_count: DEFAULT_REFILL_COUNT,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn ReferenceVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_candidate_count(mut self, count: usize) -> Self {
        self.candidate_count = count.max(1);
        self
    }

    pub fn with_refill_count(mut self, count: usize) -> Self {
        self.refill_count = count.max(1);
        self
    }

    /// Applies the fetch sizes from `[search]` configuration.
    pub fn with_settings(self, settings: &SearchSettings) -> Self {
        self.with_candidate_count(settings.candidate_count)
            .with_refill_count(settings.refill_count)
    }

    /// Primary fetch for a new or retried session.
    ///
    /// Asks for at least `num_references` candidates so the visible list can
    /// be filled. Provider and payload errors propagate; verification
    /// failures do not.
    pub async fn fetch_primary(
        &self,
        context: &SelectionContext,
        prefs: &SearchPreferences,
        disapprovals: Vec<DisapprovalRecord>,
    ) -> Result<Vec<Reference>> {
        let count = self.candidate_count.max(prefs.num_references);
        let query = ReferenceQuery::new(context.clone(), prefs.clone(), count)
            .with_disapprovals(disapprovals);
        self.run(&query).await
    }

    /// Background top-up fetch excluding titles the session already holds.
    pub async fn fetch_more(
        &self,
        context: &SelectionContext,
        prefs: &SearchPreferences,
        exclude_titles: Vec<String>,
        disapprovals: Vec<DisapprovalRecord>,
    ) -> Result<Vec<Reference>> {
        let query = ReferenceQuery::new(context.clone(), prefs.clone(), self.refill_count)
            .with_exclusions(exclude_titles)
            .with_disapprovals(disapprovals);
        self.run(&query).await
    }

    async fn run(&self, query: &ReferenceQuery) -> Result<Vec<Reference>> {
        let fetched = self.provider.search(query).await?;
        let fetched_len = fetched.len();
        let candidates = dedupe_by_title(fetched);
        debug!(
            fetched = fetched_len,
            unique = candidates.len(),
            "Fetched reference candidates"
        );

        match &self.verifier {
            Some(verifier) if !candidates.is_empty() => {
                let confirmed = verifier.verify(&candidates).await;
                Ok(merge_or_keep(candidates, confirmed))
            }
            _ => Ok(candidates),
        }
    }
}
