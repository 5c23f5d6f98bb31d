//! Search session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reference::Reference;
use crate::search::{SearchPreferences, SelectionContext};

/// Lifecycle state of a search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// A primary fetch is outstanding.
    Loading,
    /// The last primary fetch succeeded (possibly with zero results).
    Success,
    /// The last primary fetch failed; `error_message` is set.
    Error,
}

/// One highlighted-text search and its evolving result state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSession {
    /// Never changes after creation.
    pub id: String,
    pub status: SessionStatus,
    /// User-facing references; never longer than `query_prefs.num_references`.
    pub visible: Vec<Reference>,
    /// Ranked overflow backing replacements.
    pub pool: Vec<Reference>,
    /// Preferences snapshot taken by the triggering fetch.
    pub query_prefs: SearchPreferences,
    /// Never changes after creation.
    pub context: SelectionContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// True while a background top-up fetch is outstanding.
    pub is_refilling: bool,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever a new primary fetch is issued; completions carrying an
    /// older value are discarded.
    #[serde(skip)]
    pub fetch_generation: u64,
}

impl SearchSession {
    /// Creates a session in `Loading` with empty result lists.
    pub fn new(id: impl Into<String>, query_prefs: SearchPreferences, context: SelectionContext) -> Self {
        Self {
            id: id.into(),
            status: SessionStatus::Loading,
            visible: Vec::new(),
            pool: Vec::new(),
            query_prefs,
            context,
            error_message: None,
            is_refilling: false,
            created_at: Utc::now(),
            fetch_generation: 0,
        }
    }

    /// Generates a unique, creation-time-derived session id.
    pub fn generate_id() -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!("search-{}-{}", Utc::now().timestamp_millis(), &uuid[..12])
    }

    /// Visible target size.
    pub fn target_len(&self) -> usize {
        self.query_prefs.num_references
    }

    /// Moves the session back to `Loading` for a fresh primary fetch.
    ///
    /// Results are cleared, the new preferences snapshot is taken and the
    /// fetch generation is bumped. Returns the new generation.
    pub fn begin_fetch(&mut self, query_prefs: SearchPreferences) -> u64 {
        self.status = SessionStatus::Loading;
        self.error_message = None;
        self.visible.clear();
        self.pool.clear();
        self.is_refilling = false;
        self.query_prefs = query_prefs;
        self.fetch_generation += 1;
        self.fetch_generation
    }

    /// Records a failed primary fetch.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = SessionStatus::Error;
        self.error_message = Some(message.into());
        self.is_refilling = false;
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    /// A successful fetch that produced nothing to show. Distinct from `Error`.
    pub fn has_no_results(&self) -> bool {
        self.status == SessionStatus::Success && self.visible.is_empty() && self.pool.is_empty()
    }

    /// Titles of everything currently in `visible` and `pool`.
    pub fn known_titles(&self) -> Vec<String> {
        self.visible
            .iter()
            .chain(self.pool.iter())
            .map(|r| r.title.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SearchSession {
        let context = SelectionContext::new("doc", "claim", "").unwrap();
        SearchSession::new("s-1", SearchPreferences::default(), context)
    }

    #[test]
    fn test_new_session_is_loading_and_empty() {
        let session = session();
        assert!(session.is_loading());
        assert!(session.visible.is_empty());
        assert!(session.pool.is_empty());
        assert!(session.error_message.is_none());
        assert!(!session.is_refilling);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = SearchSession::generate_id();
        let b = SearchSession::generate_id();
        assert_ne!(a, b);
        assert!(a.starts_with("search-"));
    }

    #[test]
    fn test_begin_fetch_clears_error_and_bumps_generation() {
        let mut session = session();
        session.fail("boom");
        assert_eq!(session.status, SessionStatus::Error);
        assert_eq!(session.error_message.as_deref(), Some("boom"));

        let mut prefs = SearchPreferences::default();
        prefs.num_references = 5;
        let generation = session.begin_fetch(prefs.clone());

        assert_eq!(generation, 1);
        assert!(session.is_loading());
        assert!(session.error_message.is_none());
        assert_eq!(session.query_prefs, prefs);
    }
}
