use std::collections::HashMap;
use std::sync::Arc;

use citeflow_core::disapproval::{DisapprovalHistory, DisapprovalReason, DisapprovalRecord};
use citeflow_core::error::{CiteError, Result};
use citeflow_core::export::CitationExport;
use citeflow_core::reference::Reference;
use citeflow_core::search::{SearchPreferences, SelectionContext, rank};
use citeflow_core::session::{SearchSession, SessionStatus};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::search::ReferencePipeline;

/// A started search: the new session id and the task delivering its result.
#[derive(Debug)]
pub struct SearchHandle {
    pub session_id: String,
    /// Resolves once the fetch result has been applied (or discarded).
    pub completion: JoinHandle<()>,
}

/// What a disapproval changed.
#[derive(Debug)]
pub struct DisapprovalOutcome {
    pub record: DisapprovalRecord,
    /// Pool entry promoted into the vacated slot.
    pub replacement: Option<Reference>,
    /// Background refill issued because the pool ran dry.
    pub refill: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct SessionTable {
    sessions: HashMap<String, SearchSession>,
    /// Ids in creation order.
    order: Vec<String>,
    active_session_id: Option<String>,
}

impl SessionTable {
    fn remove(&mut self, session_id: &str) -> Option<SearchSession> {
        let removed = self.sessions.remove(session_id)?;
        self.order.retain(|id| id != session_id);
        if self.active_session_id.as_deref() == Some(session_id) {
            self.active_session_id = None;
        }
        Some(removed)
    }
}

struct ManagerInner {
    table: RwLock<SessionTable>,
    history: DisapprovalHistory,
    pipeline: ReferencePipeline,
}

/// Owns every search session and drives their fetches.
///
/// `SearchSessionManager` is responsible for:
/// - Creating sessions and issuing their primary fetch
/// - Applying fetch completions, discarding stale ones
/// - Disapprovals, replacements and background refills
/// - Tracking the active session
///
/// Cloning is cheap and shares state. Every session mutation happens under
/// the table write lock. Completions carry the fetch generation they were
/// issued under and are dropped if the session was cleared or re-fetched in
/// the meantime.
#[derive(Clone)]
pub struct SearchSessionManager {
    inner: Arc<ManagerInner>,
}

impl SearchSessionManager {
    pub fn new(pipeline: ReferencePipeline) -> Self {
        Self::with_history(pipeline, DisapprovalHistory::new())
    }

    /// Creates a manager sharing an existing disapproval history.
    pub fn with_history(pipeline: ReferencePipeline, history: DisapprovalHistory) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                table: RwLock::new(SessionTable::default()),
                history,
                pipeline,
            }),
        }
    }

    /// The process-wide disapproval log.
    pub fn history(&self) -> &DisapprovalHistory {
        &self.inner.history
    }

    /// Creates a session in `Loading`, makes it active and starts its fetch.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn create_session(
        &self,
        context: SelectionContext,
        prefs: SearchPreferences,
    ) -> SearchHandle {
        let session_id = SearchSession::generate_id();
        let prefs = prefs.normalized();
        let mut session = SearchSession::new(session_id.clone(), prefs.clone(), context.clone());
        let generation = session.begin_fetch(prefs.clone());

        {
            let mut table = self.inner.table.write().await;
            table.order.push(session_id.clone());
            table.active_session_id = Some(session_id.clone());
            table.sessions.insert(session_id.clone(), session);
        }

        info!(
            session_id = %session_id,
            num_references = prefs.num_references,
            priority = prefs.priority.label(),
            "Created search session"
        );

        let completion = self.spawn_fetch(session_id.clone(), generation, context, prefs);
        SearchHandle {
            session_id,
            completion,
        }
    }

    /// Re-issues the primary fetch with `prefs`.
    ///
    /// Allowed from any state. Any fetch or refill still in flight for the
    /// session is superseded and its result discarded.
    pub async fn retry(&self, session_id: &str, prefs: SearchPreferences) -> Result<JoinHandle<()>> {
        let (generation, context, prefs) = {
            let mut table = self.inner.table.write().await;
            let session = table
                .sessions
                .get_mut(session_id)
                .ok_or_else(|| CiteError::not_found("SearchSession", session_id))?;
            let generation = session.begin_fetch(prefs.normalized());
            (generation, session.context.clone(), session.query_prefs.clone())
        };

        info!(session_id = %session_id, generation, "Retrying search session");
        Ok(self.spawn_fetch(session_id.to_string(), generation, context, prefs))
    }

    fn spawn_fetch(
        &self,
        session_id: String,
        generation: u64,
        context: SelectionContext,
        prefs: SearchPreferences,
    ) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let disapprovals = manager.inner.history.snapshot().await;
            let result = manager
                .inner
                .pipeline
                .fetch_primary(&context, &prefs, disapprovals)
                .await;
            manager.complete_fetch(&session_id, generation, result).await;
        })
    }

    async fn complete_fetch(&self, session_id: &str, generation: u64, result: Result<Vec<Reference>>) {
        let mut table = self.inner.table.write().await;
        let Some(session) = table.sessions.get_mut(session_id) else {
            debug!(session_id = %session_id, "Discarding fetch result for cleared session");
            return;
        };
        if session.fetch_generation != generation {
            debug!(
                session_id = %session_id,
                generation,
                current = session.fetch_generation,
                "Discarding superseded fetch result"
            );
            return;
        }

        match result {
            Ok(references) => {
                let ranked = rank(references, session.query_prefs.priority);
                session.apply_results(ranked);
                info!(
                    session_id = %session_id,
                    visible = session.visible.len(),
                    pool = session.pool.len(),
                    "Search session succeeded"
                );
            }
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "Search session failed");
                session.fail(err.user_message());
            }
        }
    }

    /// Removes `visible[index]` from a session and promotes a replacement.
    ///
    /// Returns `None` without side effects when the session does not exist or
    /// the index is out of range. When the pool runs dry a refill is issued,
    /// unless one is already outstanding.
    pub async fn disapprove(
        &self,
        session_id: &str,
        index: usize,
        reason: DisapprovalReason,
    ) -> Option<DisapprovalOutcome> {
        let (disapproval, refill_request) = {
            let mut table = self.inner.table.write().await;
            let session = table.sessions.get_mut(session_id)?;
            let disapproval = session.disapprove(index, reason)?;
            let refill_request = disapproval.needs_refill.then(|| RefillRequest {
                generation: session.fetch_generation,
                context: session.context.clone(),
                prefs: session.query_prefs.clone(),
                exclude_titles: session.known_titles(),
            });
            (disapproval, refill_request)
        };

        self.inner.history.append(disapproval.record.clone()).await;

        let refill = refill_request.map(|request| self.spawn_refill(session_id.to_string(), request));
        Some(DisapprovalOutcome {
            record: disapproval.record,
            replacement: disapproval.replacement,
            refill,
        })
    }

    /// [`disapprove`](Self::disapprove) against the active session.
    pub async fn disapprove_active(
        &self,
        index: usize,
        reason: DisapprovalReason,
    ) -> Option<DisapprovalOutcome> {
        let session_id = self.active_session_id().await?;
        self.disapprove(&session_id, index, reason).await
    }

    /// Explicitly asks for more results for a `Success` session.
    ///
    /// Returns `None` when the session is missing, not `Success`, or already
    /// refilling.
    pub async fn request_more(&self, session_id: &str) -> Option<JoinHandle<()>> {
        let request = {
            let mut table = self.inner.table.write().await;
            let session = table.sessions.get_mut(session_id)?;
            if session.status != SessionStatus::Success || session.is_refilling {
                return None;
            }
            session.is_refilling = true;
            RefillRequest {
                generation: session.fetch_generation,
                context: session.context.clone(),
                prefs: session.query_prefs.clone(),
                exclude_titles: session.known_titles(),
            }
        };
        Some(self.spawn_refill(session_id.to_string(), request))
    }

    fn spawn_refill(&self, session_id: String, request: RefillRequest) -> JoinHandle<()> {
        debug!(
            session_id = %session_id,
            excluded = request.exclude_titles.len(),
            "Issuing refill"
        );
        let manager = self.clone();
        tokio::spawn(async move {
            let disapprovals = manager.inner.history.snapshot().await;
            let result = manager
                .inner
                .pipeline
                .fetch_more(&request.context, &request.prefs, request.exclude_titles, disapprovals)
                .await;
            manager
                .complete_refill(&session_id, request.generation, result)
                .await;
        })
    }

    async fn complete_refill(&self, session_id: &str, generation: u64, result: Result<Vec<Reference>>) {
        let mut table = self.inner.table.write().await;
        let Some(session) = table.sessions.get_mut(session_id) else {
            debug!(session_id = %session_id, "Discarding refill for cleared session");
            return;
        };
        if session.fetch_generation != generation {
            debug!(session_id = %session_id, "Discarding refill for superseded fetch");
            return;
        }

        match result {
            Ok(references) => {
                let accepted = session.absorb_refill(references);
                debug!(
                    session_id = %session_id,
                    accepted,
                    visible = session.visible.len(),
                    pool = session.pool.len(),
                    "Refill absorbed"
                );
            }
            Err(err) => {
                let err = CiteError::refill(&err);
                warn!(session_id = %session_id, error = %err, "Refill failed");
                session.is_refilling = false;
            }
        }
    }

    /// Destroys a session. A fetch still in flight for it is discarded on
    /// arrival. Returns whether the session existed.
    pub async fn clear(&self, session_id: &str) -> bool {
        let removed = self.inner.table.write().await.remove(session_id).is_some();
        if removed {
            info!(session_id = %session_id, "Cleared search session");
        }
        removed
    }

    pub async fn activate(&self, session_id: &str) -> Result<()> {
        let mut table = self.inner.table.write().await;
        if !table.sessions.contains_key(session_id) {
            return Err(CiteError::not_found("SearchSession", session_id));
        }
        table.active_session_id = Some(session_id.to_string());
        Ok(())
    }

    pub async fn active_session_id(&self) -> Option<String> {
        self.inner.table.read().await.active_session_id.clone()
    }

    /// Snapshot of one session.
    pub async fn get(&self, session_id: &str) -> Option<SearchSession> {
        self.inner.table.read().await.sessions.get(session_id).cloned()
    }

    /// Snapshots of every session, oldest first.
    pub async fn list(&self) -> Vec<SearchSession> {
        let table = self.inner.table.read().await;
        table
            .order
            .iter()
            .filter_map(|id| table.sessions.get(id).cloned())
            .collect()
    }

    /// Citation markers and bibliography for the given sessions, in document
    /// order. Only `Success` sessions with visible references contribute.
    pub async fn export_citations(&self, session_ids: &[String]) -> CitationExport {
        let table = self.inner.table.read().await;
        CitationExport::build(session_ids.iter().filter_map(|id| {
            table
                .sessions
                .get(id)
                .filter(|s| s.status == SessionStatus::Success)
                .map(|s| (s.id.as_str(), s.visible.as_slice()))
        }))
    }
}

struct RefillRequest {
    generation: u64,
    context: SelectionContext,
    prefs: SearchPreferences,
    exclude_titles: Vec<String>,
}
