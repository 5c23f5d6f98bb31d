//! Visible / pool management for a single session.
//!
//! `visible` is the bounded, user-facing list; `pool` is the ranked overflow
//! that backs replacements. Every operation here keeps
//! `visible.len() <= query_prefs.num_references`.

use std::cmp::Reverse;

use tracing::debug;

use super::model::{SearchSession, SessionStatus};
use crate::disapproval::{DisapprovalReason, DisapprovalRecord};
use crate::reference::{Reference, normalize_title};

/// Splits a ranked candidate list into `(visible, pool)` at `target`.
pub fn split_candidates(mut candidates: Vec<Reference>, target: usize) -> (Vec<Reference>, Vec<Reference>) {
    let pool = if candidates.len() > target {
        candidates.split_off(target)
    } else {
        Vec::new()
    };
    (candidates, pool)
}

/// Year key used when picking a `NotNew` replacement: the whole trimmed year
/// string as a number, 0 when it does not parse.
pub fn numeric_year(year: &str) -> f64 {
    year.trim()
        .parse::<f64>()
        .ok()
        .filter(|y| y.is_finite())
        .unwrap_or(0.0)
}

/// Result of removing a visible reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Disapproval {
    /// The history entry for the removed reference.
    pub record: DisapprovalRecord,
    /// The pool entry promoted into the vacated slot, if any.
    pub replacement: Option<Reference>,
    /// Set when the pool ran dry and a refill should be issued.
    pub needs_refill: bool,
}

impl SearchSession {
    /// Installs a freshly ranked fetch result and marks the session `Success`.
    pub fn apply_results(&mut self, ranked: Vec<Reference>) {
        let (visible, pool) = split_candidates(ranked, self.target_len());
        self.visible = visible;
        self.pool = pool;
        self.status = SessionStatus::Success;
        self.error_message = None;
    }

    /// Removes `visible[index]` and promotes a replacement from the pool.
    ///
    /// `UnwantedSource` first purges every pool entry from the same
    /// publication. `NotNew` and `LowImpact` persistently re-sort the pool
    /// (by numeric year and by citation count) before the head is promoted.
    ///
    /// Returns `None` when `index` is out of range. `needs_refill` is only set
    /// when the pool is empty and no refill is already outstanding.
    pub fn disapprove(&mut self, index: usize, reason: DisapprovalReason) -> Option<Disapproval> {
        if index >= self.visible.len() {
            return None;
        }

        let removed = self.visible.remove(index);

        if reason == DisapprovalReason::UnwantedSource {
            // An empty publication is a source too: unattributed entries go together.
            let source = removed.normalized_publication();
            let before = self.pool.len();
            self.pool.retain(|r| r.normalized_publication() != source);
            debug!(
                session_id = %self.id,
                source = %source,
                purged = before - self.pool.len(),
                "Purged unwanted source from pool"
            );
        }

        let replacement = if self.pool.is_empty() {
            None
        } else {
            match reason {
                DisapprovalReason::NotNew => self
                    .pool
                    .sort_by(|a, b| numeric_year(&b.year).total_cmp(&numeric_year(&a.year))),
                DisapprovalReason::LowImpact => self.pool.sort_by_key(|r| Reverse(r.citations())),
                DisapprovalReason::NotRelevant | DisapprovalReason::UnwantedSource => {}
            }
            let next = self.pool.remove(0);
            let slot = index.min(self.visible.len());
            self.visible.insert(slot, next.clone());
            Some(next)
        };

        let needs_refill = self.pool.is_empty() && !self.is_refilling;
        if needs_refill {
            self.is_refilling = true;
        }

        debug!(
            session_id = %self.id,
            index,
            reason = ?reason,
            replaced = replacement.is_some(),
            pool = self.pool.len(),
            needs_refill,
            "Applied disapproval"
        );

        Some(Disapproval {
            record: DisapprovalRecord::new(removed, reason),
            replacement,
            needs_refill,
        })
    }

    /// Absorbs the result of a refill or "more results" fetch.
    ///
    /// Entries whose title is already shown or pooled are skipped. When
    /// `visible` is short of its target it is topped up in returned order and
    /// the remainder is parked in the pool. Returns the number of references
    /// accepted. Clears `is_refilling`.
    pub fn absorb_refill(&mut self, results: Vec<Reference>) -> usize {
        self.is_refilling = false;

        let mut seen: Vec<String> = self
            .visible
            .iter()
            .chain(self.pool.iter())
            .map(Reference::normalized_title)
            .collect();

        let mut accepted = 0;
        for reference in results {
            let key = normalize_title(&reference.title);
            if !key.is_empty() && seen.contains(&key) {
                continue;
            }
            seen.push(key);
            accepted += 1;
            if self.visible.len() < self.target_len() {
                self.visible.push(reference);
            } else {
                self.pool.push(reference);
            }
        }
        accepted
    }
}
