//! Provider seams consumed by the search pipeline.

use async_trait::async_trait;

use crate::error::Result;
use crate::reference::{RawCandidate, Reference};
use crate::search::ReferenceQuery;

/// Source of candidate references for a selection.
///
/// Implementations must honour `query.exclude_titles` on a best-effort basis
/// and fail with `CiteError::Provider` (credentials, transport) or
/// `CiteError::MalformedPayload` (unrecoverable output).
#[async_trait]
pub trait ReferenceProvider: Send + Sync {
    async fn search(&self, query: &ReferenceQuery) -> Result<Vec<Reference>>;
}

/// Independent check of a candidate list.
///
/// Returns the confirmed subset as loosely structured records. Failures are
/// absorbed by the caller.
#[async_trait]
pub trait ReferenceVerifier: Send + Sync {
    async fn verify(&self, candidates: &[Reference]) -> Result<Vec<RawCandidate>>;
}
