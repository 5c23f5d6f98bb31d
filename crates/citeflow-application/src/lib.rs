//! Application layer for Citeflow.
//!
//! Coordinates the domain rules in `citeflow-core` with an injected
//! reference provider: the search pipeline runs fetch, dedupe and
//! verification; the session manager owns the session table and applies
//! completions under a staleness guard.

pub mod search;
pub mod session;

pub use search::ReferencePipeline;
pub use session::{DisapprovalOutcome, SearchHandle, SearchSessionManager};
