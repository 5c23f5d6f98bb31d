//! Search session services.
//!
//! The manager is the only writer of session state; background fetches
//! deliver their results back through it.

mod manager;

pub use manager::{DisapprovalOutcome, SearchHandle, SearchSessionManager};
