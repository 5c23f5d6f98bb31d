pub mod config;
pub mod disapproval;
pub mod error;
pub mod export;
pub mod provider;
pub mod reference;
pub mod search;
pub mod session;

// Re-export common error type
pub use error::CiteError;

pub use disapproval::{DisapprovalHistory, DisapprovalReason, DisapprovalRecord};
pub use export::CitationExport;
pub use provider::{ReferenceProvider, ReferenceVerifier};
pub use reference::{RawCandidate, Reference};
pub use search::{Priority, ReferenceQuery, SearchPreferences, SelectionContext};
pub use session::{SearchSession, SessionStatus};
