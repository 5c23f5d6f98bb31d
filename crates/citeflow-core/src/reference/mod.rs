//! References and the parsing / reconciliation of provider payloads.

pub mod model;
pub mod payload;
pub mod verification;

pub use model::{RawCandidate, Reference, normalize_publication, normalize_title};
pub use payload::{parse_candidates, recover_json_array, strip_code_fences};
pub use verification::{merge_or_keep, merge_verified, titles_match};
