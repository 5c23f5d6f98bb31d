//! Search pipeline services.

mod pipeline;

pub use pipeline::{DEFAULT_CANDIDATE_COUNT, DEFAULT_REFILL_COUNT, ReferencePipeline, dedupe_by_title};
