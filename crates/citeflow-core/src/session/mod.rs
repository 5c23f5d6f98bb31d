//! Search sessions and their visible / pool state.

pub mod model;
pub mod pool;

pub use model::{SearchSession, SessionStatus};
pub use pool::{Disapproval, numeric_year, split_candidates};
