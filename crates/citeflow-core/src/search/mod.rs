//! Search preferences, selection capture and ranking.

pub mod model;
pub mod ranking;

pub use model::{
    MAX_REFERENCES, MIN_REFERENCES, PRECEDING_CONTEXT_CHARS, Priority, ReferenceQuery,
    SearchPreferences, SelectionContext,
};
pub use ranking::{leading_year, rank};
