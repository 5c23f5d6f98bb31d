//! Search domain models.

use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::disapproval::DisapprovalRecord;
use crate::error::{CiteError, Result};

/// Smallest number of visible references a session may request.
pub const MIN_REFERENCES: usize = 1;
/// Largest number of visible references a session may request.
pub const MAX_REFERENCES: usize = 5;
/// Maximum number of characters kept as preceding context.
pub const PRECEDING_CONTEXT_CHARS: usize = 300;

/// Ordering requested for the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Most recent publications first
    #[default]
    Newest,
    /// Highest citation count first
    MostCited,
    /// Provider order; the provider is asked to rank by impact upstream
    HighImpact,
}

impl Priority {
    /// Human-readable label used in prompts and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Newest => "newest",
            Priority::MostCited => "most cited",
            Priority::HighImpact => "high impact",
        }
    }
}

/// Preferences governing a reference search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPreferences {
    /// Number of visible references, clamped into [1, 5].
    pub num_references: usize,
    pub priority: Priority,
    /// Publisher names to restrict to; empty means unrestricted.
    #[serde(default)]
    pub publisher_filter: BTreeSet<String>,
    /// Document types to restrict to; empty means unrestricted.
    #[serde(default)]
    pub source_types: BTreeSet<String>,
    /// Earliest acceptable year; empty means unrestricted.
    #[serde(default)]
    pub year_start: String,
    /// Provider model identifier; empty means the provider default.
    #[serde(default)]
    pub model: String,
}

impl Default for SearchPreferences {
    fn default() -> Self {
        Self {
            num_references: 3,
            priority: Priority::default(),
            publisher_filter: BTreeSet::new(),
            source_types: BTreeSet::new(),
            year_start: String::new(),
            model: String::new(),
        }
    }
}

impl SearchPreferences {
    /// Returns a copy with `num_references` clamped into the allowed range.
    pub fn normalized(&self) -> Self {
        let mut prefs = self.clone();
        prefs.num_references = prefs.num_references.clamp(MIN_REFERENCES, MAX_REFERENCES);
        prefs.year_start = prefs.year_start.trim().to_string();
        prefs.model = prefs.model.trim().to_string();
        prefs
    }
}

/// The text selection a search was started from.
///
/// Captured once when the session is created and reused verbatim on retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    pub full_text: String,
    pub highlighted_text: String,
    /// At most [`PRECEDING_CONTEXT_CHARS`] characters preceding the selection.
    pub preceding_context: String,
}

impl SelectionContext {
    /// Builds a context from explicit parts, trimming the preceding context
    /// to its trailing [`PRECEDING_CONTEXT_CHARS`] characters.
    pub fn new(
        full_text: impl Into<String>,
        highlighted_text: impl Into<String>,
        preceding_text: &str,
    ) -> Result<Self> {
        let highlighted_text = highlighted_text.into();
        if highlighted_text.trim().is_empty() {
            return Err(CiteError::validation("highlighted text must not be empty"));
        }
        Ok(Self {
            full_text: full_text.into(),
            highlighted_text,
            preceding_context: trailing_chars(preceding_text, PRECEDING_CONTEXT_CHARS),
        })
    }

    /// Captures the selection `range` (byte offsets) of `full_text`.
    pub fn from_span(full_text: &str, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > full_text.len() {
            return Err(CiteError::validation(format!(
                "selection {}..{} is outside the document ({} bytes)",
                range.start,
                range.end,
                full_text.len()
            )));
        }
        if !full_text.is_char_boundary(range.start) || !full_text.is_char_boundary(range.end) {
            return Err(CiteError::validation(
                "selection does not fall on character boundaries",
            ));
        }
        Self::new(
            full_text,
            &full_text[range.clone()],
            &full_text[..range.start],
        )
    }

    /// Captures the first occurrence of `highlighted` within `full_text`.
    pub fn find(full_text: &str, highlighted: &str) -> Result<Self> {
        if highlighted.trim().is_empty() {
            return Err(CiteError::validation("highlighted text must not be empty"));
        }
        let start = full_text.find(highlighted).ok_or_else(|| {
            CiteError::validation("highlighted text does not occur in the document")
        })?;
        Self::from_span(full_text, start..start + highlighted.len())
    }
}

fn trailing_chars(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    text.chars().skip(count - limit).collect()
}

/// A single request to a reference provider.
///
/// `exclude_titles` lives here rather than on [`SearchPreferences`] so that
/// it can never leak into a session's canonical preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceQuery {
    pub context: SelectionContext,
    pub preferences: SearchPreferences,
    /// Titles the provider must not return again.
    pub exclude_titles: Vec<String>,
    /// How many candidates to ask for.
    pub requested_count: usize,
    /// Snapshot of the disapproval history at the time of the request.
    pub disapprovals: Vec<DisapprovalRecord>,
}

impl ReferenceQuery {
    pub fn new(context: SelectionContext, preferences: SearchPreferences, requested_count: usize) -> Self {
        Self {
            context,
            preferences,
            exclude_titles: Vec::new(),
            requested_count,
            disapprovals: Vec::new(),
        }
    }

    pub fn with_exclusions(mut self, exclude_titles: Vec<String>) -> Self {
        self.exclude_titles = exclude_titles;
        self
    }

    pub fn with_disapprovals(mut self, disapprovals: Vec<DisapprovalRecord>) -> Self {
        self.disapprovals = disapprovals;
        self
    }
}
