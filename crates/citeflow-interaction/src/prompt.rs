//! Prompt construction for reference search and verification.

use std::fmt::Write as _;

use citeflow_core::disapproval::DisapprovalRecord;
use citeflow_core::reference::Reference;
use citeflow_core::search::{Priority, ReferenceQuery};

/// Most recent disapprovals included as avoidance hints.
pub const MAX_DISAPPROVAL_HINTS: usize = 20;
/// Characters of the surrounding document included for topic context.
const DOCUMENT_EXCERPT_CHARS: usize = 4_000;

pub const SEARCH_SYSTEM_PROMPT: &str = "You are a meticulous research librarian. \
You only cite real, published works and you answer with JSON only.";

pub const VERIFY_SYSTEM_PROMPT: &str = "You are a citation checker. \
You confirm which references exist and correct their metadata. You answer with JSON only.";

const CANDIDATE_SCHEMA: &str = r#"[{"title": string, "authors": [string], "year": string, "publication": string, "url": string, "summary": string, "relevance": string, "citationCount": number}]"#;

const CONFIRMED_SCHEMA: &str = r#"[{"title": string, "url": string, "year": string}]"#;

fn priority_instruction(priority: Priority) -> &'static str {
    match priority {
        Priority::Newest => "Prefer the most recent publications.",
        Priority::MostCited => "Prefer the most cited publications and report citationCount.",
        Priority::HighImpact => {
            "Order results from highest to lowest impact (venue prestige, influence on the field)."
        }
    }
}

fn excerpt(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit).collect();
    out.push_str(" [...]");
    out
}

fn disapproval_hints(records: &[DisapprovalRecord]) -> Vec<String> {
    records
        .iter()
        .rev()
        .take(MAX_DISAPPROVAL_HINTS)
        .map(|record| {
            let r = &record.reference;
            if r.publication.trim().is_empty() {
                format!("\"{}\" ({})", r.title, record.reason.label())
            } else {
                format!("\"{}\" from {} ({})", r.title, r.publication.trim(), record.reason.label())
            }
        })
        .collect()
}

/// Prompt asking for candidate references supporting the highlighted claim.
pub fn build_search_prompt(query: &ReferenceQuery) -> String {
    let prefs = &query.preferences;
    let ctx = &query.context;
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "Find {} scholarly references that support the following claim.",
        query.requested_count
    );
    let _ = writeln!(prompt, "\nCLAIM:\n{}", ctx.highlighted_text.trim());
    if !ctx.preceding_context.trim().is_empty() {
        let _ = writeln!(prompt, "\nTEXT BEFORE THE CLAIM:\n{}", ctx.preceding_context.trim());
    }
    if !ctx.full_text.trim().is_empty() {
        let _ = writeln!(
            prompt,
            "\nDOCUMENT (for topic only):\n{}",
            excerpt(ctx.full_text.trim(), DOCUMENT_EXCERPT_CHARS)
        );
    }

    let _ = writeln!(prompt, "\nREQUIREMENTS:");
    let _ = writeln!(prompt, "- {}", priority_instruction(prefs.priority));
    if !prefs.year_start.is_empty() {
        let _ = writeln!(prompt, "- Only works published in {} or later.", prefs.year_start);
    }
    if !prefs.publisher_filter.is_empty() {
        let publishers: Vec<&str> = prefs.publisher_filter.iter().map(String::as_str).collect();
        let _ = writeln!(prompt, "- Only works published by: {}.", publishers.join(", "));
    }
    if !prefs.source_types.is_empty() {
        let types: Vec<&str> = prefs.source_types.iter().map(String::as_str).collect();
        let _ = writeln!(prompt, "- Only these document types: {}.", types.join(", "));
    }
    if !query.exclude_titles.is_empty() {
        let _ = writeln!(prompt, "- Do NOT return any of these titles:");
        for title in &query.exclude_titles {
            let _ = writeln!(prompt, "  * {title}");
        }
    }
    let hints = disapproval_hints(&query.disapprovals);
    if !hints.is_empty() {
        let _ = writeln!(prompt, "- The user rejected these earlier; avoid similar ones:");
        for hint in hints {
            let _ = writeln!(prompt, "  * {hint}");
        }
    }

    let _ = writeln!(
        prompt,
        "\nRespond with a JSON array only, no prose, matching:\n{CANDIDATE_SCHEMA}"
    );
    prompt
}

/// Prompt asking which candidates exist, with corrected title / url / year.
pub fn build_verification_prompt(candidates: &[Reference]) -> String {
    let mut prompt = String::from(
        "Check whether each of the following references is a real, published work.\n\
         Return only the ones that exist, with their exact title, a working url and \
         the publication year. Omit any you cannot confirm.\n\nREFERENCES:\n",
    );
    for (idx, reference) in candidates.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{}. \"{}\" by {} ({}) in {} {}",
            idx + 1,
            reference.title,
            if reference.authors.is_empty() {
                "unknown authors".to_string()
            } else {
                reference.authors.join(", ")
            },
            reference.year,
            reference.publication,
            reference.url
        );
    }
    let _ = writeln!(
        prompt,
        "\nRespond with a JSON array only, no prose, matching:\n{CONFIRMED_SCHEMA}"
    );
    prompt
}
