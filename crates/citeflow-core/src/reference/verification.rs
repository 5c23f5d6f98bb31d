//! Reconciliation of verified candidates with the enriched originals.

use tracing::{debug, warn};

use super::model::{RawCandidate, Reference, normalize_title};
use crate::error::{CiteError, Result};

/// Whether two normalized titles refer to the same work.
///
/// Matching is bidirectional containment. Empty titles never match.
pub fn titles_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

/// Merges the confirmed list from a verification pass into `original`.
///
/// * output order follows `confirmed`;
/// * confirmed items matching no original are dropped;
/// * originals without a confirmed counterpart are dropped;
/// * `url` and `year` come from the confirmed item when non-empty, and so
///   does `title` when it differs from the original beyond case and
///   punctuation; every other field is kept from the original.
///
/// Each original is emitted at most once.
pub fn merge_verified(original: &[Reference], confirmed: &[RawCandidate]) -> Vec<Reference> {
    let normalized: Vec<String> = original.iter().map(Reference::normalized_title).collect();
    let mut used = vec![false; original.len()];
    let mut merged = Vec::with_capacity(confirmed.len());

    for item in confirmed {
        let Some(confirmed_title) = item.title_value() else {
            continue;
        };
        let confirmed_norm = normalize_title(confirmed_title);

        let matched = normalized
            .iter()
            .enumerate()
            .find(|(idx, norm)| !used[*idx] && titles_match(norm, &confirmed_norm))
            .map(|(idx, _)| idx);

        let Some(idx) = matched else {
            debug!(title = confirmed_title, "Confirmed item matches no candidate; dropping");
            continue;
        };
        used[idx] = true;

        let base = &original[idx];
        let mut reference = base.clone();
        if confirmed_norm != normalized[idx] {
            reference.title = confirmed_title.to_string();
        }
        if let Some(url) = item.url_value() {
            reference.url = url.to_string();
        }
        if let Some(year) = item.year_value() {
            reference.year = year.to_string();
        }
        merged.push(reference);
    }

    debug!(
        original = original.len(),
        confirmed = confirmed.len(),
        merged = merged.len(),
        "Verification merge complete"
    );
    merged
}

/// Fail-open wrapper around [`merge_verified`].
///
/// Any error from the verification step yields `original` unchanged.
pub fn merge_or_keep(original: Vec<Reference>, confirmed: Result<Vec<RawCandidate>>) -> Vec<Reference> {
    match confirmed {
        Ok(confirmed) => merge_verified(&original, &confirmed),
        Err(cause) => {
            let err = CiteError::verification(&cause);
            warn!(error = %err, "Keeping unverified candidates");
            original
        }
    }
}
