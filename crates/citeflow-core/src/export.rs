//! Citation markers and bibliography for exported documents.
//!
//! Each highlighted span contributes its visible references. References are
//! deduplicated across spans by normalized title plus year and numbered in
//! the order they are first seen.

use std::collections::HashMap;

use serde::Serialize;

use crate::reference::{Reference, normalize_title};

/// Citation numbers attached to one highlighted span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanCitation {
    pub session_id: String,
    pub numbers: Vec<usize>,
}

impl SpanCitation {
    /// Bracketed marker such as `[1, 3]`.
    pub fn marker(&self) -> String {
        let joined = self
            .numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{joined}]")
    }
}

/// One numbered bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibliographyEntry {
    pub number: usize,
    pub reference: Reference,
}

impl BibliographyEntry {
    /// Plain-text citation line: `Authors (Year). Title. Publication. URL`.
    pub fn citation_line(&self) -> String {
        let r = &self.reference;
        let mut line = format!("[{}] ", self.number);
        if !r.authors.is_empty() {
            line.push_str(&r.authors.join(", "));
            line.push(' ');
        }
        if !r.year.trim().is_empty() {
            line.push_str(&format!("({}). ", r.year.trim()));
        }
        line.push_str(r.title.trim());
        line.push('.');
        if !r.publication.trim().is_empty() {
            line.push(' ');
            line.push_str(r.publication.trim());
            line.push('.');
        }
        if !r.url.trim().is_empty() {
            line.push(' ');
            line.push_str(r.url.trim());
        }
        line
    }
}

/// Markers and bibliography for a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CitationExport {
    pub spans: Vec<SpanCitation>,
    pub bibliography: Vec<BibliographyEntry>,
}

fn dedup_key(reference: &Reference) -> String {
    format!("{}|{}", normalize_title(&reference.title), reference.year.trim())
}

impl CitationExport {
    /// Builds the export from spans in document order. Spans without
    /// references are skipped.
    pub fn build<'a, I>(spans: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [Reference])>,
    {
        let mut numbers_by_key: HashMap<String, usize> = HashMap::new();
        let mut export = CitationExport::default();

        for (session_id, references) in spans {
            if references.is_empty() {
                continue;
            }
            let mut numbers = Vec::with_capacity(references.len());
            for reference in references {
                let key = dedup_key(reference);
                let number = match numbers_by_key.get(&key) {
                    Some(number) => *number,
                    None => {
                        let number = export.bibliography.len() + 1;
                        numbers_by_key.insert(key, number);
                        export.bibliography.push(BibliographyEntry {
                            number,
                            reference: reference.clone(),
                        });
                        number
                    }
                };
                if !numbers.contains(&number) {
                    numbers.push(number);
                }
            }
            export.spans.push(SpanCitation {
                session_id: session_id.to_string(),
                numbers,
            });
        }

        export
    }

    /// Marker for a span, if it contributed citations.
    pub fn marker_for(&self, session_id: &str) -> Option<String> {
        self.spans
            .iter()
            .find(|span| span.session_id == session_id)
            .map(SpanCitation::marker)
    }

    /// Bibliography rendered one entry per line.
    pub fn render_bibliography(&self) -> String {
        self.bibliography
            .iter()
            .map(BibliographyEntry::citation_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(title: &str, year: &str) -> Reference {
        Reference {
            title: title.to_string(),
            year: year.to_string(),
            authors: vec!["Doe, J.".to_string()],
            publication: "Journal".to_string(),
            url: "https://example.org".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_numbers_in_first_seen_order_with_dedup() {
        let first = vec![reference("Alpha", "2020"), reference("Beta", "2021")];
        let second = vec![reference("beta!", "2021"), reference("Gamma", "2019")];

        let export = CitationExport::build([
            ("s1", first.as_slice()),
            ("s2", second.as_slice()),
        ]);

        assert_eq!(export.bibliography.len(), 3);
        assert_eq!(export.marker_for("s1").as_deref(), Some("[1, 2]"));
        assert_eq!(export.marker_for("s2").as_deref(), Some("[2, 3]"));
        assert_eq!(export.bibliography[2].reference.title, "Gamma");
    }

    #[test]
    fn test_same_title_different_year_is_distinct() {
        let refs = vec![reference("Alpha", "2020"), reference("Alpha", "2022")];
        let export = CitationExport::build([("s1", refs.as_slice())]);
        assert_eq!(export.bibliography.len(), 2);
    }

    #[test]
    fn test_empty_spans_skipped() {
        let empty: Vec<Reference> = Vec::new();
        let export = CitationExport::build([("s1", empty.as_slice())]);
        assert!(export.spans.is_empty());
        assert!(export.marker_for("s1").is_none());
    }

    #[test]
    fn test_citation_line() {
        let entry = BibliographyEntry {
            number: 4,
            reference: reference("Alpha", "2020"),
        };
        assert_eq!(
            entry.citation_line(),
            "[4] Doe, J. (2020). Alpha. Journal. https://example.org"
        );
    }
}
