//! Reference domain model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A bibliographic reference proposed by a provider.
///
/// References are immutable once produced by a fetch; later stages only
/// substitute whole records, or individual fields during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub title: String,
    pub authors: Vec<String>,
    /// Publication year. Usually numeric, but not guaranteed.
    pub year: String,
    pub publication: String,
    pub url: String,
    pub summary: String,
    pub relevance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<u64>,
}

impl Reference {
    /// Title normalized for fuzzy comparison.
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }

    /// Publication normalized for source comparison.
    pub fn normalized_publication(&self) -> String {
        normalize_publication(&self.publication)
    }

    /// Citation count with "unknown" treated as zero.
    pub fn citations(&self) -> u64 {
        self.citation_count.unwrap_or(0)
    }
}

/// Lower-cases a title and drops every character that is not an ASCII
/// letter or digit.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Trims and lower-cases a publication name.
pub fn normalize_publication(publication: &str) -> String {
    publication.trim().to_lowercase()
}

/// A candidate record as decoded from provider output, before it becomes a
/// [`Reference`].
///
/// Every field is optional and decoding is lenient about shapes: numbers may
/// arrive as strings and vice versa, authors as a list or one string. Keys
/// that are not recognised are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct RawCandidate {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_authors")]
    pub authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(default, alias = "journal", deserialize_with = "lenient_string")]
    pub publication: Option<String>,
    #[serde(default, alias = "link", deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub relevance: Option<String>,
    #[serde(
        default,
        rename = "citationCount",
        alias = "citation_count",
        deserialize_with = "lenient_count"
    )]
    pub citation_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawCandidate {
    /// Non-empty, trimmed title if present.
    pub fn title_value(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    /// Non-empty, trimmed url if present.
    pub fn url_value(&self) -> Option<&str> {
        non_empty(self.url.as_deref())
    }

    /// Non-empty, trimmed year if present.
    pub fn year_value(&self) -> Option<&str> {
        non_empty(self.year.as_deref())
    }

    /// Converts into a [`Reference`], defaulting missing fields to empty.
    pub fn into_reference(self) -> Reference {
        Reference {
            title: self.title.unwrap_or_default().trim().to_string(),
            authors: self.authors.unwrap_or_default(),
            year: self.year.unwrap_or_default().trim().to_string(),
            publication: self.publication.unwrap_or_default(),
            url: self.url.unwrap_or_default().trim().to_string(),
            summary: self.summary.unwrap_or_default(),
            relevance: self.relevance.unwrap_or_default(),
            citation_count: self.citation_count,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_authors<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Object(obj) => obj
                        .get("name")
                        .and_then(|n| n.as_str())
                        .map(|n| n.trim().to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Some(Value::String(s)) => Some(
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title_strips_punctuation_and_case() {
        assert_eq!(normalize_title("Deep Learning for X"), "deeplearningforx");
        assert_eq!(normalize_title("deep learning for x!!"), "deeplearningforx");
        assert_eq!(normalize_title("  "), "");
    }

    #[test]
    fn test_normalize_publication_trims() {
        assert_eq!(normalize_publication(" Acme Journal "), "acme journal");
    }

    #[test]
    fn test_raw_candidate_accepts_mixed_shapes() {
        let raw: RawCandidate = serde_json::from_str(
            r#"{
                "title": "Attention Is All You Need",
                "authors": "Vaswani, Shazeer , ",
                "year": 2017,
                "journal": "NeurIPS",
                "citation_count": "90,000",
                "doi": "10.5555/3295222"
            }"#,
        )
        .unwrap();

        assert_eq!(raw.year.as_deref(), Some("2017"));
        assert_eq!(
            raw.authors,
            Some(vec!["Vaswani".to_string(), "Shazeer".to_string()])
        );
        assert_eq!(raw.publication.as_deref(), Some("NeurIPS"));
        assert_eq!(raw.citation_count, Some(90_000));
        assert_eq!(raw.extra.get("doi").and_then(|v| v.as_str()), Some("10.5555/3295222"));
    }

    #[test]
    fn test_raw_candidate_null_fields_become_empty() {
        let raw: RawCandidate =
            serde_json::from_str(r#"{"title": null, "citationCount": 12}"#).unwrap();
        let reference = raw.into_reference();

        assert_eq!(reference.title, "");
        assert!(reference.authors.is_empty());
        assert_eq!(reference.citation_count, Some(12));
    }

    #[test]
    fn test_reference_serializes_camel_case() {
        let reference = Reference {
            title: "T".into(),
            citation_count: Some(3),
            ..Default::default()
        };
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["citationCount"], 3);
    }
}
