//! Recovery parsing of provider output.
//!
//! Text-generation providers wrap JSON in markdown fences and sometimes stop
//! mid-array. The helpers here extract the outermost JSON array from such
//! text, closing a truncated array after its last complete object.

use tracing::{trace, warn};

use super::model::RawCandidate;
use crate::error::{CiteError, Result};

/// Removes markdown code-fence markers (```` ```json ```` and ```` ``` ````).
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```JSON", "").replace("```", "")
}

/// Locates the JSON array inside `raw` and returns it as a standalone string.
///
/// When the array was never closed, everything up to the last `}` after the
/// opening `[` is kept and a `]` is appended, so the final incomplete object is
/// dropped instead of failing the whole batch.
pub fn recover_json_array(raw: &str) -> Result<String> {
    let text = strip_code_fences(raw);

    let Some(start) = text.find('[') else {
        return Err(CiteError::malformed_payload(
            "no JSON array found in provider output",
            raw,
        ));
    };

    match text.rfind(']') {
        Some(end) if end > start => Ok(text[start..=end].to_string()),
        _ => {
            let Some(last_brace) = text[start..].rfind('}').map(|offset| start + offset) else {
                return Err(CiteError::malformed_payload(
                    "unterminated JSON array without any complete object",
                    raw,
                ));
            };
            warn!(
                recovered_len = last_brace + 1 - start,
                total_len = text.len(),
                "Provider output truncated; closing array after last complete object"
            );
            let mut recovered = text[start..=last_brace].to_string();
            recovered.push(']');
            Ok(recovered)
        }
    }
}

/// Parses provider output into candidate records.
///
/// Used for both the primary fetch and the verification pass.
pub fn parse_candidates(raw: &str) -> Result<Vec<RawCandidate>> {
    let array = recover_json_array(raw)?;
    trace!(payload = %array, "Decoding candidate array");
    serde_json::from_str::<Vec<RawCandidate>>(&array).map_err(|err| {
        CiteError::malformed_payload(format!("candidate array could not be decoded: {err}"), raw)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_array() {
        let parsed = parse_candidates(r#"[{"title":"A"},{"title":"B"}]"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn test_fenced_array_with_prose() {
        let raw = "Here are the sources:\n```json\n[{\"title\":\"A\",\"year\":\"2020\"}]\n```\nEnjoy!";
        let parsed = parse_candidates(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].year.as_deref(), Some("2020"));
    }

    #[test]
    fn test_truncated_array_drops_incomplete_object() {
        let raw = "```json\n[{\"a\":1},{\"a\":2\n";
        let recovered = recover_json_array(raw).unwrap();
        assert_eq!(recovered, "[{\"a\":1}]");

        let parsed = parse_candidates(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].extra.get("a").and_then(|v| v.as_i64()), Some(1));
    }

    #[test]
    fn test_unclosed_array_keeps_every_complete_object() {
        let raw = "```json\n[{\"a\":1},{\"a\":2}\n";
        let parsed = parse_candidates(raw).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_no_open_bracket_is_malformed() {
        let err = parse_candidates("I could not find any references, sorry.").unwrap_err();
        assert!(err.is_malformed_payload());
    }

    #[test]
    fn test_unclosed_array_without_object_is_malformed() {
        let err = parse_candidates("[ {\"title\": \"half").unwrap_err();
        assert!(err.is_malformed_payload());
    }

    #[test]
    fn test_bracket_before_array_start_counts_as_unclosed() {
        // The only `]` precedes the first `[`.
        let raw = "] noise [{\"title\":\"A\"},{\"title\":";
        let parsed = parse_candidates(raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_undecodable_array_keeps_raw_text() {
        let raw = "[{\"title\": \"A\",}]";
        match parse_candidates(raw).unwrap_err() {
            CiteError::MalformedPayload { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_elements_are_malformed() {
        let err = parse_candidates("[1, 2, 3]").unwrap_err();
        assert!(err.is_malformed_payload());
    }
}
