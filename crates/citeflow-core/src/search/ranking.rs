//! Ranking of a complete fetch result.
//!
//! This full-list ordering runs once per primary fetch, after verification and
//! before the visible / pool split. Single-slot replacement uses its own
//! ordering (see [`crate::session::pool`]).

use std::cmp::Reverse;

use super::model::Priority;
use crate::reference::Reference;

/// Year key used for ranking: the leading run of ASCII digits, 0 otherwise.
pub fn leading_year(year: &str) -> u64 {
    let digits: String = year
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Orders `candidates` for `priority`. The sort is stable, so ties keep their
/// provider order.
pub fn rank(mut candidates: Vec<Reference>, priority: Priority) -> Vec<Reference> {
    match priority {
        Priority::Newest => candidates.sort_by_key(|r| Reverse(leading_year(&r.year))),
        Priority::MostCited => candidates.sort_by_key(|r| Reverse(r.citations())),
        // No independent impact data; trust the provider's order.
        Priority::HighImpact => {}
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_year(title: &str, year: &str) -> Reference {
        Reference {
            title: title.to_string(),
            year: year.to_string(),
            ..Default::default()
        }
    }

    fn with_citations(title: &str, citations: Option<u64>) -> Reference {
        Reference {
            title: title.to_string(),
            citation_count: citations,
            ..Default::default()
        }
    }

    fn titles(refs: &[Reference]) -> Vec<&str> {
        refs.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_newest_orders_by_leading_digits() {
        let ranked = rank(
            vec![
                with_year("a", "2019"),
                with_year("b", "2021"),
                with_year("c", "abc"),
                with_year("d", "2020"),
            ],
            Priority::Newest,
        );
        assert_eq!(titles(&ranked), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_newest_handles_suffixes_and_ties() {
        let ranked = rank(
            vec![
                with_year("first", "2020"),
                with_year("suffixed", "2022a"),
                with_year("second", "2020 (online)"),
                with_year("empty", ""),
            ],
            Priority::Newest,
        );
        assert_eq!(titles(&ranked), vec!["suffixed", "first", "second", "empty"]);
    }

    #[test]
    fn test_most_cited_treats_missing_as_zero() {
        let ranked = rank(
            vec![
                with_citations("none", None),
                with_citations("ten", Some(10)),
                with_citations("zero", Some(0)),
                with_citations("hundred", Some(100)),
            ],
            Priority::MostCited,
        );
        assert_eq!(titles(&ranked), vec!["hundred", "ten", "none", "zero"]);
    }

    #[test]
    fn test_high_impact_is_passthrough() {
        let input = vec![
            with_citations("x", Some(1)),
            with_citations("y", Some(500)),
            with_citations("z", None),
        ];
        let ranked = rank(input.clone(), Priority::HighImpact);
        assert_eq!(ranked, input);
    }

    #[test]
    fn test_leading_year() {
        assert_eq!(leading_year("1999"), 1999);
        assert_eq!(leading_year("c. 1850"), 0);
        assert_eq!(leading_year(""), 0);
    }
}
