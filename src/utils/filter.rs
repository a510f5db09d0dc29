//! Client-side keyword matching and pagination.

use regex::{Regex, RegexBuilder};

use crate::models::BibliographicRecord;
use crate::sources::SourceError;

/// Case-insensitive literal keyword matcher over titles and subjects
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    regex: Regex,
}

impl KeywordMatcher {
    /// Build a matcher; `Ok(None)` for a blank keyword (no filtering).
    ///
    /// Regex metacharacters in the keyword are escaped, so the match is literal.
    /// A keyword too large to compile is an [`SourceError::InvalidRequest`].
    pub fn new(keyword: &str) -> Result<Option<Self>, SourceError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(None);
        }

        let regex = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
            .map_err(|e| SourceError::InvalidRequest(format!("Unusable keyword: {}", e)))?;

        Ok(Some(Self { regex }))
    }

    /// Whether the text contains the keyword
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Whether the record title or any subject contains the keyword
    pub fn matches(&self, record: &BibliographicRecord) -> bool {
        self.is_match(&record.title) || record.subjects.iter().any(|s| self.is_match(s))
    }
}

/// Keep only records matching `keyword`; identity for a blank keyword
pub fn filter_by_keyword(
    records: Vec<BibliographicRecord>,
    keyword: &str,
) -> Result<Vec<BibliographicRecord>, SourceError> {
    Ok(match KeywordMatcher::new(keyword)? {
        Some(matcher) => records.into_iter().filter(|r| matcher.matches(r)).collect(),
        None => records,
    })
}

/// Slice `[(page-1)*page_size, page*page_size)` out of `items`.
///
/// Returns the page and the pre-slice item count. Pages below 1 are treated
/// as page 1.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    let paged = items.into_iter().skip(start).take(page_size).collect();
    (paged, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn record(title: &str, subjects: &[&str]) -> BibliographicRecord {
        RecordBuilder::new(title, "Redalyc")
            .subjects(subjects.iter().map(|s| s.to_string()).collect())
            .build()
    }

    #[test]
    fn test_case_insensitive_title_match() {
        let matcher = KeywordMatcher::new("AGUA").unwrap().unwrap();
        assert!(matcher.matches(&record("Calidad del agua en ríos", &[])));
        assert!(!matcher.matches(&record("Suelos andinos", &[])));
    }

    #[test]
    fn test_subject_match() {
        let matcher = KeywordMatcher::new("hidrología").unwrap().unwrap();
        assert!(matcher.matches(&record("Estudio regional", &["Geografía", "Hidrología"])));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let matcher = KeywordMatcher::new("c++ (v2.0)").unwrap().unwrap();
        assert!(matcher.matches(&record("Programming in C++ (v2.0) today", &[])));
        assert!(!matcher.matches(&record("Programming in cxx v2x0", &[])));
    }

    #[test]
    fn test_blank_keyword_is_identity() {
        assert!(KeywordMatcher::new("   ").unwrap().is_none());

        let records = vec![record("A", &[]), record("B", &[])];
        let filtered = filter_by_keyword(records.clone(), "").unwrap();
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_filter_excludes_non_matching() {
        let records = vec![
            record("Agua potable", &[]),
            record("Energía", &["agua subterránea"]),
            record("Minería", &["cobre"]),
        ];
        let filtered = filter_by_keyword(records, "agua").unwrap();
        let titles: Vec<_> = filtered.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Agua potable", "Energía"]);
    }

    #[test]
    fn test_oversized_keyword_is_rejected() {
        let records = vec![record("Agua", &[]), record("Suelo", &[])];
        let keyword = "é".repeat(200_000);

        let err = filter_by_keyword(records, &keyword).unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));
    }

    #[test]
    fn test_paginate_second_page() {
        let items: Vec<usize> = (0..25).collect();
        let (page, total) = paginate(items, 2, 10);
        assert_eq!(page, (10..20).collect::<Vec<_>>());
        assert_eq!(total, 25);
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let items: Vec<usize> = (0..25).collect();
        let (page, total) = paginate(items, 3, 10);
        assert_eq!(page, (20..25).collect::<Vec<_>>());
        assert_eq!(total, 25);
    }

    #[test]
    fn test_paginate_past_end() {
        let items: Vec<usize> = (0..5).collect();
        let (page, total) = paginate(items, 4, 10);
        assert!(page.is_empty());
        assert_eq!(total, 5);
    }

    #[test]
    fn test_paginate_page_zero() {
        let items: Vec<usize> = (0..5).collect();
        let (page, _) = paginate(items, 0, 2);
        assert_eq!(page, vec![0, 1]);
    }
}
