//! Bibliographic record model shared by every source adapter.

use serde::{Deserialize, Serialize};

/// Title used when the upstream metadata carries none.
pub const UNTITLED: &str = "(untitled)";

/// Provenance label used when a caller supplies a blank one.
const UNKNOWN_SOURCE: &str = "unknown";

/// Resolver link for a DOI
pub fn doi_url(doi: &str) -> String {
    format!("https://doi.org/{}", doi)
}

/// A bibliographic record normalized from any source
///
/// Records are only constructed through [`RecordBuilder`], which guarantees a
/// non-empty `id`, `title` and `source`. Unknown string fields are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographicRecord {
    /// Best-effort key: URL, else DOI, else title
    pub id: String,

    /// Work title
    pub title: String,

    /// Author display names, in source order
    pub authors: Vec<String>,

    /// Subject/keyword tags, in source order
    pub subjects: Vec<String>,

    /// Publication date (`YYYY-MM-DD` when assembled from parts)
    pub date: String,

    /// Digital Object Identifier
    pub doi: String,

    /// Resolvable link to the work
    pub url: String,

    /// Journal or container title
    pub journal: String,

    /// Provenance label of the adapter that produced the record
    pub source: String,
}

impl BibliographicRecord {
    /// Returns the author names joined for display
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Returns the year part of the date, if any
    pub fn year(&self) -> Option<&str> {
        self.date.get(..4).filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }

    /// Check if the record carries a DOI
    pub fn has_doi(&self) -> bool {
        !self.doi.is_empty()
    }
}

/// Builder for constructing [`BibliographicRecord`] objects
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    title: String,
    authors: Vec<String>,
    subjects: Vec<String>,
    date: String,
    doi: String,
    url: String,
    journal: String,
    source: String,
}

impl RecordBuilder {
    /// Create a new builder with the title and provenance label
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Set authors
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// Set subjects
    pub fn subjects(mut self, subjects: Vec<String>) -> Self {
        self.subjects = subjects;
        self
    }

    /// Set date
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Set DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = doi.into();
        self
    }

    /// Set landing page URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set journal
    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = journal.into();
        self
    }

    /// Build the record, filling in derived fields
    pub fn build(self) -> BibliographicRecord {
        let title = match self.title.trim() {
            "" => UNTITLED.to_string(),
            t => t.to_string(),
        };
        let source = match self.source.trim() {
            "" => UNKNOWN_SOURCE.to_string(),
            s => s.to_string(),
        };
        let doi = self.doi.trim().to_string();
        let url = match self.url.trim() {
            "" if !doi.is_empty() => doi_url(&doi),
            u => u.to_string(),
        };

        let id = if !url.is_empty() {
            url.clone()
        } else if !doi.is_empty() {
            doi.clone()
        } else {
            title.clone()
        };

        BibliographicRecord {
            id,
            title,
            authors: self.authors,
            subjects: self.subjects,
            date: self.date,
            doi,
            url,
            journal: self.journal,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = RecordBuilder::new("Test Paper", "Redalyc")
            .authors(vec!["Ana Pérez".to_string(), "Juan Soto".to_string()])
            .subjects(vec!["ecología".to_string()])
            .date("2021-07-15")
            .doi("10.1590/test.1234")
            .url("https://example.org/article/1")
            .journal("Revista de Prueba")
            .build();

        assert_eq!(record.id, "https://example.org/article/1");
        assert_eq!(record.title, "Test Paper");
        assert_eq!(record.author_line(), "Ana Pérez, Juan Soto");
        assert_eq!(record.doi, "10.1590/test.1234");
        assert_eq!(record.journal, "Revista de Prueba");
        assert_eq!(record.source, "Redalyc");
    }

    #[test]
    fn test_url_derived_from_doi() {
        let record = RecordBuilder::new("Only DOI", "Crossref")
            .doi("10.1590/abc")
            .build();

        assert_eq!(record.url, "https://doi.org/10.1590/abc");
        assert_eq!(record.id, record.url);
    }

    #[test]
    fn test_id_falls_back_to_title() {
        let record = RecordBuilder::new("Bare record", "Redalyc").build();

        assert_eq!(record.id, "Bare record");
        assert!(record.url.is_empty());
        assert!(!record.has_doi());
    }

    #[test]
    fn test_placeholder_title_and_source() {
        let record = RecordBuilder::new("   ", "").build();

        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.source, "unknown");
        assert_eq!(record.id, UNTITLED);
    }

    #[test]
    fn test_year() {
        let record = RecordBuilder::new("T", "S").date("2019-03-01").build();
        assert_eq!(record.year(), Some("2019"));

        let undated = RecordBuilder::new("T", "S").build();
        assert_eq!(undated.year(), None);
    }
}
