//! Record shapes returned by the REST API
//!
//! Wire names are the API's Spanish keys. Every field that a row may omit is
//! defaulted so that a sparse row degrades instead of failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};

/// One article row.
///
/// The different article endpoints return different subsets of these columns
/// (`/articulos_institucion` adds `institucion`, `/articulos_keywords` has
/// `keywords` but no `autor`), so everything beyond the title is optional or
/// defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article title
    #[serde(rename = "titulo", default)]
    pub title: String,
    /// Author identifier (display name or ORCID iD)
    #[serde(rename = "autor", default)]
    pub author: String,
    /// DOI, empty when the article has none
    #[serde(default)]
    pub doi: String,
    /// Journal section
    #[serde(rename = "seccion", default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Author affiliation
    #[serde(rename = "institucion", default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    /// Comma-separated keyword list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl ArticleRecord {
    pub fn new(title: impl Into<String>, author: impl Into<String>, doi: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            doi: doi.into(),
            ..Default::default()
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// Keywords split on commas, trimmed, empties dropped
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .map(|kw| kw.split(',').map(str::trim).filter(|k| !k.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Full article as returned by `/articulo/?doi=`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub uri: String,
    pub titulo: String,
    pub autor: String,
    pub resumen: String,
    pub url: String,
}

impl ArticleDetail {
    /// Reduce to the row shape used by the triple builder
    pub fn into_record(self, doi: &str) -> ArticleRecord {
        ArticleRecord::new(self.titulo, self.autor, doi)
    }
}

/// `/articulo/` answers 200 with `{"error": ...}` when the DOI is unknown.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ArticleLookup {
    Found(ArticleDetail),
    Missing {
        #[allow(dead_code)]
        error: String,
    },
}

/// Section with its article count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionActivity {
    pub seccion: String,
    #[serde(deserialize_with = "count_from_number_or_string")]
    pub cantidad: u64,
}

/// Author with their publication count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorActivity {
    pub autor: String,
    #[serde(deserialize_with = "count_from_number_or_string")]
    pub publicaciones: u64,
}

/// SPARQL JSON bindings carry aggregate counts as strings ("12"); accept both.
fn count_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_row_with_missing_columns() {
        let row: ArticleRecord = serde_json::from_str(r#"{"titulo": "T", "doi": "10.1/x", "keywords": "a,b"}"#).unwrap();
        assert_eq!(row.title, "T");
        assert_eq!(row.author, "");
        assert_eq!(row.keywords.as_deref(), Some("a,b"));
        assert!(row.section.is_none());
    }

    #[test]
    fn test_institution_row() {
        let row: ArticleRecord = serde_json::from_str(
            r#"{"titulo": "T", "doi": "d", "autor": "Ana", "institucion": "MIT"}"#,
        ).unwrap();
        assert_eq!(row.institution.as_deref(), Some("MIT"));
    }

    #[test]
    fn test_keyword_list_trims_and_drops_empty() {
        let row = ArticleRecord::new("T", "A", "d").with_keywords(" ai , ,nlp,");
        assert_eq!(row.keyword_list(), vec!["ai", "nlp"]);
    }

    #[test]
    fn test_counts_as_strings() {
        let s: SectionActivity = serde_json::from_str(r#"{"seccion": "Artículos", "cantidad": "12"}"#).unwrap();
        assert_eq!(s.cantidad, 12);
        let a: AuthorActivity = serde_json::from_str(r#"{"autor": "X", "publicaciones": 3}"#).unwrap();
        assert_eq!(a.publicaciones, 3);
        assert!(serde_json::from_str::<AuthorActivity>(r#"{"autor": "X", "publicaciones": "many"}"#).is_err());
    }

    #[test]
    fn test_article_lookup_missing() {
        let missing: ArticleLookup = serde_json::from_str(r#"{"error": "not found"}"#).unwrap();
        assert!(matches!(missing, ArticleLookup::Missing { .. }));

        let found: ArticleLookup = serde_json::from_str(
            r#"{"uri": "u", "titulo": "t", "autor": "a", "resumen": "r", "url": "l"}"#,
        ).unwrap();
        match found {
            ArticleLookup::Found(detail) => assert_eq!(detail.into_record("10.1/a").doi, "10.1/a"),
            ArticleLookup::Missing { .. } => panic!("expected detail"),
        }
    }
}
