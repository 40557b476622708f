//! Article records → triple sequence
//!
//! Per record, in order:
//!
//! 1. `(article:{doi}, type, article)` with the title
//! 2. `(article:{doi}, hasAuthor, author:{author})`, `(author:{author}, type, author)`
//! 3. section, if present: `hasSection` + type assertion
//! 4. institution, if present: `hasInstitution` + type assertion
//! 5. each keyword: `hasKeyword` + type assertion
//!
//! Type assertions for entities shared between records are repeated; collapsing
//! them is the graph view's job.

use crate::api::ArticleRecord;
use crate::rdf::types::{EntityKind, EntityUri, Predicate, Triple};

/// Build the triple sequence for a list of records. Never fails.
pub fn build_triples(records: &[ArticleRecord]) -> Vec<Triple> {
    let mut triples = Vec::with_capacity(records.len() * 4);
    for record in records {
        append_record(&mut triples, record);
    }
    triples
}

/// Append the triples of a single record
pub fn append_record(triples: &mut Vec<Triple>, record: &ArticleRecord) {
    let article = EntityUri::article(&record.doi);
    triples.push(Triple::type_of(article.clone()).with_title(record.title.as_str()));

    let author = EntityUri::author(&record.author);
    triples.push(Triple::relation(article.clone(), Predicate::HasAuthor, author.clone()));
    triples.push(Triple::type_of(author).with_name(record.author.as_str()));

    if let Some(section) = present(&record.section) {
        link(triples, &article, Predicate::HasSection, EntityKind::Section, section);
    }

    if let Some(institution) = present(&record.institution) {
        link(triples, &article, Predicate::HasInstitution, EntityKind::Institution, institution);
    }

    for keyword in record.keyword_list() {
        link(triples, &article, Predicate::HasKeyword, EntityKind::Keyword, keyword);
    }
}

fn link(triples: &mut Vec<Triple>, article: &EntityUri, predicate: Predicate, kind: EntityKind, id: &str) {
    let target = EntityUri::new(kind, id);
    triples.push(Triple::relation(article.clone(), predicate, target.clone()));
    triples.push(Triple::type_of(target).with_name(id));
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::types::TripleObject;

    fn rendered(triples: &[Triple]) -> Vec<String> {
        triples.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_keyword_scenario() {
        let records = vec![ArticleRecord::new("A", "X", "10.1/a").with_keywords("ai, nlp")];
        let triples = build_triples(&records);

        assert_eq!(rendered(&triples), vec![
            "(article:10.1/a, type, article)",
            "(article:10.1/a, hasAuthor, author:X)",
            "(author:X, type, author)",
            "(article:10.1/a, hasKeyword, keyword:ai)",
            "(keyword:ai, type, keyword)",
            "(article:10.1/a, hasKeyword, keyword:nlp)",
            "(keyword:nlp, type, keyword)",
        ]);
        assert_eq!(triples[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn test_full_record_order() {
        let record = ArticleRecord::new("T", "Ana", "d1")
            .with_section("Reviews")
            .with_institution("MIT")
            .with_keywords("rdf");
        let predicates: Vec<&str> = build_triples(&[record])
            .iter()
            .map(|t| t.predicate.as_str())
            .collect();
        assert_eq!(predicates, vec![
            "type", "hasAuthor", "type",
            "hasSection", "type",
            "hasInstitution", "type",
            "hasKeyword", "type",
        ]);
    }

    #[test]
    fn test_institution_type_object() {
        let record = ArticleRecord::new("T", "Ana", "d1").with_institution("MIT");
        let triples = build_triples(&[record]);
        assert_eq!(triples[4].subject.to_string(), "inst:MIT");
        assert_eq!(triples[4].object, TripleObject::Class(EntityKind::Institution));
        assert_eq!(triples[4].object.to_string(), "institution");
    }

    #[test]
    fn test_empty_input() {
        assert!(build_triples(&[]).is_empty());
    }

    #[test]
    fn test_blank_optional_fields_are_absent() {
        let record = ArticleRecord::new("T", "Ana", "d1")
            .with_section("  ")
            .with_keywords(" , ");
        assert_eq!(build_triples(&[record]).len(), 3);
    }

    #[test]
    fn test_malformed_record_degrades() {
        let record = ArticleRecord { title: "No ids".to_string(), ..Default::default() };
        let triples = build_triples(&[record]);
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0].subject.to_string(), "article:");
        assert_eq!(triples[1].object.to_string(), "author:");
    }

    #[test]
    fn test_shared_author_type_repeated() {
        let records = vec![
            ArticleRecord::new("A", "X", "a"),
            ArticleRecord::new("B", "X", "b"),
        ];
        let author_types = build_triples(&records)
            .into_iter()
            .filter(|t| t.predicate.is_type() && t.subject.kind() == EntityKind::Author)
            .count();
        assert_eq!(author_types, 2);
    }
}
