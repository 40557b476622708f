//! Knowledge-graph triples for OJS articles
//!
//! - **types**: entity kinds, `kind:id` URIs, predicates, triples
//! - **builder**: article records → ordered triple sequence
//! - **export**: Turtle / N-Triples with full IRIs
//!
//! # Example
//!
//! ```rust
//! use ojs_knowledge::api::ArticleRecord;
//! use ojs_knowledge::rdf::build_triples;
//!
//! let records = vec![ArticleRecord::new("A", "X", "10.1/a").with_keywords("ai, nlp")];
//! let triples = build_triples(&records);
//! assert_eq!(triples.len(), 7);
//! assert_eq!(triples[0].to_string(), "(article:10.1/a, type, article)");
//! ```

mod builder;
mod export;
mod types;

pub use types::{
    EntityKind, EntityUri, Predicate, Triple, TripleObject,
    UriError, UriResult,
};

pub use builder::{append_record, build_triples};

pub use export::{ExportError, ExportResult, RdfExporter, RdfFormat};
