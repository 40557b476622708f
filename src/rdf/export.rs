//! Turtle / N-Triples export of a triple sequence
//!
//! `kind:id` URIs expand to `{base}{kind}/{id}` with the identifier percent-encoded,
//! predicates to `{base}vocab#{name}`, and `type` to `rdf:type`.

use oxrdf::NamedNode;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rio_api::formatter::TriplesFormatter;
use rio_api::model;
use rio_turtle::{NTriplesFormatter, TurtleFormatter};
use std::str::FromStr;
use thiserror::Error;

use crate::rdf::types::{EntityKind, EntityUri, Predicate, Triple, TripleObject};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const DCTERMS_TITLE: &str = "http://purl.org/dc/terms/title";
const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";

/// Characters kept verbatim in identifier segments
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// Expanded IRI rejected by the IRI parser
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Formatter failure
    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Output syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
}

impl RdfFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle; charset=utf-8",
            RdfFormat::NTriples => "application/n-triples; charset=utf-8",
        }
    }
}

impl FromStr for RdfFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> ExportResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(RdfFormat::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(RdfFormat::NTriples),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

enum ExportObject {
    Iri(NamedNode),
    Literal(String),
}

struct ExportTriple {
    subject: NamedNode,
    predicate: NamedNode,
    object: ExportObject,
}

/// Expands synthetic URIs into IRIs under a base
pub struct RdfExporter {
    base_iri: String,
}

impl RdfExporter {
    pub fn new(base_iri: impl Into<String>) -> Self {
        let mut base_iri = base_iri.into();
        if !base_iri.ends_with('/') && !base_iri.ends_with('#') {
            base_iri.push('/');
        }
        Self { base_iri }
    }

    /// IRI for an entity
    pub fn entity_iri(&self, uri: &EntityUri) -> ExportResult<NamedNode> {
        let id = utf8_percent_encode(uri.id(), SEGMENT);
        iri(format!("{}{}/{}", self.base_iri, uri.kind().prefix(), id))
    }

    /// IRI for a class
    pub fn class_iri(&self, kind: EntityKind) -> ExportResult<NamedNode> {
        let name = kind.class_name();
        let mut chars = name.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        iri(format!("{}vocab#{}", self.base_iri, capitalized))
    }

    /// IRI for a predicate
    pub fn predicate_iri(&self, predicate: Predicate) -> ExportResult<NamedNode> {
        match predicate {
            Predicate::Type => iri(RDF_TYPE.to_string()),
            other => iri(format!("{}vocab#{}", self.base_iri, other.as_str())),
        }
    }

    /// Serialize the triples; display fields become title/name literals
    pub fn serialize(&self, triples: &[Triple], format: RdfFormat) -> ExportResult<String> {
        let expanded = self.expand(triples)?;
        let mut output = Vec::new();

        match format {
            RdfFormat::Turtle => {
                let mut formatter = TurtleFormatter::new(&mut output);
                for triple in &expanded {
                    formatter.format(&to_rio(triple))
                        .map_err(|e| ExportError::Serialize(e.to_string()))?;
                }
                formatter.finish()
                    .map_err(|e| ExportError::Serialize(e.to_string()))?;
            }
            RdfFormat::NTriples => {
                let mut formatter = NTriplesFormatter::new(&mut output);
                for triple in &expanded {
                    formatter.format(&to_rio(triple))
                        .map_err(|e| ExportError::Serialize(e.to_string()))?;
                }
                formatter.finish()
                    .map_err(|e| ExportError::Serialize(e.to_string()))?;
            }
        }

        String::from_utf8(output).map_err(|e| ExportError::Serialize(e.to_string()))
    }

    fn expand(&self, triples: &[Triple]) -> ExportResult<Vec<ExportTriple>> {
        let mut out = Vec::with_capacity(triples.len());
        for triple in triples {
            let subject = self.entity_iri(&triple.subject)?;
            let object = match &triple.object {
                TripleObject::Entity(uri) => ExportObject::Iri(self.entity_iri(uri)?),
                TripleObject::Class(kind) => ExportObject::Iri(self.class_iri(*kind)?),
            };
            out.push(ExportTriple {
                subject: subject.clone(),
                predicate: self.predicate_iri(triple.predicate)?,
                object,
            });

            if let Some(title) = triple.title.as_ref().filter(|t| !t.is_empty()) {
                out.push(ExportTriple {
                    subject: subject.clone(),
                    predicate: iri(DCTERMS_TITLE.to_string())?,
                    object: ExportObject::Literal(title.clone()),
                });
            }
            if let Some(name) = triple.name.as_ref().filter(|n| !n.is_empty()) {
                out.push(ExportTriple {
                    subject,
                    predicate: iri(FOAF_NAME.to_string())?,
                    object: ExportObject::Literal(name.clone()),
                });
            }
        }
        Ok(out)
    }
}

fn iri(value: String) -> ExportResult<NamedNode> {
    NamedNode::new(value.as_str()).map_err(|_| ExportError::InvalidIri(value))
}

fn to_rio(triple: &ExportTriple) -> model::Triple<'_> {
    let object = match &triple.object {
        ExportObject::Iri(node) => model::Term::NamedNode(model::NamedNode { iri: node.as_str() }),
        ExportObject::Literal(value) => model::Term::Literal(model::Literal::Simple { value: value.as_str() }),
    };
    model::Triple {
        subject: model::Subject::NamedNode(model::NamedNode { iri: triple.subject.as_str() }),
        predicate: model::NamedNode { iri: triple.predicate.as_str() },
        object,
    }
}
