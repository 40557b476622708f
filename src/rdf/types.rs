//! Triple vocabulary: entity kinds, synthetic URIs, predicates

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// URI parse errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UriError {
    /// No `:` separating kind and identifier
    #[error("Missing kind prefix in URI: {0}")]
    MissingPrefix(String),

    /// Prefix outside the vocabulary
    #[error("Unknown URI prefix: {0}")]
    UnknownPrefix(String),
}

pub type UriResult<T> = Result<T, UriError>;

/// Kind of entity in the knowledge graph.
///
/// Doubles as the display group of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Article,
    Author,
    Section,
    Institution,
    Keyword,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Article,
        EntityKind::Author,
        EntityKind::Section,
        EntityKind::Institution,
        EntityKind::Keyword,
    ];

    /// URI prefix (`inst` for institutions)
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Article => "article",
            EntityKind::Author => "author",
            EntityKind::Section => "section",
            EntityKind::Institution => "inst",
            EntityKind::Keyword => "keyword",
        }
    }

    /// Class name used as the object of `type` triples
    pub fn class_name(&self) -> &'static str {
        match self {
            EntityKind::Article => "article",
            EntityKind::Author => "author",
            EntityKind::Section => "section",
            EntityKind::Institution => "institution",
            EntityKind::Keyword => "keyword",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name())
    }
}

/// Synthetic entity identifier, rendered as `kind:id`.
///
/// Not a resolvable resource. The identifier may be empty for malformed rows and
/// may itself contain colons (DOIs, ORCID URLs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityUri {
    kind: EntityKind,
    id: String,
}

impl EntityUri {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn article(doi: &str) -> Self {
        Self::new(EntityKind::Article, doi)
    }

    pub fn author(author: &str) -> Self {
        Self::new(EntityKind::Author, author)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for EntityUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.id)
    }
}

impl FromStr for EntityUri {
    type Err = UriError;

    fn from_str(s: &str) -> UriResult<Self> {
        let (prefix, id) = s
            .split_once(':')
            .ok_or_else(|| UriError::MissingPrefix(s.to_string()))?;
        let kind = EntityKind::from_prefix(prefix)
            .ok_or_else(|| UriError::UnknownPrefix(prefix.to_string()))?;
        Ok(Self::new(kind, id))
    }
}

impl Serialize for EntityUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityUri {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Relationship carried by a triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "hasAuthor")]
    HasAuthor,
    #[serde(rename = "hasSection")]
    HasSection,
    #[serde(rename = "hasInstitution")]
    HasInstitution,
    #[serde(rename = "hasKeyword")]
    HasKeyword,
}

impl Predicate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Predicate::Type => "type",
            Predicate::HasAuthor => "hasAuthor",
            Predicate::HasSection => "hasSection",
            Predicate::HasInstitution => "hasInstitution",
            Predicate::HasKeyword => "hasKeyword",
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self, Predicate::Type)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object of a triple: another entity, or a class for `type` assertions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TripleObject {
    Entity(EntityUri),
    Class(EntityKind),
}

impl TripleObject {
    pub fn as_entity(&self) -> Option<&EntityUri> {
        match self {
            TripleObject::Entity(uri) => Some(uri),
            TripleObject::Class(_) => None,
        }
    }
}

impl fmt::Display for TripleObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripleObject::Entity(uri) => write!(f, "{}", uri),
            TripleObject::Class(kind) => f.write_str(kind.class_name()),
        }
    }
}

impl Serialize for TripleObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Subject-predicate-object statement with optional display fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Triple {
    pub subject: EntityUri,
    pub predicate: Predicate,
    pub object: TripleObject,
    /// Article title, on article type assertions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Entity name, on non-article type assertions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Triple {
    /// Relationship between two entities
    pub fn relation(subject: EntityUri, predicate: Predicate, object: EntityUri) -> Self {
        Self {
            subject,
            predicate,
            object: TripleObject::Entity(object),
            title: None,
            name: None,
        }
    }

    /// `(subject, type, kind)` assertion
    pub fn type_of(subject: EntityUri) -> Self {
        let kind = subject.kind();
        Self {
            subject,
            predicate: Predicate::Type,
            object: TripleObject::Class(kind),
            title: None,
            name: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}
