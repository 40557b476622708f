//! Query Resolver
//!
//! Maps a typed search query to exactly one fetch directive and runs it.
//! Each resolution carries a request token; only the latest issued token may
//! update dashboard state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiResult, ArticleRecord, RecordSource};

/// Query parse errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryParseError {
    #[error("Unknown search kind: {0}")]
    UnknownKind(String),

    #[error("Missing search kind in query: {0}")]
    MissingKind(String),
}

/// What the search term is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Article,
    Author,
    Institution,
    Keywords,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Article => "article",
            SearchKind::Author => "author",
            SearchKind::Institution => "institution",
            SearchKind::Keywords => "keywords",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKind {
    type Err = QueryParseError;

    /// English names plus the search bar's Spanish prefixes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "article" | "articulo" => Ok(SearchKind::Article),
            "author" | "autor" => Ok(SearchKind::Author),
            "institution" | "institucion" | "inst" => Ok(SearchKind::Institution),
            "keywords" | "keyword" | "kw" => Ok(SearchKind::Keywords),
            other => Err(QueryParseError::UnknownKind(other.to_string())),
        }
    }
}

/// A typed search; lives for one resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub kind: SearchKind,
    #[serde(default)]
    pub term: String,
}

impl SearchQuery {
    pub fn new(kind: SearchKind, term: impl Into<String>) -> Self {
        Self { kind, term: term.into() }
    }

    /// The single fetch this query maps to
    pub fn directive(&self) -> FetchDirective {
        let term = self.term.trim().to_string();
        match self.kind {
            SearchKind::Article if term.is_empty() => FetchDirective::AllArticles,
            SearchKind::Article => FetchDirective::ArticleByDoi(term),
            SearchKind::Author => FetchDirective::ArticlesByAuthor(term),
            SearchKind::Institution => FetchDirective::ArticlesByInstitution(term),
            SearchKind::Keywords => FetchDirective::ArticlesByKeyword(term),
        }
    }
}

impl FromStr for SearchQuery {
    type Err = QueryParseError;

    /// Parses `kind:term`, e.g. `autor:García` or `institution:MIT`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, term) = s
            .split_once(':')
            .ok_or_else(|| QueryParseError::MissingKind(s.to_string()))?;
        Ok(Self::new(kind.parse()?, term.trim()))
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.term)
    }
}

/// One fetch against the record source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDirective {
    AllArticles,
    ArticleByDoi(String),
    ArticlesByAuthor(String),
    ArticlesByInstitution(String),
    ArticlesByKeyword(String),
}

impl FetchDirective {
    /// REST endpoint the directive calls
    pub fn endpoint(&self) -> &'static str {
        match self {
            FetchDirective::AllArticles | FetchDirective::ArticlesByAuthor(_) => "/articulos",
            FetchDirective::ArticleByDoi(_) => "/articulo/",
            FetchDirective::ArticlesByInstitution(_) => "/articulos_institucion",
            FetchDirective::ArticlesByKeyword(_) => "/articulos_keywords",
        }
    }

    /// Run the directive: exactly one call on `source`
    pub async fn fetch(&self, source: &dyn RecordSource) -> ApiResult<Vec<ArticleRecord>> {
        match self {
            FetchDirective::AllArticles => source.articles(None).await,
            FetchDirective::ArticleByDoi(doi) => Ok(source
                .article_by_doi(doi)
                .await?
                .map(|detail| vec![detail.into_record(doi)])
                .unwrap_or_default()),
            FetchDirective::ArticlesByAuthor(author) => source.articles(Some(author.as_str())).await,
            FetchDirective::ArticlesByInstitution(inst) => source.articles_by_institution(inst).await,
            FetchDirective::ArticlesByKeyword(kw) => source.articles_by_keyword(kw).await,
        }
    }
}

/// Monotonic per-search token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RequestToken(pub u64);

/// Issues tokens and answers whether one is still the latest
#[derive(Debug, Default)]
pub struct RequestTokens {
    issued: AtomicU64,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> RequestToken {
        RequestToken(self.issued.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest() == token
    }
}

/// Result of one resolution, tagged with its token
#[derive(Debug)]
pub struct Resolution {
    pub token: RequestToken,
    pub query: SearchQuery,
    pub result: ApiResult<Vec<ArticleRecord>>,
}

/// Resolves queries against a record source
pub struct QueryResolver {
    source: Arc<dyn RecordSource>,
    tokens: RequestTokens,
}

impl QueryResolver {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            tokens: RequestTokens::new(),
        }
    }

    pub fn source(&self) -> &Arc<dyn RecordSource> {
        &self.source
    }

    /// Claim a token for a state update that is not a search (initial load)
    pub fn issue_token(&self) -> RequestToken {
        self.tokens.issue()
    }

    /// Issue a token, then perform the query's single fetch
    pub async fn resolve(&self, query: SearchQuery) -> Resolution {
        let token = self.tokens.issue();
        let directive = query.directive();
        debug!("Resolving {} (token {}) via {}", query, token.0, directive.endpoint());
        let result = directive.fetch(self.source.as_ref()).await;
        Resolution { token, query, result }
    }

    /// Whether no newer resolution has been started since `token`
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.tokens.is_current(token)
    }
}
