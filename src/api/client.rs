//! RecordSource trait: the fetch contract the core depends on

use async_trait::async_trait;

use crate::api::models::{ArticleDetail, ArticleRecord, AuthorActivity, SectionActivity};
use crate::api::ApiResult;

/// Source of article and aggregate records.
///
/// Implemented by:
/// - `RestClient`: the REST API over HTTP
/// - in-memory fakes in tests
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// `GET /articulos`, optionally filtered by author name
    async fn articles(&self, author: Option<&str>) -> ApiResult<Vec<ArticleRecord>>;

    /// `GET /articulos_institucion?inst=`
    async fn articles_by_institution(&self, institution: &str) -> ApiResult<Vec<ArticleRecord>>;

    /// `GET /articulos_keywords?kw=`
    async fn articles_by_keyword(&self, keyword: &str) -> ApiResult<Vec<ArticleRecord>>;

    /// `GET /articulo/?doi=`; `None` when the DOI is unknown
    async fn article_by_doi(&self, doi: &str) -> ApiResult<Option<ArticleDetail>>;

    /// `GET /relacionados?doi=`
    async fn related_articles(&self, doi: &str) -> ApiResult<Vec<ArticleRecord>>;

    /// `GET /secciones_mas_activas`
    async fn active_sections(&self) -> ApiResult<Vec<SectionActivity>>;

    /// `GET /secciones`
    async fn sections(&self) -> ApiResult<Vec<String>>;

    /// `GET /autores_top`
    async fn top_authors(&self) -> ApiResult<Vec<AuthorActivity>>;

    /// `GET /autores`
    async fn authors(&self) -> ApiResult<Vec<String>>;
}
