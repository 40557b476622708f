//! RestClient: HTTP client for the knowledge REST API

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::api::client::RecordSource;
use crate::api::models::{
    ArticleDetail, ArticleLookup, ArticleRecord, AuthorActivity, SectionActivity,
};
use crate::api::{ApiError, ApiResult};
use crate::config::ApiConfig;

/// Network client for the REST API.
pub struct RestClient {
    base_url: String,
    http_client: Client,
}

impl RestClient {
    /// Create a client for the given base URL with default timeouts.
    ///
    /// # Example
    /// ```no_run
    /// # use ojs_knowledge::api::RestClient;
    /// let client = RestClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        }
    }

    /// Create a client from the `api` config section
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}{path}` with query parameters and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, params);

        let response = self.http_client.get(&url)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl RecordSource for RestClient {
    async fn articles(&self, author: Option<&str>) -> ApiResult<Vec<ArticleRecord>> {
        match author {
            Some(autor) => self.get_json("/articulos", &[("autor", autor)]).await,
            None => self.get_json("/articulos", &[]).await,
        }
    }

    async fn articles_by_institution(&self, institution: &str) -> ApiResult<Vec<ArticleRecord>> {
        self.get_json("/articulos_institucion", &[("inst", institution)]).await
    }

    async fn articles_by_keyword(&self, keyword: &str) -> ApiResult<Vec<ArticleRecord>> {
        self.get_json("/articulos_keywords", &[("kw", keyword)]).await
    }

    async fn article_by_doi(&self, doi: &str) -> ApiResult<Option<ArticleDetail>> {
        let lookup: ArticleLookup = self.get_json("/articulo/", &[("doi", doi)]).await?;
        Ok(match lookup {
            ArticleLookup::Found(detail) => Some(detail),
            ArticleLookup::Missing { .. } => None,
        })
    }

    async fn related_articles(&self, doi: &str) -> ApiResult<Vec<ArticleRecord>> {
        self.get_json("/relacionados", &[("doi", doi)]).await
    }

    async fn active_sections(&self) -> ApiResult<Vec<SectionActivity>> {
        self.get_json("/secciones_mas_activas", &[]).await
    }

    async fn sections(&self) -> ApiResult<Vec<String>> {
        self.get_json("/secciones", &[]).await
    }

    async fn top_authors(&self) -> ApiResult<Vec<AuthorActivity>> {
        self.get_json("/autores_top", &[]).await
    }

    async fn authors(&self) -> ApiResult<Vec<String>> {
        self.get_json("/autores", &[]).await
    }
}
