//! Shared fixtures: an in-memory record source with a call log

#![allow(dead_code)]

use async_trait::async_trait;
use ojs_knowledge::api::{
    ApiError, ApiResult, ArticleDetail, ArticleRecord, AuthorActivity, RecordSource,
    SectionActivity,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn journal() -> Vec<ArticleRecord> {
    vec![
        ArticleRecord::new("Graph search", "Ana García", "10.1/a")
            .with_section("Reviews")
            .with_institution("MIT")
            .with_keywords("ai, graphs"),
        ArticleRecord::new("Entity ranking", "Ana García", "10.1/b")
            .with_section("Articles")
            .with_keywords("ranking"),
        ArticleRecord::new("Open peer review", "Luis Pérez", "10.1/c")
            .with_section("Articles")
            .with_institution("UCuenca")
            .with_keywords("ai"),
    ]
}

#[derive(Default)]
pub struct FakeSource {
    pub records: Vec<ArticleRecord>,
    pub calls: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    /// Keyword searches wait on this before answering
    pub keyword_gate: Option<Arc<Notify>>,
    /// Top-author requests wait on this, then report success or failure
    pub authors_gate: Option<Arc<Notify>>,
}

impl FakeSource {
    pub fn new(records: Vec<ArticleRecord>) -> Self {
        Self { records, ..Default::default() }
    }

    pub fn gated(records: Vec<ArticleRecord>, gate: Arc<Notify>) -> Self {
        Self { records, keyword_gate: Some(gate), ..Default::default() }
    }

    pub fn with_authors_gate(records: Vec<ArticleRecord>, gate: Arc<Notify>) -> Self {
        Self { records, authors_gate: Some(gate), ..Default::default() }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: String) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call.clone());
        self.check(call)
    }

    fn check(&self, call: String) -> ApiResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Status { endpoint: call, status: 500 });
        }
        Ok(())
    }

    fn matching<F: Fn(&ArticleRecord) -> bool>(&self, keep: F) -> Vec<ArticleRecord> {
        self.records.iter().filter(|r| keep(r)).cloned().collect()
    }
}

#[async_trait]
impl RecordSource for FakeSource {
    async fn articles(&self, author: Option<&str>) -> ApiResult<Vec<ArticleRecord>> {
        self.record(format!("/articulos?autor={}", author.unwrap_or("")))?;
        Ok(self.matching(|r| author.map_or(true, |a| r.author == a)))
    }

    async fn articles_by_institution(&self, institution: &str) -> ApiResult<Vec<ArticleRecord>> {
        self.record(format!("/articulos_institucion?inst={}", institution))?;
        Ok(self.matching(|r| r.institution.as_deref() == Some(institution)))
    }

    async fn articles_by_keyword(&self, keyword: &str) -> ApiResult<Vec<ArticleRecord>> {
        self.record(format!("/articulos_keywords?kw={}", keyword))?;
        if let Some(gate) = &self.keyword_gate {
            gate.notified().await;
        }
        Ok(self.matching(|r| r.keyword_list().contains(&keyword)))
    }

    async fn article_by_doi(&self, doi: &str) -> ApiResult<Option<ArticleDetail>> {
        self.record(format!("/articulo/?doi={}", doi))?;
        Ok(self.records.iter().find(|r| r.doi == doi).map(|r| ArticleDetail {
            uri: format!("http://example.org/article/{}", r.doi),
            titulo: r.title.clone(),
            autor: r.author.clone(),
            resumen: format!("Abstract of {}", r.title),
            url: format!("https://doi.org/{}", r.doi),
        }))
    }

    async fn related_articles(&self, doi: &str) -> ApiResult<Vec<ArticleRecord>> {
        self.record(format!("/relacionados?doi={}", doi))?;
        Ok(self.matching(|r| r.doi != doi))
    }

    async fn active_sections(&self) -> ApiResult<Vec<SectionActivity>> {
        self.record("/secciones_mas_activas".to_string())?;
        Ok(vec![
            SectionActivity { seccion: "Articles".into(), cantidad: 2 },
            SectionActivity { seccion: "Reviews".into(), cantidad: 1 },
        ])
    }

    async fn sections(&self) -> ApiResult<Vec<String>> {
        self.record("/secciones".to_string())?;
        Ok(vec!["Articles".into(), "Reviews".into()])
    }

    async fn top_authors(&self) -> ApiResult<Vec<AuthorActivity>> {
        let call = "/autores_top".to_string();
        self.calls.lock().unwrap().push(call.clone());
        if let Some(gate) = &self.authors_gate {
            gate.notified().await;
        }
        self.check(call)?;
        Ok(vec![
            AuthorActivity { autor: "Ana García".into(), publicaciones: 2 },
            AuthorActivity { autor: "Luis Pérez".into(), publicaciones: 1 },
        ])
    }

    async fn authors(&self) -> ApiResult<Vec<String>> {
        self.record("/autores".to_string())?;
        Ok(vec!["Ana García".into(), "Luis Pérez".into()])
    }
}
