//! Dashboard state container
//!
//! Owns the article list, triple list, rendered graph, filters, selection and
//! reveal cursor. Every mutation goes through a method here; article list,
//! triples and graph are always replaced together, never patched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{
    ApiResult, ArticleDetail, ArticleRecord, AuthorActivity, RecordSource, SectionActivity,
};
use crate::config::ViewConfig;
use crate::graph::{Point, Renderer, SelectCallback, SelectedNode};
use crate::orcid::{enrich_authors, AuthorProfile, ProfileLookup};
use crate::rdf::{build_triples, EntityKind, EntityUri, ExportResult, RdfExporter, RdfFormat, Triple};
use crate::resolver::{QueryResolver, RequestToken, SearchQuery};

/// Upper bound on server-side layout ticks per render
const SETTLE_TICKS: usize = 300;

/// Section/author selections from the search bar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.section.is_none() && self.author.is_none()
    }

    pub fn matches(&self, record: &ArticleRecord) -> bool {
        let section_ok = self.section.as_ref()
            .map_or(true, |s| record.section.as_deref() == Some(s.as_str()));
        let author_ok = self.author.as_ref()
            .map_or(true, |a| &record.author == a);
        section_ok && author_ok
    }

    /// Empty strings mean "all"
    fn normalized(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            section: keep(self.section),
            author: keep(self.author),
        }
    }
}

/// Pointer phase of a drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Start,
    Move,
    End,
}

/// What a search did to the state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SearchOutcome {
    /// Response applied; counts describe the new state
    Applied { articles: usize, triples: usize },
    /// A newer search was issued first; response dropped
    Stale { token: RequestToken },
    /// Fetch failed; state unchanged
    Failed { message: String },
}

/// A selected node with whatever detail could be fetched for it
#[derive(Debug, Clone, Serialize)]
pub struct SelectionDetail {
    pub node: SelectedNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleDetail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<ArticleRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<AuthorProfile>,
}

/// Revealed slice of the article list
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub articles: Vec<ArticleRecord>,
    pub total: usize,
    pub has_more: bool,
}

/// Author ranking with enrichment
#[derive(Debug, Clone, Serialize)]
pub struct RankedAuthor {
    #[serde(flatten)]
    pub activity: AuthorActivity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<AuthorProfile>,
}

/// Choices for the filter dropdowns
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub sections: Vec<String>,
    pub authors: Vec<String>,
}

/// Summary of the state for the page
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub articles: usize,
    pub revealed: usize,
    pub triples: usize,
    pub nodes: usize,
    pub edges: usize,
    pub filters: FilterState,
    pub selection: Option<SelectedNode>,
    pub last_query: Option<SearchQuery>,
    pub last_error: Option<String>,
}

struct DashboardState {
    articles: Vec<ArticleRecord>,
    triples: Vec<Triple>,
    renderer: Renderer,
    active_sections: Vec<SectionActivity>,
    top_authors: Vec<AuthorActivity>,
    profiles: IndexMap<String, AuthorProfile>,
    filters: FilterState,
    selection: Option<SelectedNode>,
    revealed: usize,
    last_query: Option<SearchQuery>,
    last_error: Option<String>,
}

fn log_selection(node: &SelectedNode) {
    debug!("Selected {} ({})", node.uri, node.label);
}

impl DashboardState {
    fn new() -> Self {
        let mut renderer = Renderer::new();
        renderer.on_select(Box::new(log_selection));
        Self {
            articles: Vec::new(),
            triples: Vec::new(),
            renderer,
            active_sections: Vec::new(),
            top_authors: Vec::new(),
            profiles: IndexMap::new(),
            filters: FilterState::default(),
            selection: None,
            revealed: 0,
            last_query: None,
            last_error: None,
        }
    }

    /// Rebuild triples and graph from the article list
    fn rebuild(&mut self, view: &ViewConfig) {
        self.triples = if view.apply_filters && !self.filters.is_empty() {
            let kept: Vec<ArticleRecord> = self.articles
                .iter()
                .filter(|r| self.filters.matches(r))
                .cloned()
                .collect();
            build_triples(&kept)
        } else {
            build_triples(&self.articles)
        };
        self.renderer.render(&self.triples);
        self.renderer.settle(SETTLE_TICKS);
        self.selection = None;
        self.revealed = view.page_size.min(self.articles.len());
    }
}

/// Single-session dashboard over a record source
pub struct Dashboard {
    resolver: QueryResolver,
    profiles: Option<Arc<dyn ProfileLookup>>,
    view: ViewConfig,
    state: RwLock<DashboardState>,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn RecordSource>,
        profiles: Option<Arc<dyn ProfileLookup>>,
        view: ViewConfig,
    ) -> Self {
        Self {
            resolver: QueryResolver::new(source),
            profiles,
            view,
            state: RwLock::new(DashboardState::new()),
        }
    }

    fn source(&self) -> &dyn RecordSource {
        self.resolver.source().as_ref()
    }

    /// Articles, active sections and top authors, awaited together before any
    /// state change. A search issued meanwhile keeps its article list.
    pub async fn initial_load(&self) -> ApiResult<()> {
        let token = self.resolver.issue_token();
        let source = self.source();

        let loaded = tokio::try_join!(
            source.articles(None),
            source.active_sections(),
            source.top_authors(),
        );
        let (articles, sections, authors) = match loaded {
            Ok(parts) => parts,
            Err(e) => {
                warn!("Initial load failed: {}", e);
                if self.resolver.is_current(token) {
                    self.state.write().await.last_error = Some(e.to_string());
                }
                return Err(e);
            }
        };

        let profiles = match &self.profiles {
            Some(lookup) => {
                let names: Vec<String> = authors.iter().map(|a| a.autor.clone()).collect();
                enrich_authors(lookup.as_ref(), &names).await
            }
            None => IndexMap::new(),
        };

        let mut state = self.state.write().await;
        state.active_sections = sections;
        state.top_authors = authors;
        state.profiles = profiles;
        if self.resolver.is_current(token) {
            state.articles = articles;
            state.rebuild(&self.view);
            info!(
                "Initial load: {} articles, {} triples",
                state.articles.len(),
                state.triples.len()
            );
        } else {
            debug!("Initial article list superseded by a search");
        }
        Ok(())
    }

    /// Resolve a search and, if it is still the latest, replace the article
    /// list and rebuild the graph
    pub async fn search(&self, query: SearchQuery) -> SearchOutcome {
        let resolution = self.resolver.resolve(query).await;

        let mut state = self.state.write().await;
        if !self.resolver.is_current(resolution.token) {
            debug!("Discarding stale response for {}", resolution.query);
            return SearchOutcome::Stale { token: resolution.token };
        }

        match resolution.result {
            Ok(articles) => {
                state.articles = articles;
                state.last_query = Some(resolution.query);
                state.last_error = None;
                state.rebuild(&self.view);
                info!(
                    "Search applied: {} articles, {} triples",
                    state.articles.len(),
                    state.triples.len()
                );
                SearchOutcome::Applied {
                    articles: state.articles.len(),
                    triples: state.triples.len(),
                }
            }
            Err(e) => {
                warn!("Search {} failed: {}", resolution.query, e);
                let message = e.to_string();
                state.last_error = Some(message.clone());
                SearchOutcome::Failed { message }
            }
        }
    }

    /// Record filter selections. They never reach the fetch; with
    /// `apply_filters` the graph is rebuilt from the matching articles.
    pub async fn set_filters(&self, filters: FilterState) -> FilterState {
        let filters = filters.normalized();
        info!("Filters changed: {:?}", filters);

        let mut state = self.state.write().await;
        state.filters = filters.clone();
        if self.view.apply_filters {
            state.rebuild(&self.view);
        }
        filters
    }

    /// Click a node. Articles get their detail and related articles, authors
    /// their cached profile; failed fetches just leave those out.
    pub async fn select(&self, uri: &EntityUri) -> Option<SelectionDetail> {
        let (node, profile) = {
            let mut state = self.state.write().await;
            let node = state.renderer.click(uri)?;
            state.selection = Some(node.clone());
            let profile = match node.group {
                EntityKind::Author => state.profiles.get(uri.id()).cloned(),
                _ => None,
            };
            (node, profile)
        };

        let mut detail = SelectionDetail { node, article: None, related: Vec::new(), profile };
        if detail.node.group == EntityKind::Article && !uri.id().is_empty() {
            let doi = uri.id();
            let (article, related) = tokio::join!(
                self.source().article_by_doi(doi),
                self.source().related_articles(doi),
            );
            detail.article = article.unwrap_or_else(|e| {
                warn!("Article lookup failed for {}: {}", doi, e);
                None
            });
            detail.related = related.unwrap_or_else(|e| {
                warn!("Related lookup failed for {}: {}", doi, e);
                Vec::new()
            });
        }
        Some(detail)
    }

    /// Also call `callback` on every node click, after the selection is logged
    pub async fn on_select(&self, callback: SelectCallback) {
        let logged: SelectCallback = Box::new(move |node| {
            log_selection(node);
            callback(node);
        });
        self.state.write().await.renderer.on_select(logged);
    }

    /// Forward a drag gesture to the renderer and advance the layout one tick.
    /// Returns the node's position afterwards, `None` if the gesture was ignored.
    pub async fn drag(&self, uri: &EntityUri, phase: DragPhase, at: Option<Point>) -> Option<Point> {
        let mut state = self.state.write().await;
        let accepted = match (phase, at) {
            (DragPhase::Start, _) => state.renderer.drag_start(uri),
            (DragPhase::Move, Some(at)) => state.renderer.drag_to(uri, at),
            (DragPhase::Move, None) => false,
            (DragPhase::End, _) => state.renderer.drag_end(uri),
        };
        if !accepted {
            return None;
        }
        state.renderer.tick();
        state.renderer.position(uri)
    }

    /// Reveal the next page of the article list
    pub async fn show_more(&self) -> ArticlePage {
        let mut state = self.state.write().await;
        state.revealed = (state.revealed + self.view.page_size).min(state.articles.len());
        Self::page(&state)
    }

    /// The currently revealed articles
    pub async fn visible_articles(&self) -> ArticlePage {
        Self::page(&*self.state.read().await)
    }

    fn page(state: &DashboardState) -> ArticlePage {
        ArticlePage {
            articles: state.articles[..state.revealed].to_vec(),
            total: state.articles.len(),
            has_more: state.revealed < state.articles.len(),
        }
    }

    /// Options for the filter dropdowns; a failed fetch leaves its list empty
    pub async fn filter_options(&self) -> FilterOptions {
        let (sections, authors) = tokio::join!(self.source().sections(), self.source().authors());
        FilterOptions {
            sections: sections.unwrap_or_else(|e| {
                warn!("Loading sections failed: {}", e);
                Vec::new()
            }),
            authors: authors.unwrap_or_else(|e| {
                warn!("Loading authors failed: {}", e);
                Vec::new()
            }),
        }
    }

    pub async fn active_sections(&self) -> Vec<SectionActivity> {
        self.state.read().await.active_sections.clone()
    }

    pub async fn top_authors(&self) -> Vec<RankedAuthor> {
        let state = self.state.read().await;
        state.top_authors
            .iter()
            .map(|a| RankedAuthor {
                activity: a.clone(),
                profile: state.profiles.get(&a.autor).cloned(),
            })
            .collect()
    }

    pub async fn triples(&self) -> Vec<Triple> {
        self.state.read().await.triples.clone()
    }

    /// Graph frame as JSON
    pub async fn graph_json(&self) -> serde_json::Value {
        let state = self.state.read().await;
        serde_json::to_value(state.renderer.payload()).unwrap_or_default()
    }

    pub async fn export(&self, exporter: &RdfExporter, format: RdfFormat) -> ExportResult<String> {
        let state = self.state.read().await;
        exporter.serialize(&state.triples, format)
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read().await;
        DashboardSnapshot {
            articles: state.articles.len(),
            revealed: state.revealed,
            triples: state.triples.len(),
            nodes: state.renderer.view().node_count(),
            edges: state.renderer.view().edge_count(),
            filters: state.filters.clone(),
            selection: state.selection.clone(),
            last_query: state.last_query.clone(),
            last_error: state.last_error.clone(),
        }
    }
}
