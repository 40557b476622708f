//! HTTP server for the dashboard page and its API

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use super::handler::{
    articles_handler, authors_handler, drag_handler, export_handler, filter_options_handler,
    filters_handler, graph_handler, more_articles_handler, search_handler, sections_handler,
    select_handler, status_handler, triples_handler,
};
use crate::config::ServerConfig;
use crate::dashboard::Dashboard;
use crate::rdf::RdfExporter;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "src/http/static/"]
struct Assets;

async fn static_handler() -> Response {
    match Assets::get("index.html") {
        Some(page) => Html(String::from_utf8_lossy(page.data.as_ref()).into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "index.html not embedded").into_response(),
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub exporter: Arc<RdfExporter>,
}

/// HTTP server managing the dashboard API and static assets
pub struct HttpServer {
    state: AppState,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(dashboard: Arc<Dashboard>, exporter: RdfExporter, config: ServerConfig) -> Self {
        Self {
            state: AppState { dashboard, exporter: Arc::new(exporter) },
            config,
        }
    }

    /// All routes, CORS included
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(static_handler))
            .route("/api/status", get(status_handler))
            .route("/api/graph", get(graph_handler))
            .route("/api/triples", get(triples_handler))
            .route("/api/search", post(search_handler))
            .route("/api/filters", get(filter_options_handler).post(filters_handler))
            .route("/api/select", post(select_handler))
            .route("/api/drag", post(drag_handler))
            .route("/api/articles", get(articles_handler))
            .route("/api/articles/more", post(more_articles_handler))
            .route("/api/sections", get(sections_handler))
            .route("/api/authors", get(authors_handler))
            .route("/api/export", get(export_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Dashboard available at http://{}", listener.local_addr()?);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
