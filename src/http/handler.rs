//! HTTP handlers for the dashboard API

use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use super::server::AppState;
use crate::dashboard::{DragPhase, FilterState, SearchOutcome};
use crate::graph::Point;
use crate::rdf::{EntityUri, RdfFormat};
use crate::resolver::{SearchKind, SearchQuery};

/// Either `{"kind": "author", "term": "Ana"}` or `{"query": "autor:Ana"}`
#[derive(Deserialize)]
pub struct SearchRequest {
    pub kind: Option<String>,
    #[serde(default)]
    pub term: String,
    pub query: Option<String>,
}

impl SearchRequest {
    fn into_query(self) -> Result<SearchQuery, String> {
        if let Some(query) = self.query {
            return query.parse().map_err(|e: crate::resolver::QueryParseError| e.to_string());
        }
        let kind: SearchKind = self.kind
            .as_deref()
            .unwrap_or("article")
            .parse()
            .map_err(|e: crate::resolver::QueryParseError| e.to_string())?;
        Ok(SearchQuery::new(kind, self.term))
    }
}

#[derive(Deserialize)]
pub struct SelectRequest {
    pub id: String,
}

#[derive(Deserialize)]
pub struct DragRequest {
    pub id: String,
    pub phase: DragPhase,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn parse_uri(id: &str) -> Result<EntityUri, Response> {
    id.parse()
        .map_err(|e: crate::rdf::UriError| error_response(StatusCode::BAD_REQUEST, e.to_string()))
}

/// Handler for system status
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.dashboard.snapshot().await;
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "dashboard": snapshot,
    }))
}

pub async fn graph_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.graph_json().await)
}

pub async fn triples_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.triples().await)
}

/// Runs a search; a failed fetch answers 502 with the state left as it was
pub async fn search_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Response {
    let query = match payload.into_query() {
        Ok(q) => q,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let outcome = state.dashboard.search(query).await;
    let status = match outcome {
        SearchOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, Json(outcome)).into_response()
}

pub async fn filters_handler(
    State(state): State<AppState>,
    Json(filters): Json<FilterState>,
) -> impl IntoResponse {
    Json(state.dashboard.set_filters(filters).await)
}

pub async fn filter_options_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.filter_options().await)
}

pub async fn select_handler(
    State(state): State<AppState>,
    Json(payload): Json<SelectRequest>,
) -> Response {
    let uri = match parse_uri(&payload.id) {
        Ok(uri) => uri,
        Err(resp) => return resp,
    };
    match state.dashboard.select(&uri).await {
        Some(detail) => Json(detail).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("No node {} in the graph", uri)),
    }
}

pub async fn drag_handler(
    State(state): State<AppState>,
    Json(payload): Json<DragRequest>,
) -> Response {
    let uri = match parse_uri(&payload.id) {
        Ok(uri) => uri,
        Err(resp) => return resp,
    };
    let at = payload.x.zip(payload.y).map(|(x, y)| Point::new(x, y));
    match state.dashboard.drag(&uri, payload.phase, at).await {
        Some(position) => Json(json!({ "id": uri, "x": position.x, "y": position.y })).into_response(),
        None => error_response(StatusCode::CONFLICT, format!("Drag {:?} ignored for {}", payload.phase, uri)),
    }
}

pub async fn articles_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.visible_articles().await)
}

pub async fn more_articles_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.show_more().await)
}

pub async fn sections_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.active_sections().await)
}

pub async fn authors_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.top_authors().await)
}

/// Current triples as Turtle (default) or N-Triples
pub async fn export_handler(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Response {
    let format: RdfFormat = match params.format.as_deref().unwrap_or("turtle").parse() {
        Ok(f) => f,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("{}", e)),
    };

    match state.dashboard.export(&state.exporter, format).await {
        Ok(body) => ([(header::CONTENT_TYPE, format.content_type())], body).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
