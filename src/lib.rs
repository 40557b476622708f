//! OJS Knowledge Graph
//!
//! Turns article records from an OJS knowledge REST API into a triple graph and
//! serves it as an interactive dashboard.
//!
//! # Architecture
//!
//! - **api**: `RecordSource` trait and the reqwest client for the REST API
//! - **rdf**: entity URIs, the record → triple builder, Turtle/N-Triples export
//! - **graph**: node/edge view, force layout, click and drag interaction
//! - **resolver**: typed search query → one fetch, request tokens
//! - **orcid**: optional author enrichment from the public ORCID API
//! - **dashboard**: the state container every update goes through
//! - **http**: axum server for the embedded page and its JSON API
//! - **config**: YAML + environment configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use ojs_knowledge::api::ArticleRecord;
//! use ojs_knowledge::graph::GraphView;
//! use ojs_knowledge::rdf::build_triples;
//!
//! let records = vec![
//!     ArticleRecord::new("Graph search", "Ana García", "10.1/a").with_section("Reviews"),
//!     ArticleRecord::new("Ranking", "Ana García", "10.1/b"),
//! ];
//!
//! let triples = build_triples(&records);
//! let view = GraphView::from_triples(&triples);
//!
//! // two articles, one shared author, one section
//! assert_eq!(view.node_count(), 4);
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod graph;
pub mod http;
pub mod orcid;
pub mod rdf;
pub mod resolver;

pub use api::{ApiError, ApiResult, ArticleRecord, RecordSource, RestClient};
pub use config::{ConfigError, ConfigResult, DashboardConfig};
pub use dashboard::{Dashboard, FilterState, SearchOutcome};
pub use graph::{GraphView, Renderer};
pub use http::HttpServer;
pub use rdf::{build_triples, EntityKind, EntityUri, RdfExporter, RdfFormat, Triple};
pub use resolver::{QueryResolver, SearchKind, SearchQuery};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
