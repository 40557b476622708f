use anyhow::Context;
use ojs_knowledge::config::DashboardConfig;
use ojs_knowledge::orcid::{OrcidClient, ProfileLookup};
use ojs_knowledge::{Dashboard, HttpServer, RdfExporter, RecordSource, RestClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional YAML config path as the only argument
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = DashboardConfig::load(path.as_deref())
        .with_context(|| format!("loading configuration from {:?}", path))?;

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level()?)
        .init();

    info!("OJS knowledge dashboard v{}", ojs_knowledge::version());
    info!("REST API at {}", config.api.base_url);

    let source: Arc<dyn RecordSource> = Arc::new(RestClient::from_config(&config.api)?);
    let profiles: Option<Arc<dyn ProfileLookup>> = if config.orcid.enabled {
        Some(Arc::new(OrcidClient::from_config(&config.orcid)?))
    } else {
        None
    };

    let dashboard = Arc::new(Dashboard::new(source, profiles, config.view.clone()));
    if let Err(e) = dashboard.initial_load().await {
        warn!("Starting with an empty graph: {}", e);
    }

    let exporter = RdfExporter::new(&config.export.base_iri);
    let server = HttpServer::new(dashboard, exporter, config.server.clone());
    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("dashboard server failed: {}", e))?;

    Ok(())
}
