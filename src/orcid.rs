//! ORCID author enrichment
//!
//! Display-only: biography and country from the public ORCID record. A failed
//! lookup drops that author's profile and nothing else.

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::{ApiError, ApiResult};
use crate::config::OrcidConfig;

/// Enrichment for one author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl AuthorProfile {
    pub fn is_empty(&self) -> bool {
        self.biography.is_none() && self.country.is_none()
    }

    /// Extract from an ORCID v3 record document
    pub fn from_record(record: &serde_json::Value) -> Self {
        let text = |pointer: &str| {
            record
                .pointer(pointer)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            biography: text("/person/biography/content"),
            country: text("/person/addresses/address/0/country/value")
                .or_else(|| text("/person/addresses/content/0/country/value")),
        }
    }
}

fn orcid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:https?://orcid\.org/)?(\d{4}-\d{4}-\d{4}-\d{3}[\dX])$")
            .expect("static ORCID pattern")
    })
}

/// The bare iD if `author` is an ORCID iD or ORCID URL
pub fn orcid_id(author: &str) -> Option<&str> {
    orcid_pattern()
        .captures(author.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Profile lookup by ORCID iD
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn profile(&self, orcid: &str) -> ApiResult<AuthorProfile>;
}

/// Client for the public ORCID API
pub struct OrcidClient {
    client: Client,
    base_url: String,
}

impl OrcidClient {
    pub fn from_config(config: &OrcidConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProfileLookup for OrcidClient {
    async fn profile(&self, orcid: &str) -> ApiResult<AuthorProfile> {
        let url = format!("{}/{}", self.base_url, orcid);
        let resp = self.client.get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Status {
                endpoint: url,
                status: resp.status().as_u16(),
            });
        }

        let record: serde_json::Value = resp.json().await?;
        Ok(AuthorProfile::from_record(&record))
    }
}

/// Look up every ORCID-shaped author; non-ORCID names and failures are skipped
pub async fn enrich_authors(
    lookup: &dyn ProfileLookup,
    authors: &[String],
) -> IndexMap<String, AuthorProfile> {
    let mut profiles = IndexMap::new();

    for author in authors {
        let Some(id) = orcid_id(author) else {
            debug!("Skipping enrichment for non-ORCID author {}", author);
            continue;
        };
        match lookup.profile(id).await {
            Ok(profile) => {
                profiles.insert(author.clone(), profile);
            }
            Err(e) => warn!("ORCID lookup failed for {}: {}", author, e),
        }
    }

    profiles
}
