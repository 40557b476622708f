//! Record Fetcher for the OJS knowledge REST API
//!
//! The REST API is an external collaborator: it answers SPARQL-backed queries over
//! the exported journal graph. This module only knows its input/output contract.
//!
//! - **`RecordSource`**: the async trait the rest of the crate depends on
//! - **`RestClient`**: the reqwest implementation talking to a running API

pub mod client;
pub mod models;
pub mod remote;

use thiserror::Error;

pub use client::RecordSource;
pub use models::{ArticleDetail, ArticleRecord, AuthorActivity, SectionActivity};
pub use remote::RestClient;

/// Errors raised while talking to the REST API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("{endpoint} returned {status}")]
    Status { endpoint: String, status: u16 },

    /// The body did not match the expected record shape
    #[error("Decode error on {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Client could not be built from the given settings
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
