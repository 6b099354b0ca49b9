//! Error types for fetching and resolving.

use geo_metadata::MetadataError;
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} exceeds the body limit of {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("No parser could read metadata for {url}")]
    NoParser { url: String },

    #[error("Could not fetch metadata for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}
