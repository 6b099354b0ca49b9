//! Network side of My Meta Maps metadata extraction.
//!
//! Parsers in `geo-metadata` only see document text. This crate fetches
//! that text ([`HttpFetcher`]) and drives the parser registry for a user
//! supplied URL ([`MetadataResolver`]).

pub mod config;
pub mod error;
pub mod fetch;
pub mod resolver;

pub use config::FetchConfig;
pub use error::{FetchError, FetchResult, ResolveError};
pub use fetch::{DocumentFetcher, HttpFetcher};
pub use resolver::{MetadataResolver, Resolution};
