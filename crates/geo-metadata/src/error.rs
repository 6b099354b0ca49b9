//! Error types for the metadata layer.
//!
//! Parsing outcomes are reported as booleans by the parsers themselves; these
//! errors cover misuse of the registry.

use thiserror::Error;

/// Result type alias using MetadataError.
pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Unknown parser: {0}")]
    UnknownParser(String),

    #[error("Parser code already registered: {0}")]
    DuplicateParser(String),
}
