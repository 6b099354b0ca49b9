//! Parser contract shared by every supported metadata format.
//!
//! A format implements [`MetadataFormat`] (extraction + model filling) and is
//! wrapped in [`CachedParser`], which provides the [`Parser`] operations and
//! the one-slot document cache.

mod cached;
pub mod kml;
pub mod microformats2;
pub mod wms;

pub use cached::CachedParser;
pub use kml::{Kml, KmlParser};
pub use microformats2::{Microformats2, Microformats2Parser};
pub use wms::{Wms, WmsParser};

use crate::metadata::Metadata;

/// Operations every parser variant offers to a dispatcher.
///
/// Instances keep per-document state and must not be shared between
/// concurrent callers; use [`Parser::create_object`] to get another one.
pub trait Parser: Send + Sync {
    /// A fresh instance of the same variant with an empty cache.
    fn create_object(&self) -> Box<dyn Parser>;

    /// Machine-readable identifier, unique across registered parsers.
    fn code(&self) -> &'static str;

    /// Display name.
    fn name(&self) -> &'static str;

    /// Network-free guess whether `url` serves this format.
    fn detect_by_url(&self, url: &str) -> bool;

    /// Whether `source` contains usable data of this format.
    fn detect(&mut self, source: &str) -> bool;

    /// Fill `model` from `source`. On `false` the model is left untouched.
    fn parse(&mut self, source: &str, model: &mut Metadata) -> bool;

    /// URL serving the machine-readable metadata for a user supplied URL.
    fn metadata_url(&self, url: &str) -> String;

    /// Base URL of the service for a user supplied URL.
    fn service_url(&self, url: &str) -> String;
}

/// Format-specific half of a parser.
pub trait MetadataFormat: Clone + Send + Sync + 'static {
    /// Parsed representation cached per source.
    type Document: Send + Sync + 'static;

    fn code(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn detect_by_url(&self, _url: &str) -> bool {
        false
    }

    fn metadata_url(&self, url: &str) -> String {
        url.to_string()
    }

    fn service_url(&self, url: &str) -> String {
        url.to_string()
    }

    /// Build the representation, `None` if the source holds no usable data.
    fn extract(&self, source: &str) -> Option<Self::Document>;

    /// Copy the representation into `model`.
    ///
    /// Implementations may write partially before returning `false`; the
    /// cached parser discards such writes.
    fn fill(&self, document: &Self::Document, model: &mut Metadata) -> bool;
}

/// Splits a URL into the part before the query and the query string.
///
/// The fragment is dropped.
pub(crate) fn split_query(url: &str) -> (&str, Option<&str>) {
    let url = url.split('#').next().unwrap_or(url);
    match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_query() {
        assert_eq!(split_query("http://a/b"), ("http://a/b", None));
        assert_eq!(
            split_query("http://a/b?x=1#top"),
            ("http://a/b", Some("x=1"))
        );
        assert_eq!(split_query(""), ("", None));
    }
}
