//! Resolving a user supplied URL to metadata.
//!
//! Every registry candidate names the document it needs through
//! `metadata_url`. Candidates sharing a metadata URL share one download.

use std::collections::HashMap;

use geo_metadata::{Metadata, Parser, ParserRegistry};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{FetchError, ResolveError};
use crate::fetch::DocumentFetcher;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Code of the parser that produced the metadata
    pub parser: &'static str,
    pub service_url: String,
    pub metadata_url: String,
    pub metadata: Metadata,
}

pub struct MetadataResolver<F> {
    registry: ParserRegistry,
    fetcher: F,
}

impl<F: DocumentFetcher> MetadataResolver<F> {
    pub fn new(registry: ParserRegistry, fetcher: F) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Try every registered parser on `url`, URL matches first.
    ///
    /// Fails with [`ResolveError::Fetch`] only if no document could be
    /// downloaded at all.
    #[instrument(skip(self))]
    pub async fn resolve(&self, url: &str) -> Result<Resolution, ResolveError> {
        let url = url.trim();
        let mut bodies: HashMap<String, Option<String>> = HashMap::new();
        let mut last_error: Option<FetchError> = None;
        let mut fetched_any = false;

        for prototype in self.registry.candidates(url) {
            let mut parser = prototype.create_object();
            let metadata_url = parser.metadata_url(url);

            if !bodies.contains_key(&metadata_url) {
                let body = match self.fetcher.fetch(&metadata_url).await {
                    Ok(body) => Some(body),
                    Err(e) => {
                        warn!(parser = parser.code(), error = %e, "Fetching metadata failed");
                        last_error = Some(e);
                        None
                    }
                };
                bodies.insert(metadata_url.clone(), body);
            }

            let Some(source) = bodies.get(&metadata_url).and_then(|b| b.as_deref()) else {
                continue;
            };
            fetched_any = true;

            if let Some(resolution) = run_parser(parser.as_mut(), url, &metadata_url, source) {
                info!(parser = resolution.parser, "Resolved metadata");
                return Ok(resolution);
            }
        }

        match last_error {
            Some(source) if !fetched_any => Err(ResolveError::Fetch {
                url: url.to_string(),
                source,
            }),
            _ => Err(ResolveError::NoParser {
                url: url.to_string(),
            }),
        }
    }

    /// Resolve `url` with the parser registered as `code` only.
    #[instrument(skip(self))]
    pub async fn resolve_with(&self, code: &str, url: &str) -> Result<Resolution, ResolveError> {
        let url = url.trim();
        let mut parser = self.registry.create(code)?;
        let metadata_url = parser.metadata_url(url);

        let source = self
            .fetcher
            .fetch(&metadata_url)
            .await
            .map_err(|source| ResolveError::Fetch {
                url: url.to_string(),
                source,
            })?;

        run_parser(parser.as_mut(), url, &metadata_url, &source).ok_or_else(|| {
            ResolveError::NoParser {
                url: url.to_string(),
            }
        })
    }
}

fn run_parser(
    parser: &mut dyn Parser,
    url: &str,
    metadata_url: &str,
    source: &str,
) -> Option<Resolution> {
    if !parser.detect(source) {
        debug!(parser = parser.code(), "Source not recognized");
        return None;
    }

    let mut metadata = Metadata::new();
    if !parser.parse(source, &mut metadata) {
        debug!(parser = parser.code(), "Source recognized but holds no usable metadata");
        return None;
    }

    Some(Resolution {
        parser: parser.code(),
        service_url: parser.service_url(url),
        metadata_url: metadata_url.to_string(),
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use geo_metadata::BoundingBoxContainer;
    use test_utils::{documents, urls};

    use crate::error::FetchResult;

    /// Serves fixed documents and records every requested URL.
    #[derive(Default)]
    struct MemoryFetcher {
        documents: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MemoryFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.documents.insert(url.to_string(), body.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentFetcher for MemoryFetcher {
        async fn fetch(&self, url: &str) -> FetchResult<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn resolver(fetcher: MemoryFetcher) -> MetadataResolver<MemoryFetcher> {
        MetadataResolver::new(ParserRegistry::with_defaults(), fetcher)
    }

    #[tokio::test]
    async fn test_resolve_wms_from_getmap_url() {
        let fetcher =
            MemoryFetcher::default().with(urls::WMS_CAPABILITIES, documents::WMS_130_CAPABILITIES);
        let resolver = resolver(fetcher);

        let resolution = resolver.resolve(urls::WMS_GETMAP).await.unwrap();
        assert_eq!(resolution.parser, "wms");
        assert_eq!(resolution.service_url, urls::WMS_SERVICE);
        assert_eq!(resolution.metadata_url, urls::WMS_CAPABILITIES);
        assert_eq!(resolution.metadata.title(), Some("Bavarian Trails"));
        assert_eq!(resolver.fetcher.requests(), vec![urls::WMS_CAPABILITIES]);
    }

    #[tokio::test]
    async fn test_shared_metadata_url_is_fetched_once() {
        let fetcher = MemoryFetcher::default().with(urls::BLOG_POST, documents::MF2_BLOG_POST);
        let resolver = resolver(fetcher);

        let resolution = resolver.resolve(urls::BLOG_POST).await.unwrap();
        assert_eq!(resolution.parser, "mf2");
        assert!(resolution.metadata.has_bounding_box(None));

        // wms asks for the capabilities URL; kml and mf2 share the page itself
        let requests = resolver.fetcher.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], urls::BLOG_POST);
    }

    #[tokio::test]
    async fn test_no_parser_matches() {
        let fetcher = MemoryFetcher::default().with(urls::BLOG_POST, documents::PLAIN_HTML);
        let err = resolver(fetcher).resolve(urls::BLOG_POST).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoParser { .. }));
    }

    #[tokio::test]
    async fn test_all_fetches_failed() {
        let err = resolver(MemoryFetcher::default())
            .resolve(urls::KML_FILE)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Fetch {
                source: FetchError::Status { status: 404, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_resolve_with_forced_parser() {
        let fetcher = MemoryFetcher::default().with(urls::KML_FILE, documents::KML_DOCUMENT);
        let resolver = resolver(fetcher);

        let resolution = resolver.resolve_with("kml", urls::KML_FILE).await.unwrap();
        assert_eq!(resolution.metadata.title(), Some("Alpine Trails"));

        let err = resolver.resolve_with("mf2", urls::KML_FILE).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoParser { .. }));

        let err = resolver.resolve_with("gml", urls::KML_FILE).await.unwrap_err();
        assert!(matches!(err, ResolveError::Metadata(_)));
    }

    #[tokio::test]
    async fn test_resolution_serializes() {
        let fetcher = MemoryFetcher::default().with(urls::BLOG_POST, documents::MF2_JSON);
        let resolution = resolver(fetcher).resolve(urls::BLOG_POST).await.unwrap();

        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["parser"], "mf2");
        assert_eq!(json["metadata"]["bounding_boxes"][0]["crs"], "EPSG:4326");
    }
}
