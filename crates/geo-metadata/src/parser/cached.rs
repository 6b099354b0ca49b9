//! One-slot document cache shared by all parser variants.

use tracing::debug;

use super::{MetadataFormat, Parser};
use crate::metadata::Metadata;

/// Cached extraction result for one exact source string.
struct CacheSlot<D> {
    source: String,
    /// `None` marks a source that was examined and held no data.
    document: Option<D>,
}

/// Wraps a [`MetadataFormat`] with the detect/parse state machine.
///
/// The format's extraction runs at most once per distinct source; repeated
/// `detect`/`parse` calls with the same source reuse the cached document,
/// including the "no data" outcome.
pub struct CachedParser<F: MetadataFormat> {
    format: F,
    slot: Option<CacheSlot<F::Document>>,
}

impl<F: MetadataFormat> CachedParser<F> {
    pub fn new(format: F) -> Self {
        Self { format, slot: None }
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    /// The cached document for the last source, if it held data.
    pub fn document(&self) -> Option<&F::Document> {
        self.slot.as_ref().and_then(|slot| slot.document.as_ref())
    }

    fn load(&mut self, source: &str) -> Option<&F::Document> {
        let cached = matches!(&self.slot, Some(slot) if slot.source == source);
        if cached {
            debug!(parser = self.format.code(), "Parser cache hit");
        } else {
            let document = if source.trim().is_empty() {
                None
            } else {
                self.format.extract(source)
            };
            debug!(
                parser = self.format.code(),
                bytes = source.len(),
                has_data = document.is_some(),
                "Extracted document"
            );
            self.slot = Some(CacheSlot {
                source: source.to_string(),
                document,
            });
        }
        self.document()
    }
}

impl<F: MetadataFormat + Default> Default for CachedParser<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: MetadataFormat> Parser for CachedParser<F> {
    fn create_object(&self) -> Box<dyn Parser> {
        Box::new(CachedParser::new(self.format.clone()))
    }

    fn code(&self) -> &'static str {
        self.format.code()
    }

    fn name(&self) -> &'static str {
        self.format.name()
    }

    fn detect_by_url(&self, url: &str) -> bool {
        self.format.detect_by_url(url)
    }

    fn detect(&mut self, source: &str) -> bool {
        self.load(source).is_some()
    }

    fn parse(&mut self, source: &str, model: &mut Metadata) -> bool {
        if self.load(source).is_none() {
            return false;
        }
        let Some(document) = self.document() else {
            return false;
        };

        let mut staged = model.clone();
        if self.format.fill(document, &mut staged) {
            *model = staged;
            true
        } else {
            debug!(parser = self.format.code(), "Document held no usable metadata");
            false
        }
    }

    fn metadata_url(&self, url: &str) -> String {
        self.format.metadata_url(url)
    }

    fn service_url(&self, url: &str) -> String {
        self.format.service_url(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::BoundingBoxContainer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Treats the source as "west,south,east,north" and counts extractions.
    #[derive(Clone, Default)]
    struct CountingFormat {
        extractions: Arc<AtomicUsize>,
    }

    impl CountingFormat {
        fn count(&self) -> usize {
            self.extractions.load(Ordering::SeqCst)
        }
    }

    impl MetadataFormat for CountingFormat {
        type Document = Vec<f64>;

        fn code(&self) -> &'static str {
            "count"
        }

        fn name(&self) -> &'static str {
            "counting"
        }

        fn extract(&self, source: &str) -> Option<Vec<f64>> {
            self.extractions.fetch_add(1, Ordering::SeqCst);
            let values: Vec<f64> = source
                .split(',')
                .filter_map(|v| v.trim().parse().ok())
                .collect();
            (!values.is_empty()).then_some(values)
        }

        fn fill(&self, document: &Vec<f64>, model: &mut Metadata) -> bool {
            // Writes before failing so the staging can be observed.
            model.set_title("partial");
            if document.len() != 4 {
                return false;
            }
            model.create_bounding_box(document[0], document[1], document[2], document[3], "");
            true
        }
    }

    #[test]
    fn test_detect_twice_extracts_once() {
        let format = CountingFormat::default();
        let mut parser = CachedParser::new(format.clone());

        assert!(parser.detect("1,2,3,4"));
        assert!(parser.detect("1,2,3,4"));
        assert_eq!(format.count(), 1);

        let mut model = Metadata::new();
        assert!(parser.parse("1,2,3,4", &mut model));
        assert_eq!(format.count(), 1);
    }

    #[test]
    fn test_new_source_invalidates_slot() {
        let format = CountingFormat::default();
        let mut parser = CachedParser::new(format.clone());

        assert!(parser.detect("1,2,3,4"));
        assert!(parser.detect("5,6,7,8"));
        assert!(parser.detect("1,2,3,4"));
        assert_eq!(format.count(), 3);
    }

    #[test]
    fn test_no_data_sentinel_is_cached() {
        let format = CountingFormat::default();
        let mut parser = CachedParser::new(format.clone());

        assert!(!parser.detect("nothing here"));
        assert!(!parser.detect("nothing here"));
        let mut model = Metadata::new();
        assert!(!parser.parse("nothing here", &mut model));
        assert_eq!(format.count(), 1);
        assert!(parser.document().is_none());
    }

    #[test]
    fn test_blank_source_skips_extraction() {
        let format = CountingFormat::default();
        let mut parser = CachedParser::new(format.clone());

        assert!(!parser.detect(""));
        assert!(!parser.detect("  \n\t"));
        assert_eq!(format.count(), 0);
    }

    #[test]
    fn test_failed_fill_leaves_model_untouched() {
        let mut parser = CachedParser::new(CountingFormat::default());
        let mut model = Metadata::new();
        model.set_author("someone");
        let before = model.clone();

        assert!(!parser.parse("1,2,3", &mut model));
        assert_eq!(model, before);

        assert!(parser.parse("1,2,3,4", &mut model));
        assert_eq!(model.title(), Some("partial"));
        assert_eq!(model.author(), Some("someone"));
    }

    #[test]
    fn test_create_object_has_independent_cache() {
        let format = CountingFormat::default();
        let mut original = CachedParser::new(format.clone());
        assert!(original.detect("1,2,3,4"));

        let mut copy = original.create_object();
        assert_eq!(copy.code(), "count");
        assert!(copy.detect("1,2,3,4"));
        assert_eq!(format.count(), 2);
    }
}
