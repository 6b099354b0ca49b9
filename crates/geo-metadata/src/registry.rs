//! Ordered collection of parser prototypes.
//!
//! The registry never parses with its prototypes directly: callers obtain
//! fresh instances via [`ParserRegistry::create`] or
//! [`Parser::create_object`], so one registry can serve many requests.

use tracing::debug;

use crate::error::{MetadataError, MetadataResult};
use crate::metadata::Metadata;
use crate::parser::{Kml, Microformats2, Parser, Wms};

pub struct ParserRegistry {
    parsers: Vec<Box<dyn Parser>>,
}

impl ParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// All built-in parsers. Formats with strict document roots come first;
    /// Microformats2 accepts any HTML page and goes last.
    pub fn with_defaults() -> Self {
        Self {
            parsers: vec![
                Box::new(Wms::parser()),
                Box::new(Kml::parser()),
                Box::new(Microformats2::parser()),
            ],
        }
    }

    /// Appends a parser. Codes must be unique.
    pub fn register(&mut self, parser: Box<dyn Parser>) -> MetadataResult<()> {
        if self.get(parser.code()).is_some() {
            return Err(MetadataError::DuplicateParser(parser.code().to_string()));
        }
        self.parsers.push(parser);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.code()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Parser> {
        self.parsers.iter().map(|p| p.as_ref())
    }

    pub fn get(&self, code: &str) -> Option<&dyn Parser> {
        self.iter().find(|p| p.code() == code)
    }

    /// A fresh instance of the parser registered under `code`.
    pub fn create(&self, code: &str) -> MetadataResult<Box<dyn Parser>> {
        self.get(code)
            .map(|p| p.create_object())
            .ok_or_else(|| MetadataError::UnknownParser(code.to_string()))
    }

    /// Prototypes in trial order for `url`: those whose URL heuristic
    /// matches first, then the rest, each group in registration order.
    pub fn candidates(&self, url: &str) -> Vec<&dyn Parser> {
        let (mut matching, rest): (Vec<&dyn Parser>, Vec<&dyn Parser>) =
            self.iter().partition(|p| p.detect_by_url(url));
        debug!(
            url,
            matching = matching.len(),
            total = self.parsers.len(),
            "Ordered parser candidates"
        );
        matching.extend(rest);
        matching
    }

    /// Tries every candidate on an already fetched `source`.
    ///
    /// Returns the code of the parser that filled `model`, or `None` if no
    /// parser could use the source (the model is then unchanged).
    pub fn parse_source(
        &self,
        url: &str,
        source: &str,
        model: &mut Metadata,
    ) -> Option<&'static str> {
        for prototype in self.candidates(url) {
            let mut parser = prototype.create_object();
            if !parser.detect(source) {
                continue;
            }
            if parser.parse(source, model) {
                debug!(parser = parser.code(), "Parsed source");
                return Some(parser.code());
            }
        }
        None
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::BoundingBoxContainer;

    #[test]
    fn test_default_codes() {
        let registry = ParserRegistry::with_defaults();
        assert_eq!(registry.codes(), vec!["wms", "kml", "mf2"]);
        assert_eq!(registry.get("mf2").unwrap().name(), "microformats2");
    }

    #[test]
    fn test_register_rejects_duplicate_code() {
        let mut registry = ParserRegistry::with_defaults();
        let err = registry
            .register(Box::new(Microformats2::parser()))
            .unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateParser(code) if code == "mf2"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_create_unknown_parser() {
        let registry = ParserRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.create("wms"),
            Err(MetadataError::UnknownParser(_))
        ));
    }

    #[test]
    fn test_candidates_prefer_url_matches() {
        let registry = ParserRegistry::with_defaults();
        let codes: Vec<_> = registry
            .candidates("https://example.org/trails.kml")
            .iter()
            .map(|p| p.code())
            .collect();
        assert_eq!(codes, vec!["kml", "wms", "mf2"]);
    }

    #[test]
    fn test_parse_source_picks_matching_format() {
        let registry = ParserRegistry::with_defaults();
        let html = r#"<div class="h-geo"><span class="p-latitude">48.1</span><span class="p-longitude">11.5</span></div>"#;
        let mut model = Metadata::new();
        assert_eq!(
            registry.parse_source("https://example.org/", html, &mut model),
            Some("mf2")
        );
        assert!(model.has_bounding_box(None));

        let mut untouched = Metadata::new();
        assert_eq!(
            registry.parse_source("https://example.org/", "<p>nothing</p>", &mut untouched),
            None
        );
        assert_eq!(untouched, Metadata::new());
    }
}
