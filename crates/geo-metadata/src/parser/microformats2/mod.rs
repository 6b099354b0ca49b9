//! Parser for Microformats2 (h-geo) embedded in web pages.
//!
//! Code: `mf2`. The bounding box is the envelope of the latitude/longitude
//! pairs of the page's top-level items; `rel` links supply descriptive fields.

mod document;

pub use document::{Mf2Document, Mf2Item, PropertyValue};

use tracing::debug;

use super::{CachedParser, MetadataFormat};
use crate::bbox::Envelope;
use crate::container::BoundingBoxContainer;
use crate::metadata::Metadata;

/// Microformats2 parser with its document cache.
pub type Microformats2Parser = CachedParser<Microformats2>;

/// Microformats2 format definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Microformats2;

impl Microformats2 {
    /// Coordinates in h-geo are always WGS84.
    pub const CRS: &'static str = "EPSG:4326";

    pub fn parser() -> Microformats2Parser {
        CachedParser::new(Microformats2)
    }
}

fn set_copyright(model: &mut Metadata, values: &[String]) {
    if let Some(first) = values.first() {
        model.set_copyright(first.as_str());
    }
}

fn set_keywords(model: &mut Metadata, values: &[String]) {
    model.set_keywords(values.iter().cloned());
}

fn set_abstract(model: &mut Metadata, values: &[String]) {
    if let Some(first) = values.first() {
        model.set_abstract(first.as_str());
    }
}

fn set_license(model: &mut Metadata, values: &[String]) {
    if let Some(first) = values.first() {
        model.set_license(first.as_str());
    }
}

fn set_author(model: &mut Metadata, values: &[String]) {
    if let Some(first) = values.first() {
        model.set_author(first.as_str());
    }
}

type RelationSetter = fn(&mut Metadata, &[String]);

/// Relation keys understood by the filler, by lower-cased name.
const RELATION_SETTERS: &[(&str, RelationSetter)] = &[
    ("copyright", set_copyright),
    ("tag", set_keywords),
    ("contents", set_abstract),
    ("license", set_license),
    ("author", set_author),
];

fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl MetadataFormat for Microformats2 {
    type Document = Mf2Document;

    fn code(&self) -> &'static str {
        "mf2"
    }

    fn name(&self) -> &'static str {
        "microformats2"
    }

    fn extract(&self, source: &str) -> Option<Mf2Document> {
        let document = Mf2Document::parse(source)?;
        if document.items.is_empty() {
            return None;
        }
        Some(document)
    }

    fn fill(&self, document: &Mf2Document, model: &mut Metadata) -> bool {
        let mut envelope = Envelope::new();
        for item in &document.items {
            let (Some(lat), Some(lon)) = (item.first_text("latitude"), item.first_text("longitude"))
            else {
                continue;
            };
            match (parse_coordinate(lat), parse_coordinate(lon)) {
                (Some(lat), Some(lon)) => envelope.expand(lon, lat),
                _ => debug!(latitude = lat, longitude = lon, "Skipping non-numeric h-geo"),
            }
        }

        let Some((west, south, east, north)) = envelope.bounds() else {
            return false;
        };
        model.create_bounding_box(west, south, east, north, Self::CRS);

        for (key, values) in &document.rels {
            let key = key.to_lowercase();
            if let Some((_, setter)) = RELATION_SETTERS.iter().find(|(name, _)| *name == key) {
                setter(model, values);
            }
        }

        true
    }
}
