//! Geodata metadata model and format parsers for My Meta Maps.
//!
//! A [`Metadata`] record describes a geodata resource (bounding boxes per
//! CRS, title, abstract, keywords, rights). Parsers turn a fetched document
//! into such a record; [`ParserRegistry`] holds the built-in ones.

pub mod bbox;
pub mod container;
pub mod crs;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod registry;

pub use bbox::{BoundingBox, Envelope, Reprojector};
pub use container::{BoundingBoxContainer, BoundingBoxSet};
pub use crs::{normalize_crs, AxisOrder, CrsCode, CrsParseError, DEFAULT_CRS};
pub use error::{MetadataError, MetadataResult};
pub use metadata::{Layer, Metadata};
pub use parser::{
    CachedParser, Kml, KmlParser, MetadataFormat, Microformats2, Microformats2Parser, Parser, Wms,
    WmsParser,
};
pub use registry::ParserRegistry;
