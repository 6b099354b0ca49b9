//! Parser for KML documents.
//!
//! Code: `kml`. The bounding box is the envelope of all coordinates and
//! `LatLonBox` extents in the file.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use super::{split_query, CachedParser, MetadataFormat};
use crate::bbox::Envelope;
use crate::container::BoundingBoxContainer;
use crate::metadata::Metadata;

/// KML parser with its document cache.
pub type KmlParser = CachedParser<Kml>;

/// KML format definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kml;

impl Kml {
    /// KML coordinates are always WGS84 longitude, latitude.
    pub const CRS: &'static str = "EPSG:4326";

    pub fn parser() -> KmlParser {
        CachedParser::new(Kml)
    }
}

#[derive(Debug, Clone, Default)]
pub struct KmlDocument {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub begin: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub envelope: Envelope,
    pub coordinate_count: usize,
}

/// Containers whose `name`/`description` describe the whole file.
const DOCUMENT_ELEMENTS: [&str; 2] = ["Document", "kml"];

#[derive(Debug, Default)]
struct LatLonBox {
    north: Option<f64>,
    south: Option<f64>,
    east: Option<f64>,
    west: Option<f64>,
}

impl KmlDocument {
    /// Parse a KML file. `None` if the XML is malformed or not KML.
    pub fn parse(source: &str) -> Option<Self> {
        let mut reader = Reader::from_str(source);
        reader.trim_text(true);

        let mut doc = KmlDocument::default();
        let mut fallback_name: Option<String> = None;
        let mut fallback_description: Option<String> = None;
        let mut lat_lon_box = LatLonBox::default();
        let mut path: Vec<String> = Vec::new();
        let mut text = String::new();
        let mut seen_root = false;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    debug!(position = reader.buffer_position(), error = %e, "Malformed KML");
                    return None;
                }
            };

            match event {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if path.is_empty() {
                        if name != "kml" {
                            return None;
                        }
                        seen_root = true;
                    }
                    if name == "LatLonBox" || name == "LatLonAltBox" {
                        lat_lon_box = LatLonBox::default();
                    }
                    path.push(name);
                    text.clear();
                }
                Event::Empty(e) => {
                    if path.is_empty() {
                        return (e.local_name().as_ref() == b"kml").then(KmlDocument::default);
                    }
                }
                Event::Text(t) => {
                    if let Ok(value) = t.unescape() {
                        text.push_str(&value);
                    }
                }
                Event::CData(c) => {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
                Event::End(_) => {
                    let value = text.trim();
                    let len = path.len();
                    let element = path.last().map(String::as_str).unwrap_or_default();
                    let parent = if len >= 2 { path[len - 2].as_str() } else { "" };

                    match (parent, element) {
                        (_, "coordinates") => doc.add_coordinates(value),
                        ("author", "name") => {
                            if doc.author.is_none() {
                                doc.author = non_empty(value);
                            }
                        }
                        (parent, "name") => {
                            if DOCUMENT_ELEMENTS.contains(&parent) {
                                doc.name = doc.name.take().or_else(|| non_empty(value));
                            } else if fallback_name.is_none() {
                                fallback_name = non_empty(value);
                            }
                        }
                        (parent, "description") => {
                            if DOCUMENT_ELEMENTS.contains(&parent) {
                                doc.description =
                                    doc.description.take().or_else(|| non_empty(value));
                            } else if fallback_description.is_none() {
                                fallback_description = non_empty(value);
                            }
                        }
                        ("TimeSpan", "begin") => doc.add_time(value),
                        ("TimeSpan", "end") => doc.add_time(value),
                        ("TimeStamp", "when") => doc.add_time(value),
                        ("LatLonBox" | "LatLonAltBox", field) => {
                            let parsed = value.parse::<f64>().ok();
                            match field {
                                "north" => lat_lon_box.north = parsed,
                                "south" => lat_lon_box.south = parsed,
                                "east" => lat_lon_box.east = parsed,
                                "west" => lat_lon_box.west = parsed,
                                _ => {}
                            }
                        }
                        (_, "LatLonBox" | "LatLonAltBox") => {
                            if let (Some(north), Some(south), Some(east), Some(west)) = (
                                lat_lon_box.north,
                                lat_lon_box.south,
                                lat_lon_box.east,
                                lat_lon_box.west,
                            ) {
                                doc.envelope.expand_box(west, south, east, north);
                                doc.coordinate_count += 2;
                            }
                        }
                        _ => {}
                    }
                    path.pop();
                    text.clear();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return None;
        }
        doc.name = doc.name.or(fallback_name);
        doc.description = doc.description.or(fallback_description);
        Some(doc)
    }

    /// Adds whitespace separated `lon,lat[,alt]` tuples.
    fn add_coordinates(&mut self, value: &str) {
        for tuple in value.split_whitespace() {
            let mut parts = tuple.split(',').map(|p| p.trim().parse::<f64>());
            match (parts.next(), parts.next()) {
                (Some(Ok(lon)), Some(Ok(lat))) if lon.is_finite() && lat.is_finite() => {
                    self.envelope.expand(lon, lat);
                    self.coordinate_count += 1;
                }
                _ => debug!(tuple, "Skipping malformed KML coordinate"),
            }
        }
    }

    /// Widens the begin/end range by one timestamp.
    fn add_time(&mut self, value: &str) {
        let Some(time) = parse_kml_time(value) else {
            debug!(value, "Skipping unparseable KML time");
            return;
        };
        self.begin = Some(self.begin.map_or(time, |begin| begin.min(time)));
        self.end = Some(self.end.map_or(time, |end| end.max(time)));
    }
}

/// Parses the `dateTime`, `date`, `gYearMonth` and `gYear` forms KML allows.
fn parse_kml_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time.with_timezone(&Utc));
    }
    if let Ok(time) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&time));
    }
    let mut parts = value.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(1);
    let day = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(1);
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl MetadataFormat for Kml {
    type Document = KmlDocument;

    fn code(&self) -> &'static str {
        "kml"
    }

    fn name(&self) -> &'static str {
        "KML"
    }

    fn detect_by_url(&self, url: &str) -> bool {
        let (base, _) = split_query(url.trim());
        base.to_lowercase().ends_with(".kml")
    }

    fn extract(&self, source: &str) -> Option<KmlDocument> {
        KmlDocument::parse(source)
    }

    fn fill(&self, doc: &KmlDocument, model: &mut Metadata) -> bool {
        let Some((west, south, east, north)) = doc.envelope.bounds() else {
            return false;
        };
        model.create_bounding_box(west, south, east, north, Self::CRS);

        if let Some(name) = &doc.name {
            model.set_title(name.as_str());
        }
        if let Some(description) = &doc.description {
            model.set_abstract(description.as_str());
        }
        if let Some(author) = &doc.author {
            model.set_author(author.as_str());
        }
        if let Some(begin) = doc.begin {
            model.set_begin_time(begin);
        }
        if let Some(end) = doc.end {
            model.set_end_time(end);
        }
        true
    }
}
