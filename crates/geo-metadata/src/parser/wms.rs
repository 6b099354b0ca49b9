//! Parser for OGC WMS GetCapabilities documents.
//!
//! Code: `wms`. Supports WMS 1.1.x (`WMT_MS_Capabilities`) and 1.3.0
//! (`WMS_Capabilities`).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::{split_query, CachedParser, MetadataFormat};
use crate::bbox::Envelope;
use crate::container::BoundingBoxContainer;
use crate::crs::{AxisOrder, CrsCode, DEFAULT_CRS};
use crate::metadata::Metadata;

/// WMS parser with its document cache.
pub type WmsParser = CachedParser<Wms>;

/// Query parameters describing a request rather than the service.
const REQUEST_PARAMS: [&str; 3] = ["service", "request", "version"];

/// WMS format definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wms;

impl Wms {
    pub fn parser() -> WmsParser {
        CachedParser::new(Wms)
    }
}

/// Extent as written in a `BoundingBox` element, before axis handling.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsExtent {
    pub crs: String,
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmsLayer {
    /// Nesting level, 1 for the root layer.
    pub depth: usize,
    pub name: Option<String>,
    pub title: Option<String>,
    /// `(west, south, east, north)` in WGS84.
    pub geographic: Option<(f64, f64, f64, f64)>,
    pub extents: Vec<CrsExtent>,
}

/// The parts of a capabilities document the metadata model uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmsCapabilities {
    pub version: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    pub contact_person: Option<String>,
    pub contact_organization: Option<String>,
    pub access_constraints: Option<String>,
    pub fees: Option<String>,
    /// Layers in document order.
    pub layers: Vec<WmsLayer>,
}

impl WmsCapabilities {
    /// Parse a capabilities document. `None` if the XML is malformed or the
    /// root element is not a WMS capabilities element.
    pub fn parse(source: &str) -> Option<Self> {
        let mut reader = Reader::from_str(source);
        reader.trim_text(true);

        let mut caps = WmsCapabilities::default();
        let mut path: Vec<String> = Vec::new();
        let mut open_layers: Vec<usize> = Vec::new();
        let mut geo_box = GeoBoxBuilder::default();
        let mut text = String::new();
        let mut seen_root = false;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    debug!(
                        position = reader.buffer_position(),
                        error = %e,
                        "Malformed capabilities XML"
                    );
                    return None;
                }
            };

            match event {
                Event::Start(e) => {
                    let name = local_name(&e);
                    if path.is_empty() {
                        if name != "WMS_Capabilities" && name != "WMT_MS_Capabilities" {
                            return None;
                        }
                        caps.version = attribute(&e, "version").unwrap_or_default();
                        seen_root = true;
                    }
                    match name.as_str() {
                        "Layer" => {
                            caps.layers.push(WmsLayer {
                                depth: open_layers.len() + 1,
                                ..Default::default()
                            });
                            open_layers.push(caps.layers.len() - 1);
                        }
                        "EX_GeographicBoundingBox" => geo_box = GeoBoxBuilder::default(),
                        _ => caps.handle_extent_element(&name, &e, open_layers.last().copied()),
                    }
                    path.push(name);
                    text.clear();
                }
                Event::Empty(e) => {
                    if path.is_empty() {
                        return None;
                    }
                    let name = local_name(&e);
                    caps.handle_extent_element(&name, &e, open_layers.last().copied());
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
                    let current_layer = open_layers.last().copied();
                    match path_tail(&path).as_slice() {
                        [.., "Service", "Title"] => caps.title = non_empty(value),
                        [.., "Service", "Abstract"] => caps.abstract_text = non_empty(value),
                        [.., "Service", "KeywordList", "Keyword"] if !value.is_empty() => {
                            caps.keywords.push(value.to_string())
                        }
                        [.., "ContactPersonPrimary", "ContactPerson"] => {
                            caps.contact_person = non_empty(value)
                        }
                        [.., "ContactPersonPrimary", "ContactOrganization"] => {
                            caps.contact_organization = non_empty(value)
                        }
                        [.., "Service", "AccessConstraints"] => {
                            caps.access_constraints = non_empty(value)
                        }
                        [.., "Service", "Fees"] => caps.fees = non_empty(value),
                        [.., "Layer", "Name"] => {
                            if let Some(index) = current_layer {
                                caps.layers[index].name = non_empty(value);
                            }
                        }
                        [.., "Layer", "Title"] => {
                            if let Some(index) = current_layer {
                                caps.layers[index].title = non_empty(value);
                            }
                        }
                        [.., "EX_GeographicBoundingBox", field] => geo_box.set(field, value),
                        [.., "EX_GeographicBoundingBox"] => {
                            if let (Some(index), Some(bounds)) = (current_layer, geo_box.build()) {
                                caps.layers[index].geographic = Some(bounds);
                            }
                        }
                        [.., "Layer"] => {
                            open_layers.pop();
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

        seen_root.then_some(caps)
    }

    /// `LatLonBoundingBox` (1.1.x) and `BoundingBox` elements.
    fn handle_extent_element(&mut self, name: &str, e: &BytesStart<'_>, layer: Option<usize>) {
        let Some(index) = layer else {
            return;
        };
        match name {
            "LatLonBoundingBox" => {
                if let Some(extent) = read_extent(e, DEFAULT_CRS) {
                    self.layers[index].geographic =
                        Some((extent.minx, extent.miny, extent.maxx, extent.maxy));
                }
            }
            "BoundingBox" => {
                let crs = attribute(e, "CRS").or_else(|| attribute(e, "SRS"));
                if let Some(extent) = crs.and_then(|crs| read_extent(e, &crs)) {
                    self.layers[index].extents.push(extent);
                }
            }
            _ => {}
        }
    }

    fn is_1_3(&self) -> bool {
        self.version.starts_with("1.3")
    }

    /// Convert an extent to `(west, south, east, north, crs)` in x, y order.
    fn normalize_extent(&self, extent: &CrsExtent) -> (f64, f64, f64, f64, String) {
        match CrsCode::from_identifier(&extent.crs) {
            Ok(code) => {
                let order = if self.is_1_3() {
                    code.axis_order_wms_1_3()
                } else {
                    code.axis_order_wms_1_1()
                };
                let crs = code.storage_identifier().to_string();
                match order {
                    AxisOrder::LatLon => (extent.miny, extent.minx, extent.maxy, extent.maxx, crs),
                    AxisOrder::XY => (extent.minx, extent.miny, extent.maxx, extent.maxy, crs),
                }
            }
            Err(_) => (
                extent.minx,
                extent.miny,
                extent.maxx,
                extent.maxy,
                extent.crs.clone(),
            ),
        }
    }

    fn fill_layer_boxes<C: BoundingBoxContainer>(&self, layer: &WmsLayer, target: &mut C) {
        if let Some((west, south, east, north)) = layer.geographic {
            target.create_bounding_box(west, south, east, north, DEFAULT_CRS);
        }
        for extent in &layer.extents {
            let (west, south, east, north, crs) = self.normalize_extent(extent);
            if !target.has_bounding_box(Some(&crs)) {
                target.create_bounding_box(west, south, east, north, &crs);
            }
        }
    }
}

#[derive(Debug, Default)]
struct GeoBoxBuilder {
    west: Option<f64>,
    east: Option<f64>,
    south: Option<f64>,
    north: Option<f64>,
}

impl GeoBoxBuilder {
    fn set(&mut self, field: &str, value: &str) {
        let parsed = value.parse::<f64>().ok();
        match field {
            "westBoundLongitude" => self.west = parsed,
            "eastBoundLongitude" => self.east = parsed,
            "southBoundLatitude" => self.south = parsed,
            "northBoundLatitude" => self.north = parsed,
            _ => {}
        }
    }

    fn build(&self) -> Option<(f64, f64, f64, f64)> {
        Some((self.west?, self.south?, self.east?, self.north?))
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

pub(crate) fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .filter_map(Result::ok)
        .find(|a| a.key.local_name().as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.trim().to_string()))
}

fn read_extent(e: &BytesStart<'_>, crs: &str) -> Option<CrsExtent> {
    let number = |key: &str| attribute(e, key).and_then(|v| v.parse::<f64>().ok());
    Some(CrsExtent {
        crs: crs.to_string(),
        minx: number("minx")?,
        miny: number("miny")?,
        maxx: number("maxx")?,
        maxy: number("maxy")?,
    })
}

fn path_tail(path: &[String]) -> Vec<&str> {
    let start = path.len().saturating_sub(3);
    path[start..].iter().map(String::as_str).collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn is_none_marker(value: &str) -> bool {
    value.eq_ignore_ascii_case("none")
}

impl MetadataFormat for Wms {
    type Document = WmsCapabilities;

    fn code(&self) -> &'static str {
        "wms"
    }

    fn name(&self) -> &'static str {
        "OGC WMS"
    }

    fn detect_by_url(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        let (base, query) = split_query(&lower);
        let by_query = query
            .map(|q| q.split('&').any(|param| param.trim() == "service=wms"))
            .unwrap_or(false);
        let path = base.split_once("://").map(|(_, rest)| rest).unwrap_or(base);
        by_query || path.split('/').any(|segment| segment.contains("wms"))
    }

    fn service_url(&self, url: &str) -> String {
        let (base, query) = split_query(url.trim());
        let kept: Vec<&str> = query
            .unwrap_or_default()
            .split('&')
            .filter(|param| !param.is_empty())
            .filter(|param| {
                let key = param.split('=').next().unwrap_or_default().to_lowercase();
                !REQUEST_PARAMS.contains(&key.as_str())
            })
            .collect();
        if kept.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, kept.join("&"))
        }
    }

    fn metadata_url(&self, url: &str) -> String {
        let service = self.service_url(url);
        let separator = if service.contains('?') { '&' } else { '?' };
        format!("{}{}SERVICE=WMS&REQUEST=GetCapabilities", service, separator)
    }

    fn extract(&self, source: &str) -> Option<WmsCapabilities> {
        let caps = WmsCapabilities::parse(source)?;
        debug!(
            version = %caps.version,
            layers = caps.layers.len(),
            "Parsed WMS capabilities"
        );
        Some(caps)
    }

    fn fill(&self, caps: &WmsCapabilities, model: &mut Metadata) -> bool {
        let mut envelope = Envelope::new();
        for layer in &caps.layers {
            if let Some((west, south, east, north)) = layer.geographic {
                envelope.expand_box(west, south, east, north);
            }
        }
        if let Some((west, south, east, north)) = envelope.bounds() {
            model.create_bounding_box(west, south, east, north, DEFAULT_CRS);
        }
        for layer in caps.layers.iter().filter(|l| l.depth == 1) {
            for extent in &layer.extents {
                let (west, south, east, north, crs) = caps.normalize_extent(extent);
                if !model.has_bounding_box(Some(&crs)) {
                    model.create_bounding_box(west, south, east, north, &crs);
                }
            }
        }
        if !model.has_bounding_box(None) {
            return false;
        }

        if let Some(title) = &caps.title {
            model.set_title(title.as_str());
        }
        if let Some(text) = &caps.abstract_text {
            model.set_abstract(text.as_str());
        }
        if !caps.keywords.is_empty() {
            model.set_keywords(caps.keywords.iter().cloned());
        }
        if let Some(author) = caps
            .contact_person
            .as_ref()
            .or(caps.contact_organization.as_ref())
        {
            model.set_author(author.as_str());
        }
        if let Some(license) = caps.access_constraints.as_deref().filter(|v| !is_none_marker(v)) {
            model.set_license(license);
        }
        if let Some(fees) = caps.fees.as_deref().filter(|v| !is_none_marker(v)) {
            model.set_copyright(fees);
        }

        for layer in &caps.layers {
            let Some(name) = &layer.name else {
                continue;
            };
            let target = model.add_layer(name.as_str(), layer.title.clone());
            caps.fill_layer_boxes(layer, target);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use test_utils::crs;

    const WMS_130: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms">
  <Service>
    <Name>WMS</Name>
    <Title>Bavarian Trails</Title>
    <Abstract>Hiking &amp; biking trails</Abstract>
    <KeywordList><Keyword>trails</Keyword><Keyword>bavaria</Keyword></KeywordList>
    <ContactInformation>
      <ContactPersonPrimary>
        <ContactPerson>Jane Doe</ContactPerson>
        <ContactOrganization>Trail Office</ContactOrganization>
      </ContactPersonPrimary>
    </ContactInformation>
    <Fees>none</Fees>
    <AccessConstraints>CC-BY 4.0</AccessConstraints>
  </Service>
  <Capability>
    <Layer>
      <Title>Root</Title>
      <CRS>EPSG:4326</CRS>
      <EX_GeographicBoundingBox>
        <westBoundLongitude>10.0</westBoundLongitude>
        <eastBoundLongitude>13.5</eastBoundLongitude>
        <southBoundLatitude>47.3</southBoundLatitude>
        <northBoundLatitude>50.5</northBoundLatitude>
      </EX_GeographicBoundingBox>
      <BoundingBox CRS="EPSG:4326" minx="47.3" miny="10.0" maxx="50.5" maxy="13.5"/>
      <BoundingBox CRS="EPSG:25832" minx="500000" miny="5200000" maxx="760000" maxy="5600000"/>
      <Layer queryable="1">
        <Name>trails</Name>
        <Title>Trails</Title>
        <EX_GeographicBoundingBox>
          <westBoundLongitude>11.0</westBoundLongitude>
          <eastBoundLongitude>12.0</eastBoundLongitude>
          <southBoundLatitude>48.0</southBoundLatitude>
          <northBoundLatitude>49.0</northBoundLatitude>
        </EX_GeographicBoundingBox>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

    #[test]
    fn test_parse_wms_130() {
        let mut parser = Wms::parser();
        let mut model = Metadata::new();
        assert!(parser.parse(WMS_130, &mut model));

        assert_eq!(
            model.bounding_box(Some("EPSG:4326")).unwrap().to_tuple(),
            (10.0, 47.3, 13.5, 50.5)
        );
        assert_eq!(
            model.bounding_box(Some("EPSG:25832")).unwrap().to_tuple(),
            (500000.0, 5200000.0, 760000.0, 5600000.0)
        );
        assert_eq!(model.title(), Some("Bavarian Trails"));
        assert_eq!(model.abstract_text(), Some("Hiking & biking trails"));
        assert_eq!(model.keywords(), &["trails".to_string(), "bavaria".to_string()]);
        assert_eq!(model.author(), Some("Jane Doe"));
        assert_eq!(model.license(), Some("CC-BY 4.0"));
        assert!(model.copyright().is_none());

        assert_eq!(model.layers().len(), 1);
        let layer = model.layer("trails").unwrap();
        assert_eq!(layer.title.as_deref(), Some("Trails"));
        assert_eq!(
            layer.bounding_box(None).unwrap().to_tuple(),
            (11.0, 48.0, 12.0, 49.0)
        );
    }

    #[test]
    fn test_wms_130_swaps_geographic_axes() {
        let xml = r#"<WMS_Capabilities version="1.3.0"><Capability><Layer>
            <BoundingBox CRS="EPSG:4326" minx="47.0" miny="10.0" maxx="48.0" maxy="11.0"/>
            <BoundingBox CRS="CRS:84" minx="10.0" miny="47.0" maxx="11.0" maxy="48.0"/>
            </Layer></Capability></WMS_Capabilities>"#;
        let mut model = Metadata::new();
        assert!(Wms::parser().parse(xml, &mut model));
        assert_eq!(model.coordinate_reference_systems(), vec![crs::EPSG_4326]);
        assert_eq!(
            model.bounding_box(None).unwrap().to_tuple(),
            (10.0, 47.0, 11.0, 48.0)
        );
    }

    #[test]
    fn test_crs84_only_extent_is_stored_as_wgs84() {
        let xml = format!(
            r#"<WMS_Capabilities version="1.3.0"><Capability><Layer>
            <BoundingBox CRS="{}" minx="10.0" miny="47.0" maxx="11.0" maxy="48.0"/>
            </Layer></Capability></WMS_Capabilities>"#,
            crs::CRS_84
        );
        let mut model = Metadata::new();
        assert!(Wms::parser().parse(&xml, &mut model));
        assert!(!model.has_bounding_box(Some(crs::CRS_84)));
        assert_eq!(
            model.bounding_box(Some(crs::EPSG_4326)).unwrap().to_tuple(),
            (10.0, 47.0, 11.0, 48.0)
        );
    }

    #[test]
    fn test_parse_wms_111() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE WMT_MS_Capabilities SYSTEM "http://schemas.opengis.net/wms/1.1.1/capabilities_1_1_1.dtd">
<WMT_MS_Capabilities version="1.1.1">
  <Service><Name>OGC:WMS</Name><Title>Legacy</Title></Service>
  <Capability><Layer>
    <LatLonBoundingBox minx="-10" miny="35" maxx="30" maxy="60"/>
    <BoundingBox SRS="EPSG:4326" minx="-10" miny="35" maxx="30" maxy="60"/>
    <BoundingBox SRS="EPSG:3857" minx="-1113194" miny="4163881" maxx="3339584" maxy="8399737"/>
  </Layer></Capability>
</WMT_MS_Capabilities>"#;
        let mut model = Metadata::new();
        assert!(Wms::parser().parse(xml, &mut model));
        assert_eq!(
            model.bounding_box(None).unwrap().to_tuple(),
            (-10.0, 35.0, 30.0, 60.0)
        );
        assert!(model.has_bounding_box(Some("EPSG:3857")));
        assert_eq!(model.title(), Some("Legacy"));
    }

    #[test]
    fn test_rejects_other_documents() {
        let mut parser = Wms::parser();
        assert!(!parser.detect("<kml><Document/></kml>"));
        assert!(!parser.detect("<html><body>not xml"));
        assert!(!parser.detect("<WMS_Capabilities><Layer></Service></WMS_Capabilities>"));
    }

    #[test]
    fn test_capabilities_without_extent_fail() {
        let xml = r#"<WMS_Capabilities version="1.3.0"><Service><Title>Empty</Title></Service></WMS_Capabilities>"#;
        let mut parser = Wms::parser();
        assert!(parser.detect(xml));
        let mut model = Metadata::new();
        assert!(!parser.parse(xml, &mut model));
        assert_eq!(model, Metadata::new());
    }

    #[test]
    fn test_detect_by_url() {
        let parser = Wms::parser();
        assert!(parser.detect_by_url("https://maps.example.org/geoserver/wms"));
        assert!(parser.detect_by_url("http://example.org/cgi-bin/mapserv?map=x&SERVICE=WMS"));
        assert!(!parser.detect_by_url("https://example.org/wmts/1.0.0/WMTSCapabilities.xml"));
        assert!(!parser.detect_by_url("https://example.org/page.html"));
        assert!(!parser.detect_by_url("::not a url::"));
    }

    #[test]
    fn test_service_and_metadata_urls() {
        let parser = Wms::parser();
        let url = "https://example.org/mapserv?map=trails.map&SERVICE=WMS&request=GetMap&Version=1.3.0";
        assert_eq!(
            parser.service_url(url),
            "https://example.org/mapserv?map=trails.map"
        );
        assert_eq!(
            parser.metadata_url(url),
            "https://example.org/mapserv?map=trails.map&SERVICE=WMS&REQUEST=GetCapabilities"
        );
        assert_eq!(
            parser.metadata_url("https://example.org/wms"),
            "https://example.org/wms?SERVICE=WMS&REQUEST=GetCapabilities"
        );
    }
}
