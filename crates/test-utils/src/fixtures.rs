//! Common test fixtures for geo-metadata tests.
//!
//! Small but complete documents for every supported format, plus extents
//! that show up across the parser and container tests.

/// Common bounding box definitions for testing, `(west, south, east, north)`.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Europe bounding box
    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 35.0, 45.0, 72.0);

    /// Bavaria, the extent of [`super::documents::WMS_130_CAPABILITIES`]
    pub const BAVARIA: (f64, f64, f64, f64) = (8.97, 47.27, 13.84, 50.56);

    /// Single point (degenerate bbox)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);

    /// Crosses antimeridian (Pacific-centric)
    pub const PACIFIC: (f64, f64, f64, f64) = (160.0, -50.0, -140.0, 50.0);
}

/// Common CRS identifiers.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "EPSG:4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";

    /// ETRS89 / UTM zone 32N
    pub const EPSG_25832: &str = "EPSG:25832";

    /// WGS84 with longitude first
    pub const CRS_84: &str = "CRS:84";
}

/// URLs a user might paste into the application.
pub mod urls {
    pub const WMS_GETMAP: &str = "https://geo.example.org/mapserv?map=trails.map&SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap";
    pub const WMS_SERVICE: &str = "https://geo.example.org/mapserv?map=trails.map";
    pub const WMS_CAPABILITIES: &str =
        "https://geo.example.org/mapserv?map=trails.map&SERVICE=WMS&REQUEST=GetCapabilities";
    pub const KML_FILE: &str = "https://files.example.org/exports/alpine-trails.kml";
    pub const BLOG_POST: &str = "https://blog.example.org/2014/06/summit-day";
}

/// Complete documents per format.
pub mod documents {
    /// WMS 1.3.0 capabilities: lat/lon axis order for EPSG:4326, one
    /// projected extent, and two named layers.
    pub const WMS_130_CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Service>
    <Name>WMS</Name>
    <Title>Bavarian Trails</Title>
    <Abstract>Hiking and biking trails maintained by the regional trail office.</Abstract>
    <KeywordList>
      <Keyword>trails</Keyword>
      <Keyword>hiking</Keyword>
      <Keyword>bavaria</Keyword>
    </KeywordList>
    <OnlineResource xlink:href="https://geo.example.org/mapserv?map=trails.map"/>
    <ContactInformation>
      <ContactPersonPrimary>
        <ContactPerson></ContactPerson>
        <ContactOrganization>Regional Trail Office</ContactOrganization>
      </ContactPersonPrimary>
    </ContactInformation>
    <Fees>(c) Regional Trail Office 2024</Fees>
    <AccessConstraints>CC-BY 4.0</AccessConstraints>
  </Service>
  <Capability>
    <Layer>
      <Title>Trails</Title>
      <CRS>EPSG:4326</CRS>
      <CRS>EPSG:25832</CRS>
      <EX_GeographicBoundingBox>
        <westBoundLongitude>8.97</westBoundLongitude>
        <eastBoundLongitude>13.84</eastBoundLongitude>
        <southBoundLatitude>47.27</southBoundLatitude>
        <northBoundLatitude>50.56</northBoundLatitude>
      </EX_GeographicBoundingBox>
      <BoundingBox CRS="EPSG:4326" minx="47.27" miny="8.97" maxx="50.56" maxy="13.84"/>
      <BoundingBox CRS="EPSG:25832" minx="497000" miny="5236000" maxx="865000" maxy="5604000"/>
      <Layer queryable="1">
        <Name>hiking</Name>
        <Title>Hiking trails</Title>
        <EX_GeographicBoundingBox>
          <westBoundLongitude>9.5</westBoundLongitude>
          <eastBoundLongitude>13.0</eastBoundLongitude>
          <southBoundLatitude>47.27</southBoundLatitude>
          <northBoundLatitude>48.5</northBoundLatitude>
        </EX_GeographicBoundingBox>
      </Layer>
      <Layer queryable="1">
        <Name>biking</Name>
        <Title>Bike routes</Title>
        <EX_GeographicBoundingBox>
          <westBoundLongitude>8.97</westBoundLongitude>
          <eastBoundLongitude>13.84</eastBoundLongitude>
          <southBoundLatitude>47.5</southBoundLatitude>
          <northBoundLatitude>50.56</northBoundLatitude>
        </EX_GeographicBoundingBox>
        <BoundingBox CRS="EPSG:3857" minx="998500" miny="6026000" maxx="1540700" maxy="6521500"/>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

    /// WMS 1.1.1 capabilities with x/y ordered extents.
    pub const WMS_111_CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE WMT_MS_Capabilities SYSTEM "http://schemas.opengis.net/wms/1.1.1/capabilities_1_1_1.dtd">
<WMT_MS_Capabilities version="1.1.1">
  <Service>
    <Name>OGC:WMS</Name>
    <Title>European Coastlines</Title>
    <Fees>none</Fees>
    <AccessConstraints>NONE</AccessConstraints>
  </Service>
  <Capability>
    <Layer>
      <Title>Coastlines</Title>
      <SRS>EPSG:4326</SRS>
      <LatLonBoundingBox minx="-15" miny="35" maxx="45" maxy="72"/>
      <BoundingBox SRS="EPSG:4326" minx="-15" miny="35" maxx="45" maxy="72"/>
      <BoundingBox SRS="EPSG:3857" minx="-1669792" miny="4163881" maxx="5009377" maxy="11753184"/>
    </Layer>
  </Capability>
</WMT_MS_Capabilities>"#;

    /// KML export of a hiking tour.
    pub const KML_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2" xmlns:atom="http://www.w3.org/2005/Atom">
  <Document>
    <name>Alpine Trails</name>
    <description>Summer tours around the Zugspitze</description>
    <atom:author><atom:name>Alice Example</atom:name></atom:author>
    <TimeSpan><begin>2014-05</begin><end>2014-09-30</end></TimeSpan>
    <Placemark>
      <name>Summit</name>
      <Point><coordinates>10.9863,47.4211,2962</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>Approach</name>
      <LineString>
        <coordinates>
          10.9520,47.4510,1000 10.9700,47.4400,1500
          10.9863,47.4211,2962
        </coordinates>
      </LineString>
    </Placemark>
  </Document>
</kml>"#;

    /// Blog post with two top-level locations (one mf2, one classic `geo`),
    /// an author card with its own nested h-geo, and rel links.
    pub const MF2_BLOG_POST: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Summit day</title>
  <link rel="license" href="https://creativecommons.org/licenses/by/4.0/">
  <link rel="author" href="https://blog.example.org/about">
</head>
<body>
  <article class="h-entry">
    <h1 class="p-name">Summit day</h1>
    <div class="h-card p-author">
      <span class="p-name">Alice</span>
      <span class="p-geo h-geo">
        <data class="p-latitude" value="48.1374"></data>
        <data class="p-longitude" value="11.5755"></data>
      </span>
    </div>
    <a rel="tag" href="https://blog.example.org/tag/alps">alps</a>
    <a rel="tag" href="https://blog.example.org/tag/hiking">hiking</a>
  </article>
  <aside>
    <p class="h-geo">
      Summit: <span class="p-latitude">47.4211</span>,
      <span class="p-longitude">10.9863</span>
    </p>
    <p class="geo">
      Hut: <abbr class="latitude" title="47.4917">N 47° 29.5</abbr>,
      <abbr class="longitude" title="11.0955">E 11° 05.7</abbr>
    </p>
  </aside>
  <footer><a rel="Copyright" href="https://blog.example.org/copyright">(c) Alice</a></footer>
</body>
</html>"#;

    /// Parsed Microformats2 JSON for a single location.
    pub const MF2_JSON: &str = r#"{
  "items": [
    {
      "type": ["h-geo"],
      "properties": {"latitude": ["52.5163"], "longitude": ["13.3777"]}
    }
  ],
  "rels": {"license": ["https://opendatacommons.org/licenses/odbl/"]}
}"#;

    /// Web page without any geodata.
    pub const PLAIN_HTML: &str =
        "<!DOCTYPE html><html><head><title>Hello</title></head><body><p>Nothing here.</p></body></html>";
}
