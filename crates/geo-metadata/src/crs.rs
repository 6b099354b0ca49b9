//! Coordinate Reference System identifiers and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS used when a bounding box is created without one.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Normalize a CRS identifier for storage and comparison.
///
/// Trims surrounding whitespace and upper-cases the `AUTHORITY:CODE` string.
/// Blank input yields [`DEFAULT_CRS`].
pub fn normalize_crs(crs: &str) -> String {
    let trimmed = crs.trim();
    if trimmed.is_empty() {
        DEFAULT_CRS.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

/// Well-known CRS codes found in service metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// WGS84 Geographic with lon/lat axis order (OGC CRS:84)
    Crs84,
    /// Web Mercator (meters)
    Epsg3857,
    /// NAD83 Geographic
    Epsg4269,
    /// ETRS89 Geographic
    Epsg4258,
    /// ETRS89 / UTM zone 32N
    Epsg25832,
}

impl CrsCode {
    /// Parse a CRS identifier as found in SRS/CRS attributes.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:4326"
    /// - "CRS:84"
    /// - "EPSG:900913" (legacy Web Mercator alias)
    pub fn from_identifier(s: &str) -> Result<Self, CrsParseError> {
        match normalize_crs(s).as_str() {
            "EPSG:4326" => Ok(CrsCode::Epsg4326),
            "CRS:84" => Ok(CrsCode::Crs84),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            "EPSG:4258" => Ok(CrsCode::Epsg4258),
            "EPSG:25832" => Ok(CrsCode::Epsg25832),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Get the axis order for this CRS in WMS 1.3.0.
    ///
    /// WMS 1.3.0 uses the "natural" axis order of the CRS:
    /// - Geographic EPSG CRS: lat, lon (y, x)
    /// - CRS:84 and projected CRS: x, y
    pub fn axis_order_wms_1_3(&self) -> AxisOrder {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 | CrsCode::Epsg4258 => AxisOrder::LatLon,
            _ => AxisOrder::XY,
        }
    }

    /// Get the axis order for WMS 1.1.1 (always x, y regardless of CRS).
    pub fn axis_order_wms_1_1(&self) -> AxisOrder {
        AxisOrder::XY
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(
            self,
            CrsCode::Epsg4326 | CrsCode::Crs84 | CrsCode::Epsg4269 | CrsCode::Epsg4258
        )
    }

    /// Identifier under which boxes in this CRS are stored.
    ///
    /// CRS:84 differs from EPSG:4326 only in axis order, so both map to the
    /// EPSG code once coordinates are in x, y order.
    pub fn storage_identifier(&self) -> &'static str {
        match self {
            CrsCode::Crs84 => DEFAULT_CRS,
            other => other.as_str(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Crs84 => "CRS:84",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg4269 => "EPSG:4269",
            CrsCode::Epsg4258 => "EPSG:4258",
            CrsCode::Epsg25832 => "EPSG:25832",
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Axis order for coordinate interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(
            CrsCode::from_identifier("EPSG:4326").unwrap(),
            CrsCode::Epsg4326
        );
        assert_eq!(
            CrsCode::from_identifier("epsg:3857").unwrap(),
            CrsCode::Epsg3857
        );
        assert_eq!(
            CrsCode::from_identifier("EPSG:900913").unwrap(),
            CrsCode::Epsg3857
        );
        assert_eq!(CrsCode::from_identifier(" CRS:84 ").unwrap(), CrsCode::Crs84);
        assert!(CrsCode::from_identifier("EPSG:99999").is_err());
    }

    #[test]
    fn test_axis_order() {
        assert_eq!(CrsCode::Epsg4326.axis_order_wms_1_3(), AxisOrder::LatLon);
        assert_eq!(CrsCode::Crs84.axis_order_wms_1_3(), AxisOrder::XY);
        assert_eq!(CrsCode::Epsg3857.axis_order_wms_1_3(), AxisOrder::XY);

        // WMS 1.1.1 always uses X,Y
        assert_eq!(CrsCode::Epsg4326.axis_order_wms_1_1(), AxisOrder::XY);
    }

    #[test]
    fn test_normalize_crs() {
        assert_eq!(normalize_crs(""), DEFAULT_CRS);
        assert_eq!(normalize_crs("  epsg:25832 "), "EPSG:25832");
        assert_eq!(CrsCode::Crs84.storage_identifier(), DEFAULT_CRS);
    }
}
