//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::crs::{normalize_crs, DEFAULT_CRS};

/// An immutable geographic or projected bounding box in a named CRS.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857, etc.), coordinates are in meters.
///
/// `west > east` is not rejected: boxes crossing the antimeridian keep their
/// corners as given, see [`BoundingBox::crosses_antimeridian`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
    crs: String,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    ///
    /// A blank CRS identifier falls back to [`DEFAULT_CRS`].
    pub fn new(west: f64, south: f64, east: f64, north: f64, crs: &str) -> Self {
        Self {
            west,
            south,
            east,
            north,
            crs: normalize_crs(crs),
        }
    }

    /// Create a WGS84 (EPSG:4326) bounding box.
    pub fn wgs84(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(west, south, east, north, DEFAULT_CRS)
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    /// Normalized CRS identifier, e.g. `EPSG:4326`.
    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Corners as `(west, south, east, north)`.
    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        (self.west, self.south, self.east, self.north)
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// True if both boxes are expressed in the same CRS.
    pub fn same_crs(&self, other: &BoundingBox) -> bool {
        self.crs == other.crs
    }

    /// True for boxes whose west edge lies east of their east edge.
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Check if this bbox intersects another.
    ///
    /// Boxes in different CRSs never intersect; reproject first.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.same_crs(other)
            && self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            west: self.west.max(other.west),
            south: self.south.max(other.south),
            east: self.east.min(other.east),
            north: self.north.min(other.north),
            crs: self.crs.clone(),
        })
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.west && x <= self.east && y >= self.south && y <= self.north
    }

    /// Express this box in `target_crs` using an external reprojector.
    ///
    /// Returns a copy when the box already uses the target CRS.
    pub fn to_crs(&self, target_crs: &str, reprojector: &dyn Reprojector) -> Option<BoundingBox> {
        let target = normalize_crs(target_crs);
        if target == self.crs {
            return Some(self.clone());
        }
        reprojector.reproject(self, &target)
    }
}

/// Hook for coordinate transformations between CRSs.
///
/// The metadata layer never reprojects on its own; callers plug in whatever
/// projection library they use.
pub trait Reprojector {
    /// Transform `bbox` into `target_crs`, or `None` if unsupported.
    fn reproject(&self, bbox: &BoundingBox, target_crs: &str) -> Option<BoundingBox>;
}

/// Accumulates the envelope of a point cloud.
#[derive(Debug, Clone, Copy, Default)]
pub struct Envelope {
    bounds: Option<(f64, f64, f64, f64)>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the envelope by one point. Non-finite coordinates are ignored.
    pub fn expand(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.bounds = Some(match self.bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }

    /// Extend the envelope by the corners of another box.
    pub fn expand_box(&mut self, west: f64, south: f64, east: f64, north: f64) {
        self.expand(west, south);
        self.expand(east, north);
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// `(min_x, min_y, max_x, max_y)` or `None` when no point was added.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.bounds
    }

    pub fn to_bbox(&self, crs: &str) -> Option<BoundingBox> {
        self.bounds
            .map(|(west, south, east, north)| BoundingBox::new(west, south, east, north, crs))
    }
}
