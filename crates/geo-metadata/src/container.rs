//! Multi-CRS bounding box storage.
//!
//! [`BoundingBoxSet`] stores at most one box per CRS. Models gain the
//! container operations by implementing [`BoundingBoxContainer`], which only
//! asks for access to their set.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::crs::{normalize_crs, DEFAULT_CRS};

/// Bounding boxes keyed by their CRS, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBoxSet {
    boxes: Vec<BoundingBox>,
}

impl BoundingBoxSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundingBox> {
        self.boxes.iter()
    }

    pub fn crs_list(&self) -> Vec<&str> {
        self.boxes.iter().map(|b| b.crs()).collect()
    }

    pub fn get(&self, crs: &str) -> Option<&BoundingBox> {
        let key = normalize_crs(crs);
        self.boxes.iter().find(|b| b.crs() == key)
    }

    /// The box for [`DEFAULT_CRS`] if stored, otherwise the earliest inserted.
    pub fn primary(&self) -> Option<&BoundingBox> {
        self.get(DEFAULT_CRS).or_else(|| self.boxes.first())
    }

    /// Insert or replace the box for its CRS, returning the stored box.
    pub fn upsert(&mut self, bbox: BoundingBox) -> &BoundingBox {
        let index = match self.position(bbox.crs()) {
            Some(index) => {
                self.boxes[index] = bbox;
                index
            }
            None => {
                self.boxes.push(bbox);
                self.boxes.len() - 1
            }
        };
        &self.boxes[index]
    }

    pub fn remove(&mut self, crs: &str) -> Option<BoundingBox> {
        let key = normalize_crs(crs);
        self.position(&key).map(|index| self.boxes.remove(index))
    }

    /// Union with `other`; boxes from `other` win on CRS collisions.
    pub fn merge_from(&mut self, other: &BoundingBoxSet) {
        for bbox in other.iter() {
            self.upsert(bbox.clone());
        }
    }

    fn position(&self, normalized_crs: &str) -> Option<usize> {
        self.boxes.iter().position(|b| b.crs() == normalized_crs)
    }
}

/// Bounding box capability for metadata models.
///
/// Operations taking `Option<&str>` treat `None` as "the primary box", see
/// [`BoundingBoxSet::primary`].
pub trait BoundingBoxContainer {
    fn bounding_boxes(&self) -> &BoundingBoxSet;

    fn bounding_boxes_mut(&mut self) -> &mut BoundingBoxSet;

    fn coordinate_reference_systems(&self) -> Vec<&str> {
        self.bounding_boxes().crs_list()
    }

    fn has_bounding_box(&self, crs: Option<&str>) -> bool {
        self.bounding_box(crs).is_some()
    }

    fn bounding_box(&self, crs: Option<&str>) -> Option<&BoundingBox> {
        match crs {
            Some(crs) => self.bounding_boxes().get(crs),
            None => self.bounding_boxes().primary(),
        }
    }

    /// Store `bbox` under its CRS. `None` clears the default CRS slot.
    fn set_bounding_box(&mut self, bbox: Option<BoundingBox>) {
        match bbox {
            Some(bbox) => {
                self.bounding_boxes_mut().upsert(bbox);
            }
            None => {
                self.bounding_boxes_mut().remove(DEFAULT_CRS);
            }
        }
    }

    /// Returns false if no box was stored for `crs`.
    fn remove_bounding_box(&mut self, crs: &str) -> bool {
        self.bounding_boxes_mut().remove(crs).is_some()
    }

    fn create_bounding_box(
        &mut self,
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        crs: &str,
    ) -> &BoundingBox {
        self.bounding_boxes_mut()
            .upsert(BoundingBox::new(west, south, east, north, crs))
    }

    fn copy_bounding_boxes<C>(&mut self, other: &C)
    where
        C: BoundingBoxContainer + ?Sized,
        Self: Sized,
    {
        self.bounding_boxes_mut().merge_from(other.bounding_boxes());
    }
}

impl BoundingBoxContainer for BoundingBoxSet {
    fn bounding_boxes(&self) -> &BoundingBoxSet {
        self
    }

    fn bounding_boxes_mut(&mut self) -> &mut BoundingBoxSet {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let mut set = BoundingBoxSet::new();
        let created = set.create_bounding_box(1.0, 2.0, 3.0, 4.0, "").clone();
        assert_eq!(created.crs(), DEFAULT_CRS);
        assert!(set.has_bounding_box(None));
        assert!(set.has_bounding_box(Some("epsg:4326")));
        assert_eq!(set.bounding_box(Some("EPSG:4326")), Some(&created));
    }

    #[test]
    fn test_upsert_replaces_same_crs() {
        let mut set = BoundingBoxSet::new();
        set.create_bounding_box(0.0, 0.0, 1.0, 1.0, "EPSG:3857");
        set.create_bounding_box(5.0, 5.0, 6.0, 6.0, "epsg:3857");
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.bounding_box(Some("EPSG:3857")).unwrap().to_tuple(),
            (5.0, 5.0, 6.0, 6.0)
        );
    }

    #[test]
    fn test_primary_prefers_default_crs() {
        let mut set = BoundingBoxSet::new();
        set.create_bounding_box(0.0, 0.0, 100.0, 100.0, "EPSG:3857");
        assert_eq!(set.bounding_box(None).unwrap().crs(), "EPSG:3857");

        set.create_bounding_box(0.0, 0.0, 1.0, 1.0, "EPSG:4326");
        assert_eq!(set.bounding_box(None).unwrap().crs(), "EPSG:4326");
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut set = BoundingBoxSet::new();
        assert!(!set.remove_bounding_box("EPSG:4326"));
        set.create_bounding_box(0.0, 0.0, 1.0, 1.0, "EPSG:4326");
        assert!(set.remove_bounding_box("epsg:4326"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_none_clears_default_slot_only() {
        let mut set = BoundingBoxSet::new();
        set.create_bounding_box(0.0, 0.0, 1.0, 1.0, "EPSG:4326");
        set.create_bounding_box(0.0, 0.0, 9.0, 9.0, "EPSG:25832");
        set.set_bounding_box(None);
        assert_eq!(set.coordinate_reference_systems(), vec!["EPSG:25832"]);
    }
}
