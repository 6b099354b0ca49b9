//! Canonical metadata model filled by the parsers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::container::{BoundingBoxContainer, BoundingBoxSet};

/// Normalized description of a geodata service or document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    bounding_boxes: BoundingBoxSet,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    keywords: Vec<String>,
    author: Option<String>,
    license: Option<String>,
    copyright: Option<String>,
    language: Option<String>,
    begin_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    layers: Vec<Layer>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    pub fn set_abstract(&mut self, abstract_text: impl Into<String>) {
        self.abstract_text = Some(abstract_text.into());
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Replaces all keywords, keeping order and duplicates.
    pub fn set_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = Some(author.into());
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn set_license(&mut self, license: impl Into<String>) {
        self.license = Some(license.into());
    }

    pub fn copyright(&self) -> Option<&str> {
        self.copyright.as_deref()
    }

    pub fn set_copyright(&mut self, copyright: impl Into<String>) {
        self.copyright = Some(copyright.into());
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = Some(language.into());
    }

    pub fn begin_time(&self) -> Option<DateTime<Utc>> {
        self.begin_time
    }

    pub fn set_begin_time(&mut self, time: DateTime<Utc>) {
        self.begin_time = Some(time);
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn set_end_time(&mut self, time: DateTime<Utc>) {
        self.end_time = Some(time);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Appends a layer and returns it for further filling.
    pub fn add_layer(&mut self, id: impl Into<String>, title: Option<String>) -> &mut Layer {
        self.layers.push(Layer {
            id: id.into(),
            title,
            bounding_boxes: BoundingBoxSet::new(),
        });
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }
}

impl BoundingBoxContainer for Metadata {
    fn bounding_boxes(&self) -> &BoundingBoxSet {
        &self.bounding_boxes
    }

    fn bounding_boxes_mut(&mut self) -> &mut BoundingBoxSet {
        &mut self.bounding_boxes
    }
}

/// A named sub-dataset of a service, e.g. a WMS layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub title: Option<String>,
    bounding_boxes: BoundingBoxSet,
}

impl BoundingBoxContainer for Layer {
    fn bounding_boxes(&self) -> &BoundingBoxSet {
        &self.bounding_boxes
    }

    fn bounding_boxes_mut(&mut self) -> &mut BoundingBoxSet {
        &mut self.bounding_boxes
    }
}
