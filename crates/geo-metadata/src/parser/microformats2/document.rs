//! Microformats2 document model and HTML extraction.
//!
//! Produces the canonical mf2 JSON structure: a list of root items and the
//! document's `rel` relations. Classic microformats (`geo`, `vcard`) are
//! mapped onto their mf2 equivalents.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Nesting limit for items inside a root item.
pub const MAX_ITEM_DEPTH: usize = 32;

/// Parsed microformats of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mf2Document {
    #[serde(default)]
    pub items: Vec<Mf2Item>,
    #[serde(default)]
    pub rels: BTreeMap<String, Vec<String>>,
}

/// One microformat object, e.g. an `h-geo` or `h-card`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mf2Item {
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<PropertyValue>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Mf2Item>,
}

/// Value of a microformat property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Item(Box<Mf2Item>),
    Embedded { html: String, value: String },
}

impl PropertyValue {
    /// Plain text form of the value, if it has one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            PropertyValue::Embedded { value, .. } => Some(value),
            PropertyValue::Item(_) => None,
        }
    }
}

impl Mf2Item {
    /// First text value of a property.
    pub fn first_text(&self, property: &str) -> Option<&str> {
        self.properties
            .get(property)
            .and_then(|values| values.first())
            .and_then(PropertyValue::as_text)
    }

    /// Items nested as property values or children.
    pub fn nested_items(&self) -> impl Iterator<Item = &Mf2Item> {
        self.properties
            .values()
            .flatten()
            .filter_map(|value| match value {
                PropertyValue::Item(item) => Some(item.as_ref()),
                _ => None,
            })
            .chain(self.children.iter())
    }

    fn push(&mut self, property: &str, value: PropertyValue) {
        self.properties
            .entry(property.to_string())
            .or_default()
            .push(value);
    }
}

impl Mf2Document {
    /// Parse a page. Canonical mf2 JSON is accepted as well as HTML.
    ///
    /// Returns `None` for JSON that does not match the mf2 structure.
    pub fn parse(source: &str) -> Option<Self> {
        if source.trim_start().starts_with('{') {
            return serde_json::from_str(source).ok();
        }
        Some(Self::from_html(source))
    }

    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let items = collect_roots(root);

        let mut rels: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for element in root.descendants().filter_map(ElementRef::wrap) {
            let el = element.value();
            if !matches!(el.name(), "a" | "link" | "area") {
                continue;
            }
            let (Some(rel), Some(href)) = (el.attr("rel"), el.attr("href")) else {
                continue;
            };
            for token in rel.split_whitespace() {
                rels.entry(token.to_string())
                    .or_default()
                    .push(href.trim().to_string());
            }
        }

        Self { items, rels }
    }

    /// Every item in the document, depth first.
    pub fn all_items(&self) -> Vec<&Mf2Item> {
        let mut out = Vec::new();
        let mut stack: Vec<&Mf2Item> = self.items.iter().rev().collect();
        while let Some(item) = stack.pop() {
            out.push(item);
            let nested: Vec<&Mf2Item> = item.nested_items().collect();
            stack.extend(nested.into_iter().rev());
        }
        out
    }
}

/// Classic microformat a legacy root maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vocabulary {
    Mf2,
    LegacyGeo,
    LegacyCard,
}

impl Vocabulary {
    /// Property class for a legacy class name, e.g. `latitude` -> `p-latitude`.
    fn legacy_property(self, class: &str) -> Option<&'static str> {
        match (self, class) {
            (Vocabulary::LegacyGeo, "latitude") => Some("p-latitude"),
            (Vocabulary::LegacyGeo, "longitude") => Some("p-longitude"),
            (Vocabulary::LegacyCard, "fn") => Some("p-name"),
            (Vocabulary::LegacyCard, "org") => Some("p-org"),
            (Vocabulary::LegacyCard, "url") => Some("u-url"),
            (Vocabulary::LegacyCard, "email") => Some("u-email"),
            (Vocabulary::LegacyCard, "geo") => Some("p-geo"),
            _ => None,
        }
    }
}

fn is_root_class(class: &str) -> bool {
    let Some(name) = class.strip_prefix("h-") else {
        return false;
    };
    !name.is_empty()
        && !name.ends_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Root types of an element. Legacy roots only count without mf2 roots.
fn root_types(element: ElementRef<'_>) -> Option<(Vec<String>, Vocabulary)> {
    let classes: Vec<&str> = element.value().classes().collect();

    let mut types: Vec<String> = classes
        .iter()
        .filter(|c| is_root_class(c))
        .map(|c| c.to_string())
        .collect();
    if !types.is_empty() {
        types.sort();
        types.dedup();
        return Some((types, Vocabulary::Mf2));
    }

    if classes.contains(&"vcard") {
        Some((vec!["h-card".to_string()], Vocabulary::LegacyCard))
    } else if classes.contains(&"geo") {
        Some((vec!["h-geo".to_string()], Vocabulary::LegacyGeo))
    } else {
        None
    }
}

/// Property classes (`p-name`, `u-url`, ...) of an element.
fn property_classes(element: ElementRef<'_>, vocabulary: Vocabulary) -> Vec<String> {
    element
        .value()
        .classes()
        .filter_map(|class| {
            if vocabulary == Vocabulary::Mf2 {
                ["p-", "u-", "dt-", "e-"]
                    .iter()
                    .any(|prefix| class.len() > prefix.len() && class.starts_with(prefix))
                    .then(|| class.to_string())
            } else {
                vocabulary.legacy_property(class).map(str::to_string)
            }
        })
        .collect()
}

/// Element children in document order.
fn child_elements(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap).collect()
}

/// Pushes the children of `element` so that they pop in document order.
fn push_children<'a>(stack: &mut Vec<ElementRef<'a>>, element: ElementRef<'a>) {
    let mut children = child_elements(element);
    children.reverse();
    stack.extend(children);
}

fn collect_roots(root: ElementRef<'_>) -> Vec<Mf2Item> {
    let mut items = Vec::new();
    let mut stack = Vec::new();
    push_children(&mut stack, root);
    while let Some(element) = stack.pop() {
        match root_types(element) {
            Some((types, vocabulary)) => items.push(parse_item(element, types, vocabulary, 0)),
            None => push_children(&mut stack, element),
        }
    }
    items
}

/// Builds the item rooted at `element`. Items nested deeper than
/// [`MAX_ITEM_DEPTH`] below a root are dropped.
fn parse_item(
    element: ElementRef<'_>,
    types: Vec<String>,
    vocabulary: Vocabulary,
    depth: usize,
) -> Mf2Item {
    let mut item = Mf2Item {
        types,
        ..Default::default()
    };
    let mut stack = Vec::new();
    push_children(&mut stack, element);

    while let Some(current) = stack.pop() {
        let properties = property_classes(current, vocabulary);

        let nested_root = match vocabulary {
            Vocabulary::Mf2 => root_types(current).filter(|(_, v)| *v == Vocabulary::Mf2),
            _ => root_types(current),
        };
        if let Some((types, nested_vocabulary)) = nested_root {
            if depth >= MAX_ITEM_DEPTH {
                debug!(depth, "Skipping microformat nested too deeply");
                continue;
            }
            let nested = parse_item(current, types, nested_vocabulary, depth + 1);
            if properties.is_empty() {
                item.children.push(nested);
            } else {
                for class in &properties {
                    if let Some((_, name)) = class.split_once('-') {
                        item.push(name, PropertyValue::Item(Box::new(nested.clone())));
                    }
                }
            }
            continue;
        }

        for class in &properties {
            let Some((prefix, name)) = class.split_once('-') else {
                continue;
            };
            let value = match prefix {
                "u" => PropertyValue::Text(url_value(current)),
                "dt" => PropertyValue::Text(datetime_value(current)),
                "e" => PropertyValue::Embedded {
                    html: current.inner_html().trim().to_string(),
                    value: text_content(current),
                },
                _ => PropertyValue::Text(plain_value(current)),
            };
            item.push(name, value);
        }

        push_children(&mut stack, current);
    }
    item
}

fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Concatenated values of `value` class descendants, if any.
fn value_class_pattern(element: ElementRef<'_>) -> Option<String> {
    let parts: Vec<String> = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().classes().any(|c| c == "value"))
        .map(|e| {
            let el = e.value();
            match el.name() {
                "img" | "area" => el.attr("alt").unwrap_or_default().to_string(),
                "data" => el
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| text_content(e)),
                "abbr" => el
                    .attr("title")
                    .map(str::to_string)
                    .unwrap_or_else(|| text_content(e)),
                _ => text_content(e),
            }
        })
        .collect();
    (!parts.is_empty()).then(|| parts.concat())
}

fn plain_value(element: ElementRef<'_>) -> String {
    if let Some(value) = value_class_pattern(element) {
        return value;
    }
    let el = element.value();
    let attr = match el.name() {
        "abbr" | "link" => el.attr("title"),
        "data" | "input" => el.attr("value"),
        "img" | "area" => el.attr("alt"),
        _ => None,
    };
    attr.map(|v| v.trim().to_string())
        .unwrap_or_else(|| text_content(element))
}

fn url_value(element: ElementRef<'_>) -> String {
    let el = element.value();
    let attr = match el.name() {
        "a" | "area" | "link" => el.attr("href"),
        "img" | "audio" | "video" | "source" | "iframe" => el.attr("src"),
        "object" => el.attr("data"),
        _ => None,
    };
    match attr {
        Some(url) => url.trim().to_string(),
        None => plain_value(element),
    }
}

fn datetime_value(element: ElementRef<'_>) -> String {
    if let Some(value) = value_class_pattern(element) {
        return value;
    }
    let el = element.value();
    let attr = match el.name() {
        "time" | "ins" | "del" => el.attr("datetime"),
        "abbr" => el.attr("title"),
        "data" | "input" => el.attr("value"),
        _ => None,
    };
    attr.map(|v| v.trim().to_string())
        .unwrap_or_else(|| text_content(element))
}
