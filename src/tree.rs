//! # Document tree
//!
//! Parsers never own the tree they build: they receive a parent [`Element`] and append to it.
//! Serialization is left to the caller; the types implement [`serde::Serialize`] so that any
//! serde format can be used.
use serde::Serialize;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Element(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// A labelled node with attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style [`Element::set_attribute`].
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set an attribute, replacing an existing value for the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append text, merging it into the last child if that is text already.
    pub fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(Node::Text(last)) => last.push_str(text),
            _ => self.children.push(Node::Text(text.to_string())),
        }
    }

    /// Builder-style [`Element::add_text`].
    pub fn with_text(mut self, text: &str) -> Self {
        self.add_text(text);
        self
    }

    /// Append a child element. Children are built before they are added.
    pub fn add_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// The first child element called `name`.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Text of the direct text children.
    pub fn text(&self) -> String {
        self.children.iter().filter_map(Node::as_text).collect()
    }

    /// Text of all descendants in document order.
    pub fn text_content(&self) -> String {
        let mut content = String::new();
        self.collect_text(&mut content);
        content
    }

    fn collect_text(&self, content: &mut String) {
        for child in &self.children {
            match child {
                Node::Element(element) => element.collect_text(content),
                Node::Text(text) => content.push_str(text),
            }
        }
    }
}
