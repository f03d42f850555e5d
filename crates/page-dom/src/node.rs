//! Node identity and per-node payloads

use std::fmt;

/// Opaque handle to a node in a [`crate::Document`].
///
/// Handles are never reused: a removed node keeps its id, so comparing two
/// handles is an identity comparison for the lifetime of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index, mostly useful for logging
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a node is
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The document root (parent of `<body>`)
    Document,
    /// An element with tag, attributes and inline style
    Element(ElementData),
    /// A run of character data
    Text(String),
    /// A detached container whose children move on insertion
    Fragment,
}

/// Element payload
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in insertion order (`id` and `class` live here too)
    pub attributes: Vec<(String, String)>,
    /// Inline style declarations in insertion order
    pub style: Vec<(String, String)>,
    /// Current value of a form control (`textarea`, `input`)
    pub value: String,
    /// Selection offsets of a form control, in characters
    pub selection: (usize, usize),
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|(key, _)| key != name);
        before != self.attributes.len()
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Whether this element holds its text in `value` rather than in children
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "textarea" | "input")
    }

    /// Elements that never have children
    pub fn is_void(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "br" | "input" | "img" | "hr" | "meta" | "link"
        )
    }

    /// Elements that start a new line in rendered text
    pub fn is_block(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "p" | "div" | "li" | "ul" | "ol" | "pre" | "blockquote" | "h1" | "h2" | "h3"
        )
    }

    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        match self.style.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.style.push((property.to_string(), value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_parsing() {
        let mut el = ElementData::new("DIV");
        el.set_attribute("class", "  ql-editor  ql-blank ");
        assert_eq!(el.tag, "div");
        assert!(el.has_class("ql-editor"));
        assert!(el.has_class("ql-blank"));
        assert!(!el.has_class("ql"));
    }

    #[test]
    fn test_attribute_upsert() {
        let mut el = ElementData::new("button");
        el.set_attribute("type", "submit");
        el.set_attribute("type", "button");
        assert_eq!(el.attributes.len(), 1);
        assert_eq!(el.attribute("type"), Some("button"));
        assert!(el.remove_attribute("type"));
        assert!(!el.remove_attribute("type"));
    }
}
