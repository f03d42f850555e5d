//! Fluent element construction

use crate::document::Document;
use crate::error::Result;
use crate::node::NodeId;

/// Builds one element and optionally attaches it
///
/// ```rust,ignore
/// let textarea = ElementBuilder::new(&doc, "textarea")
///     .id("prompt-textarea")
///     .value("draft")
///     .append_to(form)?;
/// ```
pub struct ElementBuilder<'a> {
    doc: &'a Document,
    node: NodeId,
    error: Option<crate::error::DomError>,
}

impl<'a> ElementBuilder<'a> {
    pub fn new(doc: &'a Document, tag: &str) -> Self {
        Self {
            doc,
            node: doc.create_element(tag),
            error: None,
        }
    }

    fn record(mut self, result: Result<()>) -> Self {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
        self
    }

    pub fn id(self, id: &str) -> Self {
        let result = self.doc.set_attribute(self.node, "id", id);
        self.record(result)
    }

    pub fn class(self, class: &str) -> Self {
        let result = self.doc.add_class(self.node, class);
        self.record(result)
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        let result = self.doc.set_attribute(self.node, name, value);
        self.record(result)
    }

    pub fn style(self, property: &str, value: &str) -> Self {
        let result = self.doc.set_style(self.node, property, value);
        self.record(result)
    }

    /// Append a text child
    pub fn text(self, text: &str) -> Self {
        let run = self.doc.create_text(text);
        let result = self.doc.append_child(self.node, run);
        self.record(result)
    }

    /// Append an existing node as a child
    pub fn child(self, child: NodeId) -> Self {
        let result = self.doc.append_child(self.node, child);
        self.record(result)
    }

    /// Set a form control value
    pub fn value(self, value: &str) -> Self {
        let result = self.doc.set_value(self.node, value);
        self.record(result)
    }

    /// Finish without attaching
    pub fn build(self) -> Result<NodeId> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.node),
        }
    }

    /// Finish and append to `parent`
    pub fn append_to(self, parent: NodeId) -> Result<NodeId> {
        let doc = self.doc;
        let node = self.build()?;
        doc.append_child(parent, node)?;
        Ok(node)
    }
}

impl Document {
    /// Start building an element
    pub fn build(&self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder::new(self, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_attaches() {
        let doc = Document::new();
        let button = doc
            .build("button")
            .attr("type", "button")
            .class("chip")
            .style("color", "#fff")
            .text("Go")
            .append_to(doc.body())
            .unwrap();
        assert_eq!(
            doc.to_html(button),
            "<button type=\"button\" class=\"chip\" style=\"color: #fff\">Go</button>"
        );
        assert!(doc.is_connected(button));
    }

    #[test]
    fn test_builder_reports_first_error() {
        let doc = Document::new();
        assert!(doc.build("div").value("nope").build().is_err());
    }
}
