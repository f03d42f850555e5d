//! Node arena and structural primitives
//!
//! All mutation funnels through `insert_at` / `detach` / the setters here so
//! that every change produces exactly one mutation record.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;

use crate::error::{DomError, Result};
use crate::events::{ListenerEntry, MutationRecord};
use crate::node::{ElementData, NodeId, NodeKind};
use crate::range::Range;

pub(crate) struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

pub(crate) struct Tree {
    pub nodes: Vec<Node>,
    pub root: NodeId,
    pub body: NodeId,
    pub selection: Option<Range>,
    pub active: Option<NodeId>,
    pub observers: Vec<UnboundedSender<MutationRecord>>,
    pub listeners: HashMap<NodeId, Vec<ListenerEntry>>,
}

impl Tree {
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            selection: None,
            active: None,
            observers: Vec::new(),
            listeners: HashMap::new(),
        };
        tree.root = tree.alloc(NodeKind::Document);
        let body = tree.alloc(NodeKind::Element(ElementData::new("body")));
        tree.nodes[body.0].parent = Some(tree.root);
        tree.nodes[tree.root.0].children.push(body);
        tree.body = body;
        tree
    }

    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn element(&self, id: NodeId) -> Result<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.nodes[parent.0].children.iter().position(|c| *c == id)
    }

    /// `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.is_inclusive_ancestor(self.root, id)
    }

    /// Child-index path from the root, used to order boundary points
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_in_parent(current) {
            path.push(index);
            current = self.nodes[current.0].parent.unwrap_or(current);
        }
        path.reverse();
        path
    }

    /// Descendants of `id` in tree order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .get(id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    pub fn notify(&mut self, record: MutationRecord) {
        let before = self.observers.len();
        self.observers.retain(|tx| tx.send(record.clone()).is_ok());
        if self.observers.len() < before {
            log::trace!("Dropped {} closed mutation observer(s)", before - self.observers.len());
        }
    }

    /// Remove `id` from its parent; a detached node is left untouched
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        let Some(parent) = self.parent_of(id) else {
            return Ok(());
        };
        let index = self.index_in_parent(id).unwrap_or_default();
        self.nodes[parent.0].children.remove(index);
        self.nodes[id.0].parent = None;
        self.fix_boundaries_after_removal(parent, index, id);
        if self.active.is_some_and(|active| self.is_inclusive_ancestor(id, active)) {
            self.active = None;
        }
        self.notify(MutationRecord::child_list(parent, Vec::new(), vec![id]));
        Ok(())
    }

    /// Insert `child` (or a fragment's children) into `parent` at `index`
    ///
    /// Returns the nodes actually inserted, in order.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<Vec<NodeId>> {
        match &self.node(parent)?.kind {
            NodeKind::Text(_) => {
                return Err(DomError::hierarchy("text nodes cannot have children"));
            }
            NodeKind::Element(el) if el.is_void() => {
                return Err(DomError::hierarchy(format!("<{}> cannot have children", el.tag)));
            }
            _ => {}
        }
        match &self.node(child)?.kind {
            NodeKind::Document => return Err(DomError::hierarchy("cannot insert the document")),
            NodeKind::Fragment => return self.insert_fragment(parent, index, child),
            _ => {}
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::hierarchy("cannot insert a node into itself"));
        }

        let mut index = index.min(self.nodes[parent.0].children.len());
        if self.parent_of(child) == Some(parent) {
            if let Some(current) = self.index_in_parent(child) {
                if current < index {
                    index -= 1;
                }
            }
        }
        self.detach(child)?;
        let index = index.min(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.fix_boundaries_after_insertion(parent, index, 1);
        self.notify(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(vec![child])
    }

    fn insert_fragment(&mut self, parent: NodeId, index: usize, fragment: NodeId) -> Result<Vec<NodeId>> {
        let children = std::mem::take(&mut self.nodes[fragment.0].children);
        let index = index.min(self.nodes[parent.0].children.len());
        for (offset, child) in children.iter().enumerate() {
            self.nodes[child.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index + offset, *child);
        }
        if !children.is_empty() {
            self.fix_boundaries_after_insertion(parent, index, children.len());
            self.notify(MutationRecord::child_list(parent, children.clone(), Vec::new()));
        }
        Ok(children)
    }

    /// Keep the live selection valid when children of `parent` shift right
    fn fix_boundaries_after_insertion(&mut self, parent: NodeId, index: usize, count: usize) {
        if let Some(range) = self.selection.as_mut() {
            for point in [&mut range.start, &mut range.end] {
                if point.container == parent && point.offset > index {
                    point.offset += count;
                }
            }
        }
    }

    /// Keep the live selection valid when a child of `parent` is removed
    fn fix_boundaries_after_removal(&mut self, parent: NodeId, index: usize, removed: NodeId) {
        let Some(mut range) = self.selection else {
            return;
        };
        for point in [&mut range.start, &mut range.end] {
            if self.is_inclusive_ancestor(removed, point.container) {
                point.container = parent;
                point.offset = index;
            } else if point.container == parent && point.offset > index {
                point.offset -= 1;
            }
        }
        self.selection = Some(range);
    }

    pub fn set_text(&mut self, id: NodeId, text: String) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(existing) => *existing = text,
            _ => return Err(DomError::hierarchy("not a text node")),
        }
        let len = self.char_len(id);
        if let Some(range) = self.selection.as_mut() {
            for point in [&mut range.start, &mut range.end] {
                if point.container == id && point.offset > len {
                    point.offset = len;
                }
            }
        }
        self.notify(MutationRecord::character_data(id));
        Ok(())
    }

    /// Length in boundary-point units: characters for text, children otherwise
    pub fn char_len(&self, id: NodeId) -> usize {
        match self.get(id) {
            Some(Node {
                kind: NodeKind::Text(text),
                ..
            }) => text.chars().count(),
            Some(node) => node.children.len(),
            None => 0,
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(el) if el.is_form_control() => out.push_str(&el.value),
            _ => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Rendered text: `<br>` becomes a newline and block elements start a new line
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.get(id) {
            for child in &node.children {
                self.collect_inner_text(*child, &mut out, None);
            }
        }
        out
    }

    /// Rendered text of the content of `root` that precedes `(container, offset)`
    pub fn inner_text_before(&self, root: NodeId, container: NodeId, offset: usize) -> String {
        let mut out = String::new();
        let Some(node) = self.get(root) else {
            return out;
        };
        if root == container {
            for child in node.children.iter().take(offset) {
                self.collect_inner_text(*child, &mut out, None);
            }
            return out;
        }
        for child in &node.children {
            if self.collect_inner_text(*child, &mut out, Some((container, offset))) {
                break;
            }
        }
        out
    }

    /// Returns true once the stop point has been reached
    fn collect_inner_text(&self, id: NodeId, out: &mut String, stop: Option<(NodeId, usize)>) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        match &node.kind {
            NodeKind::Text(text) => {
                if let Some((container, offset)) = stop {
                    if container == id {
                        out.extend(text.chars().take(offset));
                        return true;
                    }
                }
                out.push_str(text);
                false
            }
            NodeKind::Element(el) => {
                if el.tag == "br" {
                    out.push('\n');
                    return false;
                }
                if el.is_form_control() {
                    out.push_str(&el.value);
                    return false;
                }
                if el.is_block() && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for (index, child) in node.children.iter().enumerate() {
                    if stop == Some((id, index)) {
                        return true;
                    }
                    if self.collect_inner_text(*child, out, stop) {
                        return true;
                    }
                }
                stop == Some((id, node.children.len()))
            }
            _ => {
                for child in &node.children {
                    if self.collect_inner_text(*child, out, stop) {
                        return true;
                    }
                }
                false
            }
        }
    }
}
