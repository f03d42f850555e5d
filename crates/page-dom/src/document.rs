//! Shared document handle
//!
//! `Document` is a cheap clonable handle over one node tree. The host page
//! and the content script hold clones of the same handle; every structural
//! change is published to mutation observers.

use std::cmp::Ordering;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::error::{DomError, Result};
use crate::events::{Event, Listener, ListenerEntry, MutationRecord};
use crate::node::{ElementData, NodeId, NodeKind};
use crate::range::{compare_points, BoundaryPoint, Range};
use crate::selector::SelectorList;
use crate::tree::Tree;

/// Handle to a host page document
#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<Tree>>,
}

/// Non-owning handle, for listeners that must not keep their document alive
#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<RwLock<Tree>>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.inner.read();
        f.debug_struct("Document")
            .field("nodes", &tree.nodes.len())
            .field("observers", &tree.observers.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document containing only `<body>`
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Tree::new())),
        }
    }

    /// Whether two handles refer to the same document
    pub fn same_document(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn root(&self) -> NodeId {
        self.inner.read().root
    }

    pub fn body(&self) -> NodeId {
        self.inner.read().body
    }

    // ─── CREATION ───────────────────────────────────────────────────

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner
            .write()
            .alloc(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.inner.write().alloc(NodeKind::Text(text.to_string()))
    }

    pub fn create_fragment(&self) -> NodeId {
        self.inner.write().alloc(NodeKind::Fragment)
    }

    // ─── STRUCTURE ──────────────────────────────────────────────────

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut tree = self.inner.write();
        let end = tree.node(parent)?.children.len();
        tree.insert_at(parent, end, child).map(|_| ())
    }

    pub fn prepend_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.inner.write().insert_at(parent, 0, child).map(|_| ())
    }

    /// Insert `child` into `parent` before `reference`, or at the end when `reference` is `None`
    pub fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> Result<()> {
        let mut tree = self.inner.write();
        let index = match reference {
            Some(reference) => {
                if tree.parent_of(reference) != Some(parent) {
                    return Err(DomError::hierarchy(format!(
                        "{} is not a child of {}",
                        reference, parent
                    )));
                }
                tree.index_in_parent(reference).unwrap_or_default()
            }
            None => tree.node(parent)?.children.len(),
        };
        tree.insert_at(parent, index, child).map(|_| ())
    }

    /// Insert `child` as the next sibling of `reference`
    pub fn insert_after(&self, reference: NodeId, child: NodeId) -> Result<()> {
        let mut tree = self.inner.write();
        let parent = tree
            .parent_of(reference)
            .ok_or_else(|| DomError::hierarchy(format!("{} has no parent", reference)))?;
        let index = tree.index_in_parent(reference).unwrap_or_default() + 1;
        tree.insert_at(parent, index, child).map(|_| ())
    }

    /// Detach `node` from its parent
    pub fn remove(&self, node: NodeId) -> Result<()> {
        self.inner.write().detach(node)
    }

    pub fn remove_children(&self, node: NodeId) -> Result<()> {
        let mut tree = self.inner.write();
        let children = tree.node(node)?.children.clone();
        for child in children {
            tree.detach(child)?;
        }
        Ok(())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.read().parent_of(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .read()
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.inner.read().get(node)?.children.first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.inner.read().get(node)?.children.last().copied()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.inner.read();
        let parent = tree.parent_of(node)?;
        let index = tree.index_in_parent(node)?;
        tree.nodes[parent.index()].children.get(index + 1).copied()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.inner.read();
        let parent = tree.parent_of(node)?;
        let index = tree.index_in_parent(node)?;
        index
            .checked_sub(1)
            .and_then(|i| tree.nodes[parent.index()].children.get(i).copied())
    }

    /// `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.read().is_inclusive_ancestor(ancestor, node)
    }

    /// Whether `node` is attached to this document's root
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.read().is_connected(node)
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.inner.read().get(node).map(|n| n.kind.clone())
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.inner.read().element(node).is_ok()
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Text(_)))
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.read().element(node).ok().map(|el| el.tag.clone())
    }

    // ─── TEXT ───────────────────────────────────────────────────────

    /// Data of a text node
    pub fn text(&self, node: NodeId) -> Option<String> {
        match &self.inner.read().get(node)?.kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    pub fn set_text(&self, node: NodeId, text: &str) -> Result<()> {
        self.inner.write().set_text(node, text.to_string())
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.inner.read().text_content(node)
    }

    /// Replace all children with a single text node (or set the value of a form control)
    pub fn set_text_content(&self, node: NodeId, text: &str) -> Result<()> {
        if self.is_form_control(node) {
            return self.set_value(node, text);
        }
        self.remove_children(node)?;
        if !text.is_empty() {
            let child = self.create_text(text);
            self.append_child(node, child)?;
        }
        Ok(())
    }

    /// Rendered text, with `<br>` and block boundaries as newlines
    pub fn inner_text(&self, node: NodeId) -> String {
        let tree = self.inner.read();
        match tree.element(node) {
            Ok(el) if el.is_form_control() => el.value.clone(),
            _ => tree.inner_text(node),
        }
    }

    /// Rendered text of `root`'s content up to `point`
    pub fn inner_text_before(&self, root: NodeId, point: BoundaryPoint) -> String {
        self.inner
            .read()
            .inner_text_before(root, point.container, point.offset)
    }

    /// Replace children with text runs separated by `<br>`, as the `innerText` setter does
    pub fn set_inner_text(&self, node: NodeId, text: &str) -> Result<()> {
        if self.is_form_control(node) {
            return self.set_value(node, text);
        }
        self.remove_children(node)?;
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                let br = self.create_element("br");
                self.append_child(node, br)?;
            }
            if !line.is_empty() {
                let run = self.create_text(line);
                self.append_child(node, run)?;
            }
        }
        Ok(())
    }

    // ─── ATTRIBUTES ─────────────────────────────────────────────────

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .read()
            .element(node)
            .ok()?
            .attribute(name)
            .map(str::to_string)
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let mut tree = self.inner.write();
        tree.element_mut(node)?.set_attribute(name, value);
        tree.notify(MutationRecord::attribute(node, name));
        Ok(())
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<()> {
        let mut tree = self.inner.write();
        if tree.element_mut(node)?.remove_attribute(name) {
            tree.notify(MutationRecord::attribute(node, name));
        }
        Ok(())
    }

    pub fn element_id(&self, node: NodeId) -> Option<String> {
        self.attribute(node, "id")
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.inner
            .read()
            .element(node)
            .map(|el| el.has_class(class))
            .unwrap_or(false)
    }

    pub fn add_class(&self, node: NodeId, class: &str) -> Result<()> {
        if self.has_class(node, class) {
            return Ok(());
        }
        let mut classes = self.attribute(node, "class").unwrap_or_default();
        if !classes.trim().is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self.set_attribute(node, "class", classes.trim())
    }

    pub fn remove_class(&self, node: NodeId, class: &str) -> Result<()> {
        if !self.has_class(node, class) {
            return Ok(());
        }
        let classes = self.attribute(node, "class").unwrap_or_default();
        let remaining: Vec<&str> = classes.split_whitespace().filter(|c| *c != class).collect();
        self.set_attribute(node, "class", &remaining.join(" "))
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.inner
            .read()
            .element(node)
            .ok()?
            .style_value(property)
            .map(str::to_string)
    }

    pub fn set_style(&self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let mut tree = self.inner.write();
        tree.element_mut(node)?.set_style(property, value);
        tree.notify(MutationRecord::attribute(node, "style"));
        Ok(())
    }

    /// Editable through `contenteditable` on the element or its nearest deciding ancestor
    pub fn is_content_editable(&self, node: NodeId) -> bool {
        let tree = self.inner.read();
        let mut current = Some(node);
        while let Some(id) = current {
            if let Ok(el) = tree.element(id) {
                match el.attribute("contenteditable") {
                    Some("false") => return false,
                    Some(_) => return true,
                    None => {}
                }
            }
            current = tree.parent_of(id);
        }
        false
    }

    // ─── FORM CONTROLS ──────────────────────────────────────────────

    pub fn is_form_control(&self, node: NodeId) -> bool {
        self.inner
            .read()
            .element(node)
            .map(|el| el.is_form_control())
            .unwrap_or(false)
    }

    fn form_control<T>(&self, node: NodeId, f: impl FnOnce(&ElementData) -> T) -> Result<T> {
        let tree = self.inner.read();
        let el = tree.element(node)?;
        if !el.is_form_control() {
            return Err(DomError::NotAFormControl(node));
        }
        Ok(f(el))
    }

    pub fn value(&self, node: NodeId) -> Result<String> {
        self.form_control(node, |el| el.value.clone())
    }

    /// Set the value; the caret moves to the end as in a browser
    pub fn set_value(&self, node: NodeId, value: &str) -> Result<()> {
        let mut tree = self.inner.write();
        let el = tree.element_mut(node)?;
        if !el.is_form_control() {
            return Err(DomError::NotAFormControl(node));
        }
        el.value = value.to_string();
        let len = el.value.chars().count();
        el.selection = (len, len);
        Ok(())
    }

    /// `(selectionStart, selectionEnd)` in characters
    pub fn selection_range(&self, node: NodeId) -> Result<(usize, usize)> {
        self.form_control(node, |el| el.selection)
    }

    pub fn set_selection_range(&self, node: NodeId, start: usize, end: usize) -> Result<()> {
        let mut tree = self.inner.write();
        let el = tree.element_mut(node)?;
        if !el.is_form_control() {
            return Err(DomError::NotAFormControl(node));
        }
        let len = el.value.chars().count();
        let end = end.min(len);
        el.selection = (start.min(end), end);
        Ok(())
    }

    // ─── QUERIES ────────────────────────────────────────────────────

    /// First element in tree order matching `selector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        self.query_selector_in(self.root(), selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_in(self.root(), selector)
    }

    /// First descendant of `scope` matching `selector`
    pub fn query_selector_in(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let tree = self.inner.read();
        Ok(tree
            .descendants(scope)
            .into_iter()
            .find(|node| list.matches(&tree, *node)))
    }

    pub fn query_selector_all_in(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let tree = self.inner.read();
        Ok(tree
            .descendants(scope)
            .into_iter()
            .filter(|node| list.matches(&tree, *node))
            .collect())
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool> {
        let list = SelectorList::parse(selector)?;
        Ok(list.matches(&self.inner.read(), node))
    }

    /// Nearest inclusive ancestor matching `selector`
    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let tree = self.inner.read();
        let mut current = Some(node);
        while let Some(id) = current {
            if list.matches(&tree, id) {
                return Ok(Some(id));
            }
            current = tree.parent_of(id);
        }
        Ok(None)
    }

    // ─── FOCUS & SELECTION ──────────────────────────────────────────

    pub fn active_element(&self) -> Option<NodeId> {
        self.inner.read().active
    }

    pub fn focus(&self, node: NodeId) -> Result<()> {
        let mut tree = self.inner.write();
        tree.element(node)?;
        tree.active = Some(node);
        Ok(())
    }

    pub fn blur(&self) {
        self.inner.write().active = None;
    }

    /// The document selection, if it holds a range
    pub fn selection(&self) -> Option<Range> {
        self.inner.read().selection
    }

    pub fn set_selection(&self, range: Option<Range>) {
        self.inner.write().selection = range;
    }

    /// Remove the content inside `range` and collapse it onto its start
    pub fn delete_contents(&self, range: &mut Range) -> Result<()> {
        let mut tree = self.inner.write();
        delete_contents(&mut tree, range)
    }

    /// Insert `node` (or a fragment's children) at the start of `range`
    ///
    /// A collapsed range grows to cover the inserted nodes, so collapsing it
    /// to the end afterwards puts the caret after the insertion.
    pub fn insert_node(&self, range: &mut Range, node: NodeId) -> Result<()> {
        let mut tree = self.inner.write();
        insert_node(&mut tree, range, node)
    }

    /// Move the start of `range` to just after `node`
    pub fn set_start_after(&self, range: &mut Range, node: NodeId) -> Result<()> {
        let tree = self.inner.read();
        let parent = tree
            .parent_of(node)
            .ok_or_else(|| DomError::hierarchy(format!("{} has no parent", node)))?;
        let index = tree.index_in_parent(node).unwrap_or_default();
        range.start = BoundaryPoint::new(parent, index + 1);
        Ok(())
    }

    // ─── EVENTS ─────────────────────────────────────────────────────

    pub fn add_event_listener<F>(&self, node: NodeId, event_type: &str, listener: F)
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.inner
            .write()
            .listeners
            .entry(node)
            .or_default()
            .push(ListenerEntry {
                event_type: event_type.to_string(),
                listener,
            });
    }

    /// Drop every listener registered on `node` and its descendants
    pub fn clear_event_listeners(&self, node: NodeId) {
        let mut tree = self.inner.write();
        let mut doomed = tree.descendants(node);
        doomed.push(node);
        for id in doomed {
            tree.listeners.remove(&id);
        }
    }

    /// Listeners registered across the whole document
    pub fn listener_count(&self) -> usize {
        self.inner.read().listeners.values().map(Vec::len).sum()
    }

    /// Dispatch `event` at `target`, bubbling to ancestors when the event bubbles
    ///
    /// Returns the event after all listeners ran so callers can inspect its flags.
    pub fn dispatch_event(&self, target: NodeId, mut event: Event) -> Event {
        event.target = target;
        let path: Vec<NodeId> = {
            let tree = self.inner.read();
            if event.bubbles {
                let mut path = vec![target];
                let mut current = tree.parent_of(target);
                while let Some(id) = current {
                    path.push(id);
                    current = tree.parent_of(id);
                }
                path
            } else {
                vec![target]
            }
        };

        for node in path {
            // Clone out so listeners can take the lock themselves
            let listeners: Vec<Listener> = {
                let tree = self.inner.read();
                tree.listeners
                    .get(&node)
                    .map(|entries| {
                        entries
                            .iter()
                            .filter(|entry| entry.event_type == event.event_type)
                            .map(|entry| entry.listener.clone())
                            .collect()
                    })
                    .unwrap_or_default()
            };
            event.current_target = node;
            for listener in listeners {
                listener(&mut event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event
    }

    /// Dispatch a click as a user would
    pub fn click(&self, target: NodeId) -> Event {
        self.dispatch_event(target, Event::click())
    }

    // ─── MUTATIONS ──────────────────────────────────────────────────

    /// Subscribe to every change anywhere in the document
    pub fn observe(&self) -> mpsc::UnboundedReceiver<MutationRecord> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.write().observers.push(tx);
        rx
    }

    // ─── SERIALISATION ──────────────────────────────────────────────

    /// Serialise `node` and its subtree as HTML
    pub fn to_html(&self, node: NodeId) -> String {
        let tree = self.inner.read();
        let mut out = String::new();
        write_html(&tree, node, &mut out);
        out
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn write_html(tree: &Tree, node: NodeId, out: &mut String) {
    let Some(n) = tree.get(node) else {
        return;
    };
    match &n.kind {
        NodeKind::Text(text) => out.push_str(&escape(text, false)),
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attributes {
                out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
            }
            if !el.style.is_empty() {
                let style: Vec<String> = el
                    .style
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect();
                out.push_str(&format!(" style=\"{}\"", escape(&style.join("; "), true)));
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            if el.is_form_control() {
                out.push_str(&escape(&el.value, false));
            }
            for child in &n.children {
                write_html(tree, *child, out);
            }
            out.push_str(&format!("</{}>", el.tag));
        }
        NodeKind::Document | NodeKind::Fragment => {
            for child in &n.children {
                write_html(tree, *child, out);
            }
        }
    }
}

/// Convert a text boundary point to the equivalent point in its parent
///
/// `after` selects the position after the text node instead of before it.
fn lift_text_point(tree: &Tree, point: BoundaryPoint, after: bool) -> Result<BoundaryPoint> {
    let parent = tree
        .parent_of(point.container)
        .ok_or_else(|| DomError::hierarchy(format!("{} has no parent", point.container)))?;
    let index = tree.index_in_parent(point.container).unwrap_or_default();
    Ok(BoundaryPoint::new(parent, if after { index + 1 } else { index }))
}

fn text_of(tree: &Tree, node: NodeId) -> Option<String> {
    match &tree.get(node)?.kind {
        NodeKind::Text(text) => Some(text.clone()),
        _ => None,
    }
}

fn check_offset(tree: &Tree, point: BoundaryPoint) -> Result<()> {
    tree.node(point.container)?;
    if point.offset > tree.char_len(point.container) {
        return Err(DomError::IndexSize {
            node: point.container,
            offset: point.offset,
        });
    }
    Ok(())
}

fn delete_contents(tree: &mut Tree, range: &mut Range) -> Result<()> {
    check_offset(tree, range.start)?;
    check_offset(tree, range.end)?;
    if range.collapsed() {
        return Ok(());
    }
    let (start, end) = (range.start, range.end);

    if start.container == end.container {
        if let Some(text) = text_of(tree, start.container) {
            let kept: String = text
                .chars()
                .take(start.offset)
                .chain(text.chars().skip(end.offset))
                .collect();
            tree.set_text(start.container, kept)?;
        } else {
            let doomed: Vec<NodeId> = tree.nodes[start.container.index()].children
                [start.offset..end.offset.max(start.offset)]
                .to_vec();
            for child in doomed {
                tree.detach(child)?;
            }
        }
        range.collapse(true);
        return Ok(());
    }

    // Element-level bounds of the fully contained region
    let mut inner_start = start;
    let mut inner_end = end;
    if text_of(tree, start.container).is_some() {
        inner_start = lift_text_point(tree, start, true)?;
    }
    if text_of(tree, end.container).is_some() {
        inner_end = lift_text_point(tree, end, false)?;
    }

    let contained: Vec<NodeId> = tree
        .descendants(tree.root)
        .into_iter()
        .filter(|node| {
            let Some(parent) = tree.parent_of(*node) else {
                return false;
            };
            let index = tree.index_in_parent(*node).unwrap_or_default();
            let node_start = BoundaryPoint::new(parent, index);
            let node_end = BoundaryPoint::new(parent, index + 1);
            compare_points(tree, node_start, inner_start) != Ordering::Less
                && compare_points(tree, node_end, inner_end) != Ordering::Greater
        })
        .collect();
    let topmost: Vec<NodeId> = contained
        .iter()
        .copied()
        .filter(|node| {
            tree.parent_of(*node)
                .map(|parent| !contained.contains(&parent))
                .unwrap_or(true)
        })
        .collect();

    // Trim partially selected text before detaching so indices stay valid
    if let Some(text) = text_of(tree, start.container) {
        tree.set_text(start.container, text.chars().take(start.offset).collect())?;
    }
    if let Some(text) = text_of(tree, end.container) {
        tree.set_text(end.container, text.chars().skip(end.offset).collect())?;
    }
    for node in topmost {
        tree.detach(node)?;
    }

    range.end = start;
    Ok(())
}

fn insert_node(tree: &mut Tree, range: &mut Range, node: NodeId) -> Result<()> {
    check_offset(tree, range.start)?;
    let was_collapsed = range.collapsed();
    let start = range.start;

    let (parent, index) = match text_of(tree, start.container) {
        Some(text) => {
            let lifted = lift_text_point(tree, start, false)?;
            let len = text.chars().count();
            if start.offset == 0 {
                range.start = lifted;
                (lifted.container, lifted.offset)
            } else if start.offset >= len {
                (lifted.container, lifted.offset + 1)
            } else {
                let head: String = text.chars().take(start.offset).collect();
                let tail: String = text.chars().skip(start.offset).collect();
                tree.set_text(start.container, head)?;
                let tail_node = tree.alloc(NodeKind::Text(tail));
                tree.insert_at(lifted.container, lifted.offset + 1, tail_node)?;
                (lifted.container, lifted.offset + 1)
            }
        }
        None => (start.container, start.offset),
    };

    let inserted = tree.insert_at(parent, index, node)?;
    if was_collapsed {
        range.end = BoundaryPoint::new(parent, index + inserted.len());
        if range.start.container == parent && range.start.offset > index {
            range.start.offset = index;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div_with_text(doc: &Document, text: &str) -> (NodeId, NodeId) {
        let div = doc.create_element("div");
        doc.append_child(doc.body(), div).unwrap();
        let run = doc.create_text(text);
        doc.append_child(div, run).unwrap();
        (div, run)
    }

    #[test]
    fn test_insert_after_and_siblings() {
        let doc = Document::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(doc.body(), a).unwrap();
        doc.insert_after(a, b).unwrap();
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.previous_sibling(b), Some(a));
        assert!(doc.insert_after(doc.create_element("i"), b).is_err());
    }

    #[test]
    fn test_cannot_insert_into_descendant() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert!(matches!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest(_))
        ));
    }

    #[test]
    fn test_set_inner_text_uses_line_breaks() {
        let doc = Document::new();
        let (div, _) = div_with_text(&doc, "old");
        doc.set_inner_text(div, "a\n\nb").unwrap();
        assert_eq!(doc.to_html(div), "<div>a<br><br>b</div>");
        assert_eq!(doc.inner_text(div), "a\n\nb");
    }

    #[test]
    fn test_insert_node_splits_text() {
        let doc = Document::new();
        let (div, run) = div_with_text(&doc, "AB");
        let mut range = Range::caret(run, 1);
        let br = doc.create_element("br");
        doc.insert_node(&mut range, br).unwrap();
        assert_eq!(doc.to_html(div), "<div>A<br>B</div>");
        range.collapse(false);
        assert_eq!(range.start, BoundaryPoint::new(div, 2));
    }

    #[test]
    fn test_insert_fragment_at_element_offset() {
        let doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.body(), div).unwrap();
        let fragment = doc.create_fragment();
        let a = doc.create_text("x");
        let br = doc.create_element("br");
        doc.append_child(fragment, a).unwrap();
        doc.append_child(fragment, br).unwrap();
        let mut range = Range::caret(div, 0);
        doc.insert_node(&mut range, fragment).unwrap();
        assert_eq!(doc.children(div), vec![a, br]);
        assert!(doc.children(fragment).is_empty());
        assert_eq!(range.end, BoundaryPoint::new(div, 2));
    }

    #[test]
    fn test_delete_contents_within_text() {
        let doc = Document::new();
        let (div, run) = div_with_text(&doc, "hello world");
        let mut range = Range::new(BoundaryPoint::new(run, 5), BoundaryPoint::new(run, 11));
        doc.delete_contents(&mut range).unwrap();
        assert_eq!(doc.text_content(div), "hello");
        assert!(range.collapsed());
        assert_eq!(range.start, BoundaryPoint::new(run, 5));
    }

    #[test]
    fn test_delete_contents_across_nodes() {
        let doc = Document::new();
        let (div, first) = div_with_text(&doc, "abc");
        let br = doc.create_element("br");
        let last = doc.create_text("def");
        doc.append_child(div, br).unwrap();
        doc.append_child(div, last).unwrap();

        let mut range = Range::new(BoundaryPoint::new(first, 1), BoundaryPoint::new(last, 2));
        doc.delete_contents(&mut range).unwrap();
        assert_eq!(doc.to_html(div), "<div>af</div>");
        assert_eq!(range, Range::caret(first, 1));
    }

    #[test]
    fn test_live_selection_follows_removal() {
        let doc = Document::new();
        let (div, run) = div_with_text(&doc, "abc");
        doc.set_selection(Some(Range::caret(run, 2)));
        doc.remove(run).unwrap();
        assert_eq!(doc.selection(), Some(Range::caret(div, 0)));
    }

    #[test]
    fn test_form_control_value_and_caret() {
        let doc = Document::new();
        let textarea = doc.create_element("textarea");
        doc.set_value(textarea, "AB").unwrap();
        assert_eq!(doc.selection_range(textarea).unwrap(), (2, 2));
        doc.set_selection_range(textarea, 5, 1).unwrap();
        assert_eq!(doc.selection_range(textarea).unwrap(), (1, 1));
        let div = doc.create_element("div");
        assert_eq!(doc.value(div), Err(DomError::NotAFormControl(div)));
    }

    #[test]
    fn test_content_editable_inheritance() {
        let doc = Document::new();
        let editor = doc.create_element("div");
        doc.set_attribute(editor, "contenteditable", "true").unwrap();
        let p = doc.create_element("p");
        let locked = doc.create_element("span");
        doc.set_attribute(locked, "contenteditable", "false").unwrap();
        doc.append_child(editor, p).unwrap();
        doc.append_child(p, locked).unwrap();
        assert!(doc.is_content_editable(p));
        assert!(!doc.is_content_editable(locked));
    }

    #[test]
    fn test_classes() {
        let doc = Document::new();
        let el = doc.create_element("div");
        doc.add_class(el, "ql-editor").unwrap();
        doc.add_class(el, "ql-blank").unwrap();
        doc.add_class(el, "ql-blank").unwrap();
        assert_eq!(doc.attribute(el, "class").as_deref(), Some("ql-editor ql-blank"));
        doc.remove_class(el, "ql-blank").unwrap();
        assert_eq!(doc.attribute(el, "class").as_deref(), Some("ql-editor"));
    }

    #[test]
    fn test_html_escaping() {
        let doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attribute(p, "title", "say \"hi\" & <go>").unwrap();
        let text = doc.create_text("1 < 2");
        doc.append_child(p, text).unwrap();
        assert_eq!(
            doc.to_html(p),
            "<p title=\"say &quot;hi&quot; &amp; &lt;go&gt;\">1 &lt; 2</p>"
        );
    }

    #[test]
    fn test_inner_text_before_caret() {
        let doc = Document::new();
        let (div, run) = div_with_text(&doc, "one");
        let br = doc.create_element("br");
        let two = doc.create_text("two");
        doc.append_child(div, br).unwrap();
        doc.append_child(div, two).unwrap();
        assert_eq!(doc.inner_text_before(div, BoundaryPoint::new(run, 2)), "on");
        assert_eq!(doc.inner_text_before(div, BoundaryPoint::new(div, 2)), "one\n");
        assert_eq!(doc.inner_text_before(div, BoundaryPoint::new(two, 1)), "one\nt");
        assert_eq!(doc.inner_text_before(div, BoundaryPoint::new(div, 0)), "");
    }
}
