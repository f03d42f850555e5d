//! Per-site input adapters
//!
//! An adapter bundles the three things that differ between chat services:
//! where the composer lives (`locate_anchor`), which element takes the text
//! (`locate_input_widget`), and how text gets into it (`insert_text`).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │      AdapterRegistry         │  SiteKind -> Arc<dyn InputAdapter>
//! └──────────────┬───────────────┘
//!                │
//!       ┌────────┴─────────┐
//!       ▼                  ▼
//! ┌─────────────┐    ┌─────────────┐
//! │ SiteAdapter │    │ NoopAdapter │  (unknown sites)
//! │  (records)  │    └─────────────┘
//! └─────────────┘
//! ```
//!
//! Built-in sites are pure data: a `SiteAdapter` record per site in
//! [`sites::SITE_ADAPTERS`]. A selector that stops matching only disables
//! its own site.

mod registry;
pub mod sites;

pub use registry::AdapterRegistry;
pub use sites::SITE_ADAPTERS;

use page_dom::{DomError, Document, NodeId};

use crate::insertion::{self, InsertOutcome};
use crate::site::SiteKind;

/// Capability bundle for one chat service
///
/// Implementations must be stateless: locate operations are re-run on every
/// mutation burst and every click, and must not cache nodes.
pub trait InputAdapter: Send + Sync {
    /// Site this adapter serves
    fn site(&self) -> SiteKind;

    // ─── LOCATION ───────────────────────────────────────────────────

    /// Element the button bar is mounted relative to, or `None` if the
    /// composer has not rendered yet
    fn locate_anchor(&self, doc: &Document) -> Option<NodeId>;

    /// Live editable element that receives prompt text
    fn locate_input_widget(&self, doc: &Document) -> Option<NodeId>;

    // ─── MUTATION ───────────────────────────────────────────────────

    /// Attach `bar` relative to `anchor`
    fn mount(&self, doc: &Document, anchor: NodeId, bar: NodeId) -> page_dom::Result<()>;

    /// Insert `text` into `widget`
    ///
    /// The strategy follows the widget's shape rather than the site, so an
    /// adapter keeps working when its host swaps editor technology.
    fn insert_text(&self, doc: &Document, widget: NodeId, text: &str) -> InsertOutcome {
        insertion::insert_text(doc, widget, text)
    }

    /// Locate the widget afresh and insert `text` into it
    ///
    /// Returns `None` when no widget is present; the caller just waits for
    /// the next click.
    fn insert_prompt(&self, doc: &Document, text: &str) -> Option<InsertOutcome> {
        match self.locate_input_widget(doc) {
            Some(widget) => Some(self.insert_text(doc, widget, text)),
            None => {
                log::debug!("No input widget on {} at click time", self.site());
                None
            }
        }
    }
}

/// Where the bar goes relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Next sibling of the anchor
    AfterAnchor,
    /// Last child of the anchor
    LastChild,
    /// Before the first descendant of the anchor matching the selector,
    /// falling back to the last child
    BeforeChild(&'static str),
    /// Before the anchor's sibling matching the selector, falling back to
    /// just after the anchor
    BeforeSibling(&'static str),
}

impl Placement {
    pub fn mount(&self, doc: &Document, anchor: NodeId, bar: NodeId) -> page_dom::Result<()> {
        match *self {
            Placement::AfterAnchor => doc.insert_after(anchor, bar),
            Placement::LastChild => doc.append_child(anchor, bar),
            Placement::BeforeChild(selector) => match doc.query_selector_in(anchor, selector)? {
                Some(child) => {
                    let parent = doc.parent(child).unwrap_or(anchor);
                    doc.insert_before(parent, bar, Some(child))
                }
                None => {
                    log::debug!("Placement target {:?} missing, appending to anchor", selector);
                    doc.append_child(anchor, bar)
                }
            },
            Placement::BeforeSibling(selector) => {
                let parent = doc
                    .parent(anchor)
                    .ok_or_else(|| DomError::hierarchy(format!("anchor {} is detached", anchor)))?;
                let mut sibling = None;
                for child in doc.children(parent) {
                    if child != anchor && doc.matches(child, selector)? {
                        sibling = Some(child);
                        break;
                    }
                }
                match sibling {
                    Some(row) => doc.insert_before(parent, bar, Some(row)),
                    None => {
                        log::debug!("Sibling {:?} missing, mounting after anchor", selector);
                        doc.insert_after(anchor, bar)
                    }
                }
            }
        }
    }
}

/// Table-driven adapter: ordered selector fallback chains plus a placement
#[derive(Debug, Clone, Copy)]
pub struct SiteAdapter {
    pub kind: SiteKind,
    /// Tried in order; the first selector with a match wins
    pub anchor_selectors: &'static [&'static str],
    pub input_selectors: &'static [&'static str],
    pub placement: Placement,
}

impl SiteAdapter {
    fn first_match(&self, doc: &Document, selectors: &[&str]) -> Option<NodeId> {
        selectors.iter().find_map(|selector| match doc.query_selector(selector) {
            Ok(found) => found,
            Err(err) => {
                log::warn!("Bad selector for {}: {}", self.kind, err);
                None
            }
        })
    }
}

impl InputAdapter for SiteAdapter {
    fn site(&self) -> SiteKind {
        self.kind
    }

    fn locate_anchor(&self, doc: &Document) -> Option<NodeId> {
        self.first_match(doc, self.anchor_selectors)
    }

    fn locate_input_widget(&self, doc: &Document) -> Option<NodeId> {
        self.first_match(doc, self.input_selectors)
    }

    fn mount(&self, doc: &Document, anchor: NodeId, bar: NodeId) -> page_dom::Result<()> {
        self.placement.mount(doc, anchor, bar)
    }
}

/// Adapter for unrecognised sites; never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAdapter;

impl InputAdapter for NoopAdapter {
    fn site(&self) -> SiteKind {
        SiteKind::Unknown
    }

    fn locate_anchor(&self, _doc: &Document) -> Option<NodeId> {
        None
    }

    fn locate_input_widget(&self, _doc: &Document) -> Option<NodeId> {
        None
    }

    fn mount(&self, _doc: &Document, _anchor: NodeId, _bar: NodeId) -> page_dom::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer(doc: &Document) -> (NodeId, NodeId, NodeId) {
        let form = doc.build("form").append_to(doc.body()).unwrap();
        let anchor = doc.build("div").class("composer").append_to(form).unwrap();
        let row = doc.build("div").class("actions").append_to(form).unwrap();
        (form, anchor, row)
    }

    #[test]
    fn test_after_anchor() {
        let doc = Document::new();
        let (_, anchor, row) = composer(&doc);
        let bar = doc.create_element("div");
        Placement::AfterAnchor.mount(&doc, anchor, bar).unwrap();
        assert_eq!(doc.next_sibling(anchor), Some(bar));
        assert_eq!(doc.next_sibling(bar), Some(row));
    }

    #[test]
    fn test_last_child() {
        let doc = Document::new();
        let (_, anchor, _) = composer(&doc);
        doc.build("textarea").append_to(anchor).unwrap();
        let bar = doc.create_element("div");
        Placement::LastChild.mount(&doc, anchor, bar).unwrap();
        assert_eq!(doc.last_child(anchor), Some(bar));
    }

    #[test]
    fn test_before_child_and_fallback() {
        let doc = Document::new();
        let (_, anchor, _) = composer(&doc);
        let inner = doc.build("div").append_to(anchor).unwrap();
        let textarea = doc.build("textarea").append_to(inner).unwrap();

        let bar = doc.create_element("div");
        Placement::BeforeChild("textarea").mount(&doc, anchor, bar).unwrap();
        assert_eq!(doc.parent(bar), Some(inner));
        assert_eq!(doc.next_sibling(bar), Some(textarea));

        let other = doc.create_element("div");
        Placement::BeforeChild(".missing").mount(&doc, anchor, other).unwrap();
        assert_eq!(doc.last_child(anchor), Some(other));
    }

    #[test]
    fn test_before_sibling_and_fallback() {
        let doc = Document::new();
        let (form, anchor, row) = composer(&doc);
        let spacer = doc.create_element("span");
        doc.insert_after(anchor, spacer).unwrap();

        let bar = doc.create_element("div");
        Placement::BeforeSibling(".actions").mount(&doc, anchor, bar).unwrap();
        assert_eq!(doc.parent(bar), Some(form));
        assert_eq!(doc.next_sibling(bar), Some(row));

        let other = doc.create_element("div");
        Placement::BeforeSibling(".missing").mount(&doc, anchor, other).unwrap();
        assert_eq!(doc.next_sibling(anchor), Some(other));
    }

    #[test]
    fn test_selector_chain_falls_through() {
        let doc = Document::new();
        let target = doc.build("div").class("second").append_to(doc.body()).unwrap();
        let adapter = SiteAdapter {
            kind: SiteKind::Chatgpt,
            anchor_selectors: &["#first", "div:bad", ".second"],
            input_selectors: &[],
            placement: Placement::AfterAnchor,
        };
        assert_eq!(adapter.locate_anchor(&doc), Some(target));
        assert_eq!(adapter.locate_input_widget(&doc), None);
    }

    #[test]
    fn test_noop_adapter_finds_nothing() {
        let doc = Document::new();
        doc.build("div").id("composer-background").append_to(doc.body()).unwrap();
        assert_eq!(NoopAdapter.locate_anchor(&doc), None);
        assert_eq!(NoopAdapter.insert_prompt(&doc, "hello"), None);
    }
}
