//! Caret-aware text insertion
//!
//! The strategy is picked from the widget itself:
//!
//! | Widget                                 | Strategy          |
//! |----------------------------------------|-------------------|
//! | `<textarea>` / `<input>`               | `PlainText`       |
//! | element with class `ql-editor`         | `BlockEditor`     |
//! | element with class `ProseMirror`       | `ParagraphEditor` |
//! | anything else (contenteditable)        | `EditableDiv`     |
//!
//! Every call focuses the widget, mutates it, then dispatches exactly one
//! bubbling `input` event so the host framework notices the change. If the
//! chosen strategy fails the widget's whole text is overwritten instead.
//! Nothing here ever clicks the host's submit control.

use page_dom::{BoundaryPoint, Document, Event, NodeId, Range};

use crate::constants::editors;

/// How text is put into a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStrategy {
    /// Splice into a form control's value at the caret
    PlainText,
    /// Text runs separated by `<br>` at the document selection
    EditableDiv,
    /// One `<p>` per line (ProseMirror family)
    ParagraphEditor,
    /// One `<p>` per line, clearing a lone empty paragraph first (Quill family)
    BlockEditor,
}

/// What an insertion did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    pub strategy: InsertStrategy,
    /// The strategy failed and the widget text was overwritten
    pub fell_back: bool,
}

/// Pick a strategy from the widget's tag and classes
pub fn classify(doc: &Document, widget: NodeId) -> InsertStrategy {
    if doc.is_form_control(widget) {
        InsertStrategy::PlainText
    } else if doc.has_class(widget, editors::QUILL) {
        InsertStrategy::BlockEditor
    } else if doc.has_class(widget, editors::PROSEMIRROR) {
        InsertStrategy::ParagraphEditor
    } else {
        InsertStrategy::EditableDiv
    }
}

/// Insert `text` into `widget` and notify the host
pub fn insert_text(doc: &Document, widget: NodeId, text: &str) -> InsertOutcome {
    let strategy = classify(doc, widget);

    if doc.active_element() != Some(widget) {
        if let Err(err) = doc.focus(widget) {
            log::debug!("Could not focus {}: {}", widget, err);
        }
    }

    let result = match strategy {
        InsertStrategy::PlainText => insert_plain(doc, widget, text),
        InsertStrategy::EditableDiv => insert_editable(doc, widget, text),
        InsertStrategy::ParagraphEditor => insert_paragraphs(doc, widget, text),
        InsertStrategy::BlockEditor => insert_blocks(doc, widget, text),
    };

    let fell_back = match result {
        Ok(()) => false,
        Err(err) => {
            log::debug!("{:?} insertion failed ({}), overwriting widget text", strategy, err);
            if let Err(err) = doc.set_inner_text(widget, text) {
                log::warn!("Fallback insertion into {} failed: {}", widget, err);
            }
            true
        }
    };

    doc.dispatch_event(widget, Event::input(Some(text.to_string())));
    InsertOutcome {
        strategy,
        fell_back,
    }
}

// ─── PLAIN TEXT ─────────────────────────────────────────────────────

fn insert_plain(doc: &Document, widget: NodeId, text: &str) -> page_dom::Result<()> {
    let value: Vec<char> = doc.value(widget)?.chars().collect();
    let (start, end) = doc.selection_range(widget)?;
    let start = start.min(value.len());
    let end = end.clamp(start, value.len());

    let mut spliced: String = value[..start].iter().collect();
    spliced.push_str(text);
    spliced.extend(&value[end..]);

    doc.set_value(widget, &spliced)?;
    let caret = start + text.chars().count();
    doc.set_selection_range(widget, caret, caret)
}

// ─── EDITABLE DIV ───────────────────────────────────────────────────

fn insert_editable(doc: &Document, widget: NodeId, text: &str) -> page_dom::Result<()> {
    let Some(mut range) = selection_within(doc, widget) else {
        let current = doc.inner_text(widget);
        let combined = if current.is_empty() {
            text.to_string()
        } else {
            format!("{}\n{}", current, text)
        };
        return doc.set_inner_text(widget, &combined);
    };

    if !range.collapsed() {
        doc.delete_contents(&mut range)?;
    }

    let before = doc.inner_text_before(widget, range.start);
    if !before.is_empty() && !before.ends_with('\n') {
        let br = doc.create_element("br");
        doc.insert_node(&mut range, br)?;
        doc.set_start_after(&mut range, br)?;
        range.collapse(true);
    }

    let fragment = line_runs(doc, text)?;
    doc.insert_node(&mut range, fragment)?;
    range.collapse(false);
    doc.set_selection(Some(range));
    Ok(())
}

/// Fragment of text runs with a `<br>` before every line but the first
fn line_runs(doc: &Document, text: &str) -> page_dom::Result<NodeId> {
    let fragment = doc.create_fragment();
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            let br = doc.create_element("br");
            doc.append_child(fragment, br)?;
        }
        if !line.is_empty() {
            let run = doc.create_text(line);
            doc.append_child(fragment, run)?;
        }
    }
    Ok(fragment)
}

// ─── RICH EDITORS ───────────────────────────────────────────────────

fn insert_paragraphs(doc: &Document, widget: NodeId, text: &str) -> page_dom::Result<()> {
    if is_placeholder_state(doc, widget) {
        doc.remove_children(widget)?;
        let paragraphs = paragraphs(doc, text)?;
        let count = paragraphs.len();
        for paragraph in paragraphs {
            doc.append_child(widget, paragraph)?;
        }
        doc.set_selection(Some(Range::caret(widget, count)));
        return Ok(());
    }
    insert_paragraphs_at_selection(doc, widget, text)
}

fn insert_blocks(doc: &Document, widget: NodeId, text: &str) -> page_dom::Result<()> {
    if is_placeholder_state(doc, widget) {
        doc.remove_children(widget)?;
    }
    insert_paragraphs_at_selection(doc, widget, text)?;
    if doc.has_class(widget, editors::QUILL_BLANK) {
        doc.remove_class(widget, editors::QUILL_BLANK)?;
    }
    Ok(())
}

/// Insert one paragraph per line at the selection's block, or append
fn insert_paragraphs_at_selection(doc: &Document, widget: NodeId, text: &str) -> page_dom::Result<()> {
    let index = match selection_within(doc, widget) {
        Some(mut range) => {
            if !range.collapsed() {
                doc.delete_contents(&mut range)?;
            }
            block_index(doc, widget, range.start)
        }
        None => doc.children(widget).len(),
    };

    let paragraphs = paragraphs(doc, text)?;
    let count = paragraphs.len();
    let reference = doc.children(widget).get(index).copied();
    for paragraph in paragraphs {
        doc.insert_before(widget, paragraph, reference)?;
    }
    doc.set_selection(Some(Range::caret(widget, index + count)));
    Ok(())
}

/// One `<p>` per line; blank lines hold a single `<br>`
fn paragraphs(doc: &Document, text: &str) -> page_dom::Result<Vec<NodeId>> {
    text.split('\n')
        .map(|line| -> page_dom::Result<NodeId> {
            let p = doc.create_element("p");
            if line.is_empty() {
                let br = doc.create_element("br");
                doc.append_child(p, br)?;
            } else {
                let run = doc.create_text(line);
                doc.append_child(p, run)?;
            }
            Ok(p)
        })
        .collect()
}

/// Child index of `widget` where new blocks go for a caret at `point`
///
/// A caret at the very start of a block inserts before it, anywhere else
/// after it.
fn block_index(doc: &Document, widget: NodeId, point: BoundaryPoint) -> usize {
    if point.container == widget {
        return point.offset;
    }
    let children = doc.children(widget);
    let mut block = point.container;
    while let Some(parent) = doc.parent(block) {
        if parent == widget {
            break;
        }
        block = parent;
    }
    let Some(index) = children.iter().position(|c| *c == block) else {
        return children.len();
    };
    if doc.inner_text_before(block, point).is_empty() {
        index
    } else {
        index + 1
    }
}

/// Empty editor, or a single paragraph with no rendered text
fn is_placeholder_state(doc: &Document, widget: NodeId) -> bool {
    match doc.children(widget).as_slice() {
        [] => true,
        [only] => {
            doc.tag_name(*only).as_deref() == Some("p") && doc.inner_text(*only).trim().is_empty()
        }
        _ => false,
    }
}

/// The document selection, if both ends are inside `widget`
fn selection_within(doc: &Document, widget: NodeId) -> Option<Range> {
    doc.selection().filter(|range| {
        doc.contains(widget, range.start.container) && doc.contains(widget, range.end.container)
    })
}
