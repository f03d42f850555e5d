//! Events dispatched on document nodes and the mutation notification stream
//!
//! Two kinds of traffic flow out of a document:
//! - `Event`s, dispatched to listeners registered on a node and bubbling to
//!   its ancestors (clicks, input notifications)
//! - `MutationRecord`s, delivered to every observer for any structural,
//!   attribute or character-data change anywhere in the document

use std::sync::Arc;

use event_types::EventType;

use crate::node::NodeId;

/// Well-known event type names
pub mod event_types {
    /// Event type string (`"input"`, `"click"`, ...)
    pub type EventType = String;

    pub const INPUT: &str = "input";
    pub const CLICK: &str = "click";
    pub const MOUSE_OVER: &str = "mouseover";
    pub const MOUSE_OUT: &str = "mouseout";
}

/// Event delivered to listeners
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    /// Node the event was dispatched on
    pub target: NodeId,
    /// Node whose listener is currently running
    pub current_target: NodeId,
    pub bubbles: bool,
    /// Payload for input events
    pub data: Option<String>,
    /// `insertText`, `insertFromPaste`, ...
    pub input_type: Option<String>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// A bare event; target is filled in at dispatch
    pub fn new(event_type: &str, bubbles: bool) -> Self {
        Self {
            event_type: event_type.to_string(),
            target: NodeId(0),
            current_target: NodeId(0),
            bubbles,
            data: None,
            input_type: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Bubbling `input` event as a host framework expects after programmatic edits
    pub fn input(data: Option<String>) -> Self {
        Self {
            data,
            input_type: Some("insertText".to_string()),
            ..Self::new(event_types::INPUT, true)
        }
    }

    /// Bubbling `click` event
    pub fn click() -> Self {
        Self::new(event_types::CLICK, true)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Listener callback
///
/// Listeners run with no document lock held, so they are free to query and
/// mutate the document that dispatched the event.
pub type Listener = Arc<dyn Fn(&mut Event) + Send + Sync>;

/// Registered listener with its type filter
#[derive(Clone)]
pub(crate) struct ListenerEntry {
    pub event_type: EventType,
    pub listener: Listener,
}

/// What changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from `target`
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// An attribute (or inline style) of `target` changed
    Attributes { name: String },
    /// Text of a character-data node changed
    CharacterData,
}

/// One change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            target,
            kind: MutationKind::ChildList { added, removed },
        }
    }

    pub fn attribute(target: NodeId, name: &str) -> Self {
        Self {
            target,
            kind: MutationKind::Attributes {
                name: name.to_string(),
            },
        }
    }

    pub fn character_data(target: NodeId) -> Self {
        Self {
            target,
            kind: MutationKind::CharacterData,
        }
    }
}
