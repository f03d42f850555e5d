//! Composer watcher
//!
//! Two states: `Idle` (nothing tracked) and `Attached` (tracking an anchor
//! node). Every mutation burst re-runs the adapter's anchor lookup and feeds
//! the result to [`DomWatcher::observe`]:
//!
//! | Tracked   | Located      | Transition |
//! |-----------|--------------|------------|
//! | none      | none         | `NoChange` |
//! | none      | `a`          | `Attach`   |
//! | `a`       | `a`          | `NoChange` |
//! | `a`       | `b`          | `Replace`  |
//! | `a`       | none         | `NoChange` |
//!
//! A vanished anchor does not return the watcher to `Idle`; the last bar is
//! left in place until a new composer shows up. A transition whose injection
//! fails is rolled back with [`DomWatcher::restore`] and retried on the next
//! burst.

use page_dom::{Document, MutationRecord, NodeId};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::adapter::InputAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Attached { anchor: NodeId },
}

/// Outcome of one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NoChange,
    /// First anchor seen
    Attach(NodeId),
    /// The tracked anchor was superseded by a different node
    Replace { previous: NodeId, anchor: NodeId },
}

impl Transition {
    /// Anchor a bar must now be injected against, if any
    pub fn anchor(&self) -> Option<NodeId> {
        match *self {
            Transition::NoChange => None,
            Transition::Attach(anchor) | Transition::Replace { anchor, .. } => Some(anchor),
        }
    }
}

#[derive(Debug)]
pub struct DomWatcher {
    state: WatchState,
}

impl DomWatcher {
    pub fn new() -> Self {
        Self {
            state: WatchState::Idle,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn current_anchor(&self) -> Option<NodeId> {
        match self.state {
            WatchState::Idle => None,
            WatchState::Attached { anchor } => Some(anchor),
        }
    }

    /// Feed the result of an anchor lookup
    pub fn observe(&mut self, located: Option<NodeId>) -> Transition {
        let Some(anchor) = located else {
            return Transition::NoChange;
        };
        let transition = match self.state {
            WatchState::Idle => Transition::Attach(anchor),
            WatchState::Attached { anchor: current } if current == anchor => Transition::NoChange,
            WatchState::Attached { anchor: previous } => Transition::Replace { previous, anchor },
        };
        self.state = WatchState::Attached { anchor };
        transition
    }

    /// Put back a state saved before an observation whose injection failed,
    /// so the next check reports the same transition again
    pub fn restore(&mut self, state: WatchState) {
        self.state = state;
    }

    /// Look the anchor up through `adapter` and observe the result
    pub fn check(&mut self, doc: &Document, adapter: &dyn InputAdapter) -> Transition {
        self.observe(adapter.locate_anchor(doc))
    }
}

impl Default for DomWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// `first` plus every record already queued behind it
///
/// A host re-render produces many records at once; the anchor only needs
/// to be looked up once per burst.
pub fn drain_burst(
    mutations: &mut UnboundedReceiver<MutationRecord>,
    first: MutationRecord,
) -> Vec<MutationRecord> {
    let mut burst = vec![first];
    while let Ok(record) = mutations.try_recv() {
        burst.push(record);
    }
    burst
}
