//! Page DOM - host page document model
//!
//! This crate provides the document the quick-prompt content script runs
//! against: a tree of element and text nodes with the small slice of DOM
//! behaviour that composer adaptation depends on:
//!
//! - Stable node identity (`NodeId`) for "is this still the same composer?" checks
//! - A CSS selector subset for locating composer anchors and input widgets
//! - Ranges and a document selection for caret-aware text insertion
//! - Focus, event listeners and bubbling dispatch (`input`, `click`)
//! - A mutation notification stream over the whole document
//!
//! # Example
//!
//! ```rust,ignore
//! use page_dom::{Document, Event};
//!
//! let doc = Document::new();
//! let mut mutations = doc.observe();
//! let composer = doc.build("div").id("composer-background").append_to(doc.body())?;
//!
//! while let Some(record) = mutations.recv().await {
//!     println!("{:?}", record);
//! }
//! ```

mod builder;
pub mod document;
pub mod error;
pub mod events;
pub mod node;
pub mod range;
mod selector;
mod tree;

pub use builder::ElementBuilder;
pub use document::{Document, WeakDocument};
pub use error::{DomError, Result};
pub use events::{event_types, Event, Listener, MutationKind, MutationRecord};
pub use node::{ElementData, NodeId, NodeKind};
pub use range::{BoundaryPoint, Range};
pub use selector::SelectorList;
