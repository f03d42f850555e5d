//! Error types for document operations

use thiserror::Error;

use crate::node::NodeId;

/// Result type alias using DomError
pub type Result<T> = std::result::Result<T, DomError>;

/// Errors raised by document operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// Handle does not belong to this document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Operation needs an element but got text/fragment/document
    #[error("Not an element: {0}")]
    NotAnElement(NodeId),

    /// Value/selection accessors on something that is not a textarea or input
    #[error("Not a form control: {0}")]
    NotAFormControl(NodeId),

    /// Insertion would create a cycle or put children under a leaf
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// Offset past the end of a node
    #[error("Offset {offset} out of range for {node}")]
    IndexSize { node: NodeId, offset: usize },

    /// Selector could not be parsed
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl DomError {
    pub fn hierarchy(msg: impl Into<String>) -> Self {
        Self::HierarchyRequest(msg.into())
    }
}
