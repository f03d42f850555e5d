//! Boundary points and ranges
//!
//! Offsets count characters inside text nodes and children inside every
//! other node, as in the DOM.

use std::cmp::Ordering;

use crate::node::NodeId;
use crate::tree::Tree;

/// A position between two children of a node, or between two characters of a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub container: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(container: NodeId, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// A contiguous span of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl Range {
    /// A collapsed range (a caret)
    pub fn caret(container: NodeId, offset: usize) -> Self {
        let point = BoundaryPoint::new(container, offset);
        Self {
            start: point,
            end: point,
        }
    }

    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    pub fn collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Collapse onto the start (`true`) or the end (`false`)
    pub fn collapse(&mut self, to_start: bool) {
        if to_start {
            self.end = self.start;
        } else {
            self.start = self.end;
        }
    }

    pub fn start_container(&self) -> NodeId {
        self.start.container
    }

    pub fn start_offset(&self) -> usize {
        self.start.offset
    }
}

/// Tree-order position of a boundary point inside an element-like container
pub(crate) fn point_path(tree: &Tree, point: BoundaryPoint) -> Vec<usize> {
    let mut path = tree.path(point.container);
    path.push(point.offset);
    path
}

/// Order two boundary points (both must be in element-like containers)
pub(crate) fn compare_points(tree: &Tree, a: BoundaryPoint, b: BoundaryPoint) -> Ordering {
    point_path(tree, a).cmp(&point_path(tree, b))
}
