//! Boundary points, ranges and the range-scoped tree edits built on them.

use crate::Document;
use crate::Element;
use crate::NodeId;
use std::cmp::Ordering;

/// A boundary point. `offset` counts characters inside text nodes and child
/// slots inside elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// A boundary point expressed relative to nodes rather than child slots, so it
/// survives edits that move those nodes around (wrapping, unwrapping, tag
/// replacement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Character offset inside a text node.
    Text(NodeId, usize),
    Before(NodeId),
    After(NodeId),
    /// Inside an element that had no children.
    Empty(NodeId),
}

impl Document {
    pub fn anchor(&self, position: Position) -> Anchor {
        if self.is_text(position.node) {
            return Anchor::Text(position.node, position.offset);
        }
        let children = self.children(position.node);
        match position.offset.min(children.len()) {
            _ if children.is_empty() => Anchor::Empty(position.node),
            0 => Anchor::Before(children[0]),
            offset => Anchor::After(children[offset - 1]),
        }
    }

    /// Turns an anchor back into a boundary point. `None` once the anchor
    /// node has left the tree.
    pub fn resolve_anchor(&self, anchor: Anchor) -> Option<Position> {
        let position = match anchor {
            Anchor::Text(node, offset) => Position::new(node, offset.min(self.node_length(node))),
            Anchor::Empty(node) => Position::new(node, 0),
            Anchor::Before(node) => Position::new(self.parent(node)?, self.index_in_parent(node)?),
            Anchor::After(node) => {
                Position::new(self.parent(node)?, self.index_in_parent(node)? + 1)
            }
        };
        self.is_attached(position.node).then_some(position)
    }

    /// Orders two boundary points in tree order. `None` when either point is
    /// detached from the root.
    pub fn compare_positions(&self, left: Position, right: Position) -> Option<Ordering> {
        Some(self.position_key(left)?.cmp(&self.position_key(right)?))
    }

    fn position_key(&self, position: Position) -> Option<Vec<usize>> {
        let mut key = self.path_of(position.node)?;
        key.push(position.offset.min(self.node_length(position.node)));
        Some(key)
    }

    /// Clamps offsets and orders the endpoints. `None` for detached ranges.
    pub fn normalized_range(&self, range: Range) -> Option<Range> {
        let clamp = |position: Position| Position {
            node: position.node,
            offset: position.offset.min(self.node_length(position.node)),
        };
        let start = clamp(range.start);
        let end = clamp(range.end);
        match self.compare_positions(start, end)? {
            Ordering::Greater => Some(Range::new(end, start)),
            _ => Some(Range::new(start, end)),
        }
    }

    pub fn select_node_contents(&self, node: NodeId) -> Range {
        Range::new(
            Position::new(node, 0),
            Position::new(node, self.node_length(node)),
        )
    }

    /// Deepest node containing both endpoints.
    pub fn common_ancestor_container(&self, range: Range) -> Option<NodeId> {
        self.common_ancestor(range.start.node, range.end.node)
    }

    /// True when some part of `node` lies inside `range`.
    pub fn intersects_node(&self, range: Range, node: NodeId) -> bool {
        let (Some(parent), Some(index)) = (self.parent(node), self.index_in_parent(node)) else {
            return self.contains_id(node);
        };
        let before = Position::new(parent, index);
        let after = Position::new(parent, index + 1);
        matches!(
            self.compare_positions(before, range.end),
            Some(Ordering::Less)
        ) && matches!(
            self.compare_positions(after, range.start),
            Some(Ordering::Greater)
        )
    }

    /// Inserts `node` at a boundary point, splitting a text node when the
    /// point falls inside one.
    pub fn insert_at(&mut self, at: Position, node: NodeId) -> bool {
        if self.is_element(at.node) {
            let index = at.offset.min(self.child_count(at.node));
            return self.insert_child(at.node, index, node);
        }

        let length = self.node_length(at.node);
        if at.offset == 0 {
            return self.insert_before(at.node, node);
        }
        if at.offset >= length {
            return self.insert_after(at.node, node);
        }
        match self.split_text(at.node, at.offset) {
            Some(tail) => self.insert_before(tail, node),
            None => false,
        }
    }

    /// Moves the content covered by `range` into a new element built from
    /// `wrapper`, puts the element where the content was, and returns it along
    /// with a range spanning its contents.
    ///
    /// Partially covered ancestors are split so the wrapper ends up as a child
    /// of the range's common ancestor. Returns `None` for collapsed or empty
    /// ranges, leaving the tree untouched apart from text splits.
    pub fn wrap_range(&mut self, range: Range, wrapper: Element) -> Option<(NodeId, Range)> {
        let (container, start, end) = self.isolate_range(range)?;
        let moved = self.children(container)[start..end].to_vec();
        let wrapper = self.create_element_with(wrapper);
        for node in moved {
            self.append_child(wrapper, node);
        }
        self.insert_child(container, start, wrapper);
        tracing::trace!(
            wrapper = wrapper.index(),
            container = container.index(),
            children = self.child_count(wrapper),
            "wrapped range"
        );
        Some((wrapper, self.select_node_contents(wrapper)))
    }

    /// Removes the content covered by `range` and returns the collapsed point
    /// where it used to start.
    pub fn delete_range(&mut self, range: Range) -> Option<Position> {
        let normalized = self.normalized_range(range)?;
        if normalized.is_collapsed() {
            return Some(normalized.start);
        }
        let Some((container, start, end)) = self.isolate_range(normalized) else {
            return Some(normalized.start);
        };
        let removed = self.children(container)[start..end].to_vec();
        for node in removed {
            self.detach(node);
        }
        Some(Position::new(container, start))
    }

    /// Splits the tree at both endpoints so the range covers whole children
    /// `start..end` of a single element.
    fn isolate_range(&mut self, range: Range) -> Option<(NodeId, usize, usize)> {
        let range = self.normalized_range(range)?;
        if range.is_collapsed() {
            return None;
        }

        let mut container = self.common_ancestor_container(range)?;
        if self.is_text(container) {
            container = self.parent(container)?;
        }

        // The end is split first so the start endpoint's offsets stay valid;
        // the end slot is then re-read through the node that follows it.
        let end = self.split_boundary(range.end, container)?;
        let end_ref = self.children(container).get(end).copied();
        let start = self.split_boundary(range.start, container)?;
        let end = match end_ref {
            Some(node) => self.index_in_parent(node)?,
            None => self.child_count(container),
        };

        (start < end).then_some((container, start, end))
    }

    /// Splits every node between `at` and `container` so that `at` becomes a
    /// child slot of `container`. Returns that slot.
    fn split_boundary(&mut self, at: Position, container: NodeId) -> Option<usize> {
        let mut node = at.node;
        let mut offset = at.offset;

        if self.is_text(node) {
            let length = self.node_length(node);
            let parent = self.parent(node)?;
            let index = self.index_in_parent(node)?;
            offset = if offset == 0 {
                index
            } else if offset >= length {
                index + 1
            } else {
                self.split_text(node, offset)?;
                index + 1
            };
            node = parent;
        }

        while node != container {
            let parent = self.parent(node)?;
            let index = self.index_in_parent(node)?;
            let count = self.child_count(node);
            offset = if offset == 0 {
                index
            } else if offset >= count {
                index + 1
            } else {
                let twin = self.shallow_clone(node)?;
                let tail = self.children(node)[offset..].to_vec();
                for child in tail {
                    self.append_child(twin, child);
                }
                self.insert_child(parent, index + 1, twin);
                index + 1
            };
            node = parent;
        }

        Some(offset.min(self.child_count(container)))
    }
}
