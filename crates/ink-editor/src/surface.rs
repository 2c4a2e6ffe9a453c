//! The editable surface: the document tree and its live selection.

use ink_dom::Anchor;
use ink_dom::Document;
use ink_dom::NodeId;
use ink_dom::Position;
use ink_dom::Range;

use crate::history::Snapshot;

/// Placeholder character a collapsed caret sits behind inside a new wrapper.
pub const ZERO_WIDTH_SPACE: &str = "\u{200b}";

/// Owns the document tree. Formatting borrows it for the length of one call.
#[derive(Debug, Clone, Default)]
pub struct EditorSurface {
    document: Document,
    selection: Option<Range>,
    focused: bool,
}

impl EditorSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn root(&self) -> NodeId {
        self.document.root()
    }

    /// Installs a new tree and drops the selection, which pointed into the
    /// old one. Returns the previous tree.
    pub fn replace_document(&mut self, document: Document) -> Document {
        self.selection = None;
        std::mem::replace(&mut self.document, document)
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The current selection, ordered and clamped. `None` when nothing is
    /// selected or the selection no longer lies inside the editable root.
    pub fn selection(&self) -> Option<Range> {
        let range = self.selection?;
        let root = self.root();
        if !self.document.is_inclusive_ancestor(root, range.start.node)
            || !self.document.is_inclusive_ancestor(root, range.end.node)
        {
            return None;
        }
        self.document.normalized_range(range)
    }

    pub fn select(&mut self, range: Range) {
        self.selection = self.document.normalized_range(range);
    }

    pub fn select_all(&mut self) {
        let root = self.root();
        self.selection = Some(self.document.select_node_contents(root));
    }

    /// Collapses the selection to the end of the document.
    pub fn place_caret_at_end(&mut self) {
        let root = self.root();
        let end = Position::new(root, self.document.child_count(root));
        self.selection = Some(Range::collapsed(end));
    }

    /// Nearest element containing the whole selection; the root when the
    /// selection's common ancestor is the root or lies outside it.
    pub fn selection_container(&self) -> Option<NodeId> {
        let range = self.selection()?;
        let root = self.root();
        let container = self
            .document
            .common_ancestor_container(range)
            .and_then(|common| self.document.nearest_element(common))
            .filter(|element| self.document.is_inclusive_ancestor(root, *element))
            .unwrap_or(root);
        Some(container)
    }

    /// Runs a tree edit that may move nodes around the selection and keeps
    /// the selection pointing at the same content afterwards.
    pub fn edit_preserving_selection<R>(&mut self, edit: impl FnOnce(&mut Document) -> R) -> R {
        let anchors = self.selection.map(|range| {
            (
                self.document.anchor(range.start),
                self.document.anchor(range.end),
            )
        });
        let result = edit(&mut self.document);
        self.selection = anchors.and_then(|(start, end)| self.resolve_anchors(start, end));
        result
    }

    fn resolve_anchors(&self, start: Anchor, end: Anchor) -> Option<Range> {
        let start = self.document.resolve_anchor(start)?;
        let end = self.document.resolve_anchor(end)?;
        self.document.normalized_range(Range::new(start, end))
    }

    /// Inserts `text` at `at` and returns the point just after it. Text next
    /// to an existing text node is merged into it.
    pub fn insert_text(&mut self, at: Position, text: &str) -> Option<Position> {
        if text.is_empty() {
            return Some(at);
        }
        let document = &mut self.document;
        if document.is_text(at.node) {
            let end = document.insert_text_at(at.node, at.offset, text)?;
            return Some(Position::new(at.node, end));
        }

        let offset = at.offset.min(document.child_count(at.node));
        if offset > 0 {
            let previous = document.children(at.node)[offset - 1];
            if document.is_text(previous) {
                let length = document.node_length(previous);
                let end = document.insert_text_at(previous, length, text)?;
                return Some(Position::new(previous, end));
            }
        }
        let node = document.create_text(text);
        if !document.insert_child(at.node, offset, node) {
            return None;
        }
        Some(Position::new(node, text.chars().count()))
    }

    /// Exact copy of the current state. Node ids stay the same, so a caller
    /// can restore it and keep using ids it already holds.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        }
    }

    /// Copy for the undo history: only attached nodes are kept and the
    /// selection is remapped onto the compacted tree.
    pub fn history_snapshot(&self) -> Snapshot {
        let (document, map) = self.document.compacted();
        Snapshot {
            document,
            selection: self.selection.and_then(|range| map.range(range)),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.selection = snapshot.selection;
    }
}
