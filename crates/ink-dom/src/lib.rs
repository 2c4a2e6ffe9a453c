//! DOM tree data structures.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by [`NodeId`].
//! Detaching a node never frees its slot, so ids stay valid for the lifetime of
//! the document and can be kept in selections across edits. Long-lived copies
//! such as undo snapshots should go through [`Document::compacted`], which
//! leaves detached slots behind.

mod range;

pub use range::Anchor;
pub use range::Position;
pub use range::Range;

/// ID used to address nodes in the DOM arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element payload: lowercase tag name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Attribute names are case-insensitive and stored lowercase.
    pub fn attr(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
            return;
        }
        self.attrs.push((name, value));
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let index = self.attrs.iter().position(|(key, _)| *key == name)?;
        Some(self.attrs.remove(index).1)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Old-to-new ids produced by [`Document::compacted`].
#[derive(Debug, Clone, Default)]
pub struct NodeMap(Vec<Option<NodeId>>);

impl NodeMap {
    /// The id `old` has in the compacted tree, `None` if it was detached.
    pub fn get(&self, old: NodeId) -> Option<NodeId> {
        self.0.get(old.0).copied().flatten()
    }

    pub fn position(&self, old: Position) -> Option<Position> {
        Some(Position::new(self.get(old.node)?, old.offset))
    }

    pub fn range(&self, old: Range) -> Option<Range> {
        Some(Range::new(self.position(old.start)?, self.position(old.end)?))
    }
}

/// Editable document tree rooted at a single container element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document whose root is an empty `div` container.
    pub fn new() -> Self {
        Self::with_root(Element::new("div"))
    }

    pub fn with_root(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Element(root),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, detached nodes included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|node| &node.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id)? {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(text) => Some(text.as_str()),
            NodeData::Element(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Text(_)))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Element(_)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_with(Element::new(tag))
    }

    pub fn create_element_with(&mut self, element: Element) -> NodeId {
        self.push_node(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Text(text.into()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Creates a copy of `id` without children and without a parent.
    pub fn shallow_clone(&mut self, id: NodeId) -> Option<NodeId> {
        let data = self.data(id)?.clone();
        Some(self.push_node(data))
    }

    /// Removes `id` from its parent's child list. The node keeps its subtree.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.parent = None;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let index = self.child_count(parent);
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` at `index` in `parent`, detaching it from its previous
    /// position first. `index` is interpreted against the child list before the
    /// move and clamped to its length.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> bool {
        if parent == child
            || !self.contains_id(child)
            || !self.is_element(parent)
            || self.is_inclusive_ancestor(child, parent)
        {
            return false;
        }

        let mut index = index.min(self.child_count(parent));
        if self.parent(child) == Some(parent) {
            if let Some(current) = self.index_in_parent(child) {
                if current < index {
                    index -= 1;
                }
            }
        }

        self.detach(child);
        let Some(node) = self.nodes.get_mut(parent.0) else {
            return false;
        };
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
        true
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> bool {
        let (Some(parent), Some(index)) = (self.parent(reference), self.index_in_parent(reference))
        else {
            return false;
        };
        self.insert_child(parent, index, node)
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> bool {
        let (Some(parent), Some(index)) = (self.parent(reference), self.index_in_parent(reference))
        else {
            return false;
        };
        self.insert_child(parent, index + 1, node)
    }

    /// Puts `replacement` into the slot of `old`, which becomes detached.
    pub fn replace_node(&mut self, old: NodeId, replacement: NodeId) -> bool {
        if old == replacement || !self.insert_before(old, replacement) {
            return false;
        }
        self.detach(old);
        true
    }

    /// Moves every child of `from` to the end of `to`, preserving identity.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = self.children(from).to_vec();
        for child in children {
            self.append_child(to, child);
        }
    }

    /// Replaces `id` with its own children.
    pub fn unwrap_node(&mut self, id: NodeId) -> bool {
        let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) else {
            return false;
        };
        let children = self.children(id).to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_child(parent, index + offset, child);
        }
        self.detach(id);
        true
    }

    /// Copies the tree reachable from the root into a fresh arena, in
    /// document order. Detached nodes are not carried over.
    pub fn compacted(&self) -> (Document, NodeMap) {
        let mut map = vec![None; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(slot) = map.get_mut(id.0) {
                *slot = Some(NodeId(order.len()));
            }
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }

        let map = NodeMap(map);
        let nodes = order
            .iter()
            .filter_map(|id| self.nodes.get(id.0))
            .map(|node| Node {
                parent: node.parent.and_then(|parent| map.get(parent)),
                children: node
                    .children
                    .iter()
                    .filter_map(|child| map.get(*child))
                    .collect(),
                data: node.data.clone(),
            })
            .collect();
        let document = Document {
            nodes,
            root: NodeId(0),
        };
        (document, map)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    /// `id` followed by its ancestors, nearest first.
    pub fn inclusive_ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.contains_id(id).then_some(id),
        }
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inclusive_ancestors(node).any(|id| id == ancestor)
    }

    /// True when `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, id)
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn common_ancestor(&self, left: NodeId, right: NodeId) -> Option<NodeId> {
        let chain: Vec<NodeId> = self.inclusive_ancestors(left).collect();
        self.inclusive_ancestors(right)
            .find(|candidate| chain.contains(candidate))
    }

    /// Child indices leading from the root to `id`; `None` for detached nodes.
    pub fn path_of(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    /// Length of a text node in characters; child count for elements.
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.data(id) {
            Some(NodeData::Text(text)) => text.chars().count(),
            Some(NodeData::Element(_)) => self.child_count(id),
            None => 0,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> bool {
        match self.nodes.get_mut(id.0).map(|node| &mut node.data) {
            Some(NodeData::Text(text)) => {
                *text = value.into();
                true
            }
            _ => false,
        }
    }

    /// Inserts `value` into a text node at a character offset. Returns the
    /// character offset just after the inserted text.
    pub fn insert_text_at(&mut self, id: NodeId, offset: usize, value: &str) -> Option<usize> {
        let Some(NodeData::Text(text)) = self.nodes.get_mut(id.0).map(|node| &mut node.data)
        else {
            return None;
        };
        let byte = char_to_byte(text, offset);
        text.insert_str(byte, value);
        Some(text[..byte].chars().count() + value.chars().count())
    }

    /// Splits a text node at a character offset. The original keeps the head,
    /// the returned node holds the tail and is inserted right after it.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let Some(NodeData::Text(text)) = self.nodes.get_mut(id.0).map(|node| &mut node.data)
        else {
            return None;
        };
        let byte = char_to_byte(text, offset);
        let tail = text.split_off(byte);
        let tail_id = self.create_text(tail);
        if self.parent(id).is_some() {
            self.insert_after(id, tail_id);
        }
        tracing::trace!(node = id.index(), offset, tail = tail_id.index(), "split text node");
        Some(tail_id)
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_owned();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Nearest element at or above `id`.
    pub fn nearest_element(&self, id: NodeId) -> Option<NodeId> {
        self.inclusive_ancestors(id).find(|node| self.is_element(*node))
    }

    /// Elements under `scope` (inclusive) whose tag matches, in document order.
    pub fn elements_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        std::iter::once(scope)
            .chain(self.descendants(scope))
            .filter(|id| self.element(*id).is_some_and(|element| element.has_tag(tag)))
            .collect()
    }
}

/// Iterator over a node's ancestor chain.
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::Document;
    use super::Element;

    fn paragraph_with(document: &mut Document, text: &str) -> (super::NodeId, super::NodeId) {
        let p = document.create_element("p");
        let t = document.create_text(text);
        document.append_child(p, t);
        document.append_child(document.root(), p);
        (p, t)
    }

    #[test]
    fn new_document_has_attached_root() {
        let document = Document::new();
        assert_eq!(document.tag(document.root()), Some("div"));
        assert!(document.is_attached(document.root()));
        assert_eq!(document.child_count(document.root()), 0);
    }

    #[test]
    fn insert_child_moves_existing_nodes() {
        let mut document = Document::new();
        let root = document.root();
        let a = document.create_text("a");
        let b = document.create_text("b");
        let c = document.create_text("c");
        document.append_child(root, a);
        document.append_child(root, b);
        document.append_child(root, c);

        document.insert_child(root, 3, a);
        assert_eq!(document.children(root), &[b, c, a]);

        document.insert_child(root, 0, a);
        assert_eq!(document.children(root), &[a, b, c]);
    }

    #[test]
    fn refuses_to_create_cycles() {
        let mut document = Document::new();
        let (p, _) = paragraph_with(&mut document, "x");
        assert!(!document.append_child(p, document.root()));
        assert!(!document.append_child(p, p));
    }

    #[test]
    fn split_text_keeps_head_and_inserts_tail_after() {
        let mut document = Document::new();
        let (p, t) = paragraph_with(&mut document, "héllo");
        let Some(tail) = document.split_text(t, 2) else {
            panic!("split should succeed");
        };
        assert_eq!(document.text(t), Some("hé"));
        assert_eq!(document.text(tail), Some("llo"));
        assert_eq!(document.children(p), &[t, tail]);
    }

    #[test]
    fn unwrap_node_preserves_child_identity() {
        let mut document = Document::new();
        let root = document.root();
        let b = document.create_element("b");
        let t1 = document.create_text("one");
        let t2 = document.create_text("two");
        document.append_child(b, t1);
        document.append_child(b, t2);
        document.append_child(root, b);

        assert!(document.unwrap_node(b));
        assert_eq!(document.children(root), &[t1, t2]);
        assert!(!document.is_attached(b));
    }

    #[test]
    fn replace_node_swaps_slots() {
        let mut document = Document::new();
        let (p, _) = paragraph_with(&mut document, "x");
        let div = document.create_element_with(Element::new("DIV").with_attr("class", "c"));
        assert!(document.replace_node(p, div));
        assert_eq!(document.children(document.root()), &[div]);
        assert_eq!(document.attr(div, "class"), Some("c"));
        assert_eq!(document.tag(div), Some("div"));
    }

    #[test]
    fn path_and_common_ancestor() {
        let mut document = Document::new();
        let (_, first) = paragraph_with(&mut document, "a");
        let (p2, second) = paragraph_with(&mut document, "b");
        assert_eq!(document.path_of(second), Some(vec![1, 0]));
        assert_eq!(document.common_ancestor(first, second), Some(document.root()));
        assert_eq!(document.common_ancestor(second, p2), Some(p2));
    }

    #[test]
    fn insert_text_at_counts_characters() {
        let mut document = Document::new();
        let (_, t) = paragraph_with(&mut document, "añb");
        assert_eq!(document.insert_text_at(t, 2, "xy"), Some(4));
        assert_eq!(document.text(t), Some("añxyb"));
    }

    #[test]
    fn elements_by_tag_is_document_order() {
        let mut document = Document::new();
        let root = document.root();
        let outer = document.create_element("font");
        let inner = document.create_element("FONT");
        document.append_child(outer, inner);
        document.append_child(root, outer);
        assert_eq!(document.elements_by_tag(root, "font"), vec![outer, inner]);
    }

    #[test]
    fn attribute_names_ignore_case() {
        let mut element = Element::new("span").with_attr("style", "color: red;");
        element.set_attr("Style", "color: blue;");
        assert_eq!(element.attrs.len(), 1);
        assert_eq!(element.attr("STYLE"), Some("color: blue;"));
        assert_eq!(element.remove_attr("sTyLe"), Some("color: blue;".to_owned()));
        assert!(element.attrs.is_empty());
    }

    #[test]
    fn compacted_drops_detached_slots() {
        let mut document = Document::new();
        let (p, t) = paragraph_with(&mut document, "keep");
        let (gone, _) = paragraph_with(&mut document, "gone");
        let b = document.create_element("b");
        document.insert_before(t, b);
        document.append_child(b, t);
        document.detach(gone);
        assert_eq!(document.arena_len(), 6);

        let (compact, map) = document.compacted();
        assert_eq!(compact.arena_len(), 4);
        assert_eq!(map.get(gone), None);
        let (Some(new_p), Some(new_t)) = (map.get(p), map.get(t)) else {
            panic!("attached nodes should be mapped");
        };
        assert_eq!(compact.children(compact.root()), &[new_p]);
        assert_eq!(compact.text(new_t), Some("keep"));
        assert_eq!(compact.text_content(compact.root()), "keep");
        let Some(new_b) = map.get(b) else {
            panic!("wrapper should be mapped");
        };
        assert_eq!(compact.parent(new_t), Some(new_b));
        assert_eq!(compact.parent(new_b), Some(new_p));
    }
}
