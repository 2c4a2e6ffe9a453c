use std::collections::VecDeque;

use ink_dom::Document;
use ink_dom::Range;

/// Document tree plus the selection that went with it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub document: Document,
    pub selection: Option<Range>,
}

/// Bounded undo/redo stacks of whole-document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Records the state before an edit. Any redo branch is discarded.
    pub fn record(&mut self, before: Snapshot) {
        if self.limit == 0 {
            return;
        }
        self.redo.clear();
        self.undo.push_back(before);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Swaps `current` for the most recent undo snapshot.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use super::Snapshot;
    use ink_dom::Document;

    fn snapshot(text: &str) -> Snapshot {
        let mut document = Document::new();
        let node = document.create_text(text);
        document.append_child(document.root(), node);
        Snapshot {
            document,
            selection: None,
        }
    }

    fn text_of(snapshot: &Snapshot) -> String {
        snapshot.document.text_content(snapshot.document.root())
    }

    #[test]
    fn undo_then_redo_restores_states() {
        let mut history = History::new(10);
        history.record(snapshot("one"));
        let Some(previous) = history.undo(snapshot("two")) else {
            panic!("undo should have a snapshot");
        };
        assert_eq!(text_of(&previous), "one");
        let Some(next) = history.redo(previous) else {
            panic!("redo should have a snapshot");
        };
        assert_eq!(text_of(&next), "two");
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_discards_redo_branch() {
        let mut history = History::new(10);
        history.record(snapshot("one"));
        assert!(history.undo(snapshot("two")).is_some());
        history.record(snapshot("three"));
        assert!(!history.can_redo());
    }

    #[test]
    fn limit_drops_oldest_snapshots() {
        let mut history = History::new(2);
        history.record(snapshot("a"));
        history.record(snapshot("b"));
        history.record(snapshot("c"));
        let Some(first) = history.undo(snapshot("d")) else {
            panic!("undo should have a snapshot");
        };
        assert_eq!(text_of(&first), "c");
        let Some(second) = history.undo(first) else {
            panic!("undo should have a snapshot");
        };
        assert_eq!(text_of(&second), "b");
        assert!(!history.can_undo());
    }

    #[test]
    fn zero_limit_keeps_nothing() {
        let mut history = History::new(0);
        history.record(snapshot("a"));
        assert!(!history.can_undo());
    }
}
