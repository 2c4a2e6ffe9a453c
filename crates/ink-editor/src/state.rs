use std::path::Path;
use std::path::PathBuf;

/// Unsaved-changes tracking plus the file the document was opened from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    dirty: bool,
    file_path: Option<PathBuf>,
}

impl DocumentState {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        if !self.dirty {
            tracing::debug!("document marked dirty");
        }
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentState;
    use std::path::Path;

    #[test]
    fn starts_clean_without_path() {
        let state = DocumentState::default();
        assert!(!state.is_dirty());
        assert!(state.file_path().is_none());
    }

    #[test]
    fn dirty_flag_round_trips() {
        let mut state = DocumentState::default();
        state.mark_dirty();
        state.mark_dirty();
        assert!(state.is_dirty());
        state.mark_clean();
        assert!(!state.is_dirty());
    }

    #[test]
    fn keeps_opened_path() {
        let mut state = DocumentState::default();
        state.set_file_path(Some("notes/today.txt".into()));
        assert_eq!(state.file_path(), Some(Path::new("notes/today.txt")));
    }
}
