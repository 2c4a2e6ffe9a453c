//! Shared primitives used across Inkpress crates.

/// Result alias used across the workspace.
pub type EditorResult<T> = Result<T, EditorError>;

/// Error raised at the fallible edges of the editor (files, settings, printing).
///
/// Formatting operations never produce one; they degrade to no-ops instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct EditorError {
    pub code: &'static str,
    pub message: String,
}

impl EditorError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Returns the subsystem prefix of the error code (`io` for `io.read_failed`).
    pub fn domain(&self) -> &'static str {
        self.code
            .split_once('.')
            .map(|(domain, _)| domain)
            .unwrap_or(self.code)
    }
}
