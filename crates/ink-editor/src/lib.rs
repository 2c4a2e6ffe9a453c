//! Rich-text editing core: selection-scoped formatting, legacy size
//! normalization, size readback, document lifecycle and print sessions.

mod commands;
mod config;
mod editor;
pub mod formatter;
mod guard;
mod history;
pub mod normalizer;
pub mod print;
mod readback;
mod state;
mod surface;

pub use commands::NativeCommand;
pub use config::EditorConfig;
pub use editor::DEFAULT_TITLE;
pub use editor::Editor;
pub use guard::GuardAction;
pub use guard::GuardOutcome;
pub use guard::PromptChoice;
pub use guard::PromptRequest;
pub use guard::UnsavedChangesGuard;
pub use guard::UnsavedPrompt;
pub use history::History;
pub use history::Snapshot;
pub use normalizer::normalize;
pub use print::PageSize;
pub use print::PrintHost;
pub use print::PrintJob;
pub use print::PrintOutcome;
pub use print::PrintSettings;
pub use print::default_pdf_path;
pub use readback::SizeSelector;
pub use state::DocumentState;
pub use surface::EditorSurface;
pub use surface::ZERO_WIDTH_SPACE;
