use std::path::PathBuf;

use ink_core::EditorResult;
use ink_css::CssParser;
use ink_dom::Document;
use ink_dom::Range;
use ink_html::HtmlParser;
use ink_html::serialize_children;
use ink_style::StyleResolver;

use crate::commands::NativeCommand;
use crate::commands::justify;
use crate::commands::toggle_inline;
use crate::commands::wrap_legacy_size;
use crate::config::EditorConfig;
use crate::formatter;
use crate::guard::GuardAction;
use crate::guard::GuardOutcome;
use crate::guard::UnsavedChangesGuard;
use crate::guard::UnsavedPrompt;
use crate::history::History;
use crate::normalizer::normalize;
use crate::print::PrintHost;
use crate::print::PrintOutcome;
use crate::print::PrintSettings;
use crate::readback::SizeSelector;
use crate::state::DocumentState;
use crate::surface::EditorSurface;

pub const DEFAULT_TITLE: &str = "Inkpress";

/// The editing window: surface, size control, history and document state.
///
/// Formatting entry points never fail. Without a mounted surface, or
/// without a selection, they log and report that nothing changed.
#[derive(Debug)]
pub struct Editor {
    pub(crate) surface: Option<EditorSurface>,
    pub(crate) state: DocumentState,
    pub(crate) title: String,
    pub(crate) config: EditorConfig,
    size_selector: SizeSelector,
    history: History,
    resolver: StyleResolver,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let mut editor = Self::detached(config);
        editor.mount();
        editor
    }

    /// An editor with no editable surface yet.
    pub fn detached(config: EditorConfig) -> Self {
        let stylesheet = CssParser.parse(&config.base_stylesheet);
        let resolver = StyleResolver::new(stylesheet, config.root_font_size_px as f32);
        Self {
            surface: None,
            state: DocumentState::default(),
            title: DEFAULT_TITLE.to_owned(),
            size_selector: SizeSelector::new(config.size_options.clone(), config.default_size_px),
            history: History::new(config.history_limit),
            resolver,
            config,
        }
    }

    pub fn mount(&mut self) {
        if self.surface.is_none() {
            self.surface = Some(EditorSurface::new());
        }
    }

    pub fn unmount(&mut self) -> Option<EditorSurface> {
        self.history.clear();
        self.surface.take()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<&EditorSurface> {
        self.surface.as_ref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.surface.as_ref().map(EditorSurface::document)
    }

    pub fn selection(&self) -> Option<Range> {
        self.surface.as_ref()?.selection()
    }

    pub fn select(&mut self, range: Range) {
        if let Some(surface) = self.surface.as_mut() {
            surface.select(range);
            self.sync_size_selector();
        }
    }

    pub fn select_all(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.select_all();
            self.sync_size_selector();
        }
    }

    pub fn focus(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.focus();
        }
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DocumentState {
        &mut self.state
    }

    pub fn size_selector(&self) -> &SizeSelector {
        &self.size_selector
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn apply_font_size(&mut self, size_px: u32) -> bool {
        self.run_format("font-size", |surface| {
            formatter::apply_font_size(surface, size_px)
        })
    }

    pub fn apply_font_color(&mut self, color: &str) -> bool {
        self.run_format("color", |surface| formatter::apply_font_color(surface, color))
    }

    pub fn remove_font_color(&mut self) -> bool {
        self.run_format("remove-color", formatter::remove_font_color)
    }

    /// The user picked `size_px` from the size control.
    pub fn choose_size(&mut self, size_px: u32) -> bool {
        if !self.size_selector.has_option(size_px) {
            tracing::debug!(size_px, "size is not offered by the selector");
            return false;
        }
        self.size_selector.reflect(size_px);
        self.apply_font_size(size_px)
    }

    pub fn exec_command(&mut self, command: NativeCommand) -> bool {
        tracing::debug!(%command, "exec command");
        self.focus();
        match command {
            NativeCommand::Undo => self.undo(),
            NativeCommand::Redo => self.redo(),
            NativeCommand::FontSize(code) => {
                self.run_format("fontSize", |surface| wrap_legacy_size(surface, code))
            }
            _ => {
                if let Some(tags) = command.inline_tags() {
                    return self.run_format(command.name(), |surface| toggle_inline(surface, tags));
                }
                if let Some(align) = command.alignment() {
                    return self.run_format(command.name(), |surface| justify(surface, align));
                }
                false
            }
        }
    }

    /// Effective font size of the element containing the selection.
    pub fn selection_font_size_px(&self) -> Option<f32> {
        let surface = self.surface.as_ref()?;
        let container = surface.selection_container()?;
        Some(self.resolver.font_size_px(surface.document(), container))
    }

    /// Shows the selection's effective size in the size control when it is
    /// one of the offered options. Returns whether the control changed.
    pub fn sync_size_selector(&mut self) -> bool {
        match self.selection_font_size_px() {
            Some(px) => self.size_selector.reflect_computed(px),
            None => false,
        }
    }

    /// Runs one formatting edit, then normalizes the whole root with the
    /// selector's size as fallback. A change is recorded for undo and marks
    /// the document dirty.
    fn run_format(
        &mut self,
        operation: &str,
        edit: impl FnOnce(&mut EditorSurface) -> bool,
    ) -> bool {
        let fallback = self.size_selector.value();
        let Some(surface) = self.surface.as_mut() else {
            tracing::debug!(operation, "no editable surface");
            return false;
        };
        let before = surface.history_snapshot();
        let edited = edit(surface);
        let root = surface.root();
        let normalized =
            surface.edit_preserving_selection(|document| normalize(document, root, fallback));

        let changed = edited || normalized > 0;
        if changed {
            self.history.record(before);
            self.state.mark_dirty();
        }
        tracing::debug!(operation, edited, normalized, "formatting applied");
        self.sync_size_selector();
        changed
    }

    fn undo(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let Some(previous) = self.history.undo(surface.history_snapshot()) else {
            return false;
        };
        surface.restore(previous);
        self.state.mark_dirty();
        self.sync_size_selector();
        true
    }

    fn redo(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let Some(next) = self.history.redo(surface.history_snapshot()) else {
            return false;
        };
        surface.restore(next);
        self.state.mark_dirty();
        self.sync_size_selector();
        true
    }

    /// Replaces the document with parsed `html`. History is cleared and the
    /// dirty flag is left alone.
    pub fn set_content(&mut self, html: &str) {
        let mut document = HtmlParser.parse_fragment(html);
        let root = document.root();
        normalize(&mut document, root, self.size_selector.value());
        self.install(document);
    }

    /// Replaces the document with a single text node.
    pub fn set_text(&mut self, text: &str) {
        let mut document = Document::new();
        if !text.is_empty() {
            let node = document.create_text(text);
            document.append_child(document.root(), node);
        }
        self.install(document);
    }

    fn install(&mut self, document: Document) {
        let Some(surface) = self.surface.as_mut() else {
            tracing::debug!("no editable surface; content dropped");
            return;
        };
        surface.replace_document(document);
        self.history.clear();
    }

    /// Serialized content of the editable root, normalized first.
    pub fn get_content(&mut self) -> String {
        let fallback = self.size_selector.value();
        let Some(surface) = self.surface.as_mut() else {
            return String::new();
        };
        let root = surface.root();
        surface.edit_preserving_selection(|document| normalize(document, root, fallback));
        serialize_children(surface.document(), root)
    }

    pub fn clear(&mut self) {
        self.set_content("");
    }

    /// Typed input: replaces the selection with `text`, or inserts at the end
    /// of the document when nothing is selected.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let fallback = self.size_selector.value();
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        surface.focus();
        let before = surface.history_snapshot();

        if surface.selection().is_none() {
            surface.place_caret_at_end();
        }
        let Some(range) = surface.selection() else {
            return false;
        };
        if text.is_empty() && range.is_collapsed() {
            return false;
        }
        let at = surface
            .document_mut()
            .delete_range(range)
            .unwrap_or(range.start);
        let Some(end) = surface.insert_text(at, text) else {
            return false;
        };
        surface.select(Range::collapsed(end));
        let root = surface.root();
        surface.edit_preserving_selection(|document| normalize(document, root, fallback));

        self.history.record(before);
        self.state.mark_dirty();
        self.sync_size_selector();
        true
    }

    /// Opens `html` as the current document, optionally backed by `path`.
    pub fn load_document(&mut self, html: &str, path: Option<PathBuf>) {
        self.set_content(html);
        tracing::info!(path = ?path, "document loaded");
        self.state.set_file_path(path);
        self.state.mark_clean();
    }

    pub fn new_document(&mut self) {
        self.clear();
        self.state.set_file_path(None);
        self.state.mark_clean();
    }

    /// Asks before `action` discards unsaved changes. Returns whether the
    /// action may go ahead; choosing Save prints through `host` first and
    /// only goes ahead if a file was written.
    pub fn guard_action(
        &mut self,
        action: GuardAction,
        prompt: &mut dyn UnsavedPrompt,
        host: &mut dyn PrintHost,
        settings: &PrintSettings,
    ) -> EditorResult<bool> {
        match UnsavedChangesGuard.check(action, &self.state, prompt) {
            GuardOutcome::Proceed => Ok(true),
            GuardOutcome::Stay => Ok(false),
            GuardOutcome::SaveThenProceed => {
                let outcome = self.save_as_pdf(host, settings)?;
                Ok(matches!(outcome, PrintOutcome::Saved(_)))
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
