//! Print-to-PDF: swaps in a print snapshot, hands it to the host, and always
//! puts the editable document back.

use std::path::Path;
use std::path::PathBuf;

use ink_core::EditorResult;
use ink_dom::Document;
use ink_dom::Element;
use serde::Deserialize;
use serde::Serialize;

use crate::editor::Editor;
use crate::history::Snapshot;

/// Window title while the print snapshot is showing.
pub const PRINT_TITLE: &str = "Text to PDF";

pub const UNTITLED_PDF: &str = "Untitled Document.pdf";

/// Styles layered over the base stylesheet for printing.
pub const PRINT_STYLESHEET: &str = r#"
.printable { padding: 32px 40px; max-width: 750px; }
p, div, li { color: #000000; }
ul, ol { margin: 0 0 10px 1.25rem; }
p { margin: 0 0 10px 0; }
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Width and height in PDF points.
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            Self::A4 => (595.0, 842.0),
            Self::Letter => (612.0, 792.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    #[serde(default)]
    pub page_size: PageSize,

    #[serde(default)]
    pub print_background: bool,

    /// Page margin above and below the content, in CSS pixels.
    #[serde(default = "default_margin_vertical_px")]
    pub margin_vertical_px: f32,

    #[serde(default = "default_margin_horizontal_px")]
    pub margin_horizontal_px: f32,
}

fn default_margin_vertical_px() -> f32 {
    32.0
}

fn default_margin_horizontal_px() -> f32 {
    40.0
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            print_background: false,
            margin_vertical_px: default_margin_vertical_px(),
            margin_horizontal_px: default_margin_horizontal_px(),
        }
    }
}

/// Everything the host needs to print the snapshot.
#[derive(Debug)]
pub struct PrintJob<'a> {
    pub document: &'a Document,
    pub title: &'a str,
    /// Base and print stylesheets, concatenated.
    pub stylesheet: String,
    pub root_font_size_px: u32,
    pub settings: &'a PrintSettings,
    /// Suggested output path, derived from the opened file.
    pub default_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    Saved(PathBuf),
    Canceled,
}

/// Host-side PDF writer.
pub trait PrintHost {
    fn print_to_pdf(&mut self, job: &PrintJob<'_>) -> EditorResult<PrintOutcome>;
}

/// `<dir>/<stem>.pdf` for an opened file, `Untitled Document.pdf` otherwise.
pub fn default_pdf_path(opened: Option<&Path>) -> PathBuf {
    match opened {
        Some(path) if path.file_name().is_some() => path.with_extension("pdf"),
        _ => PathBuf::from(UNTITLED_PDF),
    }
}

/// Copy of `document` with the root's content moved into
/// `<section class="printable">`.
pub fn printable_document(document: &Document) -> Document {
    let mut printable = document.clone();
    let root = printable.root();
    let section =
        printable.create_element_with(Element::new("section").with_attr("class", "printable"));
    printable.move_children(root, section);
    printable.append_child(root, section);
    printable
}

/// Holds the editor while the print snapshot is showing. Dropping it puts
/// back the original document, selection and title, whatever the print
/// call returned.
struct PrintSession<'a> {
    editor: &'a mut Editor,
    original: Option<Snapshot>,
    previous_title: String,
}

impl<'a> PrintSession<'a> {
    fn begin(editor: &'a mut Editor) -> Option<Self> {
        let surface = editor.surface.as_mut()?;
        let original = surface.snapshot();
        surface.replace_document(printable_document(&original.document));
        let previous_title = std::mem::replace(&mut editor.title, PRINT_TITLE.to_owned());
        tracing::debug!("print snapshot installed");
        Some(Self {
            editor,
            original: Some(original),
            previous_title,
        })
    }

    fn document(&self) -> Option<&Document> {
        self.editor.document()
    }

    fn title(&self) -> &str {
        &self.editor.title
    }
}

impl Drop for PrintSession<'_> {
    fn drop(&mut self) {
        if let (Some(surface), Some(original)) = (self.editor.surface.as_mut(), self.original.take())
        {
            surface.restore(original);
        }
        self.editor.title = std::mem::take(&mut self.previous_title);
        tracing::debug!("print snapshot restored");
    }
}

impl Editor {
    /// Prints the document through `host`. The document is marked clean
    /// only when the host reports a saved file. Without an editable surface
    /// nothing is printed and the outcome is [`PrintOutcome::Canceled`].
    pub fn save_as_pdf(
        &mut self,
        host: &mut dyn PrintHost,
        settings: &PrintSettings,
    ) -> EditorResult<PrintOutcome> {
        let default_path = default_pdf_path(self.state.file_path());
        let stylesheet = format!("{}\n{}", self.config.base_stylesheet, PRINT_STYLESHEET);
        let root_font_size_px = self.config.root_font_size_px;

        let result = {
            let Some(session) = PrintSession::begin(self) else {
                tracing::debug!("no editable surface; nothing to print");
                return Ok(PrintOutcome::Canceled);
            };
            let Some(document) = session.document() else {
                return Ok(PrintOutcome::Canceled);
            };
            let job = PrintJob {
                document,
                title: session.title(),
                stylesheet,
                root_font_size_px,
                settings,
                default_path,
            };
            host.print_to_pdf(&job)
        };

        match &result {
            Ok(PrintOutcome::Saved(path)) => {
                self.state.mark_clean();
                tracing::info!(path = %path.display(), "saved pdf");
            }
            Ok(PrintOutcome::Canceled) => tracing::debug!("pdf save canceled"),
            Err(error) => tracing::warn!(%error, "pdf save failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::PageSize;
    use super::PrintSettings;
    use super::default_pdf_path;
    use super::printable_document;
    use ink_html::HtmlParser;
    use ink_html::serialize_children;
    use std::path::Path;
    use std::path::PathBuf;

    #[test]
    fn default_path_follows_opened_file() {
        assert_eq!(default_pdf_path(None), PathBuf::from("Untitled Document.pdf"));
        assert_eq!(
            default_pdf_path(Some(Path::new("/home/me/notes.txt"))),
            PathBuf::from("/home/me/notes.pdf")
        );
        assert_eq!(
            default_pdf_path(Some(Path::new("draft"))),
            PathBuf::from("draft.pdf")
        );
    }

    #[test]
    fn printable_document_wraps_content_in_section() {
        let document = HtmlParser.parse_fragment("<p>a</p><p>b</p>");
        let printable = printable_document(&document);
        assert_eq!(
            serialize_children(&printable, printable.root()),
            r#"<section class="printable"><p>a</p><p>b</p></section>"#
        );
        assert_eq!(
            serialize_children(&document, document.root()),
            "<p>a</p><p>b</p>"
        );
    }

    #[test]
    fn print_settings_default_to_a4_without_background() {
        let settings = PrintSettings::default();
        assert_eq!(settings.page_size, PageSize::A4);
        assert!(!settings.print_background);
        assert_eq!(PageSize::A4.dimensions_pt(), (595.0, 842.0));
    }
}
