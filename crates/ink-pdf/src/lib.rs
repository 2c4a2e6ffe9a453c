//! PDF print host: lays out the print snapshot and writes it with the
//! base-14 Helvetica faces.

mod layout;
mod text;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ink_core::EditorError;
use ink_core::EditorResult;
use ink_css::CssParser;
use ink_editor::PrintHost;
use ink_editor::PrintJob;
use ink_editor::PrintOutcome;
use ink_style::StyleResolver;
use pdf_writer::Content;
use pdf_writer::Name;
use pdf_writer::Pdf;
use pdf_writer::Rect;
use pdf_writer::Ref;
use pdf_writer::Str;
use pdf_writer::TextStr;

use crate::layout::PT_PER_PX;
use crate::layout::Page;
use crate::layout::PageGeometry;
use crate::layout::collect_blocks;
use crate::layout::paginate;
use crate::text::FontFace;
use crate::text::encode_win_ansi;

const PRODUCER: &str = "Inkpress";

/// Writes print jobs to a PDF file.
///
/// Without an explicit output path the job's suggested path is used. A job
/// with neither is reported as canceled.
#[derive(Debug, Clone, Default)]
pub struct PdfPrinter {
    output: Option<PathBuf>,
}

impl PdfPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(path: impl Into<PathBuf>) -> Self {
        Self {
            output: Some(path.into()),
        }
    }

    fn resolve_output(&self, job: &PrintJob<'_>) -> Option<PathBuf> {
        self.output.clone().or_else(|| {
            (!job.default_path.as_os_str().is_empty()).then(|| job.default_path.clone())
        })
    }
}

impl PrintHost for PdfPrinter {
    fn print_to_pdf(&mut self, job: &PrintJob<'_>) -> EditorResult<PrintOutcome> {
        let Some(path) = self.resolve_output(job) else {
            tracing::debug!("no output path for pdf");
            return Ok(PrintOutcome::Canceled);
        };

        let bytes = render_pdf(job, &document_title(&path));
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| {
                    EditorError::new(
                        "pdf.dir_create_failed",
                        format!("failed to create `{}`: {error}", parent.display()),
                    )
                })?;
            }
        }
        fs::write(&path, &bytes).map_err(|error| {
            EditorError::new(
                "pdf.write_failed",
                format!("failed to write `{}`: {error}", path.display()),
            )
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "pdf written");
        Ok(PrintOutcome::Saved(path))
    }
}

/// The saved file's name without its `.pdf` extension.
fn document_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| PRODUCER.to_owned())
}

/// Lays out the job's document and serializes it as a PDF.
pub fn render_pdf(job: &PrintJob<'_>, title: &str) -> Vec<u8> {
    let resolver = StyleResolver::new(
        CssParser.parse(&job.stylesheet),
        job.root_font_size_px as f32,
    );
    let (width, height) = job.settings.page_size.dimensions_pt();
    let geometry = PageGeometry {
        width,
        height,
        margin_x: job.settings.margin_horizontal_px * PT_PER_PX,
        margin_y: job.settings.margin_vertical_px * PT_PER_PX,
    };
    let blocks = collect_blocks(job.document, &resolver);
    let pages = paginate(&blocks, geometry);
    tracing::debug!(blocks = blocks.len(), pages = pages.len(), "laid out print document");
    write_pages(&pages, geometry, title)
}

fn write_pages(pages: &[Page], geometry: PageGeometry, title: &str) -> Vec<u8> {
    let mut next_ref = Ref::new(1);
    let catalog_id = next_ref.bump();
    let page_tree_id = next_ref.bump();
    let info_id = next_ref.bump();
    let font_ids = FontFace::ALL.map(|_| next_ref.bump());

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER));
    for face in FontFace::ALL {
        pdf.type1_font(font_ids[face.index()])
            .base_font(face.base_font())
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = next_ref.bump();
        let content_id = next_ref.bump();
        page_ids.push(page_id);
        {
            let mut writer = pdf.page(page_id);
            writer
                .media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height))
                .parent(page_tree_id)
                .contents(content_id);
            let mut resources = writer.resources();
            let mut fonts = resources.fonts();
            for face in FontFace::ALL {
                fonts.pair(face.resource_name(), font_ids[face.index()]);
            }
        }
        pdf.stream(content_id, &page_content(page));
    }

    let count = i32::try_from(page_ids.len()).unwrap_or(i32::MAX);
    pdf.pages(page_tree_id).kids(page_ids).count(count);
    pdf.finish()
}

fn page_content(page: &Page) -> Vec<u8> {
    let mut content = Content::new();
    for placed in &page.lines {
        for item in &placed.line.items {
            let style = item.style;
            let x = placed.x + item.x;
            let y = placed.baseline;
            let (r, g, b) = style.color.to_unit();
            content.set_fill_rgb(r, g, b);

            content.begin_text();
            content.set_font(style.face.resource_name(), style.size_pt);
            content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
            content.show(Str(&encode_win_ansi(&item.text)));
            content.end_text();

            let thickness = (style.size_pt * 0.05).max(0.5);
            if style.underline {
                content.rect(x, y - style.size_pt * 0.12, item.width, thickness);
                content.fill_nonzero();
            }
            if style.strike {
                content.rect(x, y + style.size_pt * 0.28, item.width, thickness);
                content.fill_nonzero();
            }
        }
    }
    content.finish().to_vec()
}

#[cfg(test)]
mod tests {
    use super::PdfPrinter;
    use super::document_title;
    use ink_editor::PrintHost;
    use ink_editor::PrintJob;
    use ink_editor::PrintOutcome;
    use ink_editor::PrintSettings;
    use ink_html::HtmlParser;
    use ink_style::BASE_STYLESHEET;
    use std::path::Path;
    use std::path::PathBuf;

    fn job<'a>(
        document: &'a ink_dom::Document,
        settings: &'a PrintSettings,
        default_path: PathBuf,
    ) -> PrintJob<'a> {
        PrintJob {
            document,
            title: "Text to PDF",
            stylesheet: BASE_STYLESHEET.to_owned(),
            root_font_size_px: 16,
            settings,
            default_path,
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    #[test]
    fn title_is_file_stem() {
        assert_eq!(document_title(Path::new("/tmp/My Notes.pdf")), "My Notes");
    }

    #[test]
    fn writes_pdf_to_explicit_output() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("{error}"),
        };
        let output = dir.path().join("exports").join("report.pdf");
        let document = HtmlParser.parse_fragment(
            r#"<p>Hello <b>bold</b> <span style="color: #ff0000; text-decoration: underline;">red</span></p>"#,
        );
        let settings = PrintSettings::default();
        let mut printer = PdfPrinter::with_output(&output);

        let outcome = printer.print_to_pdf(&job(&document, &settings, PathBuf::from("ignored.pdf")));
        assert_eq!(outcome, Ok(PrintOutcome::Saved(output.clone())));

        let bytes = match std::fs::read(&output) {
            Ok(bytes) => bytes,
            Err(error) => panic!("{error}"),
        };
        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, b"Helvetica-Bold"));
        assert!(contains(&bytes, b"WinAnsiEncoding"));
    }

    #[test]
    fn falls_back_to_suggested_path() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("{error}"),
        };
        let suggested = dir.path().join("notes.pdf");
        let document = HtmlParser.parse_fragment("<p>x</p>");
        let settings = PrintSettings::default();

        let outcome = PdfPrinter::new().print_to_pdf(&job(&document, &settings, suggested.clone()));
        assert_eq!(outcome, Ok(PrintOutcome::Saved(suggested.clone())));
        assert!(suggested.exists());
    }

    #[test]
    fn no_path_at_all_is_canceled() {
        let document = HtmlParser.parse_fragment("<p>x</p>");
        let settings = PrintSettings::default();
        let outcome = PdfPrinter::new().print_to_pdf(&job(&document, &settings, PathBuf::new()));
        assert_eq!(outcome, Ok(PrintOutcome::Canceled));
    }
}
