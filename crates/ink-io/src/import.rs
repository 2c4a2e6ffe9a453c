//! Turns files on disk into editor markup.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ink_core::EditorError;
use ink_core::EditorResult;
use ink_html::escape_text;

use crate::decode::decode_text;

/// Extensions the open dialog lists as documents.
pub const DOCUMENT_EXTENSIONS: [&str; 6] = ["txt", "md", "markdown", "pdf", "html", "htm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Pdf,
    Html,
    PlainText,
}

impl ImportFormat {
    /// Chooses a format from the file extension, case-insensitively.
    /// Anything that is not PDF or HTML is read as plain text.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("html" | "htm") => Self::Html,
            _ => Self::PlainText,
        }
    }
}

/// A file ready to load into the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedDocument {
    pub path: PathBuf,
    pub format: ImportFormat,
    pub html: String,
}

pub fn import_file(path: &Path) -> EditorResult<ImportedDocument> {
    let bytes = fs::read(path).map_err(|error| {
        EditorError::new(
            "io.read_failed",
            format!("failed to read `{}`: {error}", path.display()),
        )
    })?;
    let format = ImportFormat::from_path(path);
    let html = import_bytes(&bytes, format);
    tracing::info!(path = %path.display(), ?format, bytes = bytes.len(), "imported file");
    Ok(ImportedDocument {
        path: path.to_path_buf(),
        format,
        html,
    })
}

/// Converts raw file content to markup. PDFs whose text cannot be extracted
/// produce empty content.
pub fn import_bytes(bytes: &[u8], format: ImportFormat) -> String {
    match format {
        ImportFormat::Pdf => match pdf_extract::extract_text_from_mem(bytes) {
            Ok(text) => pdf_text_to_html(&text),
            Err(error) => {
                tracing::warn!(%error, "pdf text extraction failed; opening empty document");
                String::new()
            }
        },
        ImportFormat::Html => decode_text(bytes, true),
        ImportFormat::PlainText => plain_text_to_html(&decode_text(bytes, false)),
    }
}

/// Groups consecutive non-blank lines into paragraphs joined by spaces.
pub fn pdf_text_to_html(text: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if !line.is_empty() {
            current.push(line);
        } else if !current.is_empty() {
            paragraphs.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
        .iter()
        .map(|paragraph| format!("<p>{}</p>", escape_text(paragraph)))
        .collect()
}

/// One paragraph per non-blank line, `<br>` for each blank line.
pub fn plain_text_to_html(text: &str) -> String {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| {
            if line.trim().is_empty() {
                "<br>".to_owned()
            } else {
                format!("<p>{}</p>", escape_text(line))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::ImportFormat;
    use super::import_bytes;
    use super::import_file;
    use super::pdf_text_to_html;
    use super::plain_text_to_html;
    use std::path::Path;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ImportFormat::from_path(Path::new("a.PDF")), ImportFormat::Pdf);
        assert_eq!(ImportFormat::from_path(Path::new("a.htm")), ImportFormat::Html);
        assert_eq!(ImportFormat::from_path(Path::new("a.md")), ImportFormat::PlainText);
        assert_eq!(ImportFormat::from_path(Path::new("README")), ImportFormat::PlainText);
    }

    #[test]
    fn plain_text_lines_become_paragraphs() {
        assert_eq!(
            plain_text_to_html("one\r\n\r\ntwo < three"),
            "<p>one</p><br><p>two &lt; three</p>"
        );
    }

    #[test]
    fn pdf_lines_are_grouped_into_paragraphs() {
        let text = "  First line\nsecond line \n\n\nNext para\n";
        assert_eq!(
            pdf_text_to_html(text),
            "<p>First line second line</p><p>Next para</p>"
        );
        assert_eq!(pdf_text_to_html("\n \n"), "");
    }

    #[test]
    fn unreadable_pdf_imports_as_empty() {
        assert_eq!(import_bytes(b"not a pdf", ImportFormat::Pdf), "");
    }

    #[test]
    fn html_is_kept_as_is() {
        let html = "<p><b>bold</b></p>";
        assert_eq!(import_bytes(html.as_bytes(), ImportFormat::Html), html);
    }

    #[test]
    fn reads_files_from_disk() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("{error}"),
        };
        let path = dir.path().join("notes.txt");
        if let Err(error) = std::fs::write(&path, "hello\n") {
            panic!("{error}");
        }

        let imported = match import_file(&path) {
            Ok(imported) => imported,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(imported.format, ImportFormat::PlainText);
        assert_eq!(imported.html, "<p>hello</p><br>");
    }

    #[test]
    fn missing_file_reports_read_error() {
        let Err(error) = import_file(Path::new("/definitely/not/here.txt")) else {
            panic!("missing file should fail");
        };
        assert_eq!(error.code, "io.read_failed");
    }
}
