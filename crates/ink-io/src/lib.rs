//! File import/export and persisted settings.

mod decode;
mod import;
mod settings;

use std::fs;
use std::path::Path;

use ink_core::EditorError;
use ink_core::EditorResult;

pub use decode::decode_text;
pub use import::DOCUMENT_EXTENSIONS;
pub use import::ImportFormat;
pub use import::ImportedDocument;
pub use import::import_bytes;
pub use import::import_file;
pub use import::pdf_text_to_html;
pub use import::plain_text_to_html;
pub use settings::AppSettings;

/// Writes editor markup to `path`, creating parent directories as needed.
pub fn save_html(path: &Path, html: &str) -> EditorResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|error| {
                EditorError::new(
                    "io.dir_create_failed",
                    format!("failed to create `{}`: {error}", parent.display()),
                )
            })?;
        }
    }

    fs::write(path, html).map_err(|error| {
        EditorError::new(
            "io.write_failed",
            format!("failed to write `{}`: {error}", path.display()),
        )
    })?;
    tracing::info!(path = %path.display(), bytes = html.len(), "saved html");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::import_file;
    use super::save_html;

    #[test]
    fn saved_html_imports_unchanged() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("{error}"),
        };
        let path = dir.path().join("out").join("doc.html");
        let html = r#"<p><span style="font-size: 14px;">hi</span></p>"#;

        assert_eq!(save_html(&path, html), Ok(()));
        let imported = match import_file(&path) {
            Ok(imported) => imported,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(imported.html, html);
    }
}
