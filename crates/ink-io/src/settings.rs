use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ink_core::EditorError;
use ink_core::EditorResult;
use ink_editor::EditorConfig;
use ink_editor::PrintSettings;
use serde::Deserialize;
use serde::Serialize;

const APP_DIR: &str = "inkpress";
const SETTINGS_FILE: &str = "settings.json";

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub print: PrintSettings,
}

impl AppSettings {
    /// `<config dir>/inkpress/settings.json`, or the working directory when
    /// the platform has no config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    /// Reads settings from `path`. A missing file yields defaults; a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load_from(path: &Path) -> EditorResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file; using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|error| {
            EditorError::new(
                "settings.read_failed",
                format!("failed to read settings `{}`: {error}", path.display()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|error| {
            EditorError::new(
                "settings.parse_failed",
                format!("invalid settings in `{}`: {error}", path.display()),
            )
        })
    }

    pub fn save_to(&self, path: &Path) -> EditorResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                EditorError::new(
                    "settings.dir_create_failed",
                    format!(
                        "failed to create settings directory `{}`: {error}",
                        parent.display()
                    ),
                )
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|error| {
            EditorError::new(
                "settings.serialize_failed",
                format!("failed to serialize settings: {error}"),
            )
        })?;
        fs::write(path, json).map_err(|error| {
            EditorError::new(
                "settings.write_failed",
                format!("failed to write settings `{}`: {error}", path.display()),
            )
        })
    }
}
