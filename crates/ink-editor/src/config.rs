use serde::Deserialize;
use serde::Serialize;

/// Editor behaviour knobs, persisted as part of the application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Pixel sizes offered by the size selector, in display order.
    #[serde(default = "default_size_options")]
    pub size_options: Vec<u32>,

    #[serde(default = "default_size_px")]
    pub default_size_px: u32,

    /// Font size of the editable root before any styling applies.
    #[serde(default = "default_root_font_size_px")]
    pub root_font_size_px: u32,

    /// Undo snapshots kept before the oldest is dropped.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Tag defaults used when computing effective styles.
    #[serde(default = "default_base_stylesheet")]
    pub base_stylesheet: String,
}

fn default_size_options() -> Vec<u32> {
    vec![10, 11, 12, 14, 16, 18, 20, 24, 28, 32, 36, 48, 72]
}

fn default_size_px() -> u32 {
    12
}

fn default_root_font_size_px() -> u32 {
    16
}

fn default_history_limit() -> usize {
    100
}

fn default_base_stylesheet() -> String {
    ink_style::BASE_STYLESHEET.to_owned()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            size_options: default_size_options(),
            default_size_px: default_size_px(),
            root_font_size_px: default_root_font_size_px(),
            history_limit: default_history_limit(),
            base_stylesheet: default_base_stylesheet(),
        }
    }
}
