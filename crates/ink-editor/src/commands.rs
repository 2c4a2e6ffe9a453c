//! Toolbar commands in the style of `execCommand`: inline toggles,
//! paragraph alignment, legacy font sizes and history.

use std::fmt;
use std::str::FromStr;

use ink_core::EditorError;
use ink_dom::Document;
use ink_dom::Element;
use ink_dom::NodeId;
use ink_dom::Range;
use ink_html::is_block;
use ink_style::StyleDeclaration;
use ink_style::TextAlign;

use crate::formatter::wrap_selection;
use crate::surface::EditorSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCommand {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    /// Legacy size code 1 through 7.
    FontSize(u8),
    Undo,
    Redo,
}

impl NativeCommand {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::StrikeThrough => "strikeThrough",
            Self::JustifyLeft => "justifyLeft",
            Self::JustifyCenter => "justifyCenter",
            Self::JustifyRight => "justifyRight",
            Self::FontSize(_) => "fontSize",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    /// Parses a command name and its optional value, as a toolbar button's
    /// `data-cmd` would carry them. Names are matched case-insensitively.
    pub fn parse(name: &str, value: Option<&str>) -> Option<Self> {
        let command = match name.trim().to_ascii_lowercase().as_str() {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "strikethrough" => Self::StrikeThrough,
            "justifyleft" => Self::JustifyLeft,
            "justifycenter" => Self::JustifyCenter,
            "justifyright" => Self::JustifyRight,
            "fontsize" => {
                let code = value?.trim().parse::<u8>().ok()?;
                if !(1..=7).contains(&code) {
                    return None;
                }
                Self::FontSize(code)
            }
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            _ => return None,
        };
        Some(command)
    }

    /// Tags that count as this inline style being on. The first one is used
    /// when wrapping.
    pub fn inline_tags(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Bold => Some(&["b", "strong"]),
            Self::Italic => Some(&["i", "em"]),
            Self::Underline => Some(&["u"]),
            Self::StrikeThrough => Some(&["s", "strike"]),
            _ => None,
        }
    }

    pub fn alignment(self) -> Option<TextAlign> {
        match self {
            Self::JustifyLeft => Some(TextAlign::Left),
            Self::JustifyCenter => Some(TextAlign::Center),
            Self::JustifyRight => Some(TextAlign::Right),
            _ => None,
        }
    }
}

impl fmt::Display for NativeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontSize(code) => write!(f, "{}={code}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Accepts `name` or `name=value`, e.g. `bold` or `fontSize=5`.
impl FromStr for NativeCommand {
    type Err = EditorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name, value) = match input.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (input, None),
        };
        Self::parse(name, value).ok_or_else(|| {
            EditorError::new(
                "command.unknown",
                format!("unrecognized editor command: {input}"),
            )
        })
    }
}

/// Removes the nearest element with one of `tags` around the selection, or
/// wraps the selection in `tags[0]` when there is none.
pub(crate) fn toggle_inline(surface: &mut EditorSurface, tags: &[&str]) -> bool {
    let Some(range) = surface.selection() else {
        return false;
    };
    let Some(container) = surface.selection_container() else {
        return false;
    };
    let root = surface.root();
    let document = surface.document();
    let existing = document
        .inclusive_ancestors(container)
        .take_while(|id| *id != root)
        .find(|id| document.tag(*id).is_some_and(|tag| tags.contains(&tag)));

    if let Some(element) = existing {
        tracing::debug!(element = element.index(), "toggling inline style off");
        return surface.edit_preserving_selection(|document| document.unwrap_node(element));
    }
    let Some(tag) = tags.first() else {
        return false;
    };
    wrap_selection(surface, range, Element::new(*tag))
}

/// Sets `text-align` on every block the selection touches. Inline content
/// sitting directly in the root is first wrapped in a `div` so it has a block
/// to carry the alignment.
pub(crate) fn justify(surface: &mut EditorSurface, align: TextAlign) -> bool {
    let Some(range) = surface.selection() else {
        return false;
    };
    let root = surface.root();
    let wrapped = surface.edit_preserving_selection(|document| wrap_inline_runs(document, root, range));

    let Some(range) = surface.selection() else {
        return wrapped > 0;
    };
    let document = surface.document_mut();
    let blocks: Vec<NodeId> = document
        .descendants(root)
        .into_iter()
        .filter(|id| document.tag(*id).is_some_and(is_block) && document.intersects_node(range, *id))
        .collect();

    let mut aligned = 0_usize;
    for block in blocks {
        if document.style_property(block, "text-align").as_deref() == Some(align.as_css()) {
            continue;
        }
        if document.set_style_property(block, "text-align", align.as_css()) {
            aligned += 1;
        }
    }
    tracing::debug!(aligned, wrapped, align = align.as_css(), "justified selection");
    aligned > 0 || wrapped > 0
}

fn wrap_inline_runs(document: &mut Document, root: NodeId, range: Range) -> usize {
    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    let mut current: Vec<NodeId> = Vec::new();
    for child in document.children(root).to_vec() {
        if document.tag(child).is_some_and(is_block) {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(child);
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.retain(|run| run.iter().any(|node| document.intersects_node(range, *node)));

    let mut wrapped = 0_usize;
    for run in runs {
        let Some(first) = run.first().copied() else {
            continue;
        };
        let block = document.create_element("div");
        if !document.insert_before(first, block) {
            continue;
        }
        for node in run {
            document.append_child(block, node);
        }
        wrapped += 1;
    }
    wrapped
}

/// Wraps the selection in `<font size=code>`, the artifact the normalizer
/// later rewrites.
pub(crate) fn wrap_legacy_size(surface: &mut EditorSurface, code: u8) -> bool {
    let Some(range) = surface.selection() else {
        return false;
    };
    let font = Element::new("font").with_attr("size", code.to_string());
    wrap_selection(surface, range, font)
}

#[cfg(test)]
mod tests {
    use super::NativeCommand;
    use super::justify;
    use super::toggle_inline;
    use super::wrap_legacy_size;
    use crate::surface::EditorSurface;
    use ink_dom::Position;
    use ink_dom::Range;
    use ink_html::HtmlParser;
    use ink_html::serialize_children;
    use ink_style::TextAlign;

    fn surface(markup: &str) -> EditorSurface {
        let mut surface = EditorSurface::new();
        surface.replace_document(HtmlParser.parse_fragment(markup));
        surface
    }

    fn html(surface: &EditorSurface) -> String {
        serialize_children(surface.document(), surface.root())
    }

    #[test]
    fn parses_toolbar_command_names() {
        assert_eq!(NativeCommand::parse("bold", None), Some(NativeCommand::Bold));
        assert_eq!(
            NativeCommand::parse("justifyCenter", None),
            Some(NativeCommand::JustifyCenter)
        );
        assert_eq!(
            NativeCommand::parse("fontSize", Some("5")),
            Some(NativeCommand::FontSize(5))
        );
        assert_eq!(NativeCommand::parse("fontSize", Some("9")), None);
        assert_eq!(NativeCommand::parse("fontSize", None), None);
        assert_eq!(NativeCommand::parse("insertImage", None), None);
    }

    #[test]
    fn from_str_accepts_values_and_reports_unknown_names() {
        assert_eq!("fontSize=3".parse::<NativeCommand>(), Ok(NativeCommand::FontSize(3)));
        assert_eq!("strikeThrough".parse::<NativeCommand>(), Ok(NativeCommand::StrikeThrough));
        let Err(error) = "explode".parse::<NativeCommand>() else {
            panic!("unknown command should fail");
        };
        assert_eq!(error.code, "command.unknown");
        assert_eq!(NativeCommand::FontSize(3).to_string(), "fontSize=3");
    }

    #[test]
    fn bold_wraps_then_unwraps() {
        let mut surface = surface("<p>abc</p>");
        let paragraph = surface.document().children(surface.root())[0];
        let text = surface.document().children(paragraph)[0];
        surface.select(Range::new(Position::new(text, 0), Position::new(text, 3)));

        assert!(toggle_inline(&mut surface, &["b", "strong"]));
        assert_eq!(html(&surface), "<p><b>abc</b></p>");

        assert!(toggle_inline(&mut surface, &["b", "strong"]));
        assert_eq!(html(&surface), "<p>abc</p>");
        assert!(surface.selection().is_some());
    }

    #[test]
    fn strong_counts_as_bold() {
        let mut surface = surface("<strong>abc</strong>");
        let strong = surface.document().children(surface.root())[0];
        let text = surface.document().children(strong)[0];
        surface.select(Range::new(Position::new(text, 1), Position::new(text, 2)));
        assert!(toggle_inline(&mut surface, &["b", "strong"]));
        assert_eq!(html(&surface), "abc");
    }

    #[test]
    fn justify_sets_alignment_on_touched_blocks() {
        let mut surface = surface("<p>one</p><p>two</p><p>three</p>");
        let root = surface.root();
        let first = surface.document().children(root)[0];
        let second = surface.document().children(root)[1];
        let one = surface.document().children(first)[0];
        let two = surface.document().children(second)[0];
        surface.select(Range::new(Position::new(one, 1), Position::new(two, 1)));

        assert!(justify(&mut surface, TextAlign::Center));
        assert_eq!(
            html(&surface),
            r#"<p style="text-align: center;">one</p><p style="text-align: center;">two</p><p>three</p>"#
        );
        assert!(!justify(&mut surface, TextAlign::Center));
    }

    #[test]
    fn justify_wraps_bare_inline_run() {
        let mut surface = surface("plain <b>text</b><p>para</p>");
        let text = surface.document().children(surface.root())[0];
        surface.select(Range::collapsed(Position::new(text, 2)));

        assert!(justify(&mut surface, TextAlign::Right));
        assert_eq!(
            html(&surface),
            r#"<div style="text-align: right;">plain <b>text</b></div><p>para</p>"#
        );
        let Some(caret) = surface.selection() else {
            panic!("caret should survive wrapping");
        };
        assert_eq!(caret.start, Position::new(text, 2));
    }

    #[test]
    fn legacy_size_wraps_in_font_tag() {
        let mut surface = surface("abc");
        surface.select_all();
        assert!(wrap_legacy_size(&mut surface, 4));
        assert_eq!(html(&surface), r#"<font size="4">abc</font>"#);
    }
}
