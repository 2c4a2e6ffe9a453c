//! Style resolution over the editor tree (inline declarations + stylesheet).

mod declaration;

pub use declaration::StyleDeclaration;
pub use declaration::nearest_declaring;

use ink_css::Rgb;
use ink_css::StyleSheet;
use ink_css::legacy_font_size_px;
use ink_css::parse_color;
use ink_css::parse_font_size;
use ink_dom::Document;
use ink_dom::Element;
use ink_dom::NodeId;

/// Tag defaults applied beneath author styles.
pub const BASE_STYLESHEET: &str = r#"
h1 { font-size: 32px; font-weight: bold; }
h2 { font-size: 24px; font-weight: bold; }
h3 { font-size: 18.72px; font-weight: bold; }
h4 { font-size: 16px; font-weight: bold; }
h5 { font-size: 13.28px; font-weight: bold; }
h6 { font-size: 10.72px; font-weight: bold; }
b, strong, th { font-weight: bold; }
i, em, cite, var, dfn { font-style: italic; }
u, ins { text-decoration: underline; }
s, strike, del { text-decoration: line-through; }
small { font-size: smaller; }
big { font-size: larger; }
center { text-align: center; }
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

/// Resolved style of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub font_size_px: f32,
    pub color: Rgb,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub text_align: TextAlign,
    pub font_family: Option<String>,
}

impl ComputedStyle {
    fn initial(root_font_size_px: f32) -> Self {
        Self {
            font_size_px: root_font_size_px,
            color: Rgb::BLACK,
            bold: false,
            italic: false,
            underline: false,
            strike: false,
            text_align: TextAlign::Left,
            font_family: None,
        }
    }
}

/// Computes styles from inline declarations, a stylesheet and legacy
/// presentational attributes.
///
/// Precedence per property: inline `style`, then stylesheet rules, then
/// legacy attributes (`font size`, `font color`, `font face`, `align`), then
/// the parent's value.
#[derive(Debug, Clone)]
pub struct StyleResolver {
    stylesheet: StyleSheet,
    root_font_size_px: f32,
}

impl StyleResolver {
    pub fn new(stylesheet: StyleSheet, root_font_size_px: f32) -> Self {
        tracing::debug!(
            rules = stylesheet.rules.len(),
            root_font_size_px,
            "style resolver ready"
        );
        Self {
            stylesheet,
            root_font_size_px,
        }
    }

    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    pub fn root_font_size_px(&self) -> f32 {
        self.root_font_size_px
    }

    /// Style of `node`. Text nodes take their parent's style.
    pub fn computed(&self, document: &Document, node: NodeId) -> ComputedStyle {
        let mut chain: Vec<NodeId> = document
            .inclusive_ancestors(node)
            .filter(|id| document.is_element(*id))
            .collect();
        chain.reverse();

        let mut style = ComputedStyle::initial(self.root_font_size_px);
        for id in chain {
            style = self.cascade(document, id, &style);
        }
        style
    }

    pub fn font_size_px(&self, document: &Document, node: NodeId) -> f32 {
        self.computed(document, node).font_size_px
    }

    /// Applies the declarations of element `node` on top of its parent style.
    pub fn cascade(&self, document: &Document, node: NodeId, parent: &ComputedStyle) -> ComputedStyle {
        let Some(element) = document.element(node) else {
            return parent.clone();
        };
        let lookup = |property: &str| self.lookup(document, node, element, property);
        let mut style = parent.clone();

        style.font_size_px = lookup("font-size")
            .and_then(|value| parse_font_size(&value))
            .map(|size| size.resolve(parent.font_size_px, self.root_font_size_px))
            .or_else(|| {
                legacy_attr(element, "size").map(|code| {
                    legacy_font_size_px(code, parent.font_size_px.round() as u32) as f32
                })
            })
            .unwrap_or(parent.font_size_px);

        if let Some(color) = lookup("color")
            .or_else(|| legacy_attr(element, "color").map(str::to_owned))
            .and_then(|value| parse_color(&value))
        {
            style.color = color;
        }

        if let Some(weight) = lookup("font-weight") {
            style.bold = is_bold_weight(&weight, parent.bold);
        }
        if let Some(slant) = lookup("font-style") {
            style.italic = matches!(slant.trim(), "italic" | "oblique");
        }
        if let Some(decoration) = lookup("text-decoration-line").or_else(|| lookup("text-decoration")) {
            let decoration = decoration.to_ascii_lowercase();
            if decoration.contains("none") {
                style.underline = false;
                style.strike = false;
            }
            style.underline |= decoration.contains("underline");
            style.strike |= decoration.contains("line-through");
        }

        if let Some(align) = lookup("text-align")
            .or_else(|| element.attr("align").map(str::to_owned))
            .and_then(|value| TextAlign::parse(&value))
        {
            style.text_align = align;
        }

        if let Some(family) = lookup("font-family").or_else(|| legacy_attr(element, "face").map(str::to_owned)) {
            style.font_family = Some(family);
        }

        style
    }

    fn lookup(&self, document: &Document, node: NodeId, element: &Element, property: &str) -> Option<String> {
        if let Some(value) = document.style_property(node, property) {
            return Some(value);
        }
        let classes: Vec<&str> = element
            .attr("class")
            .map(|class| class.split_whitespace().collect())
            .unwrap_or_default();
        self.stylesheet
            .property_for(&element.tag, &classes, property)
            .map(str::to_owned)
    }
}

fn legacy_attr<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.has_tag("font").then(|| element.attr(name)).flatten()
}

fn is_bold_weight(value: &str, parent_bold: bool) -> bool {
    match value.trim() {
        "bold" | "bolder" => true,
        "normal" | "lighter" => false,
        "inherit" => parent_bold,
        numeric => numeric.parse::<u32>().is_ok_and(|weight| weight >= 600),
    }
}

#[cfg(test)]
mod tests {
    use super::BASE_STYLESHEET;
    use super::StyleResolver;
    use super::TextAlign;
    use ink_css::CssParser;
    use ink_css::Rgb;
    use ink_dom::Document;
    use ink_dom::NodeId;
    use ink_html::HtmlParser;

    fn resolver() -> StyleResolver {
        StyleResolver::new(CssParser.parse(BASE_STYLESHEET), 16.0)
    }

    fn first_text(document: &Document) -> NodeId {
        let root = document.root();
        let Some(text) = document
            .descendants(root)
            .into_iter()
            .find(|id| document.is_text(*id))
        else {
            panic!("fixture should contain text");
        };
        text
    }

    #[test]
    fn root_uses_configured_font_size() {
        let document = Document::new();
        assert_eq!(resolver().font_size_px(&document, document.root()), 16.0);
    }

    #[test]
    fn inline_size_beats_stylesheet_and_inherits() {
        let document =
            HtmlParser.parse_fragment(r#"<h1><span style="font-size: 12px;"><b>x</b></span></h1>"#);
        let text = first_text(&document);
        let style = resolver().computed(&document, text);
        assert_eq!(style.font_size_px, 12.0);
        assert!(style.bold);
    }

    #[test]
    fn relative_sizes_resolve_against_parent() {
        let document = HtmlParser
            .parse_fragment(r#"<span style="font-size: 20px"><span style="font-size: 1.5em">x</span></span>"#);
        assert_eq!(resolver().font_size_px(&document, first_text(&document)), 30.0);
    }

    #[test]
    fn legacy_font_attributes_apply() {
        let document = HtmlParser.parse_fragment(r#"<font size="5" color="red" face="Serif">x</font>"#);
        let style = resolver().computed(&document, first_text(&document));
        assert_eq!(style.font_size_px, 16.0);
        assert_eq!(style.color, Rgb::opaque(255, 0, 0));
        assert_eq!(style.font_family.as_deref(), Some("Serif"));
    }

    #[test]
    fn legacy_size_seven_keeps_parent_size() {
        let document =
            HtmlParser.parse_fragment(r#"<span style="font-size: 28px"><font size="7">x</font></span>"#);
        assert_eq!(resolver().font_size_px(&document, first_text(&document)), 28.0);
    }

    #[test]
    fn decorations_and_alignment() {
        let document = HtmlParser
            .parse_fragment(r#"<p style="text-align: center"><u><i><s>x</s></i></u></p>"#);
        let style = resolver().computed(&document, first_text(&document));
        assert!(style.underline);
        assert!(style.italic);
        assert!(style.strike);
        assert_eq!(style.text_align, TextAlign::Center);
    }

    #[test]
    fn invalid_inline_color_inherits() {
        let document = HtmlParser.parse_fragment(
            r#"<span style="color: blue"><span style="color: nonsense">x</span></span>"#,
        );
        let style = resolver().computed(&document, first_text(&document));
        assert_eq!(style.color, Rgb::opaque(0, 0, 255));
    }
}
