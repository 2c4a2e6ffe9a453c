//! Rewrites legacy `<font size>` tags into styled `span` wrappers.

use ink_css::DeclarationBlock;
use ink_css::format_px;
use ink_css::legacy_font_size_px;
use ink_dom::Document;
use ink_dom::Element;
use ink_dom::NodeId;

/// Replaces every `font[size]` element under `container` (inclusive) with a
/// `span` declaring the equivalent pixel size, and returns how many tags were
/// rewritten.
///
/// Children move into the replacement without being copied. Code 7 and
/// unknown codes take `fallback_size_px`. A `color` attribute becomes a
/// `color` declaration and `face` becomes `font-family`. The document root is
/// never replaced, and a container outside the tree is left alone.
pub fn normalize(document: &mut Document, container: NodeId, fallback_size_px: u32) -> usize {
    if !document.is_attached(container) {
        return 0;
    }

    let root = document.root();
    let legacy: Vec<NodeId> = document
        .elements_by_tag(container, "font")
        .into_iter()
        .filter(|id| *id != root && document.attr(*id, "size").is_some())
        .collect();

    let mut rewritten = 0_usize;
    for font in legacy {
        let Some(element) = document.element(font) else {
            continue;
        };
        let code = element.attr("size").unwrap_or_default();
        let px = legacy_font_size_px(code, fallback_size_px);
        let span = replacement_for(element, px);

        let span = document.create_element_with(span);
        document.move_children(font, span);
        if document.replace_node(font, span) {
            rewritten += 1;
            tracing::debug!(font = font.index(), span = span.index(), px, "normalized legacy size tag");
        }
    }
    rewritten
}

fn replacement_for(font: &Element, px: u32) -> Element {
    let mut declarations = font
        .attr("style")
        .map(DeclarationBlock::parse)
        .unwrap_or_default();
    if let Some(color) = font.attr("color") {
        if !declarations.contains("color") {
            declarations.set("color", color);
        }
    }
    if let Some(face) = font.attr("face") {
        if !declarations.contains("font-family") {
            declarations.set("font-family", face);
        }
    }
    // The size code always wins over an inline font-size on the same tag.
    declarations.remove("font-size");
    let mut ordered = DeclarationBlock::default();
    ordered.set("font-size", format_px(px as f32));
    for declaration in declarations.iter() {
        ordered.set(&declaration.name, declaration.value.clone());
    }

    let mut span = Element::new("span");
    span.set_attr("style", ordered.to_css_string());
    for (name, value) in &font.attrs {
        if !matches!(name.as_str(), "size" | "color" | "face" | "style") {
            span.set_attr(name, value.as_str());
        }
    }
    span
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use ink_dom::Document;
    use ink_html::HtmlParser;
    use ink_html::serialize_children;

    fn normalized(markup: &str, fallback: u32) -> (String, usize) {
        let mut document = HtmlParser.parse_fragment(markup);
        let root = document.root();
        let count = normalize(&mut document, root, fallback);
        (serialize_children(&document, root), count)
    }

    #[test]
    fn maps_size_three_to_twelve_pixels() {
        let (html, count) = normalized(r#"<font size="3">hi</font>"#, 16);
        assert_eq!(html, r#"<span style="font-size: 12px;">hi</span>"#);
        assert_eq!(count, 1);
    }

    #[test]
    fn size_seven_uses_fallback() {
        let (html, _) = normalized(r#"<font size="7">big</font>"#, 20);
        assert_eq!(html, r#"<span style="font-size: 20px;">big</span>"#);
    }

    #[test]
    fn fixed_codes_ignore_fallback() {
        for (code, px) in [(1, 10), (2, 11), (3, 12), (4, 14), (5, 16), (6, 18)] {
            for fallback in [9, 16, 72] {
                let (html, _) = normalized(&format!(r#"<font size="{code}">x</font>"#), fallback);
                assert_eq!(html, format!(r#"<span style="font-size: {px}px;">x</span>"#));
            }
        }
    }

    #[test]
    fn unknown_codes_use_fallback() {
        let (html, _) = normalized(r#"<font size="+2">a</font><font size="x">b</font>"#, 18);
        assert_eq!(
            html,
            r#"<span style="font-size: 18px;">a</span><span style="font-size: 18px;">b</span>"#
        );
    }

    #[test]
    fn is_idempotent() {
        let mut document = HtmlParser
            .parse_fragment(r#"<p><font size="2">a<font size="5">b</font></font>c</p>"#);
        let root = document.root();
        assert_eq!(normalize(&mut document, root, 12), 2);
        let once = serialize_children(&document, root);
        assert_eq!(normalize(&mut document, root, 12), 0);
        assert_eq!(serialize_children(&document, root), once);
        assert!(document.elements_by_tag(root, "font").is_empty());
    }

    #[test]
    fn preserves_child_identity() {
        let mut document = HtmlParser.parse_fragment(r#"<font size="4"><b>keep</b></font>"#);
        let root = document.root();
        let bold = document.elements_by_tag(root, "b")[0];
        normalize(&mut document, root, 12);
        let Some(span) = document.parent(bold) else {
            panic!("bold element should stay attached");
        };
        assert_eq!(document.tag(span), Some("span"));
        assert!(document.is_attached(bold));
    }

    #[test]
    fn carries_color_and_face() {
        let (html, _) = normalized(r#"<font size="1" color="red" face="Georgia">x</font>"#, 12);
        assert_eq!(
            html,
            r#"<span style="font-size: 10px; color: red; font-family: Georgia;">x</span>"#
        );
    }

    #[test]
    fn leaves_font_without_size_alone() {
        let (html, count) = normalized(r#"<font color="red">x</font>"#, 12);
        assert_eq!(html, r#"<font color="red">x</font>"#);
        assert_eq!(count, 0);
    }

    #[test]
    fn detached_container_is_a_no_op() {
        let mut document = Document::new();
        let loose = document.create_element("font");
        if let Some(element) = document.element_mut(loose) {
            element.set_attr("size", "3");
        }
        assert_eq!(normalize(&mut document, loose, 12), 0);
        assert_eq!(document.tag(loose), Some("font"));
    }

    #[test]
    fn only_rewrites_inside_container() {
        let mut document =
            HtmlParser.parse_fragment(r#"<p><font size="3">in</font></p><font size="3">out</font>"#);
        let root = document.root();
        let paragraph = document.children(root)[0];
        assert_eq!(normalize(&mut document, paragraph, 12), 1);
        assert_eq!(document.elements_by_tag(root, "font").len(), 1);
    }
}
