//! Selection-scoped inline styling: font size and font color.
//!
//! Every entry point focuses the surface first and silently does nothing
//! without a selection. Each returns whether the tree changed.

use ink_css::DeclarationBlock;
use ink_css::format_px;
use ink_css::is_valid_color;
use ink_dom::Element;
use ink_dom::NodeId;
use ink_dom::Position;
use ink_dom::Range;
use ink_style::StyleDeclaration;
use ink_style::nearest_declaring;

use crate::normalizer::normalize;
use crate::surface::EditorSurface;
use crate::surface::ZERO_WIDTH_SPACE;

/// Wraps the selection in a `span` declaring `font-size: {size_px}px`.
///
/// Legacy size tags in the selection container are normalized first, with
/// `size_px` as their fallback. A collapsed caret gets a placeholder wrapper
/// unless an element between it and the root already declares a font size.
pub fn apply_font_size(surface: &mut EditorSurface, size_px: u32) -> bool {
    surface.focus();
    if size_px == 0 || surface.selection().is_none() {
        return false;
    }

    let container = surface.selection_container().unwrap_or_else(|| surface.root());
    let normalized =
        surface.edit_preserving_selection(|document| normalize(document, container, size_px));
    let Some(range) = surface.selection() else {
        return normalized > 0;
    };

    if range.is_collapsed() {
        let root = surface.root();
        if let Some(sized) = nearest_declaring(surface.document(), range.start.node, root, "font-size")
        {
            tracing::debug!(ancestor = sized.index(), "caret already inside a sized wrapper");
            return normalized > 0;
        }
    }

    let wrapper = style_wrapper("font-size", &format_px(size_px as f32));
    wrap_selection(surface, range, wrapper) || normalized > 0
}

/// Wraps the selection in a `span` declaring `color`. Invalid colors are
/// ignored. A collapsed caret always gets a placeholder wrapper.
pub fn apply_font_color(surface: &mut EditorSurface, color: &str) -> bool {
    surface.focus();
    let color = color.trim();
    if !is_valid_color(color) {
        tracing::debug!(color, "ignoring invalid color");
        return false;
    }
    let Some(range) = surface.selection() else {
        return false;
    };
    wrap_selection(surface, range, style_wrapper("color", color))
}

/// Clears inline `color` declarations.
///
/// A collapsed caret clears only the nearest declaring ancestor below the
/// root. A non-collapsed selection clears every element under the range's
/// common ancestor that intersects the range; subtrees of elements outside
/// the range are not visited.
pub fn remove_font_color(surface: &mut EditorSurface) -> bool {
    surface.focus();
    let Some(range) = surface.selection() else {
        return false;
    };
    let root = surface.root();
    let document = surface.document_mut();

    if range.is_collapsed() {
        return match nearest_declaring(document, range.start.node, root, "color") {
            Some(colored) => document.remove_style_property(colored, "color"),
            None => false,
        };
    }

    let Some(common) = document.common_ancestor_container(range) else {
        return false;
    };
    let mut cleared = 0_usize;
    let mut pending: Vec<NodeId> = document.children(common).iter().rev().copied().collect();
    while let Some(node) = pending.pop() {
        if !document.is_element(node) || !document.intersects_node(range, node) {
            continue;
        }
        if document.remove_style_property(node, "color") {
            cleared += 1;
        }
        pending.extend(document.children(node).iter().rev().copied());
    }
    tracing::debug!(cleared, "removed color across selection");
    cleared > 0
}

/// Builds a `span` declaring a single property.
pub fn style_wrapper(property: &str, value: &str) -> Element {
    let mut declarations = DeclarationBlock::default();
    declarations.set(property, value);
    Element::new("span").with_attr("style", declarations.to_css_string())
}

/// Wraps a non-collapsed `range` in `wrapper` and selects the wrapper's
/// contents, or puts a placeholder wrapper at a collapsed caret and moves the
/// caret inside it.
pub(crate) fn wrap_selection(surface: &mut EditorSurface, range: Range, wrapper: Element) -> bool {
    if range.is_collapsed() {
        return insert_placeholder(surface, range.start, wrapper);
    }
    match surface.document_mut().wrap_range(range, wrapper) {
        Some((_, inner)) => {
            surface.select(inner);
            true
        }
        None => false,
    }
}

fn insert_placeholder(surface: &mut EditorSurface, caret: Position, wrapper: Element) -> bool {
    let document = surface.document_mut();
    let span = document.create_element_with(wrapper);
    let placeholder = document.create_text(ZERO_WIDTH_SPACE);
    document.append_child(span, placeholder);
    if !document.insert_at(caret, span) {
        return false;
    }
    surface.select(Range::collapsed(Position::new(placeholder, 1)));
    true
}
