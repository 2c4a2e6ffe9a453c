//! Inline `style` attribute access on tree nodes.

use ink_css::DeclarationBlock;
use ink_dom::Document;
use ink_dom::NodeId;

/// Read and write access to the inline declarations of a node.
///
/// Text nodes never carry declarations: reads return `None` and writes are
/// refused.
pub trait StyleDeclaration {
    fn inline_style(&self, node: NodeId) -> Option<DeclarationBlock>;

    fn set_inline_style(&mut self, node: NodeId, block: &DeclarationBlock) -> bool;

    fn style_property(&self, node: NodeId, property: &str) -> Option<String> {
        self.inline_style(node)?
            .get(property)
            .map(str::to_owned)
    }

    fn declares(&self, node: NodeId, property: &str) -> bool {
        self.style_property(node, property).is_some()
    }

    fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) -> bool {
        let Some(mut block) = self.inline_style(node) else {
            return false;
        };
        block.set(property, value);
        self.set_inline_style(node, &block)
    }

    /// Removes `property`. Returns true when it was declared.
    fn remove_style_property(&mut self, node: NodeId, property: &str) -> bool {
        let Some(mut block) = self.inline_style(node) else {
            return false;
        };
        if block.remove(property).is_none() {
            return false;
        }
        self.set_inline_style(node, &block)
    }
}

impl StyleDeclaration for Document {
    fn inline_style(&self, node: NodeId) -> Option<DeclarationBlock> {
        let element = self.element(node)?;
        Some(
            element
                .attr("style")
                .map(DeclarationBlock::parse)
                .unwrap_or_default(),
        )
    }

    /// Writes `block` back as the `style` attribute, dropping the attribute
    /// entirely once no declaration is left.
    fn set_inline_style(&mut self, node: NodeId, block: &DeclarationBlock) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        if block.is_empty() {
            element.remove_attr("style");
        } else {
            element.set_attr("style", block.to_css_string());
        }
        true
    }
}

/// Nearest inclusive ancestor of `node` below `stop` that declares `property`
/// inline. `stop` itself is never returned.
pub fn nearest_declaring(
    document: &Document,
    node: NodeId,
    stop: NodeId,
    property: &str,
) -> Option<NodeId> {
    document
        .inclusive_ancestors(node)
        .take_while(|candidate| *candidate != stop)
        .find(|candidate| document.declares(*candidate, property))
}
