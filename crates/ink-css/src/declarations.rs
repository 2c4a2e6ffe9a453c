//! Declaration blocks, as found in rule bodies and `style` attributes.

use crate::find_top_level;
use crate::split_top_level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

/// Ordered list of declarations. Setting an existing property replaces it in
/// place so serialization keeps the author's order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeclarationBlock {
    declarations: Vec<Declaration>,
}

impl DeclarationBlock {
    pub fn parse(input: &str) -> Self {
        let mut block = Self::default();
        for raw in split_top_level(input, ';') {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(colon) = find_top_level(trimmed, 0, b':') else {
                continue;
            };

            let name = trimmed[..colon].trim().to_ascii_lowercase();
            let (value, important) = split_important(trimmed[colon + 1..].trim());
            let value = normalize_value(value);
            if name.is_empty() || value.is_empty() {
                continue;
            }

            block.push(Declaration {
                name,
                value,
                important,
            });
        }
        block
    }

    fn push(&mut self, declaration: Declaration) {
        match self
            .declarations
            .iter_mut()
            .find(|existing| existing.name == declaration.name)
        {
            Some(existing) => *existing = declaration,
            None => self.declarations.push(declaration),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|declaration| declaration.name == name)
            .map(|declaration| declaration.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.push(Declaration {
            name: name.trim().to_ascii_lowercase(),
            value: value.into(),
            important: false,
        });
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .declarations
            .iter()
            .position(|declaration| declaration.name == name)?;
        Some(self.declarations.remove(index).value)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Serializes as a `style` attribute value: `font-size: 12px; color: red;`.
    pub fn to_css_string(&self) -> String {
        self.declarations
            .iter()
            .map(|declaration| {
                if declaration.important {
                    format!("{}: {} !important;", declaration.name, declaration.value)
                } else {
                    format!("{}: {};", declaration.name, declaration.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn split_important(value: &str) -> (&str, bool) {
    let lower = value.to_ascii_lowercase();
    match lower.rfind("!important") {
        Some(idx) if lower[idx + "!important".len()..].trim().is_empty() => {
            (value[..idx].trim_end(), true)
        }
        _ => (value, false),
    }
}

fn normalize_value(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut last_was_space = false;

    for ch in input.chars() {
        if let Some(open) = quote {
            out.push(ch);
            if ch == open {
                quote = None;
            }
            continue;
        }
        if ch == '\'' || ch == '"' {
            quote = Some(ch);
            last_was_space = false;
            out.push(ch);
            continue;
        }
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        last_was_space = false;
        out.push(ch);
    }

    out.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::DeclarationBlock;

    #[test]
    fn parses_inline_style_attribute() {
        let block = DeclarationBlock::parse("font-size:12px; COLOR : rgb(1, 2,  3) ;");
        assert_eq!(block.len(), 2);
        assert_eq!(block.get("font-size"), Some("12px"));
        assert_eq!(block.get("color"), Some("rgb(1, 2, 3)"));
    }

    #[test]
    fn keeps_semicolons_inside_function_values() {
        let block = DeclarationBlock::parse(
            r#"background-image: url("data:image/svg+xml;utf8,<svg></svg>"); color: red"#,
        );
        assert_eq!(block.len(), 2);
        assert_eq!(
            block.get("background-image"),
            Some(r#"url("data:image/svg+xml;utf8,<svg></svg>")"#)
        );
    }

    #[test]
    fn set_replaces_in_place_and_serializes() {
        let mut block = DeclarationBlock::parse("color: red; font-size: 10px");
        block.set("color", "blue");
        assert_eq!(block.to_css_string(), "color: blue; font-size: 10px;");
        assert_eq!(block.remove("color").as_deref(), Some("blue"));
        assert_eq!(block.to_css_string(), "font-size: 10px;");
    }

    #[test]
    fn tracks_important_flag() {
        let block = DeclarationBlock::parse("color: red !important");
        assert_eq!(block.get("color"), Some("red"));
        assert_eq!(block.to_css_string(), "color: red !important;");
    }

    #[test]
    fn drops_malformed_entries() {
        let block = DeclarationBlock::parse("no-colon; : empty; color:; width: 1px");
        assert_eq!(block.to_css_string(), "width: 1px;");
    }
}
