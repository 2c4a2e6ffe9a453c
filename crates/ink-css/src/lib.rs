//! CSS tokenization, declaration blocks and the value types the editor styles with.

mod color;
mod declarations;
mod values;

pub use color::Rgb;
pub use color::is_valid_color;
pub use color::parse_color;
pub use declarations::Declaration;
pub use declarations::DeclarationBlock;
pub use values::FontSize;
pub use values::LEGACY_SIZE_TABLE;
pub use values::format_px;
pub use values::legacy_font_size_px;
pub use values::parse_font_size;
pub use values::parse_px;

/// One rule of a stylesheet: a selector list and its declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selectors: Vec<SimpleSelector>,
    pub declarations: DeclarationBlock,
    pub order: usize,
}

/// The selector subset the editor understands: `tag`, `.class`, `tag.class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSelector {
    pub tag: Option<String>,
    pub classes: Vec<String>,
}

impl SimpleSelector {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty()
            || input
                .bytes()
                .any(|byte| byte.is_ascii_whitespace() || matches!(byte, b'>' | b'+' | b'~' | b'['))
        {
            return None;
        }

        let mut parts = input.split('.');
        let head = parts.next()?;
        let tag = match head {
            "" => None,
            "*" => None,
            name if name.bytes().all(is_ident_byte) => Some(name.to_ascii_lowercase()),
            _ => return None,
        };
        let mut classes = Vec::new();
        for class in parts {
            if class.is_empty() || !class.bytes().all(is_ident_byte) {
                return None;
            }
            classes.push(class.to_owned());
        }
        Some(Self { tag, classes })
    }

    pub fn matches(&self, tag: &str, classes: &[&str]) -> bool {
        self.tag
            .as_deref()
            .is_none_or(|expected| expected.eq_ignore_ascii_case(tag))
            && self
                .classes
                .iter()
                .all(|class| classes.contains(&class.as_str()))
    }

    pub fn specificity(&self) -> u32 {
        u32::from(self.tag.is_some()) + 10 * self.classes.len() as u32
    }
}

/// Style rules compiled from source CSS.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
}

impl StyleSheet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Declarations that apply to an element, lowest precedence first.
    pub fn matching_declarations(&self, tag: &str, classes: &[&str]) -> Vec<&Declaration> {
        let mut matched: Vec<(u32, usize, &DeclarationBlock)> = self
            .rules
            .iter()
            .filter_map(|rule| {
                rule.selectors
                    .iter()
                    .filter(|selector| selector.matches(tag, classes))
                    .map(SimpleSelector::specificity)
                    .max()
                    .map(|specificity| (specificity, rule.order, &rule.declarations))
            })
            .collect();
        matched.sort_by_key(|(specificity, order, _)| (*specificity, *order));
        matched
            .into_iter()
            .flat_map(|(_, _, block)| block.iter())
            .collect()
    }

    /// Winning value of `property` for an element, `!important` first.
    pub fn property_for(&self, tag: &str, classes: &[&str], property: &str) -> Option<&str> {
        let declarations = self.matching_declarations(tag, classes);
        let mut winner: Option<&Declaration> = None;
        for declaration in declarations.into_iter().filter(|d| d.name == property) {
            if winner.is_some_and(|current| current.important && !declaration.important) {
                continue;
            }
            winner = Some(declaration);
        }
        winner.map(|declaration| declaration.value.as_str())
    }
}

/// Parses CSS source text.
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn parse(&self, input: &str) -> StyleSheet {
        let sanitized = strip_comments_preserve_strings(input);
        let mut rules = Vec::new();
        parse_rules_recursive(&sanitized, &mut rules);
        StyleSheet { rules }
    }
}

fn parse_rules_recursive(input: &str, out: &mut Vec<StyleRule>) {
    let mut cursor = 0_usize;

    while let Some((selector_raw, body_raw, next_cursor)) = next_rule_block(input, cursor) {
        cursor = next_cursor;

        let selector_text = selector_raw.trim();
        if selector_text.is_empty() {
            continue;
        }

        if is_grouping_at_rule(selector_text) {
            parse_rules_recursive(body_raw, out);
            continue;
        }
        if selector_text.starts_with('@') {
            continue;
        }

        let selectors: Vec<SimpleSelector> = split_top_level(selector_text, ',')
            .into_iter()
            .filter_map(SimpleSelector::parse)
            .collect();
        let declarations = DeclarationBlock::parse(body_raw);
        if selectors.is_empty() || declarations.is_empty() {
            continue;
        }

        let order = out.len();
        out.push(StyleRule {
            selectors,
            declarations,
            order,
        });
    }
}

fn next_rule_block(input: &str, from: usize) -> Option<(&str, &str, usize)> {
    let start = skip_rule_separators(input, from);
    if start >= input.len() {
        return None;
    }

    let open = find_top_level(input, start, b'{')?;
    let close = find_matching_brace(input, open)?;
    Some((&input[start..open], &input[open + 1..close], close + 1))
}

fn skip_rule_separators(input: &str, mut idx: usize) -> usize {
    let bytes = input.as_bytes();
    while idx < bytes.len() && (bytes[idx].is_ascii_whitespace() || bytes[idx] == b';') {
        idx = idx.saturating_add(1);
    }
    idx
}

fn find_matching_brace(input: &str, open_brace: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(open_brace).copied() != Some(b'{') {
        return None;
    }

    let mut nesting = Nesting::default();
    let mut depth = 1_u32;
    for (idx, byte) in bytes.iter().enumerate().skip(open_brace + 1) {
        if !nesting.step(*byte) {
            continue;
        }
        match byte {
            b'{' => depth = depth.saturating_add(1),
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}

fn is_grouping_at_rule(selector: &str) -> bool {
    let lower = selector.to_ascii_lowercase();
    lower.starts_with("@media") || lower.starts_with("@supports") || lower.starts_with("@layer")
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_')
}

/// Quote and bracket state while walking CSS source byte by byte.
#[derive(Debug, Default)]
pub(crate) struct Nesting {
    single: bool,
    double: bool,
    escape: bool,
    parens: u32,
    brackets: u32,
}

impl Nesting {
    /// Consumes one byte. Returns true when the byte sits outside strings,
    /// parentheses and brackets.
    pub(crate) fn step(&mut self, byte: u8) -> bool {
        if self.single || self.double {
            if self.escape {
                self.escape = false;
            } else if byte == b'\\' {
                self.escape = true;
            } else if (self.single && byte == b'\'') || (self.double && byte == b'"') {
                self.single = false;
                self.double = false;
            }
            return false;
        }

        match byte {
            b'\'' => self.single = true,
            b'"' => self.double = true,
            b'(' => self.parens = self.parens.saturating_add(1),
            b')' => self.parens = self.parens.saturating_sub(1),
            b'[' => self.brackets = self.brackets.saturating_add(1),
            b']' => self.brackets = self.brackets.saturating_sub(1),
            _ => return self.parens == 0 && self.brackets == 0,
        }
        false
    }
}

pub(crate) fn find_top_level(input: &str, from: usize, needle: u8) -> Option<usize> {
    let mut nesting = Nesting::default();
    input
        .bytes()
        .enumerate()
        .skip(from)
        .find(|(_, byte)| nesting.step(*byte) && *byte == needle)
        .map(|(idx, _)| idx)
}

pub(crate) fn split_top_level(input: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut nesting = Nesting::default();
    let mut start = 0_usize;

    for (idx, byte) in input.bytes().enumerate() {
        if nesting.step(byte) && byte == delimiter as u8 {
            parts.push(&input[start..idx]);
            start = idx.saturating_add(1);
        }
    }
    parts.push(&input[start..]);
    parts
}

fn strip_comments_preserve_strings(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut quote: Option<u8> = None;
    let mut escape = false;
    let mut idx = 0_usize;

    while idx < bytes.len() {
        let byte = bytes[idx];

        if let Some(open) = quote {
            out.push(byte);
            if escape {
                escape = false;
            } else if byte == b'\\' {
                escape = true;
            } else if byte == open {
                quote = None;
            }
            idx = idx.saturating_add(1);
            continue;
        }

        if byte == b'/' && bytes.get(idx.saturating_add(1)).copied() == Some(b'*') {
            idx = input[idx.saturating_add(2)..]
                .find("*/")
                .map(|end| idx + 2 + end + 2)
                .unwrap_or(bytes.len());
            continue;
        }

        if byte == b'\'' || byte == b'"' {
            quote = Some(byte);
        }
        out.push(byte);
        idx = idx.saturating_add(1);
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::CssParser;
    use super::SimpleSelector;

    #[test]
    fn parses_tag_and_class_rules() {
        let sheet = CssParser.parse("h1 { font-size: 32px; } .printable { padding: 32px 40px; }");
        assert_eq!(sheet.rule_count(), 2);
        assert_eq!(sheet.property_for("h1", &[], "font-size"), Some("32px"));
        assert_eq!(
            sheet.property_for("section", &["printable"], "padding"),
            Some("32px 40px")
        );
        assert_eq!(sheet.property_for("p", &[], "font-size"), None);
    }

    #[test]
    fn strips_comments_and_skips_unsupported_selectors() {
        let sheet = CssParser.parse("/* x */ p { font-size: 14px; } div > p { color: red } bad {}");
        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(sheet.property_for("p", &[], "font-size"), Some("14px"));
    }

    #[test]
    fn flattens_grouping_rules() {
        let sheet = CssParser.parse("@media print { p { color: #000; } }");
        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(sheet.property_for("p", &[], "color"), Some("#000"));
    }

    #[test]
    fn more_specific_and_important_declarations_win() {
        let sheet = CssParser.parse(
            "span.note { color: blue } span { color: red } p { color: green !important } p { color: black }",
        );
        assert_eq!(sheet.property_for("span", &["note"], "color"), Some("blue"));
        assert_eq!(sheet.property_for("span", &[], "color"), Some("red"));
        assert_eq!(sheet.property_for("p", &[], "color"), Some("green"));
    }

    #[test]
    fn selector_lists_share_declarations() {
        let sheet = CssParser.parse("b, strong { font-weight: bold }");
        assert_eq!(sheet.property_for("strong", &[], "font-weight"), Some("bold"));
        assert_eq!(sheet.property_for("b", &[], "font-weight"), Some("bold"));
    }

    #[test]
    fn simple_selector_rejects_combinators() {
        assert!(SimpleSelector::parse("div p").is_none());
        assert!(SimpleSelector::parse("a[href]").is_none());
        assert!(SimpleSelector::parse("P.Lead").is_some());
    }
}
