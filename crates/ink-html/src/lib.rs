//! HTML parsing into the editor tree, and serialization back to markup.

mod tokenizer;

use ink_dom::Document;
use ink_dom::NodeData;
use ink_dom::NodeId;
use tokenizer::Token;
use tokenizer::tokenize;

/// What a parse pass produced besides the nodes themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub title: Option<String>,
    pub node_count: u32,
}

/// Parses markup into an existing [`Document`].
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Parses `input` into a fresh document rooted at an editable `div`.
    pub fn parse_fragment(&self, input: &str) -> Document {
        let mut document = Document::new();
        let root = document.root();
        self.parse_into(&mut document, root, input);
        document
    }

    /// Appends the nodes parsed from `input` to `parent`.
    ///
    /// Full documents are accepted: only `<body>` content is kept, the first
    /// `<title>` is reported in the summary, and `head`, `script`, `style` and
    /// similar non-content elements are dropped.
    pub fn parse_into(&self, document: &mut Document, parent: NodeId, input: &str) -> ParseSummary {
        let all_tokens = tokenize(input);
        let mut summary = ParseSummary {
            title: find_title(&all_tokens),
            node_count: 0,
        };
        let mut stack: Vec<NodeId> = vec![parent];
        let mut dropped_depth = 0_usize;

        for token in body_tokens(&all_tokens) {
            match token {
                Token::Start {
                    name,
                    attrs,
                    self_closing,
                } => {
                    if dropped_depth > 0 {
                        if !self_closing && !is_void(name) {
                            dropped_depth = dropped_depth.saturating_add(1);
                        }
                        continue;
                    }
                    if is_transparent(name) || is_void_metadata(name) {
                        continue;
                    }
                    if is_dropped(name) {
                        if !self_closing {
                            dropped_depth = 1;
                        }
                        continue;
                    }

                    close_implied(document, &mut stack, name);
                    let element = document.create_element(name);
                    if let Some(payload) = document.element_mut(element) {
                        for (attr, value) in attrs {
                            payload.set_attr(attr, value.as_str());
                        }
                    }
                    let top = stack.last().copied().unwrap_or(parent);
                    document.append_child(top, element);
                    summary.node_count = summary.node_count.saturating_add(1);
                    if !self_closing && !is_void(name) {
                        stack.push(element);
                    }
                }
                Token::End { name } => {
                    if dropped_depth > 0 {
                        dropped_depth -= 1;
                        continue;
                    }
                    // Stray end tags never close past the parse root.
                    if let Some(depth) = stack
                        .iter()
                        .skip(1)
                        .rposition(|id| document.tag(*id) == Some(name.as_str()))
                    {
                        stack.truncate(depth + 1);
                    }
                }
                Token::Text(text) => {
                    if dropped_depth > 0 {
                        continue;
                    }
                    let top = stack.last().copied().unwrap_or(parent);
                    append_text(document, top, text);
                }
            }
        }

        tracing::debug!(
            nodes = summary.node_count,
            title = summary.title.as_deref().unwrap_or(""),
            "parsed html"
        );
        summary
    }
}

/// Serializes the children of `node` (its inner HTML).
pub fn serialize_children(document: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for child in document.children(node) {
        write_node(document, *child, &mut out);
    }
    out
}

fn write_node(document: &Document, node: NodeId, out: &mut String) {
    match document.data(node) {
        Some(NodeData::Text(text)) => out.push_str(&escape_text(text)),
        Some(NodeData::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if is_void(&element.tag) {
                return;
            }
            for child in document.children(node) {
                write_node(document, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        None => {}
    }
}

pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Block-level elements: alignment targets and implicit paragraph closers.
pub fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "div"
            | "dl"
            | "dd"
            | "dt"
            | "fieldset"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

/// Slices out the content between `<body>` and `</body>` when present.
fn body_tokens(tokens: &[Token]) -> &[Token] {
    let open = tokens
        .iter()
        .position(|token| matches!(token, Token::Start { name, .. } if name == "body"));
    let Some(open) = open else {
        return tokens;
    };
    let close = tokens
        .iter()
        .rposition(|token| matches!(token, Token::End { name } if name == "body"))
        .filter(|close| *close > open)
        .unwrap_or(tokens.len());
    &tokens[open + 1..close]
}

fn find_title(tokens: &[Token]) -> Option<String> {
    let open = tokens
        .iter()
        .position(|token| matches!(token, Token::Start { name, .. } if name == "title"))?;
    match tokens.get(open + 1) {
        Some(Token::Text(text)) => {
            let collapsed = collapse_whitespace(text);
            (!collapsed.is_empty()).then_some(collapsed)
        }
        _ => None,
    }
}

fn close_implied(document: &Document, stack: &mut Vec<NodeId>, incoming: &str) {
    let closes = |open: &str| match open {
        "p" => is_block(incoming),
        "li" => incoming == "li",
        "dt" | "dd" => matches!(incoming, "dt" | "dd"),
        _ => false,
    };
    if let Some(depth) = stack
        .iter()
        .skip(1)
        .rposition(|id| document.tag(*id).is_some_and(closes))
    {
        stack.truncate(depth + 1);
    }
}

fn append_text(document: &mut Document, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    // Whitespace between block tags carries no content.
    if text.trim().is_empty() && text.contains('\n') {
        return;
    }
    if let Some(last) = document.children(parent).last().copied() {
        if let Some(existing) = document.text(last) {
            let merged = format!("{existing}{text}");
            document.set_text(last, merged);
            return;
        }
    }
    let node = document.create_text(text);
    document.append_child(parent, node);
}

fn is_transparent(tag: &str) -> bool {
    matches!(tag, "html" | "head" | "body")
}

fn is_void_metadata(tag: &str) -> bool {
    matches!(tag, "meta" | "link" | "base")
}

fn is_dropped(tag: &str) -> bool {
    matches!(
        tag,
        "script" | "style" | "title" | "template" | "noscript" | "iframe" | "object" | "textarea"
    )
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
