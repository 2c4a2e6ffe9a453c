//! Flows the print document into lines and pages.

use ink_css::Rgb;
use ink_dom::Document;
use ink_dom::NodeId;
use ink_html::is_block;
use ink_style::ComputedStyle;
use ink_style::StyleResolver;
use ink_style::TextAlign;

use crate::text::FontFace;
use crate::text::text_width;

/// CSS pixels to PDF points.
pub(crate) const PT_PER_PX: f32 = 0.75;

const LINE_HEIGHT: f32 = 1.2;
const ASCENT: f32 = 0.9;
const PARAGRAPH_SPACING_PX: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RunStyle {
    pub(crate) size_pt: f32,
    pub(crate) color: Rgb,
    pub(crate) face: FontFace,
    pub(crate) underline: bool,
    pub(crate) strike: bool,
}

impl RunStyle {
    fn from_computed(style: &ComputedStyle) -> Self {
        Self {
            size_pt: style.font_size_px * PT_PER_PX,
            color: style.color,
            face: FontFace::select(style.bold, style.italic),
            underline: style.underline,
            strike: style.strike,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Run {
    pub(crate) text: String,
    pub(crate) style: RunStyle,
}

/// One paragraph-like box of inline runs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Block {
    pub(crate) runs: Vec<Run>,
    pub(crate) align: TextAlign,
    /// Height of an empty line in this block, in points.
    pub(crate) size_pt: f32,
    pub(crate) space_after_pt: f32,
}

impl Block {
    fn new(style: &ComputedStyle) -> Self {
        Self {
            runs: Vec::new(),
            align: style.text_align,
            size_pt: style.font_size_px * PT_PER_PX,
            space_after_pt: 0.0,
        }
    }

    fn has_content(&self) -> bool {
        self.runs.iter().any(|run| !run.text.trim().is_empty())
    }

    fn ends_with_space(&self) -> bool {
        self.runs
            .last()
            .is_none_or(|run| run.text.is_empty() || run.text.ends_with(' '))
    }
}

/// Splits the tree under the root into blocks, resolving each text node's
/// style on the way down.
pub(crate) fn collect_blocks(document: &Document, resolver: &StyleResolver) -> Vec<Block> {
    let root = document.root();
    let style = resolver.computed(document, root);
    let mut collector = BlockCollector {
        document,
        resolver,
        blocks: Vec::new(),
        current: Block::new(&style),
    };
    collector.visit_children(root, &style);
    collector.finish_block(0.0, false, &style);
    collector.blocks
}

struct BlockCollector<'a> {
    document: &'a Document,
    resolver: &'a StyleResolver,
    blocks: Vec<Block>,
    current: Block,
}

impl BlockCollector<'_> {
    fn visit_children(&mut self, node: NodeId, style: &ComputedStyle) {
        let document = self.document;
        let numbered = document.tag(node) == Some("ol");
        let mut ordinal = 0_usize;

        for &child in document.children(node) {
            if let Some(text) = document.text(child) {
                self.push_text(text, style);
                continue;
            }
            let Some(tag) = document.tag(child) else {
                continue;
            };
            let child_style = self.resolver.cascade(document, child, style);

            if tag == "br" {
                self.finish_block(0.0, true, style);
                continue;
            }
            if !is_block(tag) {
                self.visit_children(child, &child_style);
                continue;
            }

            self.finish_block(0.0, false, &child_style);
            if tag == "li" {
                ordinal += 1;
                let marker = if numbered {
                    format!("{ordinal}. ")
                } else {
                    "\u{2022} ".to_owned()
                };
                self.push_text(&marker, &child_style);
            }
            self.visit_children(child, &child_style);
            self.finish_block(block_spacing_pt(tag, &child_style), false, style);
        }
    }

    /// Appends text with whitespace collapsed to single spaces.
    fn push_text(&mut self, text: &str, style: &ComputedStyle) {
        let mut collapsed = String::with_capacity(text.len());
        let mut pending_space = false;
        for ch in text.chars() {
            if ch == '\u{200b}' {
                continue;
            }
            if ch.is_whitespace() && ch != '\u{a0}' {
                pending_space = true;
                continue;
            }
            if pending_space && !(collapsed.is_empty() && self.current.ends_with_space()) {
                collapsed.push(' ');
            }
            pending_space = false;
            collapsed.push(ch);
        }
        if pending_space && !(collapsed.is_empty() && self.current.ends_with_space()) {
            collapsed.push(' ');
        }
        if collapsed.is_empty() {
            return;
        }

        let style = RunStyle::from_computed(style);
        match self.current.runs.last_mut() {
            Some(last) if last.style == style => last.text.push_str(&collapsed),
            _ => self.current.runs.push(Run {
                text: collapsed,
                style,
            }),
        }
    }

    /// Closes the current block and opens a fresh one styled by `next`.
    /// Blocks without visible text are dropped unless `keep_empty` is set.
    fn finish_block(&mut self, space_after_pt: f32, keep_empty: bool, next: &ComputedStyle) {
        let mut finished = std::mem::replace(&mut self.current, Block::new(next));
        if finished.has_content() || keep_empty {
            finished.space_after_pt = space_after_pt;
            self.blocks.push(finished);
        } else if let Some(previous) = self.blocks.last_mut() {
            previous.space_after_pt = previous.space_after_pt.max(space_after_pt);
        }
    }
}

fn block_spacing_pt(tag: &str, style: &ComputedStyle) -> f32 {
    match tag {
        "p" | "ul" | "ol" => PARAGRAPH_SPACING_PX * PT_PER_PX,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => style.font_size_px * 0.5 * PT_PER_PX,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Placed {
    pub(crate) text: String,
    pub(crate) style: RunStyle,
    /// Offset from the start of the line.
    pub(crate) x: f32,
    pub(crate) width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Line {
    pub(crate) items: Vec<Placed>,
    pub(crate) width: f32,
    pub(crate) size_pt: f32,
}

impl Line {
    fn new(size_pt: f32) -> Self {
        Self {
            items: Vec::new(),
            width: 0.0,
            size_pt,
        }
    }

    fn push(&mut self, text: &str, style: RunStyle, width: f32) {
        self.size_pt = if self.items.is_empty() {
            style.size_pt
        } else {
            self.size_pt.max(style.size_pt)
        };
        match self.items.last_mut() {
            Some(last) if last.style == style => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.items.push(Placed {
                text: text.to_owned(),
                style,
                x: self.width,
                width,
            }),
        }
        self.width += width;
    }

    fn trim_trailing_space(&mut self) {
        let Some(last) = self.items.last_mut() else {
            return;
        };
        if last.text.ends_with(' ') {
            let trimmed = last.text.trim_end_matches(' ').len();
            let removed = &last.text[trimmed..];
            let space_width = text_width(removed, last.style.face, last.style.size_pt);
            last.text.truncate(trimmed);
            last.width -= space_width;
            self.width -= space_width;
        }
        if last.text.is_empty() {
            self.items.pop();
        }
    }
}

/// Greedy line breaking at spaces. Words wider than the line are split
/// between characters.
pub(crate) fn break_lines(block: &Block, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::new(block.size_pt);

    for run in &block.runs {
        for token in tokens(&run.text) {
            let width = text_width(token, run.style.face, run.style.size_pt);
            if token == " " {
                if !line.items.is_empty() {
                    line.push(token, run.style, width);
                }
                continue;
            }
            if line.width + width > max_width && !line.items.is_empty() {
                line.trim_trailing_space();
                lines.push(std::mem::replace(&mut line, Line::new(block.size_pt)));
            }
            if width <= max_width {
                line.push(token, run.style, width);
                continue;
            }
            for ch in token.chars() {
                let mut buffer = [0_u8; 4];
                let piece = ch.encode_utf8(&mut buffer);
                let piece_width = text_width(piece, run.style.face, run.style.size_pt);
                if line.width + piece_width > max_width && !line.items.is_empty() {
                    lines.push(std::mem::replace(&mut line, Line::new(block.size_pt)));
                }
                line.push(piece, run.style, piece_width);
            }
        }
    }

    line.trim_trailing_space();
    if !line.items.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Words and single spaces, in order.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(' ')
        .flat_map(|piece| match piece.strip_suffix(' ') {
            Some(word) => [word, " "],
            None => [piece, ""],
        })
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageGeometry {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) margin_x: f32,
    pub(crate) margin_y: f32,
}

impl PageGeometry {
    pub(crate) fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.margin_x).max(1.0)
    }
}

/// A line placed on a page: start `x` and text baseline `y`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedLine {
    pub(crate) x: f32,
    pub(crate) baseline: f32,
    pub(crate) line: Line,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Page {
    pub(crate) lines: Vec<PlacedLine>,
}

/// Stacks the blocks' lines top to bottom, starting a new page when a line
/// would cross the bottom margin. Always yields at least one page.
pub(crate) fn paginate(blocks: &[Block], geometry: PageGeometry) -> Vec<Page> {
    let max_width = geometry.content_width();
    let top = geometry.height - geometry.margin_y;
    let bottom = geometry.margin_y;

    let mut pages = Vec::new();
    let mut page = Page::default();
    let mut cursor = top;

    for block in blocks {
        for line in break_lines(block, max_width) {
            let height = line.size_pt * LINE_HEIGHT;
            if cursor - height < bottom && !page.lines.is_empty() {
                pages.push(std::mem::take(&mut page));
                cursor = top;
            }
            let offset = match block.align {
                TextAlign::Left | TextAlign::Justify => 0.0,
                TextAlign::Center => (max_width - line.width).max(0.0) / 2.0,
                TextAlign::Right => (max_width - line.width).max(0.0),
            };
            page.lines.push(PlacedLine {
                x: geometry.margin_x + offset,
                baseline: cursor - line.size_pt * ASCENT,
                line,
            });
            cursor -= height;
        }
        cursor -= block.space_after_pt;
    }

    pages.push(page);
    pages
}

#[cfg(test)]
mod tests {
    use super::Block;
    use super::PageGeometry;
    use super::break_lines;
    use super::collect_blocks;
    use super::paginate;
    use ink_css::CssParser;
    use ink_html::HtmlParser;
    use ink_style::BASE_STYLESHEET;
    use ink_style::StyleResolver;
    use ink_style::TextAlign;

    fn blocks(markup: &str) -> Vec<Block> {
        let document = HtmlParser.parse_fragment(markup);
        let resolver = StyleResolver::new(CssParser.parse(BASE_STYLESHEET), 16.0);
        collect_blocks(&document, &resolver)
    }

    fn texts(block: &Block) -> Vec<&str> {
        block.runs.iter().map(|run| run.text.as_str()).collect()
    }

    const A4: PageGeometry = PageGeometry {
        width: 595.0,
        height: 842.0,
        margin_x: 30.0,
        margin_y: 24.0,
    };

    #[test]
    fn paragraphs_become_blocks_with_styled_runs() {
        let blocks = blocks(
            r#"<p>Hello <b>world</b></p><p style="text-align: center;"><span style="font-size: 24px;">big</span></p>"#,
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(texts(&blocks[0]), ["Hello ", "world"]);
        assert!(blocks[0].space_after_pt > 0.0);
        assert_eq!(blocks[1].align, TextAlign::Center);
        assert_eq!(blocks[1].runs[0].style.size_pt, 18.0);
    }

    #[test]
    fn whitespace_collapses_and_placeholders_vanish() {
        let blocks = blocks("<p>  a \n  b\u{200b}c  </p>");
        assert_eq!(texts(&blocks[0]), ["a bc "]);
    }

    #[test]
    fn list_items_get_markers() {
        let blocks = blocks("<ul><li>one</li></ul><ol><li>first</li><li>second</li></ol>");
        let first: Vec<String> = blocks.iter().map(|block| texts(block).concat()).collect();
        assert_eq!(first, ["\u{2022} one", "1. first", "2. second"]);
    }

    #[test]
    fn line_breaks_keep_blank_lines() {
        let blocks = blocks("<p>a</p><br><p>b</p>");
        assert_eq!(blocks.len(), 3);
        assert!(blocks[1].runs.is_empty());
    }

    #[test]
    fn narrow_lines_wrap_at_spaces() {
        let blocks = blocks("<p>alpha beta gamma</p>");
        let lines = break_lines(&blocks[0], 45.0);
        let words: Vec<String> = lines
            .iter()
            .map(|line| line.items.iter().map(|item| item.text.as_str()).collect())
            .collect();
        assert_eq!(words, ["alpha", "beta", "gamma"]);
        assert!(lines.iter().all(|line| line.width <= 45.0));
    }

    #[test]
    fn overlong_words_split_between_characters() {
        let blocks = blocks("<p>abcdefghij</p>");
        let lines = break_lines(&blocks[0], 20.0);
        assert!(lines.len() > 1);
        let joined: String = lines
            .iter()
            .flat_map(|line| line.items.iter().map(|item| item.text.as_str()))
            .collect();
        assert_eq!(joined, "abcdefghij");
    }

    #[test]
    fn long_documents_span_pages() {
        let markup = "<p>line</p>".repeat(120);
        let pages = paginate(&blocks(&markup), A4);
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.lines.iter().all(|line| line.baseline > A4.margin_y));
        }
    }

    #[test]
    fn empty_document_still_has_a_page() {
        assert_eq!(paginate(&[], A4).len(), 1);
    }

    #[test]
    fn right_alignment_offsets_line() {
        let pages = paginate(&blocks(r#"<p style="text-align: right;">x</p>"#), A4);
        let line = &pages[0].lines[0];
        let right_edge = line.x + line.line.width;
        assert!((right_edge - (A4.width - A4.margin_x)).abs() < 0.01);
    }
}
