//! Byte-level HTML tokenizer.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
}

pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = source.as_bytes();
    let mut idx = 0_usize;

    while idx < bytes.len() {
        if starts_with(bytes, idx, b"<!--") {
            idx = skip_comment(bytes, idx);
            continue;
        }

        if bytes[idx] == b'<' {
            if starts_with(bytes, idx, b"</") {
                if let Some((token, next)) = parse_end_tag(bytes, idx) {
                    out.push(token);
                    idx = next;
                    continue;
                }
            } else if starts_with(bytes, idx, b"<!") || starts_with(bytes, idx, b"<?") {
                idx = skip_to_gt(bytes, idx.saturating_add(2));
                continue;
            } else if let Some((token, next)) = parse_start_tag(bytes, idx) {
                let raw_text_tag = match &token {
                    Token::Start {
                        name, self_closing, ..
                    } if !*self_closing && is_raw_text_tag(name) => Some(name.clone()),
                    _ => None,
                };
                out.push(token);
                idx = next;

                if let Some(tag_name) = raw_text_tag {
                    let (raw_text, closing_end) = read_raw_text_until_end_tag(bytes, idx, &tag_name);
                    if !raw_text.is_empty() {
                        out.push(Token::Text(raw_text));
                    }
                    out.push(Token::End { name: tag_name });
                    idx = closing_end;
                }
                continue;
            }
        }

        // A `<` that does not open a tag is literal text.
        let next = find_byte(bytes, idx.saturating_add(1), b'<').unwrap_or(bytes.len());
        out.push(Token::Text(decode_entities(&String::from_utf8_lossy(
            &bytes[idx..next],
        ))));
        idx = next;
    }

    merge_adjacent_text(out)
}

fn merge_adjacent_text(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let (Token::Text(next), Some(Token::Text(previous))) = (&token, merged.last_mut()) {
            previous.push_str(next);
            continue;
        }
        merged.push(token);
    }
    merged
}

pub(crate) fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0_usize;

    while let Some(rel_amp) = input[cursor..].find('&') {
        let amp = cursor + rel_amp;
        out.push_str(&input[cursor..amp]);

        let rest = &input[(amp + 1)..];
        let decoded = rest
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&rest[..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                cursor = amp + 1 + semi + 1;
            }
            None => {
                out.push('&');
                cursor = amp + 1;
            }
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "nbsp" => Some('\u{a0}'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "zwsp" => Some('\u{200b}'),
        _ => {
            let value = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(value)
        }
    }
}

fn parse_end_tag(bytes: &[u8], start: usize) -> Option<(Token, usize)> {
    let mut idx = skip_spaces(bytes, start.saturating_add(2));
    let begin = idx;
    while idx < bytes.len() && is_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == begin {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[begin..idx]).to_ascii_lowercase();
    let close = find_byte(bytes, idx, b'>')?;
    Some((Token::End { name }, close.saturating_add(1)))
}

fn parse_start_tag(bytes: &[u8], start: usize) -> Option<(Token, usize)> {
    let mut idx = start.saturating_add(1);
    let begin = idx;
    while idx < bytes.len() && is_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == begin || !bytes[begin].is_ascii_alphabetic() {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[begin..idx]).to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        idx = skip_spaces(bytes, idx);
        let byte = *bytes.get(idx)?;

        if byte == b'>' {
            idx = idx.saturating_add(1);
            break;
        }

        if byte == b'/' {
            idx = skip_spaces(bytes, idx.saturating_add(1));
            if bytes.get(idx).copied() == Some(b'>') {
                self_closing = true;
                idx = idx.saturating_add(1);
                break;
            }
            continue;
        }

        let attr_start = idx;
        while idx < bytes.len() && is_name_char(bytes[idx]) {
            idx = idx.saturating_add(1);
        }
        if idx == attr_start {
            // Unparseable attribute soup: give up on attributes, keep the tag.
            idx = find_byte(bytes, idx, b'>')?.saturating_add(1);
            break;
        }

        let attr_name = String::from_utf8_lossy(&bytes[attr_start..idx]).to_ascii_lowercase();
        idx = skip_spaces(bytes, idx);

        let mut value = String::new();
        if bytes.get(idx).copied() == Some(b'=') {
            idx = skip_spaces(bytes, idx.saturating_add(1));
            match bytes.get(idx).copied() {
                Some(quote @ (b'"' | b'\'')) => {
                    let value_start = idx.saturating_add(1);
                    let value_end = find_byte(bytes, value_start, quote).unwrap_or(bytes.len());
                    value = String::from_utf8_lossy(&bytes[value_start..value_end]).into_owned();
                    idx = value_end.saturating_add(1);
                }
                _ => {
                    let value_start = idx;
                    while idx < bytes.len()
                        && !bytes[idx].is_ascii_whitespace()
                        && bytes[idx] != b'>'
                    {
                        idx = idx.saturating_add(1);
                    }
                    value = String::from_utf8_lossy(&bytes[value_start..idx]).into_owned();
                }
            }
        }

        if !attrs.iter().any(|(existing, _)| *existing == attr_name) {
            attrs.push((attr_name, decode_entities(&value)));
        }
    }

    Some((
        Token::Start {
            name,
            attrs,
            self_closing,
        },
        idx,
    ))
}

fn read_raw_text_until_end_tag(bytes: &[u8], start: usize, tag_name: &str) -> (String, usize) {
    let tag_bytes = tag_name.as_bytes();
    let mut idx = start;

    while idx < bytes.len() {
        let name_start = idx.saturating_add(2);
        let name_end = name_start.saturating_add(tag_bytes.len());
        if bytes[idx] == b'<'
            && bytes.get(idx.saturating_add(1)).copied() == Some(b'/')
            && name_end <= bytes.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(tag_bytes)
        {
            if let Some(close) = find_byte(bytes, name_end, b'>') {
                let text = String::from_utf8_lossy(&bytes[start..idx]).into_owned();
                return (text, close.saturating_add(1));
            }
        }
        idx = idx.saturating_add(1);
    }

    (String::from_utf8_lossy(&bytes[start..]).into_owned(), bytes.len())
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    find_subslice(bytes, start.saturating_add(4), b"-->")
        .map(|end| end.saturating_add(3))
        .unwrap_or(bytes.len())
}

fn skip_to_gt(bytes: &[u8], from: usize) -> usize {
    find_byte(bytes, from, b'>')
        .map(|idx| idx.saturating_add(1))
        .unwrap_or(bytes.len())
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn is_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "title" | "textarea")
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::Token;
    use super::decode_entities;
    use super::tokenize;

    #[test]
    fn tokenizes_tags_attributes_and_text() {
        let tokens = tokenize(r#"<FONT size=3 color='red'>hi</font>"#);
        assert_eq!(
            tokens,
            vec![
                Token::Start {
                    name: "font".to_owned(),
                    attrs: vec![
                        ("size".to_owned(), "3".to_owned()),
                        ("color".to_owned(), "red".to_owned())
                    ],
                    self_closing: false,
                },
                Token::Text("hi".to_owned()),
                Token::End {
                    name: "font".to_owned()
                },
            ]
        );
    }

    #[test]
    fn literal_angle_brackets_stay_text() {
        let tokens = tokenize("a < b <3");
        assert_eq!(tokens, vec![Token::Text("a < b <3".to_owned())]);
    }

    #[test]
    fn skips_comments_and_doctype() {
        let tokens = tokenize("<!DOCTYPE html><!-- note -->x");
        assert_eq!(tokens, vec![Token::Text("x".to_owned())]);
    }

    #[test]
    fn raw_text_is_not_tokenized() {
        let tokens = tokenize("<style>p > b { color: red }</style>");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::Text("p > b { color: red }".to_owned()));
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("a&amp;b&#8203;&#x41;&nbsp;"), "a&b\u{200b}A\u{a0}");
        assert_eq!(decode_entities("fish & chips &bogus;"), "fish & chips &bogus;");
    }
}
