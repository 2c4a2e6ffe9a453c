//! Byte-to-text decoding for opened files.

use encoding_rs::Encoding;

const CHARSET_SNIFF_BYTES: usize = 8192;

/// Decodes `bytes` using, in order: a byte-order mark, a `charset=` label in
/// the first bytes of HTML, or lossy UTF-8.
pub fn decode_text(bytes: &[u8], is_html: bool) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return decoded.into_owned();
    }

    if is_html {
        if let Some(label) = charset_from_html_prefix(bytes) {
            if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
                let (decoded, _, _) = encoding.decode(bytes);
                return decoded.into_owned();
            }
            tracing::debug!(label, "unknown charset label; falling back to utf-8");
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}

fn charset_from_html_prefix(bytes: &[u8]) -> Option<String> {
    let prefix = String::from_utf8_lossy(&bytes[..bytes.len().min(CHARSET_SNIFF_BYTES)]);
    let lower = prefix.to_ascii_lowercase();
    let mut search_start = 0_usize;

    while let Some(relative) = lower[search_start..].find("charset=") {
        let label_start = search_start + relative + "charset=".len();
        if let Some(label) = charset_label(&prefix[label_start..]) {
            return Some(label);
        }
        search_start = label_start;
    }
    None
}

fn charset_label(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let first = trimmed.chars().next()?;

    let label = if first == '"' || first == '\'' {
        let rest = &trimmed[first.len_utf8()..];
        rest[..rest.find(first)?].trim()
    } else {
        let end = trimmed
            .find(|ch: char| ch.is_whitespace() || matches!(ch, '"' | '\'' | ';' | '>' | '/'))
            .unwrap_or(trimmed.len());
        trimmed[..end].trim()
    };

    (!label.is_empty()).then(|| label.to_owned())
}
