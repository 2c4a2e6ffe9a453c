//! Length and font-size values.

/// Pixel sizes for legacy `<font size>` codes 1 through 6. Code 7 has no fixed
/// entry: it resolves to the caller's currently selected size.
pub const LEGACY_SIZE_TABLE: [(u8, u32); 6] =
    [(1, 10), (2, 11), (3, 12), (4, 14), (5, 16), (6, 18)];

/// Maps a legacy size code to pixels. Code 7, relative codes (`+1`), and
/// anything unparsable resolve to `fallback_px`.
pub fn legacy_font_size_px(code: &str, fallback_px: u32) -> u32 {
    let code = code.trim();
    if code.is_empty() || !code.bytes().all(|byte| byte.is_ascii_digit()) {
        return fallback_px;
    }
    let Ok(code) = code.parse::<u8>() else {
        return fallback_px;
    };
    LEGACY_SIZE_TABLE
        .iter()
        .find(|(entry, _)| *entry == code)
        .map(|(_, px)| *px)
        .unwrap_or(fallback_px)
}

/// Parses a number with an optional `px` suffix, the way size selectors and
/// computed styles report it.
pub fn parse_px(value: &str) -> Option<f32> {
    let raw = value.trim();
    let number = raw.strip_suffix("px").unwrap_or(raw).trim();
    let parsed = number.parse::<f32>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Formats a pixel length without a trailing `.0`.
pub fn format_px(px: f32) -> String {
    if (px - px.round()).abs() < f32::EPSILON {
        format!("{}px", px.round() as i64)
    } else {
        format!("{px}px")
    }
}

/// A specified `font-size` value before it is resolved against its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontSize {
    Px(f32),
    Em(f32),
    Rem(f32),
    Percent(f32),
    /// Absolute keyword already converted to pixels (`medium` = 16px).
    Keyword(f32),
    Smaller,
    Larger,
}

impl FontSize {
    pub fn resolve(self, parent_px: f32, root_px: f32) -> f32 {
        match self {
            Self::Px(px) | Self::Keyword(px) => px,
            Self::Em(factor) => factor * parent_px,
            Self::Rem(factor) => factor * root_px,
            Self::Percent(percent) => percent / 100.0 * parent_px,
            Self::Smaller => parent_px / 1.2,
            Self::Larger => parent_px * 1.2,
        }
    }
}

pub fn parse_font_size(value: &str) -> Option<FontSize> {
    let raw = value.trim().to_ascii_lowercase();
    let keyword = match raw.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "xxx-large" => Some(48.0),
        "smaller" => return Some(FontSize::Smaller),
        "larger" => return Some(FontSize::Larger),
        _ => None,
    };
    if let Some(px) = keyword {
        return Some(FontSize::Keyword(px));
    }

    let parsed = if let Some(number) = raw.strip_suffix("rem") {
        FontSize::Rem(parse_number(number)?)
    } else if let Some(number) = raw.strip_suffix("em") {
        FontSize::Em(parse_number(number)?)
    } else if let Some(number) = raw.strip_suffix("px") {
        FontSize::Px(parse_number(number)?)
    } else if let Some(number) = raw.strip_suffix("pt") {
        FontSize::Px(parse_number(number)? * 4.0 / 3.0)
    } else if let Some(number) = raw.strip_suffix('%') {
        FontSize::Percent(parse_number(number)?)
    } else {
        // Unitless zero is the only bare number CSS accepts here.
        match parse_number(&raw)? {
            zero if zero == 0.0 => FontSize::Px(0.0),
            _ => return None,
        }
    };

    let negative = match parsed {
        FontSize::Px(v) | FontSize::Em(v) | FontSize::Rem(v) | FontSize::Percent(v) => v < 0.0,
        _ => false,
    };
    (!negative).then_some(parsed)
}

fn parse_number(value: &str) -> Option<f32> {
    let parsed = value.trim().parse::<f32>().ok()?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::FontSize;
    use super::format_px;
    use super::legacy_font_size_px;
    use super::parse_font_size;
    use super::parse_px;

    #[test]
    fn legacy_codes_use_fixed_table() {
        let expected = [(1, 10), (2, 11), (3, 12), (4, 14), (5, 16), (6, 18)];
        for (code, px) in expected {
            assert_eq!(legacy_font_size_px(&code.to_string(), 99), px);
            assert_eq!(legacy_font_size_px(&code.to_string(), 13), px);
        }
    }

    #[test]
    fn legacy_code_seven_and_unknowns_use_fallback() {
        assert_eq!(legacy_font_size_px("7", 20), 20);
        assert_eq!(legacy_font_size_px(" 7 ", 36), 36);
        assert_eq!(legacy_font_size_px("0", 12), 12);
        assert_eq!(legacy_font_size_px("9", 12), 12);
        assert_eq!(legacy_font_size_px("+1", 12), 12);
        assert_eq!(legacy_font_size_px("big", 12), 12);
        assert_eq!(legacy_font_size_px("", 12), 12);
        assert_eq!(legacy_font_size_px("300", 12), 12);
    }

    #[test]
    fn parses_px_strings() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px(" 13.5 "), Some(13.5));
        assert_eq!(parse_px("abc"), None);
    }

    #[test]
    fn formats_whole_pixels_without_fraction() {
        assert_eq!(format_px(12.0), "12px");
        assert_eq!(format_px(18.5), "18.5px");
    }

    #[test]
    fn resolves_relative_font_sizes() {
        let parse = |value: &str| parse_font_size(value).map(|size| size.resolve(20.0, 16.0));
        assert_eq!(parse("1.5em"), Some(30.0));
        assert_eq!(parse("2rem"), Some(32.0));
        assert_eq!(parse("50%"), Some(10.0));
        assert_eq!(parse("12pt"), Some(16.0));
        assert_eq!(parse("medium"), Some(16.0));
        assert_eq!(parse_font_size("smaller"), Some(FontSize::Smaller));
        assert_eq!(parse_font_size("-2px"), None);
        assert_eq!(parse_font_size("14"), None);
    }
}
