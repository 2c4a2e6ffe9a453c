//! Base-14 Helvetica faces, their metrics and WinAnsi text encoding.

use pdf_writer::Name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontFace {
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl FontFace {
    pub(crate) const ALL: [Self; 4] = [Self::Regular, Self::Bold, Self::Oblique, Self::BoldOblique];

    pub(crate) fn select(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Regular,
            (true, false) => Self::Bold,
            (false, true) => Self::Oblique,
            (true, true) => Self::BoldOblique,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Regular => 0,
            Self::Bold => 1,
            Self::Oblique => 2,
            Self::BoldOblique => 3,
        }
    }

    pub(crate) fn base_font(self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"Helvetica"),
            Self::Bold => Name(b"Helvetica-Bold"),
            Self::Oblique => Name(b"Helvetica-Oblique"),
            Self::BoldOblique => Name(b"Helvetica-BoldOblique"),
        }
    }

    pub(crate) fn resource_name(self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"F1"),
            Self::Bold => Name(b"F2"),
            Self::Oblique => Name(b"F3"),
            Self::BoldOblique => Name(b"F4"),
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldOblique)
    }
}

/// Helvetica advance widths for `' '..='~'`, in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

/// Bold faces are measured with the regular widths scaled up.
const BOLD_WIDTH_SCALE: f32 = 1.06;

/// Advance width of `text` at `size_pt`, in points.
pub(crate) fn text_width(text: &str, face: FontFace, size_pt: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|ch| {
            let index = (ch as u32).wrapping_sub(0x20) as usize;
            u32::from(HELVETICA_WIDTHS.get(index).copied().unwrap_or(FALLBACK_WIDTH))
        })
        .sum();
    let width = units as f32 / 1000.0 * size_pt;
    if face.is_bold() {
        width * BOLD_WIDTH_SCALE
    } else {
        width
    }
}

/// Encodes `text` for a WinAnsi simple font. Characters outside the code
/// page become `?`; control characters are dropped.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }
        let code = ch as u32;
        let byte = match code {
            0x20..=0x7e | 0xa0..=0xff => Some(code as u8),
            _ => win_ansi_extra(ch),
        };
        out.push(byte.unwrap_or(b'?'));
    }
    out
}

fn win_ansi_extra(ch: char) -> Option<u8> {
    let byte = match ch {
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::FontFace;
    use super::encode_win_ansi;
    use super::text_width;

    #[test]
    fn measures_with_helvetica_widths() {
        let width = text_width("il", FontFace::Regular, 10.0);
        assert!((width - 4.44).abs() < 0.001);
        let bold = text_width("il", FontFace::Bold, 10.0);
        assert!(bold > width);
    }

    #[test]
    fn encodes_latin1_and_typographic_punctuation() {
        assert_eq!(encode_win_ansi("caf\u{e9}"), b"caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("\u{201c}hi\u{201d}"), b"\x93hi\x94".to_vec());
        assert_eq!(encode_win_ansi("\u{2022} item"), b"\x95 item".to_vec());
    }

    #[test]
    fn unsupported_characters_become_question_marks() {
        assert_eq!(encode_win_ansi("\u{4e2d}a\n"), b"?a".to_vec());
    }

    #[test]
    fn faces_follow_weight_and_slant() {
        assert_eq!(FontFace::select(true, true), FontFace::BoldOblique);
        assert_eq!(FontFace::select(false, true).index(), 2);
    }
}
