//! CSS color values.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels scaled to `0.0..=1.0`, as PDF fill operators expect.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb::opaque(0, 0, 0)),
    ("silver", Rgb::opaque(192, 192, 192)),
    ("gray", Rgb::opaque(128, 128, 128)),
    ("grey", Rgb::opaque(128, 128, 128)),
    ("white", Rgb::opaque(255, 255, 255)),
    ("maroon", Rgb::opaque(128, 0, 0)),
    ("red", Rgb::opaque(255, 0, 0)),
    ("purple", Rgb::opaque(128, 0, 128)),
    ("fuchsia", Rgb::opaque(255, 0, 255)),
    ("magenta", Rgb::opaque(255, 0, 255)),
    ("green", Rgb::opaque(0, 128, 0)),
    ("lime", Rgb::opaque(0, 255, 0)),
    ("olive", Rgb::opaque(128, 128, 0)),
    ("yellow", Rgb::opaque(255, 255, 0)),
    ("navy", Rgb::opaque(0, 0, 128)),
    ("blue", Rgb::opaque(0, 0, 255)),
    ("teal", Rgb::opaque(0, 128, 128)),
    ("aqua", Rgb::opaque(0, 255, 255)),
    ("cyan", Rgb::opaque(0, 255, 255)),
    ("orange", Rgb::opaque(255, 165, 0)),
    ("brown", Rgb::opaque(165, 42, 42)),
    ("pink", Rgb::opaque(255, 192, 203)),
    ("gold", Rgb::opaque(255, 215, 0)),
    ("darkred", Rgb::opaque(139, 0, 0)),
    ("darkblue", Rgb::opaque(0, 0, 139)),
    ("darkgreen", Rgb::opaque(0, 100, 0)),
    ("transparent", Rgb {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    }),
];

pub fn is_valid_color(value: &str) -> bool {
    let raw = value.trim().to_ascii_lowercase();
    matches!(raw.as_str(), "inherit" | "currentcolor") || parse_color(&raw).is_some()
}

pub fn parse_color(value: &str) -> Option<Rgb> {
    let raw = value.trim().to_ascii_lowercase();

    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(inside) = raw.strip_prefix("rgba(").and_then(|v| v.strip_suffix(')')) {
        return parse_rgb_function(inside, true);
    }
    if let Some(inside) = raw.strip_prefix("rgb(").and_then(|v| v.strip_suffix(')')) {
        return parse_rgb_function(inside, false);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, color)| *color)
}

fn parse_hex(digits: &str) -> Option<Rgb> {
    if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| -> Option<u8> {
        let part = digits.get(range)?;
        if part.len() == 1 {
            u8::from_str_radix(&part.repeat(2), 16).ok()
        } else {
            u8::from_str_radix(part, 16).ok()
        }
    };

    match digits.len() {
        3 | 4 => Some(Rgb {
            r: channel(0..1)?,
            g: channel(1..2)?,
            b: channel(2..3)?,
            a: if digits.len() == 4 { channel(3..4)? } else { 255 },
        }),
        6 | 8 => Some(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
            a: if digits.len() == 8 { channel(6..8)? } else { 255 },
        }),
        _ => None,
    }
}

fn parse_rgb_function(inside: &str, with_alpha: bool) -> Option<Rgb> {
    let parts = inside.split(',').map(str::trim).collect::<Vec<_>>();
    if (with_alpha && parts.len() != 4) || (!with_alpha && parts.len() != 3) {
        return None;
    }

    Some(Rgb {
        r: parse_rgb_channel(parts[0])?,
        g: parse_rgb_channel(parts[1])?,
        b: parse_rgb_channel(parts[2])?,
        a: if with_alpha {
            parse_alpha_channel(parts[3])?
        } else {
            255
        },
    })
}

fn parse_rgb_channel(value: &str) -> Option<u8> {
    if let Some(percent) = value.strip_suffix('%') {
        let value = percent.trim().parse::<f32>().ok()?.clamp(0.0, 100.0);
        return Some(((value / 100.0) * 255.0).round() as u8);
    }
    let value = value.parse::<f32>().ok()?.clamp(0.0, 255.0);
    Some(value.round() as u8)
}

fn parse_alpha_channel(value: &str) -> Option<u8> {
    if let Some(percent) = value.strip_suffix('%') {
        let value = percent.trim().parse::<f32>().ok()?.clamp(0.0, 100.0);
        return Some(((value / 100.0) * 255.0).round() as u8);
    }
    let value = value.parse::<f32>().ok()?.clamp(0.0, 1.0);
    Some((value * 255.0).round() as u8)
}
