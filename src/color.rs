//! 16-color palette model.
//!
//! Cells store 4-bit palette indices (0–7 normal, 8–15 bright) or the
//! "default" sentinel that defers to the configured default fg/bg.
//! Extended-palette (`38;5;N`) and direct-RGB (`38;2;r;g;b`) requests are
//! folded onto the nearest of the 16 base colors at parse time, so the
//! stored cell never widens.

/// Number of storable palette entries.
pub const PALETTE_SIZE: usize = 16;

/// Standard xterm RGB values for the 16 base colors, used as the folding
/// target for extended-palette requests.
const BASE_COLORS: [(u8, u8, u8); PALETTE_SIZE] = [
    (0x00, 0x00, 0x00), // 0  Black
    (0xcd, 0x00, 0x00), // 1  Red
    (0x00, 0xcd, 0x00), // 2  Green
    (0xcd, 0xcd, 0x00), // 3  Yellow
    (0x00, 0x00, 0xee), // 4  Blue
    (0xcd, 0x00, 0xcd), // 5  Magenta
    (0x00, 0xcd, 0xcd), // 6  Cyan
    (0xe5, 0xe5, 0xe5), // 7  White
    (0x7f, 0x7f, 0x7f), // 8  Bright Black
    (0xff, 0x00, 0x00), // 9  Bright Red
    (0x00, 0xff, 0x00), // 10 Bright Green
    (0xff, 0xff, 0x00), // 11 Bright Yellow
    (0x5c, 0x5c, 0xff), // 12 Bright Blue
    (0xff, 0x00, 0xff), // 13 Bright Magenta
    (0x00, 0xff, 0xff), // 14 Bright Cyan
    (0xff, 0xff, 0xff), // 15 Bright White
];

/// A cell color: one of the 16 palette entries, or the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Defer to the configured default foreground/background.
    #[default]
    Default,
    /// Palette index 0–15.
    Indexed(u8),
}

impl Color {
    /// Fold a 256-color palette index onto the nearest of the 16 base colors.
    ///
    /// 0–15 pass through, 16–231 expand to their 6×6×6 cube RGB, 232–255 to
    /// their grayscale ramp value; anything larger clamps to 255.
    pub fn from_index(index: u16) -> Self {
        let index = index.min(255) as u8;
        match index {
            0..=15 => Self::Indexed(index),
            16..=231 => {
                let n = index - 16;
                let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                let r = level(n / 36);
                let g = level((n / 6) % 6);
                let b = level(n % 6);
                Self::from_rgb(r, g, b)
            }
            232..=255 => {
                let v = 8 + (index - 232) * 10;
                Self::from_rgb(v, v, v)
            }
        }
    }

    /// Fold a direct RGB color onto the nearest of the 16 base colors.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, &(pr, pg, pb)) in BASE_COLORS.iter().enumerate() {
            let dr = i32::from(pr) - i32::from(r);
            let dg = i32::from(pg) - i32::from(g);
            let db = i32::from(pb) - i32::from(b);
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best_dist = dist;
                best = i as u8;
            }
        }
        Self::Indexed(best)
    }

    /// Resolve to a concrete palette index, substituting `default` for the
    /// default sentinel. Used by the serializer.
    pub fn resolve(self, default: u8) -> u8 {
        match self {
            Self::Default => default & 0x0f,
            Self::Indexed(idx) => idx & 0x0f,
        }
    }
}
