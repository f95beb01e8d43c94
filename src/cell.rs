//! Terminal cell types.
//!
//! A `Cell` represents one character position in the grid: the glyph (one
//! Unicode codepoint), 4-bit foreground/background palette colors, and the
//! SGR attribute flags. Cells are plain data, 12 bytes, so whole rows can
//! be shifted with bulk moves and the full grid stays a few kilobytes.

use bitflags::bitflags;

use crate::color::Color;

bitflags! {
    /// Per-cell SGR attribute flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellAttrs: u8 {
        const BOLD      = 1;
        const FAINT     = 1 << 1;
        const ITALIC    = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK     = 1 << 4;
        const FRAKTUR   = 1 << 5;
        const STRIKE    = 1 << 6;
        const INVERSE   = 1 << 7;
    }
}

/// One character position in the terminal grid.
///
/// Target size: 12 bytes (`char(4) + Color(2) + Color(2) + CellAttrs(1)`
/// plus padding). The inverse attribute swaps effective fg/bg at
/// serialization time; stored colors are never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The glyph stored in this cell (`' '` when blank).
    pub ch: char,
    /// Foreground palette color.
    pub fg: Color,
    /// Background palette color.
    pub bg: Color,
    /// SGR attribute flags.
    pub attrs: CellAttrs,
}

const _: () = assert!(size_of::<Cell>() <= 12);

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttrs::empty(),
        }
    }
}

impl Cell {
    /// Reset this cell to match the given template.
    pub fn reset(&mut self, template: &Self) {
        *self = *template;
    }

    /// A blank cell carrying only the template's background.
    ///
    /// Used for BCE fills: vacated cells keep the current background but
    /// drop glyph, foreground, and attributes.
    pub fn blank_with_bg(template: &Self) -> Self {
        Self {
            bg: template.bg,
            ..Self::default()
        }
    }

    /// Returns `true` if this cell is visually empty (space, default colors,
    /// no attributes).
    pub fn is_empty(&self) -> bool {
        self.ch == ' '
            && self.fg == Color::Default
            && self.bg == Color::Default
            && self.attrs.is_empty()
    }
}
