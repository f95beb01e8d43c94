//! Read-only serialization of screen and label state.
//!
//! The wire format is NUL-free so the transport can treat chunks as
//! C strings, and resumable so a small fixed buffer can drain a full
//! screen across several sends.
//!
//! Screen format: a 10-byte header (`lines`, `cols`, `cursor line`,
//! `cursor column`, `flags`, each [`encode2b`]-coded), then every cell in
//! row-major order. A cell is its glyph in UTF-8, preceded — whenever the
//! effective style differs from the previous cell's — by `0x01` and the
//! encoded foreground, background, and attribute byte. The inverse
//! attribute is applied here by swapping the effective colors; stored cells
//! are untouched.

use crate::cell::CellAttrs;
use crate::config::BUTTON_COUNT;
use crate::event::EventListener;
use crate::index::{Column, Line};

use super::Terminal;
use super::mode::TermMode;

/// Largest value [`encode2b`] can carry.
pub const ENCODE2B_MAX: u16 = 127 * 127 - 1;

/// Introduces an updated style run in the screen stream.
const STYLE_MARKER: u8 = 0x01;

/// Fixed screen header length in bytes.
const HEADER_LEN: usize = 10;

/// Header flag: cursor visible.
const FLAG_CURSOR_VISIBLE: u16 = 1;
/// Header flag: whole-screen reverse video (DECSCNM).
const FLAG_REVERSE_SCREEN: u16 = 1 << 1;

/// Map a 16-bit integer onto two printable, NUL-free bytes.
///
/// Values clamp at [`ENCODE2B_MAX`]. Both output bytes are in `1..=127`.
pub fn encode2b(n: u16) -> [u8; 2] {
    let n = n.min(ENCODE2B_MAX);
    [(n % 127 + 1) as u8, (n / 127 + 1) as u8]
}

/// Inverse of [`encode2b`], for stream consumers.
pub fn decode2b(bytes: [u8; 2]) -> u16 {
    let low = u16::from(bytes[0].saturating_sub(1));
    let high = u16::from(bytes[1].saturating_sub(1));
    low + high * 127
}

/// Outcome of one [`Terminal::serialize_screen`] call, carrying the number
/// of bytes written into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serialized {
    /// The snapshot is complete.
    Done(usize),
    /// The buffer filled up; call again with the same cursor to continue.
    More(usize),
}

/// Resumption state for [`Terminal::serialize_screen`].
///
/// Opaque to callers: create one per snapshot and pass it to every call.
/// The stream is only stable while the terminal is not mutated in between.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenCursor {
    /// Next cell to emit, in row-major order.
    index: usize,
    header_done: bool,
    /// Style of the last emitted run.
    last_style: Option<(u8, u8, u8)>,
}

impl ScreenCursor {
    /// Start a fresh snapshot.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: EventListener> Terminal<L> {
    /// Write a compact snapshot of the grid into `buf`, resuming across
    /// calls via `cursor`.
    ///
    /// `buf` must hold at least the 10-byte header plus one worst-case cell
    /// (11 bytes); 32 bytes is a comfortable minimum. Returns how far the
    /// snapshot got and how many bytes were produced this call.
    pub fn serialize_screen(&self, buf: &mut [u8], cursor: &mut ScreenCursor) -> Serialized {
        let lines = self.grid.lines();
        let cols = self.grid.cols();
        let mut pos = 0;

        if !cursor.header_done {
            if buf.len() < HEADER_LEN {
                return Serialized::More(0);
            }
            let c = self.grid.cursor();
            let mut flags = 0;
            if self.mode.contains(TermMode::SHOW_CURSOR) {
                flags |= FLAG_CURSOR_VISIBLE;
            }
            if self.mode.contains(TermMode::REVERSE_SCREEN) {
                flags |= FLAG_REVERSE_SCREEN;
            }
            let header = [
                lines as u16,
                cols as u16,
                c.line() as u16,
                c.col().0.min(cols - 1) as u16,
                flags,
            ];
            for (i, value) in header.into_iter().enumerate() {
                buf[i * 2..i * 2 + 2].copy_from_slice(&encode2b(value));
            }
            pos = HEADER_LEN;
            cursor.header_done = true;
        }

        let total = lines * cols;
        while cursor.index < total {
            let cell = self.grid[Line(cursor.index / cols)][Column(cursor.index % cols)];
            let mut fg = cell.fg.resolve(self.scratch.default_fg);
            let mut bg = cell.bg.resolve(self.scratch.default_bg);
            if cell.attrs.contains(CellAttrs::INVERSE) {
                std::mem::swap(&mut fg, &mut bg);
            }
            let style = (fg, bg, cell.attrs.bits());
            let style_len = if cursor.last_style == Some(style) { 0 } else { 7 };

            if pos + style_len + cell.ch.len_utf8() > buf.len() {
                return Serialized::More(pos);
            }

            if style_len > 0 {
                buf[pos] = STYLE_MARKER;
                buf[pos + 1..pos + 3].copy_from_slice(&encode2b(u16::from(fg)));
                buf[pos + 3..pos + 5].copy_from_slice(&encode2b(u16::from(bg)));
                buf[pos + 5..pos + 7].copy_from_slice(&encode2b(u16::from(cell.attrs.bits())));
                cursor.last_style = Some(style);
                pos += style_len;
            }
            pos += cell.ch.encode_utf8(&mut buf[pos..]).len();
            cursor.index += 1;
        }

        Serialized::Done(pos)
    }

    /// Write the title and the five button labels into `buf` in one shot,
    /// separated by `0x01`. Returns the number of bytes written; output is
    /// truncated at a char boundary if the buffer is too small.
    pub fn serialize_labels(&self, buf: &mut [u8]) -> usize {
        let mut pos = 0;
        let fields =
            std::iter::once(self.scratch.title()).chain((0..BUTTON_COUNT).map(|b| self.scratch.button(b)));
        for (i, field) in fields.enumerate() {
            if i > 0 {
                if pos >= buf.len() {
                    return pos;
                }
                buf[pos] = 0x01;
                pos += 1;
            }
            for ch in field.chars() {
                let len = ch.len_utf8();
                if pos + len > buf.len() {
                    return pos;
                }
                ch.encode_utf8(&mut buf[pos..]);
                pos += len;
            }
        }
        pos
    }
}
