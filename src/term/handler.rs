//! Escape sequence dispatch.
//!
//! Implements the parser's [`Perform`] sink on `Terminal`: printable glyphs,
//! C0 controls, CSI, ESC, and OSC sequences are translated into grid
//! operations, mode changes, and replies. Unknown sequences are discarded
//! with a log breadcrumb; nothing here panics on hostile input.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellAttrs};
use crate::color::Color;
use crate::event::{Event, EventListener};
use crate::grid::{EraseMode, MAX_COLS, TabClearMode};
use crate::index::Column;
use crate::parser::{Params, Perform};

use super::Terminal;
use super::charset::{CharsetIndex, StandardCharset};
use super::mode::TermMode;

impl<L: EventListener> Terminal<L> {
    /// CUP/HVP/DECOM-aware absolute addressing with 1-based parameters.
    ///
    /// In origin mode the row is offset by the scroll region top and clipped
    /// to the region.
    fn goto_origin(&mut self, row1: u16, col1: u16) {
        let row = row1.max(1) as usize - 1;
        let col = col1.max(1) as usize - 1;
        if self.mode.contains(TermMode::ORIGIN) {
            let region = self.grid.scroll_region();
            let line = (region.start + row).min(region.end - 1);
            self.grid.goto(line, Column(col));
        } else {
            self.grid.goto(row, Column(col));
        }
    }

    /// VPA with 1-based parameter, origin-aware, keeping the column.
    fn goto_line_origin(&mut self, row1: u16) {
        let row = row1.max(1) as usize - 1;
        if self.mode.contains(TermMode::ORIGIN) {
            let region = self.grid.scroll_region();
            self.grid.goto_line((region.start + row).min(region.end - 1));
        } else {
            self.grid.goto_line(row);
        }
    }

    /// SM/RM (no private marker).
    fn set_ansi_modes(&mut self, params: &Params, value: bool) {
        for mode in params.iter() {
            match mode {
                4 => self.mode.set(TermMode::INSERT, value),
                20 => self.mode.set(TermMode::NEWLINE, value),
                _ => log::debug!("ignoring ANSI mode {mode}"),
            }
        }
        self.touch();
    }

    /// DECSET/DECRST (`?` marker).
    fn set_private_modes(&mut self, params: &Params, value: bool) {
        for mode in params.iter() {
            match mode {
                1 => self.mode.set(TermMode::APP_CURSOR, value),
                3 => self.column_mode(),
                5 => self.mode.set(TermMode::REVERSE_SCREEN, value),
                6 => {
                    self.mode.set(TermMode::ORIGIN, value);
                    self.goto_origin(1, 1);
                }
                7 => self.mode.set(TermMode::LINE_WRAP, value),
                25 => self.mode.set(TermMode::SHOW_CURSOR, value),
                66 => self.mode.set(TermMode::APP_KEYPAD, value),
                1000 => self.mode.set(TermMode::MOUSE_CLICKS, value),
                1002 | 1003 => self.mode.set(TermMode::MOUSE_MOTION, value),
                // Alternate screen and the remaining mouse encodings are
                // not supported by this single-page core.
                47 | 1047 | 1049 => log::debug!("alternate screen request ignored"),
                12 | 1005 | 1006 | 2004 => log::trace!("ignoring private mode {mode}"),
                _ => log::debug!("ignoring private mode {mode}"),
            }
        }
        self.touch();
    }

    /// DECCOLM: column mode switch. Both directions land on the clamped
    /// column bound; the DEC-mandated side effects (clear, home, default
    /// region and tabs) still apply.
    fn column_mode(&mut self) {
        let lines = self.grid.lines();
        self.grid.resize(lines, MAX_COLS);
        self.grid.reset();
    }

    /// SGR: apply rendition parameters to the cursor template.
    fn sgr(&mut self, params: &Params) {
        let template = &mut self.grid.cursor_mut().template;
        if params.is_empty() {
            *template = Cell {
                ch: template.ch,
                ..Cell::default()
            };
            return;
        }

        let mut i = 0;
        while let Some(param) = params.get_raw(i) {
            match param {
                0 => {
                    template.fg = Color::Default;
                    template.bg = Color::Default;
                    template.attrs = CellAttrs::empty();
                }
                1 => template.attrs.insert(CellAttrs::BOLD),
                2 => template.attrs.insert(CellAttrs::FAINT),
                3 => template.attrs.insert(CellAttrs::ITALIC),
                4 => template.attrs.insert(CellAttrs::UNDERLINE),
                5 | 6 => template.attrs.insert(CellAttrs::BLINK),
                7 => template.attrs.insert(CellAttrs::INVERSE),
                9 => template.attrs.insert(CellAttrs::STRIKE),
                20 => template.attrs.insert(CellAttrs::FRAKTUR),
                22 => template.attrs.remove(CellAttrs::BOLD | CellAttrs::FAINT),
                23 => template.attrs.remove(CellAttrs::ITALIC | CellAttrs::FRAKTUR),
                24 => template.attrs.remove(CellAttrs::UNDERLINE),
                25 => template.attrs.remove(CellAttrs::BLINK),
                27 => template.attrs.remove(CellAttrs::INVERSE),
                29 => template.attrs.remove(CellAttrs::STRIKE),
                30..=37 => template.fg = Color::Indexed((param - 30) as u8),
                39 => template.fg = Color::Default,
                40..=47 => template.bg = Color::Indexed((param - 40) as u8),
                49 => template.bg = Color::Default,
                90..=97 => template.fg = Color::Indexed((param - 90 + 8) as u8),
                100..=107 => template.bg = Color::Indexed((param - 100 + 8) as u8),
                38 | 48 => {
                    let (color, consumed) = match extended_color(params, i) {
                        Some(ok) => ok,
                        None => {
                            log::debug!("malformed extended color in SGR");
                            return;
                        }
                    };
                    if param == 38 {
                        template.fg = color;
                    } else {
                        template.bg = color;
                    }
                    i += consumed;
                }
                _ => log::trace!("ignoring SGR {param}"),
            }
            i += 1;
        }
    }

    /// DSR: device status reports.
    fn device_status(&mut self, status: u16) {
        match status {
            // Operating status: report OK.
            5 => self.reply("\x1b[0n".to_string()),
            // Cursor position report, 1-based, region-relative in origin
            // mode.
            6 => {
                let cursor = self.grid.cursor();
                let mut row = cursor.line();
                if self.mode.contains(TermMode::ORIGIN) {
                    row = row.saturating_sub(self.grid.scroll_region().start);
                }
                let col = cursor.col().0.min(self.grid.cols() - 1);
                self.reply(format!("\x1b[{};{}R", row + 1, col + 1));
            }
            _ => log::debug!("ignoring DSR {status}"),
        }
    }

    /// ESC ( / ) / * / + — designate a charset into G0–G3.
    fn designate_charset(&mut self, intro: u8, designator: u8) {
        let index = match intro {
            b'(' => CharsetIndex::G0,
            b')' => CharsetIndex::G1,
            b'*' => CharsetIndex::G2,
            _ => CharsetIndex::G3,
        };
        let charset = match designator {
            b'0' => StandardCharset::SpecialGraphics,
            b'B' => StandardCharset::Ascii,
            _ => {
                log::debug!("unknown charset designator {:?}", designator as char);
                StandardCharset::Ascii
            }
        };
        self.charset.set_charset(index, charset);
    }

    /// OSC payload: `selector;text`.
    fn osc(&mut self, data: &[u8]) {
        let text = String::from_utf8_lossy(data);
        let (selector, payload) = match text.split_once(';') {
            Some((s, p)) => (s, p),
            None => (text.as_ref(), ""),
        };
        match selector.parse::<u16>() {
            Ok(0 | 2) => {
                if self.scratch.title() != payload {
                    self.scratch.set_title(payload);
                    self.emit(Event::LabelsChanged);
                }
            }
            Ok(1) => log::trace!("ignoring icon name"),
            // Button labels: selectors 81-85 address slots 1-5.
            Ok(n @ 81..=85) => {
                let slot = (n - 81) as usize;
                if self.scratch.button(slot) != payload {
                    self.scratch.set_button(slot, payload);
                    self.emit(Event::LabelsChanged);
                }
            }
            _ => log::debug!("ignoring OSC {selector:?}"),
        }
    }
}

impl<L: EventListener> Perform for Terminal<L> {
    fn print(&mut self, ch: char) {
        let ch = self.charset.translate(ch);
        // Combining marks and other zero-width codepoints never occupy a
        // cell of their own.
        if UnicodeWidthChar::width(ch) == Some(0) {
            return;
        }
        let autowrap = self.mode.contains(TermMode::LINE_WRAP);
        let insert = self.mode.contains(TermMode::INSERT);
        self.grid.put_char(ch, autowrap, insert);
        self.touch();
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 => self.emit(Event::Bell),
            0x08 => {
                self.grid.move_backward(1);
                self.touch();
            }
            0x09 => {
                self.grid.tab();
                self.touch();
            }
            0x0A..=0x0C => {
                self.grid.linefeed();
                if self.mode.contains(TermMode::NEWLINE) {
                    self.grid.carriage_return();
                }
                self.touch();
            }
            0x0D => {
                self.grid.carriage_return();
                self.touch();
            }
            0x0E => self.charset.set_active(CharsetIndex::G1),
            0x0F => self.charset.set_active(CharsetIndex::G0),
            // SUB in ground marks garbage visibly.
            0x1A => self.print('\u{FFFD}'),
            0x18 => {}
            _ => log::trace!("ignoring control {byte:#04x}"),
        }
    }

    fn csi_dispatch(&mut self, params: &Params, private: Option<u8>, action: u8) {
        match (private, action) {
            (Some(b'?'), b'h') => self.set_private_modes(params, true),
            (Some(b'?'), b'l') => self.set_private_modes(params, false),
            (Some(b'>'), b'c') => self.reply("\x1b[>1;100;0c".to_string()),
            (Some(marker), _) => {
                log::debug!("ignoring CSI {:?} {:?}", marker as char, action as char);
            }
            (None, _) => {
                let n = params.get_or(0, 1) as usize;
                match action {
                    b'A' => self.grid.move_up(n),
                    b'B' => self.grid.move_down(n),
                    b'C' => self.grid.move_forward(n),
                    b'D' => self.grid.move_backward(n),
                    b'E' => {
                        self.grid.move_down(n);
                        self.grid.carriage_return();
                    }
                    b'F' => {
                        self.grid.move_up(n);
                        self.grid.carriage_return();
                    }
                    b'G' => self.grid.goto_col(Column(n - 1)),
                    b'd' => self.goto_line_origin(params.get_or(0, 1)),
                    b'H' | b'f' => {
                        self.goto_origin(params.get_or(0, 1), params.get_or(1, 1));
                    }
                    b'S' => self.grid.scroll_up(n),
                    b'T' => self.grid.scroll_down(n),
                    b'J' => match params.get_raw(0).unwrap_or(0) {
                        0 => self.grid.erase_display(EraseMode::Below),
                        1 => self.grid.erase_display(EraseMode::Above),
                        2 => self.grid.erase_display(EraseMode::All),
                        mode => log::debug!("ignoring ED {mode}"),
                    },
                    b'K' => match params.get_raw(0).unwrap_or(0) {
                        0 => self.grid.erase_line(EraseMode::Below),
                        1 => self.grid.erase_line(EraseMode::Above),
                        2 => self.grid.erase_line(EraseMode::All),
                        mode => log::debug!("ignoring EL {mode}"),
                    },
                    b'@' => self.grid.insert_blank(n),
                    b'L' => self.grid.insert_lines(n),
                    b'M' => self.grid.delete_lines(n),
                    b'P' => self.grid.delete_chars(n),
                    b'X' => self.grid.erase_chars(n),
                    b'r' => {
                        let top = params.get_or(0, 1) as usize;
                        let bottom = params.get_raw(1).filter(|&b| b > 0).map(|b| b as usize);
                        if self.grid.set_scroll_region(top, bottom) {
                            self.goto_origin(1, 1);
                        }
                    }
                    b'm' => self.sgr(params),
                    b'h' => {
                        self.set_ansi_modes(params, true);
                        return;
                    }
                    b'l' => {
                        self.set_ansi_modes(params, false);
                        return;
                    }
                    b'n' => {
                        self.device_status(params.get_raw(0).unwrap_or(0));
                        return;
                    }
                    b'c' => {
                        // Primary DA: VT220 with ANSI color.
                        self.reply("\x1b[?62;22c".to_string());
                        return;
                    }
                    b's' => self.grid.save_position(),
                    b'u' => self.grid.restore_position(),
                    b'g' => match params.get_raw(0).unwrap_or(0) {
                        0 => self.grid.clear_tab_stop(TabClearMode::Current),
                        3 => self.grid.clear_tab_stop(TabClearMode::All),
                        mode => log::debug!("ignoring TBC {mode}"),
                    },
                    b'I' => {
                        for _ in 0..n {
                            self.grid.tab();
                        }
                    }
                    b'Z' => {
                        for _ in 0..n {
                            self.grid.tab_backward();
                        }
                    }
                    _ => {
                        log::debug!("ignoring CSI final {:?}", action as char);
                        return;
                    }
                }
                self.touch();
            }
        }
    }

    fn esc_dispatch(&mut self, intermediate: Option<u8>, byte: u8) {
        match (intermediate, byte) {
            (None, b'7') => self.save_cursor(),
            (None, b'8') => self.restore_cursor(),
            (None, b'c') => {
                self.reset();
                return;
            }
            (None, b'D') => self.grid.linefeed(),
            (None, b'M') => self.grid.reverse_index(),
            (None, b'E') => self.grid.next_line(),
            (None, b'H') => self.grid.set_tab_stop(),
            (None, b'=') => self.mode.insert(TermMode::APP_KEYPAD),
            (None, b'>') => self.mode.remove(TermMode::APP_KEYPAD),
            (None, b'n') => self.charset.set_active(CharsetIndex::G2),
            (None, b'o') => self.charset.set_active(CharsetIndex::G3),
            (None, b'N') => self.charset.set_single_shift(CharsetIndex::G2),
            (None, b'O') => self.charset.set_single_shift(CharsetIndex::G3),
            (Some(b'#'), b'8') => self.grid.fill_with_e(),
            (Some(intro @ (b'(' | b')' | b'*' | b'+')), designator) => {
                self.designate_charset(intro, designator);
                return;
            }
            _ => {
                log::debug!(
                    "ignoring ESC {:?} {:?}",
                    intermediate.map(|b| b as char),
                    byte as char
                );
                return;
            }
        }
        self.touch();
    }

    fn osc_dispatch(&mut self, data: &[u8]) {
        self.osc(data);
    }
}

/// Decode the tail of an SGR 38/48 extended color: `5;N` or `2;r;g;b`.
///
/// Returns the color and how many extra parameters were consumed.
fn extended_color(params: &Params, i: usize) -> Option<(Color, usize)> {
    match params.get_raw(i + 1)? {
        5 => {
            let index = params.get_raw(i + 2)?;
            Some((Color::from_index(index), 2))
        }
        2 => {
            let r = params.get_raw(i + 2)?;
            let g = params.get_raw(i + 3)?;
            let b = params.get_raw(i + 4)?;
            Some((
                Color::from_rgb(r.min(255) as u8, g.min(255) as u8, b.min(255) as u8),
                4,
            ))
        }
        _ => None,
    }
}
