//! Cursor movement and navigation operations.
//!
//! Implements the motion primitives behind CUU/CUD/CUF/CUB/CUP/CHA/VPA,
//! CR/LF/RI/NEL, tab motion, and the position-only save slot. All movement
//! is clamped to grid bounds and respects the scroll region where
//! applicable.

use crate::index::{Column, Line, Point};

use super::Grid;

/// Tab clear mode for TBC (Tabulation Clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabClearMode {
    /// Clear tab stop at the current column.
    Current,
    /// Clear all tab stops.
    All,
}

impl Grid {
    /// CUU: move cursor up by `count` lines, clamped to the top of the
    /// scroll region (if inside it) or line 0. Never scrolls.
    pub fn move_up(&mut self, count: usize) {
        let line = self.cursor.line();
        let top = if self.cursor_in_region() {
            self.scroll_region().start
        } else {
            0
        };
        self.cursor.set_line(line.saturating_sub(count).max(top));
    }

    /// CUD: move cursor down by `count` lines, clamped to the bottom of
    /// the scroll region (if inside it) or the last line. Never scrolls.
    pub fn move_down(&mut self, count: usize) {
        let line = self.cursor.line();
        let bottom = if self.cursor_in_region() {
            self.scroll_region().end - 1
        } else {
            self.lines() - 1
        };
        self.cursor.set_line((line + count).min(bottom));
    }

    /// Move cursor up `count` lines, converting motion past the scroll
    /// region top into reverse-index scrolls.
    ///
    /// A cursor starting outside the region clips instead of scrolling.
    /// Membership is decided once, on the position at entry, so a cursor
    /// that walks into the region mid-move still never scrolls.
    pub fn move_up_scroll(&mut self, count: usize) {
        if !self.cursor_in_region() {
            self.move_up(count);
            return;
        }
        for _ in 0..count {
            self.reverse_index();
        }
    }

    /// Move cursor down `count` lines, converting motion past the scroll
    /// region bottom into index scrolls.
    ///
    /// A cursor starting outside the region clips instead of scrolling.
    /// Membership is decided once, on the position at entry, so a cursor
    /// that walks into the region mid-move still never scrolls.
    pub fn move_down_scroll(&mut self, count: usize) {
        if !self.cursor_in_region() {
            self.move_down(count);
            return;
        }
        for _ in 0..count {
            self.linefeed();
        }
    }

    /// CUF: move cursor right by `count` columns, clamped to the last column.
    pub fn move_forward(&mut self, count: usize) {
        let col = self.cursor.col().0;
        let last = self.cols() - 1;
        self.cursor.set_col(Column((col + count).min(last)));
    }

    /// CUB: move cursor left by `count` columns, clamped to column 0.
    ///
    /// A pending-wrap cursor first drops back onto the last column.
    pub fn move_backward(&mut self, count: usize) {
        let col = self.cursor.col().0.min(self.cols() - 1);
        self.cursor.set_col(Column(col.saturating_sub(count)));
    }

    /// CUP: set cursor to absolute `(line, col)`, clamped to grid bounds.
    ///
    /// Clears pending wrap.
    pub fn goto(&mut self, line: usize, col: Column) {
        self.cursor.set_line(line.min(self.lines() - 1));
        self.cursor.set_col(Column(col.0.min(self.cols() - 1)));
    }

    /// CHA: set cursor column, clamped to the last column. Clears pending
    /// wrap.
    pub fn goto_col(&mut self, col: Column) {
        self.cursor.set_col(Column(col.0.min(self.cols() - 1)));
    }

    /// VPA: set cursor line, clamped to the last line.
    pub fn goto_line(&mut self, line: usize) {
        self.cursor.set_line(line.min(self.lines() - 1));
    }

    /// CR: move cursor to column 0. Clears pending wrap.
    pub fn carriage_return(&mut self) {
        self.cursor.set_col(Column(0));
    }

    /// LF (index): move cursor down one line. At the bottom of the scroll
    /// region, scroll the region up instead of moving.
    pub fn linefeed(&mut self) {
        let line = self.cursor.line();
        if line + 1 == self.scroll_region().end {
            self.scroll_up(1);
        } else if line + 1 < self.lines() {
            self.cursor.set_line(line + 1);
        }
    }

    /// RI (reverse index): move cursor up one line. At the top of the
    /// scroll region, scroll the region down instead of moving.
    pub fn reverse_index(&mut self) {
        let line = self.cursor.line();
        if line == self.scroll_region().start {
            self.scroll_down(1);
        } else if line > 0 {
            self.cursor.set_line(line - 1);
        }
    }

    /// NEL: carriage return followed by linefeed.
    pub fn next_line(&mut self) {
        self.carriage_return();
        self.linefeed();
    }

    /// HT: advance cursor to the next tab stop, or the last column.
    pub fn tab(&mut self) {
        let col = self.cursor.col().0;
        let last = self.cols() - 1;

        for c in (col + 1)..self.cols() {
            if self.tab_stop_at(c) {
                self.cursor.set_col(Column(c));
                return;
            }
        }
        self.cursor.set_col(Column(last));
    }

    /// CBT: move cursor to the previous tab stop, or column 0.
    pub fn tab_backward(&mut self) {
        let col = self.cursor.col().0.min(self.cols() - 1);

        for c in (0..col).rev() {
            if self.tab_stop_at(c) {
                self.cursor.set_col(Column(c));
                return;
            }
        }
        self.cursor.set_col(Column(0));
    }

    /// HTS: set a tab stop at the current cursor column.
    pub fn set_tab_stop(&mut self) {
        let col = self.cursor.col().0;
        if let Some(stop) = self.tab_stops_mut().get_mut(col) {
            *stop = true;
        }
    }

    /// TBC: clear tab stop(s) according to mode.
    pub fn clear_tab_stop(&mut self, mode: TabClearMode) {
        match mode {
            TabClearMode::Current => {
                let col = self.cursor.col().0;
                if let Some(stop) = self.tab_stops_mut().get_mut(col) {
                    *stop = false;
                }
            }
            TabClearMode::All => {
                self.tab_stops_mut().fill(false);
            }
        }
    }

    /// Save the cursor position into the position-only slot (CSI s).
    pub fn save_position(&mut self) {
        let point = Point::new(
            Line(self.cursor.line()),
            Column(self.cursor.col().0.min(self.cols() - 1)),
        );
        self.set_saved_position(Some(point));
    }

    /// Restore the cursor position from the position-only slot (CSI u).
    ///
    /// An empty slot restores the home position.
    pub fn restore_position(&mut self) {
        let point = self.saved_position().unwrap_or_default();
        self.goto(point.line.0, point.column);
    }
}
