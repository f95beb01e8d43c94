//! Grid editing operations.
//!
//! Character writes, insertion, deletion, and erase primitives the escape
//! dispatcher calls. Vacated and erased cells keep the current background
//! (BCE) but drop glyph, foreground, and attributes.

use crate::cell::Cell;
use crate::index::Column;

use super::Grid;

/// Erase mode for display and line erase operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// Erase from cursor to end (of display or line).
    Below,
    /// Erase from start (of display or line) to cursor.
    Above,
    /// Erase entire (display or line).
    All,
}

impl Grid {
    /// Write a glyph at the cursor position using the cursor template.
    ///
    /// With `autowrap`, a cursor resting in the pending-wrap column first
    /// moves to column 0 of the next row (scrolling if needed); without it
    /// the write lands in the last column. With `insert`, existing cells
    /// shift right one position first, dropping the last cell of the row.
    pub fn put_char(&mut self, ch: char, autowrap: bool, insert: bool) {
        let cols = self.cols();

        if self.cursor.col().0 >= cols {
            if autowrap {
                self.carriage_return();
                self.linefeed();
            } else {
                self.cursor.set_col(Column(cols - 1));
            }
        }

        if insert {
            self.insert_blank(1);
        }

        let line = self.cursor.line();
        let col = self.cursor.col().0;
        let template = self.cursor.template;
        let cell = &mut self.rows_mut()[line][Column(col)];
        cell.ch = ch;
        cell.fg = template.fg;
        cell.bg = template.bg;
        cell.attrs = template.attrs;

        // Advance; with auto-wrap the column may rest one past the end.
        let new_col = col + 1;
        if new_col >= cols && !autowrap {
            self.cursor.set_col(Column(cols - 1));
        } else {
            self.cursor.set_col(Column(new_col));
        }
    }

    /// ICH: insert `count` blank cells at the cursor, shifting existing
    /// cells right. Cells that shift past the right edge are lost.
    pub fn insert_blank(&mut self, count: usize) {
        let line = self.cursor.line();
        let col = self.cursor.col().0;
        let cols = self.cols();
        let blank = Cell::blank_with_bg(&self.cursor.template);

        if col >= cols {
            return;
        }

        let count = count.min(cols - col);
        let cells = self.rows_mut()[line].as_mut_slice();

        // Shift cells right by swapping (no allocation).
        for i in (col + count..cols).rev() {
            cells.swap(i, i - count);
        }

        for cell in &mut cells[col..col + count] {
            cell.reset(&blank);
        }
    }

    /// DCH: delete `count` cells at the cursor, shifting remaining cells
    /// left. New cells at the right edge are blank.
    pub fn delete_chars(&mut self, count: usize) {
        let line = self.cursor.line();
        let col = self.cursor.col().0;
        let cols = self.cols();
        let blank = Cell::blank_with_bg(&self.cursor.template);

        if col >= cols {
            return;
        }

        let count = count.min(cols - col);
        let cells = self.rows_mut()[line].as_mut_slice();

        // Shift cells left by swapping (no allocation).
        for i in col..cols - count {
            cells.swap(i, i + count);
        }

        for cell in &mut cells[cols - count..cols] {
            cell.reset(&blank);
        }
    }

    /// ECH: erase `count` cells starting at the cursor, without shifting.
    pub fn erase_chars(&mut self, count: usize) {
        let line = self.cursor.line();
        let col = self.cursor.col().0.min(self.cols() - 1);
        let end = (col + count).min(self.cols());
        let blank = Cell::blank_with_bg(&self.cursor.template);
        self.rows_mut()[line].clear_range(Column(col)..Column(end), &blank);
    }

    /// ED: erase part or all of the display. Ranges include the cursor cell.
    pub fn erase_display(&mut self, mode: EraseMode) {
        let cols = self.cols();
        let blank = Cell::blank_with_bg(&self.cursor.template);
        let cursor_line = self.cursor.line();
        match mode {
            EraseMode::Below => {
                self.erase_line(EraseMode::Below);
                for line in cursor_line + 1..self.lines() {
                    self.rows_mut()[line].reset(cols, &blank);
                }
            }
            EraseMode::Above => {
                self.erase_line(EraseMode::Above);
                for line in 0..cursor_line {
                    self.rows_mut()[line].reset(cols, &blank);
                }
            }
            EraseMode::All => {
                for line in 0..self.lines() {
                    self.rows_mut()[line].reset(cols, &blank);
                }
            }
        }
    }

    /// EL: erase part or all of the current line. Ranges include the cursor
    /// cell.
    pub fn erase_line(&mut self, mode: EraseMode) {
        let line = self.cursor.line();
        let col = self.cursor.col().0.min(self.cols() - 1);
        let cols = self.cols();
        let blank = Cell::blank_with_bg(&self.cursor.template);

        let range = match mode {
            EraseMode::Below => Column(col)..Column(cols),
            EraseMode::Above => Column(0)..Column(col + 1),
            EraseMode::All => Column(0)..Column(cols),
        };
        self.rows_mut()[line].clear_range(range, &blank);
    }

    /// DECALN: fill every cell with 'E' using default colors and no
    /// attributes.
    pub fn fill_with_e(&mut self) {
        let cols = self.cols();
        let template = Cell {
            ch: 'E',
            ..Cell::default()
        };
        for line in 0..self.lines() {
            self.rows_mut()[line].reset(cols, &template);
        }
    }
}
