//! Scroll region management and scroll operations.
//!
//! Provides `set_scroll_region` (DECSTBM), `scroll_up`, `scroll_down`,
//! `insert_lines`, and `delete_lines`. All operations rotate existing row
//! allocations and fill vacated rows with the current background (BCE).

use std::ops::Range;

use crate::cell::Cell;

use super::Grid;

impl Grid {
    /// DECSTBM: set the scroll region.
    ///
    /// Parameters are 1-based; `top` 0 is treated as 1 and a missing
    /// `bottom` means the last line. Stored internally as a 0-based
    /// half-open range. Regions of fewer than 2 lines are rejected.
    ///
    /// Returns `true` when the region was changed; the dispatcher homes the
    /// cursor afterwards (respecting origin mode).
    pub fn set_scroll_region(&mut self, top: usize, bottom: Option<usize>) -> bool {
        let top = top.max(1) - 1;
        let bottom = bottom.map_or(self.lines(), |b| b.min(self.lines()));

        if top + 1 >= bottom {
            log::debug!("rejecting scroll region {top}..{bottom}");
            return false;
        }

        self.set_scroll_region_range(top..bottom);
        true
    }

    /// SU: scroll the scroll region up by `count` lines.
    ///
    /// Top rows of the region are lost; blank rows appear at the bottom.
    pub fn scroll_up(&mut self, count: usize) {
        let range = self.scroll_region();
        self.scroll_range_up(range, count);
    }

    /// SD: scroll the scroll region down by `count` lines.
    ///
    /// Bottom rows of the region are lost; blank rows appear at the top.
    pub fn scroll_down(&mut self, count: usize) {
        let range = self.scroll_region();
        self.scroll_range_down(range, count);
    }

    /// IL: insert `count` blank lines at the cursor, pushing existing lines
    /// down within the scroll region.
    ///
    /// No-op when the cursor is outside the region. Lines pushed past the
    /// bottom of the region are lost.
    pub fn insert_lines(&mut self, count: usize) {
        if !self.cursor_in_region() {
            return;
        }
        let range = self.cursor.line()..self.scroll_region().end;
        self.scroll_range_down(range, count);
    }

    /// DL: delete `count` lines at the cursor, pulling remaining lines up
    /// within the scroll region.
    ///
    /// No-op when the cursor is outside the region. Blank lines appear at
    /// the bottom of the region.
    pub fn delete_lines(&mut self, count: usize) {
        if !self.cursor_in_region() {
            return;
        }
        let range = self.cursor.line()..self.scroll_region().end;
        self.scroll_range_up(range, count);
    }

    /// Scroll a range of rows up by `count` using rotation.
    fn scroll_range_up(&mut self, range: Range<usize>, count: usize) {
        let len = range.end - range.start;
        if len == 0 || count == 0 {
            return;
        }
        let count = count.min(len);
        let cols = self.cols();
        let blank = Cell::blank_with_bg(&self.cursor.template);

        self.rows_mut()[range.start..range.end].rotate_left(count);

        for line in (range.end - count)..range.end {
            self.rows_mut()[line].reset(cols, &blank);
        }
    }

    /// Scroll a range of rows down by `count` using rotation.
    fn scroll_range_down(&mut self, range: Range<usize>, count: usize) {
        let len = range.end - range.start;
        if len == 0 || count == 0 {
            return;
        }
        let count = count.min(len);
        let cols = self.cols();
        let blank = Cell::blank_with_bg(&self.cursor.template);

        self.rows_mut()[range.start..range.end].rotate_right(count);

        for line in range.start..range.start + count {
            self.rows_mut()[line].reset(cols, &blank);
        }
    }
}
