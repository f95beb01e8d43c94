//! Terminal state machine.
//!
//! `Terminal<L: EventListener>` is the single owned value the host wires up
//! at start: it owns the grid, the escape parser, charset state, mode flags,
//! and the two configuration copies (persisted baseline + scratch). Bytes
//! go in through [`Terminal::feed`]; state comes out through the
//! serialization hooks and the event listener.

pub mod charset;
pub mod handler;
pub mod mode;
pub mod serialize;

pub use charset::{CharsetIndex, CharsetState, StandardCharset};
pub use mode::TermMode;
pub use serialize::{ScreenCursor, Serialized};

use crate::cell::Cell;
use crate::config::{BUTTON_COUNT, TermConfig};
use crate::event::{Event, EventListener};
use crate::grid::Grid;
use crate::index::{Column, Line, Point};
use crate::parser::Parser;

/// DECSC save slot: position, attributes, and charset state.
#[derive(Debug, Clone, Copy)]
struct SavedCursor {
    point: Point,
    template: Cell,
    charset: CharsetState,
}

/// The terminal state machine.
///
/// Generic over `L: EventListener` so tests can use `VoidListener` while
/// the real host routes events to its network and display tasks.
pub struct Terminal<L: EventListener> {
    /// The visible cell grid.
    grid: Grid,
    /// Escape sequence decoder.
    parser: Parser,
    /// Mode flags (DECSET/DECRST, SM/RM).
    mode: TermMode,
    /// Character set translation state (G0–G3).
    charset: CharsetState,
    /// DECSC/DECRC save slot (ESC 7 / ESC 8).
    saved_cursor: Option<SavedCursor>,
    /// Persisted configuration baseline.
    persisted: TermConfig,
    /// Scratch configuration that escape sequences mutate.
    scratch: TermConfig,
    /// Event sink.
    listener: L,
}

impl<L: EventListener> Terminal<L> {
    /// Create a terminal from a loaded configuration.
    pub fn new(config: TermConfig, listener: L) -> Self {
        let grid = Grid::new(config.lines(), config.cols());
        let mode = initial_mode(&config);
        Self {
            grid,
            parser: Parser::new(),
            mode,
            charset: CharsetState::default(),
            saved_cursor: None,
            persisted: config.clone(),
            scratch: config,
            listener,
        }
    }

    /// Consume a byte slice from the remote program and advance the parser.
    ///
    /// Safe to call with any length, including zero. Sequences may span
    /// calls; a stream cut mid-sequence leaves the parser waiting and a
    /// later `ESC c` or host-driven [`Terminal::apply_settings`] recovers.
    pub fn feed(&mut self, bytes: &[u8]) {
        // The parser is moved out so it can drive `&mut self` as the
        // dispatch target, then moved back.
        let mut parser = std::mem::take(&mut self.parser);
        parser.advance(self, bytes);
        self.parser = parser;
    }

    /// Reference to the grid, for serialization and inspection.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current terminal mode flags.
    pub fn mode(&self) -> TermMode {
        self.mode
    }

    /// Reference to the charset state.
    pub fn charset(&self) -> &CharsetState {
        &self.charset
    }

    /// Current screen title.
    pub fn title(&self) -> &str {
        self.scratch.title()
    }

    /// Current button label for `slot` (0-based).
    pub fn button(&self, slot: usize) -> &str {
        self.scratch.button(slot)
    }

    /// The scratch (live) configuration.
    pub fn config(&self) -> &TermConfig {
        &self.scratch
    }

    /// The persisted configuration baseline.
    pub fn persisted(&self) -> &TermConfig {
        &self.persisted
    }

    /// Mutable access to the persisted baseline.
    ///
    /// The host edits this on a settings change, then calls
    /// [`Terminal::apply_settings`] and writes
    /// [`TermConfig::to_bytes`] back to storage.
    pub fn persisted_mut(&mut self) -> &mut TermConfig {
        &mut self.persisted
    }

    /// Copy the persisted bundle over the scratch copy and apply it.
    ///
    /// With `reset_screen`, the grid is resized and fully reset (the power-on
    /// path). Without it, geometry, colors, and labels update in place and
    /// screen content survives (the live settings-change path).
    pub fn apply_settings(&mut self, reset_screen: bool) {
        self.scratch = self.persisted.clone();
        self.grid.resize(self.scratch.lines(), self.scratch.cols());
        if reset_screen {
            self.parser = Parser::new();
            self.reset_state();
        } else {
            self.mode.set(TermMode::FN_ALT, self.scratch.fn_alt_mode);
        }
        self.emit(Event::LabelsChanged);
        self.emit(Event::ContentChanged);
    }

    /// Write factory defaults to the persisted baseline and apply them.
    ///
    /// The host persists the new baseline afterwards.
    pub fn restore_defaults(&mut self) {
        self.persisted = TermConfig::default();
        self.apply_settings(true);
    }

    /// Full reset (RIS): re-apply the scratch baseline from the persisted
    /// bundle, clear the grid, and restore every default.
    pub fn reset(&mut self) {
        let labels_differ = self.scratch.title() != self.persisted.title()
            || (0..BUTTON_COUNT).any(|i| self.scratch.button(i) != self.persisted.button(i));
        self.scratch = self.persisted.clone();
        self.grid.resize(self.scratch.lines(), self.scratch.cols());
        self.reset_state();
        if labels_differ {
            self.emit(Event::LabelsChanged);
        }
        self.emit(Event::ContentChanged);
    }

    /// Reset mode flags, charsets, save slots, and grid-level state.
    fn reset_state(&mut self) {
        self.grid.reset();
        self.mode = initial_mode(&self.scratch);
        self.charset = CharsetState::default();
        self.saved_cursor = None;
    }

    /// DECSC: save position, attributes, and charset state.
    fn save_cursor(&mut self) {
        let cursor = self.grid.cursor();
        let point = Point::new(
            Line(cursor.line()),
            Column(cursor.col().0.min(self.grid.cols() - 1)),
        );
        self.saved_cursor = Some(SavedCursor {
            point,
            template: cursor.template,
            charset: self.charset,
        });
    }

    /// DECRC: restore position, attributes, and charset state.
    ///
    /// An empty slot restores the power-on cursor.
    fn restore_cursor(&mut self) {
        match self.saved_cursor {
            Some(saved) => {
                self.grid.goto(saved.point.line.0, saved.point.column);
                self.grid.cursor_mut().template = saved.template;
                self.charset = saved.charset;
            }
            None => {
                self.grid.goto(0, Column(0));
                self.grid.cursor_mut().template = Cell::default();
                self.charset = CharsetState::default();
            }
        }
    }

    fn emit(&self, event: Event) {
        self.listener.send_event(event);
    }

    /// Grid, cursor, or mode state changed.
    fn touch(&self) {
        self.emit(Event::ContentChanged);
    }

    /// Queue reply bytes for the remote program.
    fn reply(&self, response: String) {
        self.emit(Event::Output(response));
    }
}

/// Power-on mode flags for a configuration.
fn initial_mode(config: &TermConfig) -> TermMode {
    let mut mode = TermMode::default();
    mode.set(TermMode::FN_ALT, config.fn_alt_mode);
    mode
}
