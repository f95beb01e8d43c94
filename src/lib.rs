//! Core terminal emulation for a network-attached terminal.
//!
//! This crate is the screen state machine of the system: a byte stream from
//! the remote program goes into [`Terminal::feed`], an ANSI/VT interpreter
//! decodes it, and a bounded grid of styled cells plus cursor and mode state
//! comes out through the serialization hooks. It contains no transport,
//! storage, or UI code; those collaborate through [`EventListener`] and the
//! persisted [`TermConfig`] image.
//!
//! Everything is sized for a small embedded target: the grid is capped at
//! 80×25 cells, parsing is allocation-free, and hostile input degrades to
//! replacement glyphs and discarded sequences, never a panic.

#![deny(unsafe_code)]

pub mod cell;
pub mod color;
pub mod config;
pub mod event;
pub mod grid;
pub mod index;
pub mod parser;
pub mod term;

pub use cell::{Cell, CellAttrs};
pub use color::Color;
pub use config::TermConfig;
pub use event::{Event, EventListener, VoidListener};
pub use grid::{Cursor, EraseMode, Grid, Row, TabClearMode};
pub use index::{Column, Line, Point};
pub use parser::{Params, Parser, Perform};
pub use term::{
    CharsetIndex, CharsetState, ScreenCursor, Serialized, StandardCharset, TermMode, Terminal,
};
pub use term::serialize::{decode2b, encode2b};
