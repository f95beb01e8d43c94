//! Terminal mode flags (DECSET/DECRST, SM/RM).
//!
//! Each flag corresponds to a mode toggled by escape sequences (or, for
//! `FN_ALT`, by configuration). The default mode has `SHOW_CURSOR` and
//! `LINE_WRAP` enabled.

use bitflags::bitflags;

bitflags! {
    /// Bitflags for terminal mode state.
    ///
    /// Modes are toggled by DECSET (`CSI ? n h`), DECRST (`CSI ? n l`),
    /// SM (`CSI n h`), and RM (`CSI n l`) escape sequences.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TermMode: u16 {
        /// DECTCEM (?25) — cursor visible.
        const SHOW_CURSOR    = 1;
        /// DECAWM (?7) — auto-wrap at end of line.
        const LINE_WRAP      = 1 << 1;
        /// DECOM (?6) — origin mode (cursor relative to scroll region).
        const ORIGIN         = 1 << 2;
        /// IRM (4) — insert mode.
        const INSERT         = 1 << 3;
        /// LNM (20) — linefeed also performs carriage return.
        const NEWLINE        = 1 << 4;
        /// DECCKM (?1) — application cursor keys.
        const APP_CURSOR     = 1 << 5;
        /// DECKPAM / ?66 — application keypad mode.
        const APP_KEYPAD     = 1 << 6;
        /// DECSCNM (?5) — reverse video for the whole screen. Stored for
        /// the serializer; cells are unaffected.
        const REVERSE_SCREEN = 1 << 7;
        /// ?1000 — report mouse clicks. Stored, never acted on.
        const MOUSE_CLICKS   = 1 << 8;
        /// ?1002/?1003 — report mouse motion. Stored, never acted on.
        const MOUSE_MOTION   = 1 << 9;
        /// Function keys send alternate sequences (configuration).
        const FN_ALT         = 1 << 10;
    }
}

impl Default for TermMode {
    fn default() -> Self {
        Self::SHOW_CURSOR | Self::LINE_WRAP
    }
}
