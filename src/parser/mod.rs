//! Byte-driven escape sequence parser.
//!
//! An explicit state machine over the VT dialects: C0 controls, ESC, CSI,
//! OSC, DCS-style strings, charset designators, and a UTF-8 accumulator.
//! The parser owns no screen state; it decodes bytes into calls on a
//! [`Perform`] sink, which the terminal implements.
//!
//! Robustness contract: any byte in any state is consumed without panicking.
//! CAN and SUB abort a sequence in progress, ESC restarts one, and malformed
//! input is discarded silently (with a log breadcrumb) per the
//! lenient-consumer policy.

pub mod params;

pub use params::Params;

/// Longest OSC payload retained, selector included. Longer strings keep
/// draining to their terminator but the overflow is dropped.
const OSC_RAW_MAX: usize = 96;

/// Emitted for malformed UTF-8 input.
const REPLACEMENT: char = '\u{FFFD}';

/// Parser states, per the conventional VT500 parser model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    /// Printable bytes become glyphs; C0 controls dispatch immediately.
    #[default]
    Ground,
    /// After ESC; awaiting an intermediate or final byte.
    Escape,
    /// Collecting ESC intermediates (0x20–0x2F).
    EscapeIntermediate,
    /// After ESC `[`.
    CsiEntry,
    /// Collecting CSI parameter bytes.
    CsiParam,
    /// Collecting CSI intermediates.
    CsiIntermediate,
    /// Malformed CSI; consuming up to the final byte.
    CsiIgnore,
    /// After ESC `]`; collecting until BEL or ST.
    OscString,
    /// After ESC `P` (and SOS/PM/APC); skipping until ST.
    DcsString,
    /// After ESC `(`, `)`, `*`, `+`; awaiting the charset final.
    CharsetDesignate,
}

/// Receives decoded terminal actions from the parser.
pub trait Perform {
    /// A printable glyph (one codepoint).
    fn print(&mut self, ch: char);

    /// A C0 control byte, dispatched immediately.
    fn execute(&mut self, byte: u8);

    /// A complete CSI sequence. `private` carries the leading marker byte
    /// (`?`, `>`, ...) if one was present.
    fn csi_dispatch(&mut self, params: &Params, private: Option<u8>, action: u8);

    /// A complete ESC sequence, with its intermediate byte if any. Charset
    /// designations arrive with their introducer (`(`, `)`, `*`, `+`) as
    /// the intermediate.
    fn esc_dispatch(&mut self, intermediate: Option<u8>, byte: u8);

    /// A complete OSC string (selector and payload, unsplit).
    fn osc_dispatch(&mut self, data: &[u8]);
}

/// Bounded accumulator for OSC payloads.
#[derive(Debug, Clone, Copy)]
struct OscBuffer {
    data: [u8; OSC_RAW_MAX],
    len: usize,
    truncated: bool,
}

impl Default for OscBuffer {
    fn default() -> Self {
        Self {
            data: [0; OSC_RAW_MAX],
            len: 0,
            truncated: false,
        }
    }
}

impl OscBuffer {
    fn clear(&mut self) {
        self.len = 0;
        self.truncated = false;
    }

    fn push(&mut self, byte: u8) {
        if self.len < OSC_RAW_MAX {
            self.data[self.len] = byte;
            self.len += 1;
        } else {
            self.truncated = true;
        }
    }

    fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

/// The escape sequence parser.
///
/// Holds only decode state; all memory is fixed-size. Feed bytes through
/// [`Parser::advance`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    state: State,
    params: Params,
    private: Option<u8>,
    intermediate: Option<u8>,
    osc: OscBuffer,
    /// Introducer byte of a charset designation in progress.
    designate_intro: u8,
    /// ESC seen inside a string state; a following `\` forms ST.
    string_esc: bool,
    utf8_codepoint: u32,
    utf8_remaining: u8,
    utf8_len: u8,
}

impl Parser {
    /// Create a parser in the ground state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a byte slice, dispatching decoded actions to `performer`.
    ///
    /// Safe to call with any slice, including empty; sequences may span
    /// calls.
    pub fn advance<P: Perform>(&mut self, performer: &mut P, bytes: &[u8]) {
        for &byte in bytes {
            self.advance_byte(performer, byte);
        }
    }

    fn advance_byte<P: Perform>(&mut self, performer: &mut P, byte: u8) {
        // A multi-byte glyph in progress claims continuation bytes first.
        if self.utf8_remaining > 0 {
            if (0x80..=0xBF).contains(&byte) {
                self.utf8_codepoint = (self.utf8_codepoint << 6) | u32::from(byte & 0x3F);
                self.utf8_remaining -= 1;
                if self.utf8_remaining == 0 {
                    performer.print(self.utf8_finish());
                }
                return;
            }
            // Truncated sequence: emit a replacement glyph and resync on
            // this byte.
            self.utf8_remaining = 0;
            performer.print(REPLACEMENT);
        }

        match self.state {
            State::Ground => self.ground(performer, byte),
            State::OscString => self.osc_string(performer, byte),
            State::DcsString => self.dcs_string(performer, byte),
            _ => self.sequence(performer, byte),
        }
    }

    /// Ground state: glyphs, C0 controls, and UTF-8 leads.
    fn ground<P: Perform>(&mut self, performer: &mut P, byte: u8) {
        match byte {
            0x1B => self.enter(State::Escape),
            0x00..=0x1A | 0x1C..=0x1F => performer.execute(byte),
            0x20..=0x7E => performer.print(byte as char),
            0x7F => {}
            0xC2..=0xDF => self.utf8_start(byte & 0x1F, 2),
            0xE0..=0xEF => self.utf8_start(byte & 0x0F, 3),
            0xF0..=0xF4 => self.utf8_start(byte & 0x07, 4),
            // Stray continuation bytes and invalid leads.
            0x80..=0xC1 | 0xF5..=0xFF => performer.print(REPLACEMENT),
        }
    }

    /// All collecting states except the string states.
    fn sequence<P: Perform>(&mut self, performer: &mut P, byte: u8) {
        // CAN and SUB abort; ESC restarts; other C0 bytes execute in place.
        match byte {
            0x18 | 0x1A => {
                self.enter(State::Ground);
                return;
            }
            0x1B => {
                self.enter(State::Escape);
                return;
            }
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => {
                performer.execute(byte);
                return;
            }
            0x7F => return,
            _ => {}
        }

        match self.state {
            State::Escape => match byte {
                b'(' | b')' | b'*' | b'+' => {
                    self.designate_intro = byte;
                    self.state = State::CharsetDesignate;
                }
                0x20..=0x2F => {
                    self.intermediate = Some(byte);
                    self.state = State::EscapeIntermediate;
                }
                b'[' => self.enter(State::CsiEntry),
                b']' => {
                    self.osc.clear();
                    self.enter(State::OscString);
                }
                // DCS, SOS, PM, APC: string payloads this core skips.
                b'P' | b'X' | b'^' | b'_' => self.enter(State::DcsString),
                0x30..=0x7E => {
                    performer.esc_dispatch(None, byte);
                    self.state = State::Ground;
                }
                _ => {
                    log::debug!("discarding escape sequence at byte {byte:#04x}");
                    self.state = State::Ground;
                }
            },
            State::EscapeIntermediate => match byte {
                // Only the first intermediate matters to the dispatch table.
                0x20..=0x2F => {}
                0x30..=0x7E => {
                    performer.esc_dispatch(self.intermediate, byte);
                    self.state = State::Ground;
                }
                _ => self.state = State::Ground,
            },
            State::CharsetDesignate => match byte {
                0x20..=0x2F => {}
                0x30..=0x7E => {
                    performer.esc_dispatch(Some(self.designate_intro), byte);
                    self.state = State::Ground;
                }
                _ => self.state = State::Ground,
            },
            State::CsiEntry | State::CsiParam => match byte {
                b'0'..=b'9' => {
                    self.params.push_digit(byte - b'0');
                    self.state = State::CsiParam;
                }
                b';' => {
                    self.params.next_param();
                    self.state = State::CsiParam;
                }
                0x3C..=0x3F if self.state == State::CsiEntry => {
                    self.private = Some(byte);
                    self.state = State::CsiParam;
                }
                // Colon sub-parameters and late private markers are
                // malformed here.
                b':' | 0x3C..=0x3F => self.state = State::CsiIgnore,
                0x20..=0x2F => {
                    self.intermediate = Some(byte);
                    self.state = State::CsiIntermediate;
                }
                0x40..=0x7E => {
                    performer.csi_dispatch(&self.params, self.private, byte);
                    self.state = State::Ground;
                }
                _ => self.state = State::Ground,
            },
            State::CsiIntermediate => match byte {
                0x20..=0x2F => {}
                0x30..=0x3F => self.state = State::CsiIgnore,
                0x40..=0x7E => {
                    // No sequence with intermediates is implemented here.
                    log::debug!(
                        "ignoring CSI with intermediate {:?} final {byte:#04x}",
                        self.intermediate
                    );
                    self.state = State::Ground;
                }
                _ => self.state = State::Ground,
            },
            State::CsiIgnore => {
                if (0x40..=0x7E).contains(&byte) {
                    self.state = State::Ground;
                }
            }
            // Routed to their own handlers before this match.
            State::Ground | State::OscString | State::DcsString => {}
        }
    }

    /// OSC string state: collect until BEL or ST.
    fn osc_string<P: Perform>(&mut self, performer: &mut P, byte: u8) {
        if self.string_esc {
            self.string_esc = false;
            if byte == b'\\' {
                self.osc_end(performer);
                self.state = State::Ground;
            } else {
                // The ESC was not half of an ST: it aborts the string and
                // starts a fresh sequence.
                self.enter(State::Escape);
                self.advance_byte(performer, byte);
            }
            return;
        }

        match byte {
            0x07 => {
                self.osc_end(performer);
                self.state = State::Ground;
            }
            0x18 | 0x1A => self.enter(State::Ground),
            0x1B => self.string_esc = true,
            0x00..=0x06 | 0x08..=0x17 | 0x19 | 0x1C..=0x1F => {}
            _ => self.osc.push(byte),
        }
    }

    /// DCS/SOS/PM/APC string state: skip until ST.
    fn dcs_string<P: Perform>(&mut self, performer: &mut P, byte: u8) {
        if self.string_esc {
            self.string_esc = false;
            if byte == b'\\' {
                self.state = State::Ground;
            } else {
                self.enter(State::Escape);
                self.advance_byte(performer, byte);
            }
            return;
        }

        match byte {
            0x18 | 0x1A => self.enter(State::Ground),
            0x1B => self.string_esc = true,
            _ => {}
        }
    }

    fn osc_end<P: Perform>(&mut self, performer: &mut P) {
        if self.osc.truncated {
            log::debug!("OSC payload truncated at {OSC_RAW_MAX} bytes");
        }
        performer.osc_dispatch(self.osc.as_slice());
    }

    /// Enter a state, resetting per-sequence collection.
    fn enter(&mut self, state: State) {
        self.state = state;
        self.params.clear();
        self.private = None;
        self.intermediate = None;
        self.string_esc = false;
    }

    fn utf8_start(&mut self, bits: u8, len: u8) {
        self.utf8_codepoint = u32::from(bits);
        self.utf8_remaining = len - 1;
        self.utf8_len = len;
    }

    /// Validate a completed multi-byte sequence, rejecting overlong forms,
    /// surrogates, and out-of-range codepoints.
    fn utf8_finish(&mut self) -> char {
        let min = match self.utf8_len {
            2 => 0x80,
            3 => 0x800,
            _ => 0x10000,
        };
        if self.utf8_codepoint < min {
            return REPLACEMENT;
        }
        char::from_u32(self.utf8_codepoint).unwrap_or(REPLACEMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::{Params, Parser, Perform};

    /// Records every dispatched action for assertions.
    #[derive(Default)]
    struct Recorder {
        actions: Vec<String>,
    }

    impl Perform for Recorder {
        fn print(&mut self, ch: char) {
            self.actions.push(format!("print {ch}"));
        }

        fn execute(&mut self, byte: u8) {
            self.actions.push(format!("execute {byte:#04x}"));
        }

        fn csi_dispatch(&mut self, params: &Params, private: Option<u8>, action: u8) {
            let values: Vec<_> = params.iter().map(|v| v.to_string()).collect();
            let marker = private.map_or(String::new(), |b| (b as char).to_string());
            self.actions
                .push(format!("csi {marker}{} {}", values.join(";"), action as char));
        }

        fn esc_dispatch(&mut self, intermediate: Option<u8>, byte: u8) {
            let int = intermediate.map_or(String::new(), |b| (b as char).to_string());
            self.actions.push(format!("esc {int}{}", byte as char));
        }

        fn osc_dispatch(&mut self, data: &[u8]) {
            self.actions
                .push(format!("osc {}", String::from_utf8_lossy(data)));
        }
    }

    fn run(input: &[u8]) -> Vec<String> {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.advance(&mut recorder, input);
        recorder.actions
    }

    #[test]
    fn plain_text_prints() {
        assert_eq!(run(b"Hi"), vec!["print H", "print i"]);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(run(b"").is_empty());
    }

    #[test]
    fn c0_controls_execute() {
        assert_eq!(
            run(b"A\rB"),
            vec!["print A", "execute 0x0d", "print B"]
        );
    }

    #[test]
    fn csi_with_params() {
        assert_eq!(run(b"\x1b[3;5H"), vec!["csi 3;5 H"]);
    }

    #[test]
    fn csi_without_params() {
        assert_eq!(run(b"\x1b[H"), vec!["csi  H"]);
    }

    #[test]
    fn csi_private_marker() {
        assert_eq!(run(b"\x1b[?25h"), vec!["csi ?25 h"]);
        assert_eq!(run(b"\x1b[>c"), vec!["csi > c"]);
    }

    #[test]
    fn csi_colon_is_ignored_to_final() {
        assert_eq!(run(b"\x1b[38:5:1mX"), vec!["print X"]);
    }

    #[test]
    fn csi_with_intermediate_is_discarded() {
        // DECSCUSR-style sequences are not implemented.
        assert_eq!(run(b"\x1b[2 qX"), vec!["print X"]);
    }

    #[test]
    fn csi_c0_executes_mid_sequence() {
        assert_eq!(
            run(b"\x1b[3\x085H"),
            vec!["execute 0x08", "csi 35 H"]
        );
    }

    #[test]
    fn cancel_aborts_csi() {
        assert_eq!(run(b"\x1b[3\x18mX"), vec!["print X"]);
    }

    #[test]
    fn esc_restarts_sequence() {
        assert_eq!(run(b"\x1b[3\x1b[4m"), vec!["csi 4 m"]);
    }

    #[test]
    fn esc_dispatch_simple() {
        assert_eq!(run(b"\x1b7\x1b8\x1bc"), vec!["esc 7", "esc 8", "esc c"]);
    }

    #[test]
    fn esc_with_hash_intermediate() {
        assert_eq!(run(b"\x1b#8"), vec!["esc #8"]);
    }

    #[test]
    fn charset_designation() {
        assert_eq!(run(b"\x1b(0\x1b)B"), vec!["esc (0", "esc )B"]);
    }

    #[test]
    fn osc_terminated_by_bel() {
        assert_eq!(run(b"\x1b]0;Hello\x07"), vec!["osc 0;Hello"]);
    }

    #[test]
    fn osc_terminated_by_st() {
        assert_eq!(run(b"\x1b]2;Hi\x1b\\"), vec!["osc 2;Hi"]);
    }

    #[test]
    fn osc_aborted_by_new_escape() {
        // ESC not followed by backslash kills the string and starts over.
        assert_eq!(run(b"\x1b]0;junk\x1b[1m"), vec!["csi 1 m"]);
    }

    #[test]
    fn osc_aborted_by_can() {
        assert_eq!(run(b"\x1b]0;junk\x18X"), vec!["print X"]);
    }

    #[test]
    fn osc_overflow_truncates_but_terminates() {
        let mut input = b"\x1b]0;".to_vec();
        input.extend(std::iter::repeat_n(b'a', 300));
        input.push(0x07);
        let actions = run(&input);
        assert_eq!(actions.len(), 1);
        assert!(actions[0].starts_with("osc 0;aaa"));
        assert!(actions[0].len() < 200);
    }

    #[test]
    fn dcs_payload_is_skipped() {
        assert_eq!(run(b"\x1bPsome stuff\x1b\\done"), vec![
            "print d", "print o", "print n", "print e"
        ]);
    }

    #[test]
    fn utf8_two_byte() {
        assert_eq!(run("é".as_bytes()), vec!["print é"]);
    }

    #[test]
    fn utf8_three_byte() {
        assert_eq!(run("€".as_bytes()), vec!["print €"]);
    }

    #[test]
    fn utf8_four_byte() {
        assert_eq!(run("🦀".as_bytes()), vec!["print 🦀"]);
    }

    #[test]
    fn utf8_byte_at_a_time() {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        for &b in "日本".as_bytes() {
            parser.advance(&mut recorder, &[b]);
        }
        assert_eq!(recorder.actions, vec!["print 日", "print 本"]);
    }

    #[test]
    fn utf8_stray_continuation_is_replaced() {
        assert_eq!(run(&[0x80, b'A']), vec!["print \u{FFFD}", "print A"]);
    }

    #[test]
    fn utf8_invalid_lead_is_replaced() {
        assert_eq!(run(&[0xC0, b'A']), vec!["print \u{FFFD}", "print A"]);
        assert_eq!(run(&[0xFF]), vec!["print \u{FFFD}"]);
    }

    #[test]
    fn utf8_truncated_resyncs_on_ascii() {
        // Lead promises two bytes; an ASCII byte interrupts.
        assert_eq!(run(&[0xC3, b'A']), vec!["print \u{FFFD}", "print A"]);
    }

    #[test]
    fn utf8_truncated_resyncs_on_escape() {
        assert_eq!(
            run(&[0xE2, 0x82, 0x1B, b'[', b'm']),
            vec!["print \u{FFFD}", "csi  m"]
        );
    }

    #[test]
    fn utf8_overlong_is_replaced() {
        // 0xE0 0x80 0x80 is an overlong encoding of NUL.
        assert_eq!(run(&[0xE0, 0x80, 0x80]), vec!["print \u{FFFD}"]);
    }

    #[test]
    fn utf8_surrogate_is_replaced() {
        // 0xED 0xA0 0x80 encodes U+D800.
        assert_eq!(run(&[0xED, 0xA0, 0x80]), vec!["print \u{FFFD}"]);
    }

    #[test]
    fn params_clamp_and_overflow() {
        let actions = run(b"\x1b[99999;1;2;3;4;5;6;7;8;9;10;11;12;13;14;15;16;17m");
        assert_eq!(actions.len(), 1);
        assert!(actions[0].starts_with("csi 16383;1;2;3"));
    }

    #[test]
    fn del_is_ignored_everywhere() {
        assert_eq!(run(b"A\x7fB"), vec!["print A", "print B"]);
        assert_eq!(run(b"\x1b[1\x7fm"), vec!["csi 1 m"]);
    }

    #[test]
    fn sequence_spanning_feeds() {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.advance(&mut recorder, b"\x1b[3");
        parser.advance(&mut recorder, b";7");
        parser.advance(&mut recorder, b"m");
        assert_eq!(recorder.actions, vec!["csi 3;7 m"]);
    }

    #[test]
    fn interrupted_stream_keeps_state_without_panicking() {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.advance(&mut recorder, b"\x1b[38;5");
        // Stream cut mid-sequence: nothing dispatched, nothing lost.
        assert!(recorder.actions.is_empty());
    }
}
