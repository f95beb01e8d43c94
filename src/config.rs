//! Terminal settings bundle and its persisted binary image.
//!
//! Two copies of `TermConfig` exist at runtime: the persisted baseline
//! (loaded from storage once, written back on explicit save) and the scratch
//! copy that escape sequences mutate. A full reset re-applies the baseline
//! over the scratch copy.
//!
//! The on-disk image is exactly [`CONFIG_SIZE`] bytes with fixed field
//! widths, little-endian integers, and NUL-terminated strings:
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 4    | width            |
//! | 4      | 4    | height           |
//! | 8      | 1    | default_bg       |
//! | 9      | 1    | default_fg       |
//! | 10     | 64   | title            |
//! | 74     | 50   | 5 × button label |
//! | 124    | 1    | theme            |
//! | 125    | 4    | parser_tout_ms   |
//! | 129    | 4    | display_tout_ms  |
//! | 133    | 1    | fn_alt_mode      |
//! | 134    | 66   | reserved         |
//!
//! Field sizes are load-bearing: firmware upgrades reinterpret old images
//! in place, so the layout never changes, only the reserved tail shrinks.

use crate::grid::{MAX_COLS, MAX_LINES};

/// Size of the persisted configuration image in bytes.
pub const CONFIG_SIZE: usize = 200;

/// On-disk width of the title field, including its NUL terminator.
pub const TITLE_LEN: usize = 64;

/// On-disk width of one button label field, including its NUL terminator.
pub const BUTTON_LEN: usize = 10;

/// Number of button labels.
pub const BUTTON_COUNT: usize = 5;

const OFFSET_TITLE: usize = 10;
const OFFSET_BUTTONS: usize = 74;
const OFFSET_THEME: usize = 124;
const OFFSET_PARSER_TOUT: usize = 125;
const OFFSET_DISPLAY_TOUT: usize = 129;
const OFFSET_FN_ALT: usize = 133;

/// Terminal settings: geometry, default colors, labels, and host timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermConfig {
    /// Screen width in columns, 1–80.
    pub width: u32,
    /// Screen height in rows, 1–25.
    pub height: u32,
    /// Default background palette index (0–15).
    pub default_bg: u8,
    /// Default foreground palette index (0–15).
    pub default_fg: u8,
    /// Screen title shown by the front-end.
    title: String,
    /// Labels for the five front-end buttons.
    buttons: [String; BUTTON_COUNT],
    /// Color theme selector (interpreted by the front-end).
    pub theme: u8,
    /// Host-side parser recovery timeout in milliseconds.
    pub parser_tout_ms: u32,
    /// Host-side display coalescing timeout in milliseconds.
    pub display_tout_ms: u32,
    /// Function keys send SS3-style alternate sequences.
    pub fn_alt_mode: bool,
}

impl Default for TermConfig {
    /// Factory defaults.
    fn default() -> Self {
        Self {
            width: 26,
            height: 10,
            default_bg: 0,
            default_fg: 7,
            title: "ESPTerm".to_string(),
            buttons: ["1", "2", "3", "4", "5"].map(String::from),
            theme: 0,
            parser_tout_ms: 10,
            display_tout_ms: 20,
            fn_alt_mode: false,
        }
    }
}

impl TermConfig {
    /// The screen title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the screen title, truncating to the on-disk capacity.
    pub fn set_title(&mut self, title: &str) {
        self.title = truncate_to(title, TITLE_LEN - 1).to_string();
    }

    /// The button label for `slot` (0-based). Empty for out-of-range slots.
    pub fn button(&self, slot: usize) -> &str {
        self.buttons.get(slot).map_or("", String::as_str)
    }

    /// Set a button label, truncating to the on-disk capacity.
    ///
    /// Out-of-range slots are ignored.
    pub fn set_button(&mut self, slot: usize, label: &str) {
        if let Some(b) = self.buttons.get_mut(slot) {
            *b = truncate_to(label, BUTTON_LEN - 1).to_string();
        }
    }

    /// Screen height clamped to the legal grid range.
    pub fn lines(&self) -> usize {
        (self.height as usize).clamp(1, MAX_LINES)
    }

    /// Screen width clamped to the legal grid range.
    pub fn cols(&self) -> usize {
        (self.width as usize).clamp(1, MAX_COLS)
    }

    /// Encode into the fixed persisted image.
    pub fn to_bytes(&self) -> [u8; CONFIG_SIZE] {
        let mut out = [0u8; CONFIG_SIZE];
        out[0..4].copy_from_slice(&self.width.to_le_bytes());
        out[4..8].copy_from_slice(&self.height.to_le_bytes());
        out[8] = self.default_bg;
        out[9] = self.default_fg;
        write_str(&mut out[OFFSET_TITLE..OFFSET_TITLE + TITLE_LEN], &self.title);
        for (i, button) in self.buttons.iter().enumerate() {
            let at = OFFSET_BUTTONS + i * BUTTON_LEN;
            write_str(&mut out[at..at + BUTTON_LEN], button);
        }
        out[OFFSET_THEME] = self.theme;
        out[OFFSET_PARSER_TOUT..OFFSET_PARSER_TOUT + 4]
            .copy_from_slice(&self.parser_tout_ms.to_le_bytes());
        out[OFFSET_DISPLAY_TOUT..OFFSET_DISPLAY_TOUT + 4]
            .copy_from_slice(&self.display_tout_ms.to_le_bytes());
        out[OFFSET_FN_ALT] = u8::from(self.fn_alt_mode);
        out
    }

    /// Decode from a persisted image.
    ///
    /// Never fails: out-of-range dimensions are clamped, strings are read up
    /// to their first NUL with invalid UTF-8 replaced, and unknown reserved
    /// bytes are ignored.
    pub fn from_bytes(bytes: &[u8; CONFIG_SIZE]) -> Self {
        let read_u32 =
            |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);

        let width = read_u32(0);
        let height = read_u32(4);
        if width as usize > MAX_COLS || height as usize > MAX_LINES {
            log::debug!("stored geometry {width}x{height} out of range, clamping");
        }

        let mut config = Self {
            width: width.clamp(1, MAX_COLS as u32),
            height: height.clamp(1, MAX_LINES as u32),
            default_bg: bytes[8] & 0x0f,
            default_fg: bytes[9] & 0x0f,
            title: read_str(&bytes[OFFSET_TITLE..OFFSET_TITLE + TITLE_LEN]),
            buttons: Default::default(),
            theme: bytes[OFFSET_THEME],
            parser_tout_ms: read_u32(OFFSET_PARSER_TOUT),
            display_tout_ms: read_u32(OFFSET_DISPLAY_TOUT),
            fn_alt_mode: bytes[OFFSET_FN_ALT] != 0,
        };
        for i in 0..BUTTON_COUNT {
            let at = OFFSET_BUTTONS + i * BUTTON_LEN;
            config.buttons[i] = read_str(&bytes[at..at + BUTTON_LEN]);
        }
        config
    }
}

/// Copy a string into a fixed NUL-terminated field.
///
/// The last byte of the field always stays NUL; longer input is cut at the
/// preceding char boundary.
fn write_str(field: &mut [u8], s: &str) {
    let s = truncate_to(s, field.len() - 1);
    field[..s.len()].copy_from_slice(s.as_bytes());
    field[s.len()..].fill(0);
}

/// Read a NUL-terminated string from a fixed field, replacing invalid UTF-8.
fn read_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn truncate_to(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::{BUTTON_LEN, CONFIG_SIZE, TITLE_LEN, TermConfig, truncate_to};

    #[test]
    fn defaults() {
        let config = TermConfig::default();
        assert_eq!(config.width, 26);
        assert_eq!(config.height, 10);
        assert_eq!(config.title(), "ESPTerm");
        assert_eq!(config.default_fg, 7);
        assert_eq!(config.default_bg, 0);
        assert_eq!(config.parser_tout_ms, 10);
        assert_eq!(config.display_tout_ms, 20);
        assert!(!config.fn_alt_mode);
    }

    #[test]
    fn round_trip_defaults() {
        let config = TermConfig::default();
        let decoded = TermConfig::from_bytes(&config.to_bytes());
        assert_eq!(decoded, config);
    }

    #[test]
    fn round_trip_modified() {
        let mut config = TermConfig::default();
        config.width = 80;
        config.height = 25;
        config.set_title("screen one");
        config.set_button(0, "yes");
        config.set_button(4, "no");
        config.theme = 3;
        config.fn_alt_mode = true;
        let decoded = TermConfig::from_bytes(&config.to_bytes());
        assert_eq!(decoded, config);
    }

    #[test]
    fn image_is_exactly_200_bytes() {
        assert_eq!(TermConfig::default().to_bytes().len(), CONFIG_SIZE);
    }

    #[test]
    fn title_truncated_to_field() {
        let mut config = TermConfig::default();
        config.set_title(&"x".repeat(100));
        assert_eq!(config.title().len(), TITLE_LEN - 1);
    }

    #[test]
    fn button_truncated_to_field() {
        let mut config = TermConfig::default();
        config.set_button(2, "0123456789abcdef");
        assert_eq!(config.button(2), &"0123456789"[..BUTTON_LEN - 1]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // "éééé" is 8 bytes; a 5-byte field must cut at 4.
        assert_eq!(truncate_to("éééé", 5), "éé");
        assert_eq!(truncate_to("abc", 5), "abc");
    }

    #[test]
    fn garbage_image_decodes_clamped() {
        let bytes = [0xffu8; CONFIG_SIZE];
        let config = TermConfig::from_bytes(&bytes);
        assert_eq!(config.width, 80);
        assert_eq!(config.height, 25);
        assert!(config.default_fg <= 15);
        // Title field is all 0xff: invalid UTF-8 replaced, not rejected.
        assert!(!config.title().is_empty());
    }

    #[test]
    fn zero_dimensions_clamp_to_one() {
        let mut bytes = TermConfig::default().to_bytes();
        bytes[0..4].copy_from_slice(&0u32.to_le_bytes());
        bytes[4..8].copy_from_slice(&0u32.to_le_bytes());
        let config = TermConfig::from_bytes(&bytes);
        assert_eq!(config.width, 1);
        assert_eq!(config.height, 1);
    }

    #[test]
    fn out_of_range_button_slot_ignored() {
        let mut config = TermConfig::default();
        config.set_button(9, "nope");
        assert_eq!(config.button(9), "");
    }
}
