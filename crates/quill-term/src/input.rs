// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into structured events: keys, mouse clicks and
// wheel, and pasted text. Handles the protocols `terminal.rs` enables:
//
// - Legacy control bytes and CSI sequences (arrows, editing keys, F-keys)
// - SS3 sequences (F1-F4 and arrows from some terminals)
// - SGR mouse reports (press / release / wheel)
// - Kitty keyboard protocol, disambiguate mode (`CSI codepoint ; mods u`)
// - Bracketed paste
// - Alt+key as ESC prefix
// - UTF-8 multi-byte characters
//
// Escape sequences can be split across `read()` calls, so the parser keeps
// the unconsumed tail and resumes on the next `advance`. A lone ESC stays
// pending until the caller decides no more bytes are coming and calls
// `flush`, which turns it into an Escape key press.

use bitflags::bitflags;

// ─── Event Types ─────────────────────────────────────────────────────────────

/// A parsed terminal input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Bracketed paste content, delivered whole.
    Paste(String),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Ctrl plus a character.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// Alt plus a character.
    #[inline]
    #[must_use]
    pub const fn alt(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::ALT)
    }

    #[inline]
    #[must_use]
    pub const fn has(self, m: Modifiers) -> bool {
        self.modifiers.contains(m)
    }

    /// The character this key would insert, if any.
    ///
    /// Shift alone still inserts; Ctrl, Alt or Super turn the key into a
    /// command.
    #[must_use]
    pub fn text_char(self) -> Option<char> {
        let command = Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER;
        match self.code {
            KeyCode::Char(ch) if !self.modifiers.intersects(command) && !ch.is_control() => {
                Some(ch)
            }
            _ => None,
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F35.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Same bitmask as the xterm / Kitty CSI encoding (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// 0-indexed column.
    pub x: u16,
    /// 0-indexed row.
    pub y: u16,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press(MouseButton),
    Release(MouseButton),
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Parser ──────────────────────────────────────────────────────────────────

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

/// Incremental terminal input parser.
///
/// ```
/// use quill_term::input::{Event, KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let events = parser.advance(b"a\x1b[A");
/// assert_eq!(events, [
///     Event::Key(KeyEvent::plain(KeyCode::Char('a'))),
///     Event::Key(KeyEvent::plain(KeyCode::Up)),
/// ]);
/// ```
pub struct Parser {
    buf: Vec<u8>,
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
            in_paste: false,
        }
    }

    /// Feed bytes and return every event that can be parsed so far.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let rest = &self.buf[pos..];

            if self.in_paste {
                let Some(end) = find_subsequence(rest, PASTE_END) else {
                    break;
                };
                events.push(Event::Paste(String::from_utf8_lossy(&rest[..end]).into_owned()));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }

            if rest.starts_with(PASTE_START) {
                self.in_paste = true;
                pos += PASTE_START.len();
                continue;
            }
            // A prefix of the paste marker might still become one.
            if rest.len() < PASTE_START.len() && rest.len() > 2 && PASTE_START.starts_with(rest) {
                break;
            }

            match parse_one(rest) {
                Step::Emit(event, used) => {
                    events.push(event);
                    pos += used;
                }
                Step::Skip(used) => pos += used,
                Step::Wait => break,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Give up waiting and emit pending bytes as plain keys.
    ///
    /// A lone ESC becomes Escape. An unterminated paste is delivered as is.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.in_paste {
            self.in_paste = false;
            let text = String::from_utf8_lossy(&self.buf).into_owned();
            self.buf.clear();
            return vec![Event::Paste(text)];
        }

        let events = self
            .buf
            .iter()
            .filter_map(|&b| match b {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                0x7F => Some(KeyEvent::plain(KeyCode::Backspace)),
                0x01..=0x1A => Some(KeyEvent::ctrl(char::from(b + b'a' - 1))),
                0x20..=0x7E => Some(KeyEvent::plain(KeyCode::Char(char::from(b)))),
                _ => None,
            })
            .map(Event::Key)
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Sequence Parsing ────────────────────────────────────────────────────────
//
// Pure functions over the unconsumed tail: each reports what it found and
// how many bytes that used.

enum Step {
    Emit(Event, usize),
    /// Need more bytes.
    Wait,
    /// Unrecognised input; drop this many bytes.
    Skip(usize),
}

const fn key(code: KeyCode, modifiers: Modifiers, used: usize) -> Step {
    Step::Emit(Event::Key(KeyEvent { code, modifiers }), used)
}

fn parse_one(buf: &[u8]) -> Step {
    let none = Modifiers::empty();
    match buf[0] {
        0x1B => parse_escape(buf),
        0x00 => key(KeyCode::Char(' '), Modifiers::CTRL, 1),
        0x08 | 0x7F => key(KeyCode::Backspace, none, 1),
        0x09 => key(KeyCode::Tab, none, 1),
        0x0A | 0x0D => key(KeyCode::Enter, none, 1),
        b @ 0x01..=0x1A => key(KeyCode::Char(char::from(b + b'a' - 1)), Modifiers::CTRL, 1),
        b @ 0x20..=0x7E => key(KeyCode::Char(char::from(b)), none, 1),
        0xC0..=0xF7 => parse_utf8(buf),
        _ => Step::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Step {
    let Some(&next) = buf.get(1) else {
        return Step::Wait;
    };
    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => key(KeyCode::Escape, Modifiers::ALT, 2),
        0x7F => key(KeyCode::Backspace, Modifiers::ALT, 2),
        b @ 0x20..=0x7E => key(KeyCode::Char(char::from(b)), Modifiers::ALT, 2),
        b @ 0x01..=0x1A => key(
            KeyCode::Char(char::from(b + b'a' - 1)),
            Modifiers::ALT | Modifiers::CTRL,
            2,
        ),
        _ => key(KeyCode::Escape, Modifiers::empty(), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Step {
    if buf.len() < 3 {
        return Step::Wait;
    }
    if buf[2] == b'<' {
        return parse_sgr_mouse(buf);
    }

    // Parameter and intermediate bytes, then one final byte.
    let mut end = 2;
    while let Some(&b) = buf.get(end) {
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Step::Skip(end + 1);
        }
        end += 1;
    }
    let Some(&final_byte) = buf.get(end) else {
        return Step::Wait;
    };
    let params = parse_params(&buf[2..end]);
    let used = end + 1;
    let mods = params.get(1).map_or(Modifiers::empty(), |p| decode_modifiers(*p));

    let code = match final_byte {
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F(tilde_fkey(n, 11, 1)),
            n @ 17..=21 => KeyCode::F(tilde_fkey(n, 17, 6)),
            n @ 23..=26 => KeyCode::F(tilde_fkey(n, 23, 11)),
            _ => return Step::Skip(used),
        },
        b'u' => {
            let Some(code) = params.first().and_then(|&cp| kitty_keycode(cp)) else {
                return Step::Skip(used);
            };
            code
        }
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => return key(KeyCode::Tab, Modifiers::SHIFT, used),
        _ => return Step::Skip(used),
    };
    key(code, mods, used)
}

/// `CSI n ~` function key numbering has gaps; map a run back to F-numbers.
#[allow(clippy::cast_possible_truncation)]
const fn tilde_fkey(n: u32, run_start: u32, first_f: u8) -> u8 {
    first_f + (n - run_start) as u8
}

fn parse_ss3(buf: &[u8]) -> Step {
    let Some(&b) = buf.get(2) else {
        return Step::Wait;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Step::Skip(3),
    };
    key(code, Modifiers::empty(), 3)
}

/// `ESC [ < b ; x ; y M` (press) or `... m` (release).
fn parse_sgr_mouse(buf: &[u8]) -> Step {
    let mut end = 3;
    while let Some(&b) = buf.get(end) {
        if b == b'M' || b == b'm' {
            break;
        }
        if !b.is_ascii_digit() && b != b';' {
            return Step::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Step::Wait;
    }

    let used = end + 1;
    let params = parse_params(&buf[3..end]);
    let [cb, x, y] = [0, 1, 2].map(|i| params.get(i).copied().unwrap_or(0));

    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, cb & 4 != 0);
    modifiers.set(Modifiers::ALT, cb & 8 != 0);
    modifiers.set(Modifiers::CTRL, cb & 16 != 0);

    let button = match cb & 3 {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        _ => MouseButton::Right,
    };
    let kind = if cb & 64 != 0 {
        match cb & 3 {
            0 => MouseEventKind::ScrollUp,
            1 => MouseEventKind::ScrollDown,
            _ => return Step::Skip(used),
        }
    } else if cb & 32 != 0 {
        // Motion; only click tracking is enabled, so ignore stray reports.
        return Step::Skip(used);
    } else if buf[end] == b'm' {
        MouseEventKind::Release(button)
    } else {
        MouseEventKind::Press(button)
    };

    Step::Emit(
        Event::Mouse(MouseEvent {
            kind,
            x: saturate_u16(x).saturating_sub(1),
            y: saturate_u16(y).saturating_sub(1),
            modifiers,
        }),
        used,
    )
}

fn parse_utf8(buf: &[u8]) -> Step {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    };
    if buf.len() < len {
        return Step::Wait;
    }
    match std::str::from_utf8(&buf[..len]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => key(KeyCode::Char(ch), Modifiers::empty(), len),
        None => Step::Skip(1),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Semicolon-separated numeric parameters. Colon sub-parameters (Kitty event
/// types) are ignored.
fn parse_params(raw: &[u8]) -> Vec<u32> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u32, |acc, b| {
                    acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
                })
        })
        .collect()
}

/// Decode `1 + bitmask` into [`Modifiers`]. Bits we don't track are dropped.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u32) -> Modifiers {
    let bits = param.saturating_sub(1) & 0xFF;
    Modifiers::from_bits_truncate(bits as u8)
}

#[allow(clippy::cast_possible_truncation)]
const fn saturate_u16(v: u32) -> u16 {
    if v > u16::MAX as u32 { u16::MAX } else { v as u16 }
}

/// Map a Kitty key codepoint to a [`KeyCode`]. Functional keys live in the
/// private use area starting at 57344; lock and media keys are dropped.
#[allow(clippy::cast_possible_truncation)]
fn kitty_keycode(cp: u32) -> Option<KeyCode> {
    Some(match cp {
        27 | 57344 => KeyCode::Escape,
        13 | 57345 => KeyCode::Enter,
        9 | 57346 => KeyCode::Tab,
        127 | 57347 => KeyCode::Backspace,
        57348 => KeyCode::Insert,
        57349 => KeyCode::Delete,
        57350 => KeyCode::Left,
        57351 => KeyCode::Right,
        57352 => KeyCode::Up,
        57353 => KeyCode::Down,
        57354 => KeyCode::PageUp,
        57355 => KeyCode::PageDown,
        57356 => KeyCode::Home,
        57357 => KeyCode::End,
        57364..=57398 => KeyCode::F((cp - 57363) as u8),
        57358..=57363 | 57399..=63743 => return None,
        _ => KeyCode::Char(char::from_u32(cp)?),
    })
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(data: &[u8]) -> Vec<Event> {
        Parser::new().advance(data)
    }

    fn k(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn km(code: KeyCode, modifiers: Modifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn ascii_and_controls() {
        assert_eq!(
            parse(b"a\t\r\x7f"),
            [
                k(KeyCode::Char('a')),
                k(KeyCode::Tab),
                k(KeyCode::Enter),
                k(KeyCode::Backspace),
            ]
        );
    }

    #[test]
    fn ctrl_letters() {
        assert_eq!(parse(b"\x13"), [Event::Key(KeyEvent::ctrl('s'))]);
        assert_eq!(parse(b"\x11"), [Event::Key(KeyEvent::ctrl('q'))]);
        assert_eq!(parse(b"\x1a"), [Event::Key(KeyEvent::ctrl('z'))]);
    }

    #[test]
    fn arrows_and_modified_arrows() {
        assert_eq!(parse(b"\x1b[A"), [k(KeyCode::Up)]);
        assert_eq!(parse(b"\x1b[1;2D"), [km(KeyCode::Left, Modifiers::SHIFT)]);
        assert_eq!(parse(b"\x1b[1;5H"), [km(KeyCode::Home, Modifiers::CTRL)]);
        assert_eq!(parse(b"\x1bOB"), [k(KeyCode::Down)]);
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(parse(b"\x1b[3~"), [k(KeyCode::Delete)]);
        assert_eq!(parse(b"\x1b[5~"), [k(KeyCode::PageUp)]);
        assert_eq!(parse(b"\x1b[21~"), [k(KeyCode::F(10))]);
        assert_eq!(parse(b"\x1b[24~"), [k(KeyCode::F(12))]);
        assert_eq!(parse(b"\x1b[15~"), [k(KeyCode::F(5))]);
    }

    #[test]
    fn function_keys_ss3_and_csi() {
        assert_eq!(parse(b"\x1bOP"), [k(KeyCode::F(1))]);
        assert_eq!(parse(b"\x1b[P"), [k(KeyCode::F(1))]);
    }

    #[test]
    fn alt_prefix() {
        assert_eq!(parse(b"\x1bf"), [Event::Key(KeyEvent::alt('f'))]);
        assert_eq!(parse(b"\x1b[Z"), [km(KeyCode::Tab, Modifiers::SHIFT)]);
    }

    #[test]
    fn kitty_ctrl_shift_s() {
        assert_eq!(
            parse(b"\x1b[115;6u"),
            [km(KeyCode::Char('s'), Modifiers::CTRL | Modifiers::SHIFT)]
        );
    }

    #[test]
    fn kitty_functional_keys() {
        assert_eq!(parse(b"\x1b[27u"), [k(KeyCode::Escape)]);
        assert_eq!(parse(b"\x1b[13;5u"), [km(KeyCode::Enter, Modifiers::CTRL)]);
        assert_eq!(parse(b"\x1b[57364u"), [k(KeyCode::F(1))]);
    }

    #[test]
    fn kitty_event_type_sub_param_ignored() {
        assert_eq!(parse(b"\x1b[97;5:1u"), [Event::Key(KeyEvent::ctrl('a'))]);
    }

    #[test]
    fn utf8_chars() {
        assert_eq!(parse("é中🦀".as_bytes()), [
            k(KeyCode::Char('é')),
            k(KeyCode::Char('中')),
            k(KeyCode::Char('🦀')),
        ]);
    }

    #[test]
    fn utf8_split_across_reads() {
        let mut p = Parser::new();
        assert!(p.advance(&[0xE4]).is_empty());
        assert!(p.has_pending());
        assert_eq!(p.advance(&[0xB8, 0xAD]), [k(KeyCode::Char('中'))]);
    }

    #[test]
    fn mouse_press_release_scroll() {
        assert_eq!(
            parse(b"\x1b[<0;10;20M"),
            [Event::Mouse(MouseEvent {
                kind: MouseEventKind::Press(MouseButton::Left),
                x: 9,
                y: 19,
                modifiers: Modifiers::empty(),
            })]
        );
        assert!(matches!(
            parse(b"\x1b[<0;1;1m")[0],
            Event::Mouse(MouseEvent { kind: MouseEventKind::Release(MouseButton::Left), .. })
        ));
        assert!(matches!(
            parse(b"\x1b[<65;1;1M")[0],
            Event::Mouse(MouseEvent { kind: MouseEventKind::ScrollDown, .. })
        ));
    }

    #[test]
    fn mouse_motion_is_dropped() {
        assert!(parse(b"\x1b[<32;5;5M").is_empty());
    }

    #[test]
    fn bracketed_paste() {
        assert_eq!(
            parse(b"\x1b[200~line1\nline2\x1b[201~x"),
            [Event::Paste("line1\nline2".into()), k(KeyCode::Char('x'))]
        );
    }

    #[test]
    fn paste_split_across_reads() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[20").is_empty());
        assert!(p.advance(b"0~hel").is_empty());
        assert_eq!(p.advance(b"lo\x1b[201~"), [Event::Paste("hello".into())]);
    }

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b").is_empty());
        assert!(p.has_pending());
        assert_eq!(p.flush(), [k(KeyCode::Escape)]);
        assert!(!p.has_pending());
    }

    #[test]
    fn split_csi_resumes() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[1;").is_empty());
        assert_eq!(p.advance(b"5C"), [km(KeyCode::Right, Modifiers::CTRL)]);
    }

    #[test]
    fn unknown_csi_skipped() {
        assert_eq!(parse(b"\x1b[99xq"), [k(KeyCode::Char('q'))]);
    }

    #[test]
    fn text_char_rules() {
        assert_eq!(KeyEvent::plain(KeyCode::Char('a')).text_char(), Some('a'));
        assert_eq!(
            KeyEvent::new(KeyCode::Char('A'), Modifiers::SHIFT).text_char(),
            Some('A')
        );
        assert_eq!(KeyEvent::ctrl('a').text_char(), None);
        assert_eq!(KeyEvent::alt('f').text_char(), None);
        assert_eq!(KeyEvent::plain(KeyCode::Enter).text_char(), None);
    }

    #[test]
    fn modifier_decoding() {
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(6), Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(decode_modifiers(9), Modifiers::SUPER);
    }

    #[test]
    fn params_parse() {
        assert!(parse_params(b"").is_empty());
        assert_eq!(parse_params(b"1;22;333"), [1, 22, 333]);
        assert_eq!(parse_params(b"97;5:2"), [97, 5]);
    }
}
