// SPDX-License-Identifier: MIT
//
// Key parser.
//
// Turns raw stdin bytes into key events. The clock only enables plain
// keyboard input, so this understands what a terminal sends for keys in
// that mode:
//
// - ASCII and UTF-8 characters
// - control characters (Ctrl+letter), Enter, Tab, Backspace
// - CSI sequences for arrows, Home/End, editing keys and F1–F12, with xterm
//   modifier parameters (`ESC [ 1 ; 5 A` is Ctrl+Up)
// - SS3 sequences (`ESC O A`), sent by terminals in application cursor mode
// - Alt+key as ESC followed by the key
//
// Sequences can be split across reads, so the parser keeps unconsumed bytes.
// A lone ESC is ambiguous until more bytes arrive or a timeout passes; the
// caller resolves it with `flush`.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A key press with modifiers.
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

    /// Whether this is Ctrl plus the given letter.
    #[inline]
    #[must_use]
    pub fn is_ctrl(self, letter: char) -> bool {
        self.modifiers.contains(Modifiers::CTRL) && self.code == KeyCode::Char(letter)
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
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
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Modifier keys, in xterm's encoding (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental key parser.
///
/// ```
/// use tc_term::input::{KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let keys = parser.advance(b"q\x1b[A");
/// assert_eq!(keys, vec![KeyEvent::plain(KeyCode::Char('q')), KeyEvent::plain(KeyCode::Up)]);
/// ```
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Feed bytes and return every complete key. Incomplete sequences stay
    /// buffered for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match parse_one(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Skip(n) => pos += n,
                Parsed::Incomplete => break,
            }
        }

        self.buf.drain(..pos);
        keys
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve leftover bytes after a timeout: a lone ESC becomes Escape,
    /// anything else is read byte by byte.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let keys = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                _ => match parse_one(&[byte]) {
                    Parsed::Key(key, _) => Some(key),
                    Parsed::Skip(_) | Parsed::Incomplete => None,
                },
            })
            .collect();
        self.buf.clear();
        keys
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Parsing ────────────────────────────────────────────────────────────────

enum Parsed {
    Key(KeyEvent, usize),
    Skip(usize),
    Incomplete,
}

const fn key(code: KeyCode, n: usize) -> Parsed {
    Parsed::Key(KeyEvent::plain(code), n)
}

const fn ctrl(letter: u8) -> KeyEvent {
    KeyEvent::new(KeyCode::Char((letter + b'a' - 1) as char), Modifiers::CTRL)
}

fn parse_one(buf: &[u8]) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf),
        0x08 | 0x7F => key(KeyCode::Backspace, 1),
        0x09 => key(KeyCode::Tab, 1),
        0x0A | 0x0D => key(KeyCode::Enter, 1),
        0x00 => Parsed::Key(KeyEvent::new(KeyCode::Char(' '), Modifiers::CTRL), 1),
        b @ 0x01..=0x1A => Parsed::Key(ctrl(b), 1),
        b @ 0x20..=0x7E => key(KeyCode::Char(b as char), 1),
        0xC0..=0xF7 => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Key(KeyEvent::new(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::new(KeyCode::Char(b as char), Modifiers::ALT), 2),
        b @ 0x01..=0x1A => {
            let inner = ctrl(b);
            Parsed::Key(KeyEvent::new(inner.code, Modifiers::ALT | Modifiers::CTRL), 2)
        }
        _ => key(KeyCode::Escape, 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter bytes 0x30..=0x3F, intermediates 0x20..=0x2F, then a final
    // byte in 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        match b {
            0x40..=0x7E => break,
            0x20..=0x3F => end += 1,
            _ => return Parsed::Skip(end + 1),
        }
    }

    let consumed = end + 1;
    let mut params = buf[2..end].split(|&b| b == b';').map(parse_number);
    let first = params.next().flatten();
    let modifiers = params.next().flatten().map_or(Modifiers::empty(), decode_modifiers);

    let code = match buf[end] {
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
        b'Z' => return Parsed::Key(KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT), consumed),
        b'~' => match first.and_then(tilde_key) {
            Some(code) => code,
            None => return Parsed::Skip(consumed),
        },
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Key(KeyEvent::new(code, modifiers), consumed)
}

/// `ESC [ n ~` keys.
const fn tilde_key(n: u16) -> Option<KeyCode> {
    Some(match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((n - 10) as u8),
        17..=21 => KeyCode::F((n - 11) as u8),
        23 | 24 => KeyCode::F((n - 12) as u8),
        _ => return None,
    })
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
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
        _ => return Parsed::Skip(3),
    };
    key(code, 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    };
    if buf.len() < len {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| key(KeyCode::Char(ch), len))
}

/// Decimal parameter; empty or non-numeric yields `None`.
fn parse_number(raw: &[u8]) -> Option<u16> {
    if raw.is_empty() || !raw.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        raw.iter()
            .fold(0u16, |acc, &d| acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))),
    )
}

#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1) as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
