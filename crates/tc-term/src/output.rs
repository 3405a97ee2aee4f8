// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
//   OutputBuffer — collects a whole frame's bytes so it reaches the terminal
//   in one write.
//
//   CellWriter — remembers the cursor position and the SGR state it last
//   emitted, and skips escapes that would not change anything. A row of lit
//   clock segments is one cursor move, one background change and a run of
//   spaces.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};
use crate::color::CellColor;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()`.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 8_192;

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write a codepoint as UTF-8. Invalid codepoints and the continuation
    /// marker produce `?`.
    pub fn write_codepoint(&mut self, cp: u32) {
        match char::from_u32(cp).filter(|_| cp != 0) {
            Some(ch) => {
                let mut enc = [0u8; 4];
                self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
            }
            None => self.buf.push(b'?'),
        }
    }

    /// Drop everything accumulated, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w`, flush it, and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails. The buffer is
    /// cleared either way so a failed frame is not replayed.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = w.write_all(&self.buf).and_then(|()| w.flush());
        self.buf.clear();
        result
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing goes through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Stateful cell renderer that skips redundant escape sequences.
///
/// - Cursor moves are skipped when the next cell is directly right of the
///   last one.
/// - An attribute change emits SGR 0 first (when any attribute was on) and
///   forgets the tracked colors.
/// - Colors are emitted only when they differ from the last emitted ones.
/// - A continuation cell right after its wide character emits nothing.
#[allow(clippy::struct_field_names)]
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<CellColor>,
    last_bg: Option<CellColor>,
    last_attrs: Attr,
}

impl CellWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::empty(),
        }
    }

    /// Forget all tracked state. Call after a terminal reset or screen clear.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Render one cell at `(x, y)`.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }

        if cell.is_continuation() {
            if xi > 0 && self.last_x == xi - 1 && self.last_y == yi {
                self.last_x = xi;
                return;
            }
            self.apply_style(out, cell);
            out.buf.push(b' ');
        } else {
            self.apply_style(out, cell);
            out.write_codepoint(cell.ch);
        }

        self.last_x = xi;
        self.last_y = yi;
    }

    fn apply_style(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        if cell.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                ansi::reset(out).ok();
                self.last_fg = None;
                self.last_bg = None;
            }
            self.last_attrs = cell.attrs;
            ansi::attrs(out, cell.attrs).ok();
        }

        if self.last_fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.last_fg = Some(cell.fg);
        }

        if self.last_bg != Some(cell.bg) {
            ansi::bg(out, cell.bg).ok();
            self.last_bg = Some(cell.bg);
        }
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(out: &OutputBuffer) -> String {
        String::from_utf8_lossy(out.as_bytes()).into_owned()
    }

    // ── OutputBuffer ────────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn write_trait_appends() {
        let mut buf = OutputBuffer::new();
        write!(buf, "{:02}:{:02}", 9, 5).unwrap();
        assert_eq!(buf.as_bytes(), b"09:05");
    }

    #[test]
    fn codepoints_encode_as_utf8() {
        let mut buf = OutputBuffer::new();
        buf.write_codepoint(u32::from('A'));
        buf.write_codepoint(u32::from('月'));
        assert_eq!(buf.as_bytes(), "A月".as_bytes());
    }

    #[test]
    fn invalid_codepoints_become_question_marks() {
        let mut buf = OutputBuffer::new();
        buf.write_codepoint(0);
        buf.write_codepoint(0xD800);
        assert_eq!(buf.as_bytes(), b"??");
    }

    #[test]
    fn flush_to_moves_bytes_and_clears() {
        let mut buf = OutputBuffer::new();
        buf.write_all(b"frame").unwrap();
        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"frame");
        assert!(buf.is_empty());
    }

    #[test]
    fn flush_to_empty_writes_nothing() {
        let mut buf = OutputBuffer::new();
        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    // ── CellWriter ──────────────────────────────────────────────────────

    #[test]
    fn first_cell_positions_and_styles() {
        let mut out = OutputBuffer::new();
        let mut w = CellWriter::new();
        w.render_cell(&mut out, 2, 1, &Cell::new('x'));
        assert_eq!(text(&out), "\x1b[2;3H\x1b[39m\x1b[49mx");
    }

    #[test]
    fn adjacent_cells_skip_cursor_and_style() {
        let mut out = OutputBuffer::new();
        let mut w = CellWriter::new();
        let block = Cell::EMPTY.with_bg(CellColor::Ansi256(2));
        w.render_cell(&mut out, 0, 0, &block);
        out.clear();
        w.render_cell(&mut out, 1, 0, &block);
        assert_eq!(text(&out), " ");
    }

    #[test]
    fn gap_moves_cursor() {
        let mut out = OutputBuffer::new();
        let mut w = CellWriter::new();
        w.render_cell(&mut out, 0, 0, &Cell::new('a'));
        out.clear();
        w.render_cell(&mut out, 5, 0, &Cell::new('b'));
        assert_eq!(text(&out), "\x1b[1;6Hb");
    }

    #[test]
    fn dropping_attrs_resets_and_reemits_colors() {
        let mut out = OutputBuffer::new();
        let mut w = CellWriter::new();
        let lit = Cell::EMPTY
            .with_bg(CellColor::Ansi256(2))
            .with_attrs(Attr::SLOW_BLINK);
        w.render_cell(&mut out, 0, 0, &lit);
        out.clear();
        w.render_cell(&mut out, 1, 0, &lit.with_attrs(Attr::empty()));
        assert_eq!(text(&out), "\x1b[0m\x1b[39m\x1b[42m ");
    }

    #[test]
    fn continuation_after_wide_char_is_silent() {
        let mut out = OutputBuffer::new();
        let mut w = CellWriter::new();
        w.render_cell(&mut out, 0, 0, &Cell::new('日'));
        out.clear();
        let cont = Cell::continuation(CellColor::Default, CellColor::Default, Attr::empty());
        w.render_cell(&mut out, 1, 0, &cont);
        assert!(out.is_empty());
    }

    #[test]
    fn orphan_continuation_renders_space() {
        let mut out = OutputBuffer::new();
        let mut w = CellWriter::new();
        let cont = Cell::continuation(CellColor::Default, CellColor::Ansi256(1), Attr::empty());
        w.render_cell(&mut out, 3, 0, &cont);
        assert!(text(&out).ends_with(' '));
    }

    #[test]
    fn reset_state_forgets_position() {
        let mut out = OutputBuffer::new();
        let mut w = CellWriter::new();
        w.render_cell(&mut out, 0, 0, &Cell::new('a'));
        w.reset_state();
        out.clear();
        w.render_cell(&mut out, 1, 0, &Cell::new('b'));
        assert!(text(&out).starts_with("\x1b[1;2H"));
    }
}
