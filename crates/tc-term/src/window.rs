// SPDX-License-Identifier: MIT
//
// Windows — rectangles placed on the shared frame buffer.
//
// A window owns no cells. It is a position and a size, and every paint goes
// through it into the one FrameBuffer, clipped to the window's rectangle and
// to the screen. Moving a window does not move what was painted: the old
// area keeps its content until something erases it, exactly like a curses
// window moved with mvwin over stdscr.
//
// Coordinates passed to paint methods are window-relative (row, col), with
// (0, 0) the top-left border cell.

use crate::buffer::{ClipRect, FrameBuffer};
use crate::cell::Pen;

// ─── Border Glyphs ──────────────────────────────────────────────────────────

/// The characters a border is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BorderGlyphs {
    /// Single-line box drawing.
    pub const LINE: Self = Self {
        horizontal: '─',
        vertical: '│',
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
    };

    /// All spaces; drawing this erases a border.
    pub const BLANK: Self = Self {
        horizontal: ' ',
        vertical: ' ',
        top_left: ' ',
        top_right: ' ',
        bottom_left: ' ',
        bottom_right: ' ',
    };
}

// ─── Window ─────────────────────────────────────────────────────────────────

/// A rectangle on the frame buffer.
///
/// ```
/// use tc_term::buffer::FrameBuffer;
/// use tc_term::cell::Pen;
/// use tc_term::window::{BorderGlyphs, Window};
///
/// let mut screen = FrameBuffer::new(20, 5);
/// let win = Window::new(1, 2, 3, 6);
/// win.draw_border(&mut screen, Pen::PLAIN, BorderGlyphs::LINE);
/// win.print(&mut screen, 1, 1, "ab", Pen::PLAIN);
/// assert_eq!(screen.row_text(2), "  │ab  │            ");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    row: u16,
    col: u16,
    height: u16,
    width: u16,
}

impl Window {
    #[must_use]
    pub const fn new(row: u16, col: u16, height: u16, width: u16) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }

    #[inline]
    #[must_use]
    pub const fn row(&self) -> u16 {
        self.row
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> u16 {
        self.col
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// The window's rectangle in screen coordinates.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> ClipRect {
        ClipRect::from_unsigned(self.col, self.row, self.width, self.height)
    }

    /// Place the top-left corner at `(row, col)`.
    pub const fn move_to(&mut self, row: u16, col: u16) {
        self.row = row;
        self.col = col;
    }

    pub const fn resize(&mut self, height: u16, width: u16) {
        self.height = height;
        self.width = width;
    }

    /// Fill the whole window with spaces in `pen`.
    pub fn erase(&self, screen: &mut FrameBuffer, pen: Pen) {
        let rect = self.rect();
        screen.fill_rect(rect, pen, Some(&rect));
    }

    /// Paint one character at window-relative `(row, col)`.
    pub fn put(&self, screen: &mut FrameBuffer, row: u16, col: u16, ch: char, pen: Pen) -> bool {
        if row >= self.height || col >= self.width {
            return false;
        }
        let rect = self.rect();
        screen.paint_cell(
            self.col.saturating_add(col),
            self.row.saturating_add(row),
            ch,
            pen,
            Some(&rect),
        )
    }

    /// Paint text starting at window-relative `(row, col)`, clipped to the
    /// window. Returns the number of columns written.
    pub fn print(&self, screen: &mut FrameBuffer, row: u16, col: u16, text: &str, pen: Pen) -> u16 {
        if row >= self.height || col >= self.width {
            return 0;
        }
        let rect = self.rect();
        screen.paint_text(
            self.col.saturating_add(col),
            self.row.saturating_add(row),
            text,
            pen,
            Some(&rect),
        )
    }

    /// Draw a border around the window's edge.
    pub fn draw_border(&self, screen: &mut FrameBuffer, pen: Pen, glyphs: BorderGlyphs) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let right = self.width - 1;
        let bottom = self.height - 1;

        for col in 1..right {
            self.put(screen, 0, col, glyphs.horizontal, pen);
            self.put(screen, bottom, col, glyphs.horizontal, pen);
        }
        for row in 1..bottom {
            self.put(screen, row, 0, glyphs.vertical, pen);
            self.put(screen, row, right, glyphs.vertical, pen);
        }
        self.put(screen, 0, 0, glyphs.top_left, pen);
        self.put(screen, 0, right, glyphs.top_right, pen);
        self.put(screen, bottom, 0, glyphs.bottom_left, pen);
        self.put(screen, bottom, right, glyphs.bottom_right, pen);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
