// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A cell holds a codepoint, a foreground and background color, and a set of
// SGR attributes. The clock's frame buffer is a grid of these; the
// renderer diffs two grids and emits escape sequences for the cells that
// differ.
//
// Wide characters occupy two columns. The first cell holds the codepoint and
// the second is a continuation cell (ch = 0) that only carries colors, so the
// background still fills correctly under a double-width glyph in a localized
// date string.

use crate::color::CellColor;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// Each flag maps to one SGR parameter. Combine with bitwise OR:
    ///
    /// ```
    /// use tc_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::SLOW_BLINK;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM           = 1 << 1;
        /// SGR 4 — single underline.
        const UNDERLINE     = 1 << 2;
        /// SGR 5 — slow blink.
        const SLOW_BLINK    = 1 << 3;
        /// SGR 7 — swap foreground and background.
        const INVERSE       = 1 << 4;
    }
}

impl Attr {
    /// Whether no attributes are set.
    #[inline]
    #[must_use]
    pub const fn is_empty_flags(self) -> bool {
        self.bits() == 0
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
///
/// # Layout (12 bytes with padding)
///
/// ```text
/// ┌──────────┬──────────┬──────────┬───────┬─────────┐
/// │ ch: u32  │ fg: Cell │ bg: Cell │ attrs │ padding │
/// │ 4 bytes  │ Color 2  │ Color 2  │  u8   │ 3 bytes │
/// └──────────┴──────────┴──────────┴───────┴─────────┘
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint to display.
    ///
    /// - `0` = continuation cell (second column of a wide character)
    /// - `b' '` (32) = empty / space (the default)
    pub ch: u32,

    /// Foreground (text) color.
    pub fg: CellColor,

    /// Background color.
    pub bg: CellColor,

    /// Text attributes.
    pub attrs: Attr,
}

const CONTINUATION: u32 = 0;

const SPACE: u32 = b' ' as u32;

impl Cell {
    /// An empty cell: space character, default colors, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// Create a cell with a character and default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            fg: CellColor::Default,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Create a cell with full styling.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: ch as u32,
            fg,
            bg,
            attrs,
        }
    }

    /// Create a continuation cell for the second column of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
            attrs,
        }
    }

    // ─── Queries ──────────────────────────────────────────────────────────

    /// Whether this is a continuation cell.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// Whether this cell is visually empty (space, default colors, no styling).
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.ch == SPACE
            && self.fg == CellColor::Default
            && self.bg == CellColor::Default
            && self.attrs.is_empty_flags()
    }

    /// The codepoint as a `char`; `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    // ─── Mutations ────────────────────────────────────────────────────────

    /// Reset this cell to empty.
    #[inline]
    pub const fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: CellColor) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Pen ─────────────────────────────────────────────────────────────────────

/// The style a window paints with: colors plus attributes, no character.
///
/// Equivalent to a curses color pair combined with an attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Pen {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Pen {
    /// Default colors, no attributes.
    pub const PLAIN: Self = Self {
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(fg: CellColor, bg: CellColor) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// A cell showing `ch` in this pen's style.
    #[inline]
    #[must_use]
    pub const fn cell(self, ch: char) -> Cell {
        Cell::styled(ch, self.fg, self.bg, self.attrs)
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if !self.fg.is_default() {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if !self.bg.is_default() {
            write!(f, ", bg={:?}", self.bg)?;
        }
        if !self.attrs.is_empty_flags() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
