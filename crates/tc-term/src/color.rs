// SPDX-License-Identifier: MIT
//
// Terminal colors as they are stored in cells.
//
// The clock only ever paints with the eight classic ANSI colors and the
// terminal's own default background, so this module is deliberately
// small: one compact enum that the diff renderer can compare cheaply, plus
// names for the eight palette slots a user can pick with `-C` or the
// number keys.

use std::fmt;

// ─── CellColor ───────────────────────────────────────────────────────────────

/// Compact color for terminal cell storage.
///
/// This is what gets written to the [`FrameBuffer`](crate::buffer::FrameBuffer)
/// and converted to SGR sequences on output. Two bytes, `Copy`, cheap to
/// compare in the renderer's hot loop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// ANSI 256-color palette index. Indices 0–7 are the classic colors.
    Ansi256(u8),

    /// Terminal default color (respects the user's terminal theme).
    #[default]
    Default,
}

impl CellColor {
    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// One of the eight classic palette slots.
    ///
    /// Returns `None` for indices outside `0..8` so callers can keep their
    /// previous color instead of painting something unexpected.
    #[inline]
    #[must_use]
    pub const fn palette(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::Ansi256(index))
        } else {
            None
        }
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ansi256(idx) => match AnsiColor::from_index(*idx) {
                Some(named) => write!(f, "{named}"),
                None => write!(f, "ansi({idx})"),
            },
            Self::Default => write!(f, "default"),
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── AnsiColor ───────────────────────────────────────────────────────────────

/// The eight classic terminal colors, in SGR order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AnsiColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl AnsiColor {
    /// All eight colors, indexed by their SGR number.
    pub const ALL: [Self; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    /// Look up a color by its SGR index (0–7).
    #[inline]
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// The SGR index of this color.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Lowercase name, as shown in help text and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }
}

impl fmt::Display for AnsiColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<AnsiColor> for CellColor {
    fn from(color: AnsiColor) -> Self {
        Self::Ansi256(color.index())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
