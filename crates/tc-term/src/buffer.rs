// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid every window paints into.
//
// The buffer is persistent: nothing clears it between ticks. Windows paint
// over whatever is already there, the same way curses windows share one
// virtual screen, and the diff renderer compares the result with what the
// terminal last showed.
//
//   - Flat `Vec<Cell>`, row-major. Left-to-right scans are linear.
//   - Paint operations take an optional `ClipRect`; windows pass their own
//     rectangle so nothing they draw leaks past their edges.
//   - Wide characters get a continuation cell in the next column. Painting
//     over either half of a wide character breaks it cleanly.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Pen};

// ─── ClipRect ───────────────────────────────────────────────────────────────────

/// A clipping rectangle.
///
/// Coordinates are signed so a rectangle can hang partly off the top or left
/// of the screen and still intersect correctly.
///
/// ```
/// use tc_term::buffer::ClipRect;
///
/// let clip = ClipRect::new(10, 5, 35, 7);
/// assert!(clip.contains(10, 5));
/// assert!(clip.contains(44, 11));
/// assert!(!clip.contains(45, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl ClipRect {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Create from unsigned screen-space coordinates.
    #[inline]
    #[must_use]
    pub const fn from_unsigned(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x: x as i32,
            y: y as i32,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y + self.height as i32
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether a screen-space point is inside this rectangle.
    #[inline]
    #[must_use]
    pub fn contains(self, px: u16, py: u16) -> bool {
        let px = i32::from(px);
        let py = i32::from(py);
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// The overlap of two rectangles, or `None` if they are disjoint.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            // Both spans are positive and bounded by a u16 dimension.
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            Some(Self {
                x: x1,
                y: y1,
                width: (x2 - x1) as u16,
                height: (y2 - y1) as u16,
            })
        } else {
            None
        }
    }
}

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A 2D grid of terminal cells, `index = y * width + x`.
///
/// ```
/// use tc_term::buffer::FrameBuffer;
/// use tc_term::cell::Cell;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// buf.set(5, 3, Cell::new('X'));
/// assert_eq!(buf.get(5, 3).unwrap().character(), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The full buffer as a [`ClipRect`].
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The raw cell slice, for the renderer's hot loop.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row as a slice, or `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The characters of row `y` as a `String`, continuation cells skipped.
    ///
    /// Mostly useful for assertions on what a frame shows.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| row.iter().filter_map(|c| c.character()).collect())
            .unwrap_or_default()
    }

    // ─── Clear, Resize, Copy ─────────────────────────────────────────────

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the buffer. All content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Make `self` an exact copy of `other`, reusing the allocation.
    pub fn copy_from(&mut self, other: &Self) {
        self.width = other.width;
        self.height = other.height;
        self.cells.clone_from(&other.cells);
    }

    // ─── Direct Cell Access ──────────────────────────────────────────────

    /// Bounds-checked raw write: no clipping, no wide-char cleanup.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Break any wide character that touches `(x, y)`.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);

        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = u32::from(b' ');
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Paint one character with `pen`, honoring bounds and `clip`.
    ///
    /// Returns `true` if the cell was written.
    pub fn paint_cell(&mut self, x: u16, y: u16, ch: char, pen: Pen, clip: Option<&ClipRect>) -> bool {
        if !self.in_bounds(x, y) || clip.is_some_and(|c| !c.contains(x, y)) {
            return false;
        }

        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = pen.cell(ch);
        true
    }

    /// Fill a rectangle with spaces in `pen`'s style.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn fill_rect(&mut self, rect: ClipRect, pen: Pen, clip: Option<&ClipRect>) {
        let Some(mut effective) = rect.intersect(self.bounds()) else {
            return;
        };
        if let Some(clip) = clip {
            let Some(clipped) = effective.intersect(*clip) else {
                return;
            };
            effective = clipped;
        }

        // Intersection with the buffer bounds keeps these non-negative.
        let x1 = effective.x as u16;
        let y1 = effective.y as u16;
        let x2 = effective.right() as u16;
        let y2 = effective.bottom() as u16;

        for row in y1..y2 {
            self.break_wide_char_at(x1, row);
            self.break_wide_char_at(x2 - 1, row);
            let start = self.index(x1, row);
            let end = self.index(x2, row);
            self.cells[start..end].fill(pen.cell(' '));
        }
    }

    /// Paint `text` left to right from `(x, y)`.
    ///
    /// Wide characters take two columns; one that would straddle the right
    /// edge becomes a space. Zero-width characters are skipped.
    ///
    /// Returns the number of columns consumed.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, pen: Pen, clip: Option<&ClipRect>) -> u16 {
        if y >= self.height {
            return 0;
        }

        let limit = clip.map_or(self.width, |c| {
            u16::try_from(c.right().clamp(0, i32::from(self.width))).unwrap_or(self.width)
        });
        let mut col = x;

        for ch in text.chars() {
            if col >= limit {
                break;
            }

            let char_w = ch.width().unwrap_or(0);
            if char_w == 0 {
                continue;
            }

            if char_w == 2 && col + 1 >= limit {
                self.paint_cell(col, y, ' ', pen, clip);
                col += 1;
                break;
            }

            if self.paint_cell(col, y, ch, pen, clip) && char_w == 2 {
                let cont_x = col + 1;
                self.break_wide_char_at(cont_x, y);
                let cont_idx = self.index(cont_x, y);
                self.cells[cont_idx] = Cell::continuation(pen.fg, pen.bg, pen.attrs);
            }

            // char_w is 1 or 2.
            #[allow(clippy::cast_possible_truncation)]
            let w = char_w as u16;
            col = col.saturating_add(w);
        }

        col.saturating_sub(x)
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width ─────────────────────────────────────────────────────────────────

/// Display width of a character in terminal columns (0, 1 or 2).
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
///
/// ```
/// use tc_term::buffer::string_width;
///
/// assert_eq!(string_width("2024-05-01"), 10);
/// assert_eq!(string_width("5月1日"), 6);
/// ```
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ──────────────────────────────────────────────────────────────────────
