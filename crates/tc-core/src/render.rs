//! Digit renderer.
//!
//! Expands a [`Glyph`] into a 5 × 6 block of colored cells inside a window.
//! Each segment covers two adjacent columns: segment `(r, c)` lands on
//! window row `origin.row + r`, columns `origin.col + 2c` and `+ 2c + 1`.
//! Lit segments take the `Block` pen, unlit ones the `Blank` pen, so a
//! digit fully overwrites whatever it replaces.

use tc_term::buffer::FrameBuffer;
use tc_term::cell::{Attr, Pen};
use tc_term::window::Window;

use crate::glyph::{DIGITS, SEGMENT_WIDTH};

/// The two pens a glyph is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphPens {
    pub lit: Pen,
    pub unlit: Pen,
}

impl GlyphPens {
    /// Both pens with their attributes replaced by `attrs`. Attributes from
    /// an earlier paint never carry over.
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self {
            lit: self.lit.with_attrs(attrs),
            unlit: self.unlit.with_attrs(attrs),
        }
    }
}

/// Paint `digit` with its top-left segment at window-relative
/// `(row, col)`. `digit` is taken modulo 10.
pub fn draw_digit(screen: &mut FrameBuffer, window: &Window, digit: u8, row: u16, col: u16, pens: GlyphPens) {
    let glyph = DIGITS[usize::from(digit % 10)];
    for (r, c, on) in glyph.segments() {
        let pen = if on { pens.lit } else { pens.unlit };
        let x = col + c * SEGMENT_WIDTH;
        for dx in 0..SEGMENT_WIDTH {
            window.put(screen, row + r, x + dx, ' ', pen);
        }
    }
}
