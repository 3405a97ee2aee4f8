//! Digit glyphs.
//!
//! Every digit is a 5-row × 3-column grid of on/off segments packed into the
//! low 15 bits of a `u16`, row-major, most significant bit first:
//!
//! ```text
//!   bit 14 13 12     ###      0b111
//!       11 10  9     # #      0b101
//!        8  7  6     # #      0b101
//!        5  4  3     # #      0b101
//!        2  1  0     ###      0b111
//! ```
//!
//! The renderer doubles each segment horizontally, so a glyph covers 5 rows
//! by 6 screen columns.

/// Logical rows in a glyph.
pub const ROWS: u16 = 5;

/// Logical segments per row.
pub const COLS: u16 = 3;

/// Screen columns one segment covers.
pub const SEGMENT_WIDTH: u16 = 2;

/// Screen columns one glyph covers.
pub const WIDTH: u16 = COLS * SEGMENT_WIDTH;

// ---------------------------------------------------------------------------
// Glyph
// ---------------------------------------------------------------------------

/// A 15-segment digit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glyph(u16);

/// The glyph table, indexed by digit value.
pub const DIGITS: [Glyph; 10] = [
    Glyph(0b111_101_101_101_111),
    Glyph(0b001_001_001_001_001),
    Glyph(0b111_001_111_100_111),
    Glyph(0b111_001_111_001_111),
    Glyph(0b101_101_111_001_001),
    Glyph(0b111_100_111_001_111),
    Glyph(0b111_100_111_101_111),
    Glyph(0b111_001_001_001_001),
    Glyph(0b111_101_111_101_111),
    Glyph(0b111_101_111_001_111),
];

impl Glyph {
    /// The glyph for `digit`, or `None` above 9.
    #[must_use]
    pub const fn for_digit(digit: u8) -> Option<Self> {
        if digit < 10 {
            Some(DIGITS[digit as usize])
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn mask(self) -> u16 {
        self.0
    }

    /// Whether the segment at logical `(row, col)` is lit. Out-of-grid
    /// positions are never lit.
    #[must_use]
    pub const fn is_on(self, row: u16, col: u16) -> bool {
        if row >= ROWS || col >= COLS {
            return false;
        }
        let bit = ROWS * COLS - 1 - (row * COLS + col);
        (self.0 >> bit) & 1 == 1
    }

    /// Every segment as `(row, col, lit)`, row-major.
    pub fn segments(self) -> impl Iterator<Item = (u16, u16, bool)> {
        (0..ROWS).flat_map(move |row| (0..COLS).map(move |col| (row, col, self.is_on(row, col))))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn picture(glyph: Glyph) -> Vec<String> {
        (0..ROWS)
            .map(|row| {
                (0..COLS)
                    .map(|col| if glyph.is_on(row, col) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn zero_is_a_ring() {
        assert_eq!(picture(DIGITS[0]), vec!["###", "#.#", "#.#", "#.#", "###"]);
    }

    #[test]
    fn one_is_the_right_column() {
        assert_eq!(picture(DIGITS[1]), vec!["..#", "..#", "..#", "..#", "..#"]);
    }

    #[test]
    fn four_and_seven() {
        assert_eq!(picture(DIGITS[4]), vec!["#.#", "#.#", "###", "..#", "..#"]);
        assert_eq!(picture(DIGITS[7]), vec!["###", "..#", "..#", "..#", "..#"]);
    }

    #[test]
    fn two_and_five_mirror() {
        assert_eq!(picture(DIGITS[2]), vec!["###", "..#", "###", "#..", "###"]);
        assert_eq!(picture(DIGITS[5]), vec!["###", "#..", "###", "..#", "###"]);
    }

    #[test]
    fn eight_has_every_row_lit_on_both_sides() {
        assert!(DIGITS[8].segments().filter(|&(_, col, _)| col != 1).all(|(_, _, on)| on));
    }

    #[test]
    fn masks_fit_in_fifteen_bits() {
        assert!(DIGITS.iter().all(|g| g.mask() < 1 << 15));
    }

    #[test]
    fn out_of_range() {
        assert_eq!(Glyph::for_digit(10), None);
        assert!(!DIGITS[8].is_on(5, 0));
        assert!(!DIGITS[8].is_on(0, 3));
    }

    #[test]
    fn segments_are_row_major() {
        let order: Vec<(u16, u16)> = DIGITS[0].segments().map(|(r, c, _)| (r, c)).take(4).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0)]);
    }

    proptest! {
        #[test]
        fn glyph_lookup_is_pure(digit in 0u8..10) {
            let a: Vec<_> = Glyph::for_digit(digit).unwrap().segments().collect();
            let b: Vec<_> = Glyph::for_digit(digit).unwrap().segments().collect();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn segments_agree_with_mask(digit in 0u8..10) {
            let glyph = DIGITS[digit as usize];
            let rebuilt = glyph
                .segments()
                .fold(0u16, |acc, (_, _, on)| (acc << 1) | u16::from(on));
            prop_assert_eq!(rebuilt, glyph.mask());
        }
    }
}
