//! # tc-core — Clock core for tty-clock
//!
//! Everything that makes the clock a clock, independent of how the terminal
//! is driven:
//!
//! - **[`glyph`]** — the 5×3 segment masks for the digits 0–9
//! - **[`time`]** — sampling wall time into digits, meridiem, and a date line
//! - **[`options`]** — the startup configuration record
//! - **[`state`]** — `ClockState`, mode flags, and the color roles
//! - **[`geometry`]** — frame placement: bounce, centering, moves, clamping
//! - **[`render`]** — expanding a glyph into colored blocks on a window
//! - **[`compose`]** — per-tick redraw planning and painting
//! - **[`dispatch`]** — the key → transition table
//! - **[`clock`]** — the tick loop tying it all to a [`tc_term::surface::Surface`]
//! - **[`error`]** — fatal errors and their exit codes

pub mod clock;
pub mod compose;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod options;
pub mod render;
pub mod state;
pub mod time;
