//! Frame geometry and animation.
//!
//! The clock occupies a [`Footprint`]: the frame itself plus, when the date
//! is shown, the two rows the date window hangs below it. Every placement
//! rule uses the same footprint, so keyboard moves, the rebound bounce and
//! the post-resize clamp all agree on what "on screen" means:
//!
//! ```text
//!   0 ≤ row ≤ screen.rows − frame.rows − below
//!   0 ≤ col ≤ screen.cols − frame.cols
//! ```
//!
//! On a screen too small for the footprint both maxima are zero and the
//! frame sits in the top-left corner, clipped.

use tc_term::terminal::Size;
use tracing::debug;

use crate::state::{ClockState, DATE_HEIGHT, Direction, FRAME_HEIGHT, Mode, Position, Velocity};

// ---------------------------------------------------------------------------
// Footprint
// ---------------------------------------------------------------------------

/// The area the clock needs on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Frame size (`cols` = width, `rows` = height).
    pub frame: Size,
    /// Extra rows below the frame.
    pub below: u16,
}

impl Footprint {
    #[must_use]
    pub const fn new(frame: Size, below: u16) -> Self {
        Self { frame, below }
    }

    /// The footprint of `state` as currently configured.
    #[must_use]
    pub const fn of(state: &ClockState) -> Self {
        let below = if state.has(Mode::DATE) { DATE_HEIGHT - 1 } else { 0 };
        Self::new(Size::new(state.width(), FRAME_HEIGHT), below)
    }

    /// Largest row the frame may start on.
    #[must_use]
    pub const fn max_row(self, bounds: Size) -> u16 {
        bounds.rows.saturating_sub(self.frame.rows.saturating_add(self.below))
    }

    /// Largest column the frame may start on.
    #[must_use]
    pub const fn max_col(self, bounds: Size) -> u16 {
        bounds.cols.saturating_sub(self.frame.cols)
    }

    #[must_use]
    pub const fn contains(self, pos: Position, bounds: Size) -> bool {
        pos.row <= self.max_row(bounds) && pos.col <= self.max_col(bounds)
    }

    /// `pos` pulled back inside the bounds.
    #[must_use]
    pub fn clamp(self, pos: Position, bounds: Size) -> Position {
        Position::new(pos.row.min(self.max_row(bounds)), pos.col.min(self.max_col(bounds)))
    }

    /// The frame's centered position, by floor division on both axes.
    /// Only the frame is centered; the date window is not counted.
    #[must_use]
    pub const fn center(self, bounds: Size) -> Position {
        Position::new(
            (bounds.rows / 2).saturating_sub(self.frame.rows / 2),
            (bounds.cols / 2).saturating_sub(self.frame.cols / 2),
        )
    }
}

// ---------------------------------------------------------------------------
// Rebound
// ---------------------------------------------------------------------------

/// Re-aim `velocity` against the edges, then move one cell along it.
///
/// The check runs every step, not only on impact, so a frame that finds
/// itself outside the bounds (after a resize, say) turns back at once.
pub fn bounce(position: &mut Position, velocity: &mut Velocity, footprint: Footprint, bounds: Size) {
    if position.row < 1 {
        velocity.row = Direction::Forward;
    }
    if position.row >= footprint.max_row(bounds) {
        velocity.row = Direction::Back;
    }
    if position.col < 1 {
        velocity.col = Direction::Forward;
    }
    if position.col >= footprint.max_col(bounds) {
        velocity.col = Direction::Back;
    }
    position.row = velocity.row.step(position.row);
    position.col = velocity.col.step(position.col);
}

/// Advance the rebound animation by one tick. Does nothing unless rebound
/// is on. Returns the frame position afterwards.
pub fn step_rebound(state: &mut ClockState, bounds: Size) -> Position {
    if state.has(Mode::REBOUND) {
        let footprint = Footprint::of(state);
        bounce(&mut state.position, &mut state.velocity, footprint, bounds);
    }
    state.position
}

// ---------------------------------------------------------------------------
// Centering and width
// ---------------------------------------------------------------------------

/// Turn centering on or off. Turning it on stops rebound and moves the
/// frame to the middle of `bounds`.
pub fn set_centered(state: &mut ClockState, bounds: Size, on: bool) {
    state.set_mode(Mode::CENTERED, on);
    if on {
        state.position = Footprint::of(state).center(bounds);
    }
    debug!(centered = on, row = state.position.row, col = state.position.col, "centering");
}

/// Flip seconds display. The frame changes width; its column moves left
/// just enough to keep it on screen, and a centered frame is re-centered.
/// Returns the new seconds setting.
pub fn toggle_seconds(state: &mut ClockState, bounds: Size) -> bool {
    let on = state.toggle(Mode::SECONDS);
    let footprint = Footprint::of(state);
    state.position.col = state.position.col.min(footprint.max_col(bounds));
    if state.has(Mode::CENTERED) {
        state.position = footprint.center(bounds);
    }
    debug!(seconds = on, width = state.width(), col = state.position.col, "seconds toggled");
    on
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// A one-cell keyboard move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

/// Move the frame one cell. A centered frame does not move, and neither
/// does one the move would push off screen. Returns whether it moved.
pub fn move_by(state: &mut ClockState, direction: Move, bounds: Size) -> bool {
    if state.has(Mode::CENTERED) {
        return false;
    }
    let footprint = Footprint::of(state);
    let Position { row, col } = state.position;
    let next = match direction {
        Move::Up if row >= 1 => Position::new(row - 1, col),
        Move::Down if row < footprint.max_row(bounds) => Position::new(row + 1, col),
        Move::Left if col >= 1 => Position::new(row, col - 1),
        Move::Right if col < footprint.max_col(bounds) => Position::new(row, col + 1),
        _ => return false,
    };
    state.position = next;
    debug!(?direction, row = next.row, col = next.col, "moved");
    true
}

/// Bring the frame back on screen after the screen changed size. The last
/// position is kept when it still fits; a centered frame is re-centered.
pub fn fit(state: &mut ClockState, bounds: Size) {
    let footprint = Footprint::of(state);
    state.position = if state.has(Mode::CENTERED) {
        footprint.center(bounds)
    } else {
        footprint.clamp(state.position, bounds)
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
