//! Input dispatcher.
//!
//! One poll result per tick goes through [`dispatch`], which applies the
//! matching transition to the state and tells the loop what to do next.
//!
//! | Key                      | Normal                          | Screensaver     |
//! |--------------------------|---------------------------------|-----------------|
//! | `↑` `k`, `↓` `j`, `←` `h`, `→` `l` | move one cell (not when centered) | stop   |
//! | `q`                      | stop                            | stop            |
//! | `s`                      | toggle seconds                  | stop            |
//! | `t`                      | toggle twelve-hour              | stop            |
//! | `c`                      | toggle centering                | stop            |
//! | `b`                      | toggle bold                     | stop            |
//! | `r`                      | toggle rebound                  | stop            |
//! | `x`                      | toggle box                      | stop            |
//! | `0`–`7`                  | accent color                    | accent color    |
//! | `Ctrl-C`                 | stop, even with no-quit         | same            |
//! | resize                   | reinitialize                    | reinitialize    |
//! | timeout, other keys      | nothing                         | nothing / stop  |
//!
//! Letters are case-insensitive. With no-quit set, `q` and the screensaver's
//! "any key" do not stop the clock.

use tc_term::input::{KeyCode, KeyEvent, Modifiers};
use tc_term::surface::Poll;
use tc_term::terminal::Size;
use tracing::debug;

use crate::geometry::{self, Move};
use crate::state::{ClockState, Mode};
use crate::time::TimeSource;

/// What the loop does after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep ticking.
    Continue,
    /// Leave the loop.
    Stop,
    /// Rebuild the surface at its new size, then keep ticking.
    Reinit,
}

/// Apply one poll result to `state`. `bounds` is the current screen size;
/// `clock` is read when a transition needs fresh digits.
pub fn dispatch(state: &mut ClockState, poll: Poll, bounds: Size, clock: &impl TimeSource) -> Outcome {
    let key = match poll {
        Poll::Timeout => return Outcome::Continue,
        Poll::Resize => {
            debug!("resize requested");
            return Outcome::Reinit;
        }
        Poll::Key(key) => key,
    };

    if key.is_ctrl('c') {
        return stop(state);
    }

    if state.has(Mode::SCREENSAVER) {
        screensaver_key(state, key)
    } else {
        normal_key(state, key, bounds, clock)
    }
}

fn stop(state: &mut ClockState) -> Outcome {
    debug!("stopping");
    state.stop();
    Outcome::Stop
}

fn quit_unless_no_quit(state: &mut ClockState) -> Outcome {
    if state.has(Mode::NO_QUIT) {
        Outcome::Continue
    } else {
        stop(state)
    }
}

/// A printable key without Ctrl or Alt, folded to lower case.
fn plain_char(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(ch) if !key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => {
            Some(ch.to_ascii_lowercase())
        }
        _ => None,
    }
}

/// `'0'`–`'7'` as a color index.
fn accent_digit(ch: char) -> Option<u8> {
    ch.to_digit(8).and_then(|d| u8::try_from(d).ok())
}

fn recolor(state: &mut ClockState, accent: u8) -> Outcome {
    if state.set_accent(accent) {
        debug!(accent, "accent color");
    }
    Outcome::Continue
}

fn screensaver_key(state: &mut ClockState, key: KeyEvent) -> Outcome {
    match plain_char(key).and_then(accent_digit) {
        Some(accent) => recolor(state, accent),
        None => quit_unless_no_quit(state),
    }
}

fn arrow(key: KeyEvent) -> Option<Move> {
    if !key.modifiers.is_empty() {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(Move::Up),
        KeyCode::Down => Some(Move::Down),
        KeyCode::Left => Some(Move::Left),
        KeyCode::Right => Some(Move::Right),
        _ => None,
    }
}

fn normal_key(state: &mut ClockState, key: KeyEvent, bounds: Size, clock: &impl TimeSource) -> Outcome {
    if let Some(direction) = arrow(key) {
        geometry::move_by(state, direction, bounds);
        return Outcome::Continue;
    }
    let Some(ch) = plain_char(key) else {
        return Outcome::Continue;
    };

    match ch {
        'k' => {
            geometry::move_by(state, Move::Up, bounds);
        }
        'j' => {
            geometry::move_by(state, Move::Down, bounds);
        }
        'h' => {
            geometry::move_by(state, Move::Left, bounds);
        }
        'l' => {
            geometry::move_by(state, Move::Right, bounds);
        }
        'q' => return quit_unless_no_quit(state),
        's' => {
            geometry::toggle_seconds(state, bounds);
        }
        't' => {
            let on = state.toggle(Mode::TWELVE_HOUR);
            state.refresh_time(clock.now());
            state.request_reposition();
            debug!(twelve_hour = on, "twelve-hour toggled");
        }
        'c' => {
            let on = !state.has(Mode::CENTERED);
            geometry::set_centered(state, bounds, on);
        }
        'b' => {
            let on = state.toggle(Mode::BOLD);
            debug!(bold = on, "bold toggled");
        }
        'r' => {
            let on = state.toggle(Mode::REBOUND);
            debug!(rebound = on, "rebound toggled");
        }
        'x' => {
            let on = state.toggle(Mode::BOX);
            debug!(boxed = on, "box toggled");
        }
        _ => {
            if let Some(accent) = accent_digit(ch) {
                return recolor(state, accent);
            }
        }
    }
    Outcome::Continue
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
