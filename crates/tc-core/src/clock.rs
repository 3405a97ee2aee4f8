//! The tick loop.
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │ stop requested? ── yes ──▶ leave                            │
//!   │ rebound step            (geometry)                          │
//!   │ refresh digits + date   (time)                              │
//!   │ plan + paint            (compose, render)                   │
//!   │ present                 (surface)                           │
//!   │ poll ≤ delay            (surface)                           │
//!   │ dispatch                (dispatch) ── Reinit ──▶ rebuild    │
//!   └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the poll waits. Termination signals are seen at the top of the next
//! tick through [`Surface::stop_requested`]; a resize rebuilds the surface
//! synchronously before the next tick starts.

use std::time::Duration;

use tc_term::surface::Surface;
use tracing::{debug, info};

use crate::compose::Composer;
use crate::dispatch::{Outcome, dispatch};
use crate::error::ClockError;
use crate::geometry;
use crate::options::ClockOptions;
use crate::state::ClockState;
use crate::time::TimeSource;

/// A running clock: its state, what is on screen, and where time comes from.
pub struct Clock<'t, T: TimeSource> {
    state: ClockState,
    composer: Composer,
    delay: Duration,
    time: &'t T,
}

impl<'t, T: TimeSource> Clock<'t, T> {
    #[must_use]
    pub fn new(options: &ClockOptions, time: &'t T) -> Self {
        Self {
            state: ClockState::new(options),
            composer: Composer::new(),
            delay: options.delay(),
            time,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ClockState {
        &self.state
    }

    #[must_use]
    pub const fn composer(&self) -> &Composer {
        &self.composer
    }

    /// One full tick against `surface`.
    ///
    /// # Errors
    ///
    /// [`ClockError::Draw`] if presenting fails, [`ClockError::Input`] if
    /// polling fails, [`ClockError::Reinit`] if a resize cannot rebuild the
    /// surface.
    pub fn tick<S: Surface>(&mut self, surface: &mut S) -> Result<Outcome, ClockError> {
        let bounds = surface.size();
        geometry::step_rebound(&mut self.state, bounds);
        self.state.refresh_time(self.time.now());

        let plan = self.composer.tick(&mut self.state);
        plan.paint(surface.frame_mut(), &self.state);
        surface.present().map_err(ClockError::Draw)?;

        let poll = surface.poll(self.delay).map_err(ClockError::Input)?;
        match dispatch(&mut self.state, poll, bounds, self.time) {
            Outcome::Reinit => {
                let size = surface.reinit().map_err(ClockError::Reinit)?;
                geometry::fit(&mut self.state, size);
                self.composer.invalidate();
                debug!(cols = size.cols, rows = size.rows, "surface rebuilt");
                Ok(Outcome::Continue)
            }
            outcome => Ok(outcome),
        }
    }

    /// Tick until a key, a signal, or an error stops the clock.
    ///
    /// # Errors
    ///
    /// Whatever [`Clock::tick`] returns.
    pub fn run<S: Surface>(&mut self, surface: &mut S) -> Result<(), ClockError> {
        let size = surface.size();
        geometry::fit(&mut self.state, size);
        info!(cols = size.cols, rows = size.rows, delay = ?self.delay, "clock started");

        while self.state.is_running() && !surface.stop_requested() {
            if self.tick(surface)? == Outcome::Stop {
                break;
            }
        }

        info!("clock stopped");
        Ok(())
    }
}

/// Run a clock configured by `options` on `surface` until it stops.
///
/// # Errors
///
/// See [`Clock::tick`].
pub fn run<S: Surface, T: TimeSource>(surface: &mut S, options: &ClockOptions, time: &T) -> Result<(), ClockError> {
    Clock::new(options, time).run(surface)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Mode, NORMAL_WIDTH, Position};
    use crate::time::FixedClock;
    use chrono::{TimeDelta, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::io;
    use tc_term::buffer::FrameBuffer;
    use tc_term::color::CellColor;
    use tc_term::surface::{Headless, Poll};
    use tc_term::terminal::Size;

    fn frozen() -> FixedClock {
        FixedClock::frozen(Utc.with_ymd_and_hms(2024, 1, 1, 12, 34, 56).unwrap())
    }

    fn utc() -> ClockOptions {
        ClockOptions {
            use_utc: true,
            ..ClockOptions::default()
        }
    }

    fn finish(options: &ClockOptions, surface: &mut Headless, time: &FixedClock) -> ClockState {
        let mut clock = Clock::new(options, time);
        clock.run(surface).unwrap();
        clock.state().clone()
    }

    #[test]
    fn q_stops_after_one_frame() {
        let mut surface = Headless::new(80, 24).with_keys("q");
        let state = finish(&utc(), &mut surface, &frozen());
        assert!(!state.is_running());
        assert_eq!(surface.presents(), 1);
    }

    #[test]
    fn exhausted_input_stops_at_the_next_tick() {
        let mut surface = Headless::new(80, 24).with_script([Poll::Timeout, Poll::Timeout]);
        finish(&utc(), &mut surface, &frozen());
        assert_eq!(surface.presents(), 3);
        assert_eq!(surface.waited(), Duration::from_secs(3));
    }

    #[test]
    fn seconds_twice_restores_width() {
        let mut surface = Headless::new(80, 24).with_keys("ss");
        let state = finish(&utc(), &mut surface, &frozen());
        assert!(!state.has(Mode::SECONDS));
        assert_eq!(state.width(), NORMAL_WIDTH);
    }

    #[test]
    fn c_centers_and_stops_rebound() {
        let options = ClockOptions {
            rebound: true,
            ..utc()
        };
        let mut surface = Headless::new(80, 24).with_keys("c");
        let state = finish(&options, &mut surface, &frozen());
        assert_eq!(state.position, Position::new(12 - 3, 40 - 17));
        assert!(!state.has(Mode::REBOUND));
    }

    #[test]
    fn centered_option_centers_at_start() {
        let options = ClockOptions {
            centered: true,
            ..utc()
        };
        let mut surface = Headless::new(100, 30);
        let state = finish(&options, &mut surface, &frozen());
        assert_eq!(state.position, Position::new(15 - 3, 50 - 17));
    }

    #[test]
    fn rebound_moves_once_per_tick() {
        let options = ClockOptions {
            rebound: true,
            ..utc()
        };
        let mut surface = Headless::new(80, 24).with_script([Poll::Timeout; 3]);
        let state = finish(&options, &mut surface, &frozen());
        assert_eq!(state.position, Position::new(4, 4));
    }

    #[test]
    fn digits_reach_the_screen() {
        let mut surface = Headless::new(80, 24);
        finish(&utc(), &mut surface, &frozen());
        let frame: &FrameBuffer = surface.frame();
        // Hour tens is 1: the lit stroke sits at frame columns 5 and 6.
        assert_eq!(frame.get(5, 1).unwrap().bg, CellColor::Ansi256(2));
        assert_eq!(frame.get(6, 5).unwrap().bg, CellColor::Ansi256(2));
        assert!(frame.get(1, 1).unwrap().bg.is_default());
        assert!(frame.row_text(7).contains("2024-01-01"));
    }

    #[test]
    fn resize_rebuilds_and_clamps() {
        let mut surface = Headless::new(80, 24).with_keys("jjjjjjjjjjjjjjjjjjjj");
        surface.resize_to(Size::new(40, 12));
        let state = finish(&utc(), &mut surface, &frozen());
        assert_eq!(surface.reinits(), 1);
        assert_eq!(state.position, Position::new(12 - 9, 0));
        assert!(surface.frame().row_text(12 - 9 + 7).contains("2024-01-01"));
    }

    #[test]
    fn date_change_triggers_one_reposition() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 58).unwrap();
        let time = FixedClock::ticking(start, TimeDelta::seconds(1));
        let mut surface = Headless::new(80, 24).with_script([Poll::Timeout; 4]);
        let mut clock = Clock::new(&utc(), &time);
        clock.run(&mut surface).unwrap();
        // Initial placement, then the switch to 2024-01-02.
        assert_eq!(clock.composer().repositions(), 2);
        assert_eq!(clock.state().date, "2024-01-02");
    }

    struct Broken {
        inner: Headless,
        fail_present: bool,
    }

    impl Surface for Broken {
        fn size(&self) -> Size {
            self.inner.size()
        }
        fn frame_mut(&mut self) -> &mut FrameBuffer {
            self.inner.frame_mut()
        }
        fn present(&mut self) -> io::Result<()> {
            if self.fail_present {
                Err(io::Error::other("closed"))
            } else {
                Ok(())
            }
        }
        fn poll(&mut self, timeout: Duration) -> io::Result<Poll> {
            self.inner.poll(timeout)
        }
        fn reinit(&mut self) -> io::Result<Size> {
            Err(io::Error::other("no tty"))
        }
        fn stop_requested(&self) -> bool {
            self.inner.stop_requested()
        }
    }

    #[test]
    fn present_failure_is_a_draw_error() {
        let mut surface = Broken {
            inner: Headless::new(80, 24),
            fail_present: true,
        };
        let err = run(&mut surface, &utc(), &frozen()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn reinit_failure_is_fatal() {
        let mut inner = Headless::new(80, 24);
        inner.resize_to(Size::new(10, 10));
        let mut surface = Broken {
            inner,
            fail_present: false,
        };
        let err = run(&mut surface, &utc(), &frozen()).unwrap_err();
        assert!(matches!(err, ClockError::Reinit(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
