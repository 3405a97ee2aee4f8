//! Clock state.
//!
//! One [`ClockState`] lives for the whole run. The tick loop owns it and
//! lends it by `&mut` to each phase: geometry, time refresh, composition,
//! and key dispatch. Nothing else holds on to it between ticks.
//!
//! Mode flags are a [`Mode`] bitflag set. `CENTERED` and `REBOUND` are
//! mutually exclusive; [`ClockState::set_mode`] is the only way to change a
//! flag and it keeps that rule.

use bitflags::bitflags;
use chrono::{DateTime, Locale, Utc};
use tc_term::cell::{Attr, Pen};
use tc_term::color::CellColor;

use crate::options::{ClockOptions, DEFAULT_ACCENT};
use crate::time::{self, DigitSet, Meridiem, SampleSpec};

/// Rows in the frame, border included.
pub const FRAME_HEIGHT: u16 = 7;

/// Frame width showing hours and minutes.
pub const NORMAL_WIDTH: u16 = 35;

/// Frame width showing seconds too.
pub const SECONDS_WIDTH: u16 = 54;

/// Rows in the date window, border included.
pub const DATE_HEIGHT: u16 = 3;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

bitflags! {
    /// Independently togglable display and behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u16 {
        const SECONDS     = 1 << 0;
        const SCREENSAVER = 1 << 1;
        const TWELVE_HOUR = 1 << 2;
        const CENTERED    = 1 << 3;
        const REBOUND     = 1 << 4;
        const DATE        = 1 << 5;
        const UTC         = 1 << 6;
        const BOX         = 1 << 7;
        const NO_QUIT     = 1 << 8;
        const BOLD        = 1 << 9;
        const BLINK       = 1 << 10;
    }
}

impl Mode {
    /// The flags `options` starts the clock with. Centering wins over
    /// rebound.
    #[must_use]
    pub fn from_options(options: &ClockOptions) -> Self {
        let mut mode = Self::empty();
        mode.set(Self::SECONDS, options.show_seconds);
        mode.set(Self::SCREENSAVER, options.screensaver);
        mode.set(Self::TWELVE_HOUR, options.twelve_hour);
        mode.set(Self::CENTERED, options.centered);
        mode.set(Self::REBOUND, options.rebound && !options.centered);
        mode.set(Self::DATE, !options.hide_date);
        mode.set(Self::UTC, options.use_utc);
        mode.set(Self::BOX, options.show_box);
        mode.set(Self::NO_QUIT, options.no_quit);
        mode.set(Self::BOLD, options.bold);
        mode.set(Self::BLINK, options.blink_colon);
        mode
    }
}

// ---------------------------------------------------------------------------
// Position / Direction
// ---------------------------------------------------------------------------

/// Top-left corner of the frame, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

impl Position {
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// One axis of the bounce vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Up or left.
    Back,
    /// Down or right.
    Forward,
}

impl Direction {
    /// Move `value` one cell this way, stopping at zero.
    #[must_use]
    pub const fn step(self, value: u16) -> u16 {
        match self {
            Self::Back => value.saturating_sub(1),
            Self::Forward => value.saturating_add(1),
        }
    }
}

/// Direction of travel while rebounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Velocity {
    pub row: Direction,
    pub col: Direction,
}

impl Default for Velocity {
    fn default() -> Self {
        Self {
            row: Direction::Forward,
            col: Direction::Forward,
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What a painted cell is, which decides its colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Background on background: unlit glyph cells and erased areas.
    Blank,
    /// Background on accent: lit glyph cells and separators.
    Block,
    /// Accent on background: the date line.
    Text,
}

/// The pen for `role` with accent color `accent` (0–7) over the terminal
/// default background.
#[must_use]
pub fn pen(role: Role, accent: u8) -> Pen {
    let bg = CellColor::Default;
    let accent = CellColor::palette(accent).unwrap_or(CellColor::Default);
    match role {
        Role::Blank => Pen::new(bg, bg),
        Role::Block => Pen::new(bg, accent),
        Role::Text => Pen::new(accent, bg),
    }
}

// ---------------------------------------------------------------------------
// ClockState
// ---------------------------------------------------------------------------

/// Everything the clock knows between ticks.
#[derive(Debug, Clone)]
pub struct ClockState {
    pub position: Position,
    pub velocity: Velocity,
    mode: Mode,
    accent: u8,
    date_format: String,
    locale: Locale,

    pub digits: DigitSet,
    pub meridiem: Option<Meridiem>,
    pub date: String,
    pub previous_date: String,
    pub unix_seconds: i64,

    running: bool,
    reposition: bool,
}

impl ClockState {
    /// A stopped-in-place clock at (0, 0) heading down-right.
    #[must_use]
    pub fn new(options: &ClockOptions) -> Self {
        Self {
            position: Position::default(),
            velocity: Velocity::default(),
            mode: Mode::from_options(options),
            accent: if CellColor::palette(options.accent).is_some() {
                options.accent
            } else {
                DEFAULT_ACCENT
            },
            date_format: options.date_format.clone(),
            locale: options.locale,
            digits: DigitSet::default(),
            meridiem: None,
            date: String::new(),
            previous_date: String::new(),
            unix_seconds: 0,
            running: true,
            reposition: false,
        }
    }

    // -- Modes ---------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn has(&self, flag: Mode) -> bool {
        self.mode.contains(flag)
    }

    /// Turn `flag` on or off. Turning on `CENTERED` clears `REBOUND` and
    /// vice versa.
    pub fn set_mode(&mut self, flag: Mode, on: bool) {
        self.mode.set(flag, on);
        if on && flag.contains(Mode::CENTERED) {
            self.mode.remove(Mode::REBOUND);
        } else if on && flag.contains(Mode::REBOUND) {
            self.mode.remove(Mode::CENTERED);
        }
    }

    /// Flip `flag` and return its new value.
    pub fn toggle(&mut self, flag: Mode) -> bool {
        let on = !self.has(flag);
        self.set_mode(flag, on);
        on
    }

    // -- Geometry ------------------------------------------------------------

    /// Frame width for the current seconds setting.
    #[must_use]
    pub const fn width(&self) -> u16 {
        if self.mode.contains(Mode::SECONDS) {
            SECONDS_WIDTH
        } else {
            NORMAL_WIDTH
        }
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        FRAME_HEIGHT
    }

    // -- Colors --------------------------------------------------------------

    #[must_use]
    pub const fn accent(&self) -> u8 {
        self.accent
    }

    /// Switch the accent color. Returns `false` and keeps the old color
    /// outside 0–7.
    pub fn set_accent(&mut self, accent: u8) -> bool {
        if CellColor::palette(accent).is_none() {
            return false;
        }
        self.accent = accent;
        true
    }

    #[must_use]
    pub fn pen(&self, role: Role) -> Pen {
        pen(role, self.accent)
    }

    /// Attributes every glyph cell carries: blink in bold mode, none
    /// otherwise.
    #[must_use]
    pub const fn glyph_attrs(&self) -> Attr {
        if self.mode.contains(Mode::BOLD) {
            Attr::SLOW_BLINK
        } else {
            Attr::empty()
        }
    }

    // -- Time ----------------------------------------------------------------

    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Sample `now` into the digits and date line. The date shown before
    /// this call moves to `previous_date`.
    pub fn refresh_time(&mut self, now: DateTime<Utc>) -> DigitSet {
        let sample = time::sample(
            now,
            &SampleSpec {
                use_utc: self.has(Mode::UTC),
                twelve_hour: self.has(Mode::TWELVE_HOUR),
                format: &self.date_format,
                locale: self.locale,
            },
        );
        self.previous_date = std::mem::replace(&mut self.date, sample.date);
        self.digits = sample.digits;
        self.meridiem = sample.meridiem;
        self.unix_seconds = sample.unix_seconds;
        self.digits
    }

    // -- Run control ---------------------------------------------------------

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn stop(&mut self) {
        self.running = false;
    }

    /// Ask the next composition to move and repaint every window even if
    /// the layout looks unchanged.
    pub const fn request_reposition(&mut self) {
        self.reposition = true;
    }

    /// Consume a pending reposition request.
    pub const fn take_reposition(&mut self) -> bool {
        std::mem::replace(&mut self.reposition, false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
