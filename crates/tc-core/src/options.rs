//! Startup configuration.
//!
//! [`ClockOptions`] is the record the command line fills in before the clock
//! starts. Every field is public so callers and tests can build one with
//! struct-update syntax. Values coming from the user go through the setters,
//! which ignore anything outside its accepted range and keep the previous
//! value.
//!
//! | Field            | Range               | Default |
//! |------------------|---------------------|---------|
//! | `accent`         | 0–7                 | 2       |
//! | `date_format`    | up to 99 bytes      | `%F`    |
//! | `delay_secs`     | `0..100`            | 1       |
//! | `delay_nanos`    | `0..1_000_000_000`  | 0       |
//!
//! Every boolean defaults to `false`.

use std::time::Duration;

use chrono::Locale;

/// Longest date format kept, in bytes. Longer formats are cut on a char
/// boundary.
pub const FORMAT_MAX: usize = 99;

/// Exclusive upper bound for the delay in whole seconds.
pub const DELAY_SECS_MAX: i64 = 100;

/// Exclusive upper bound for the extra delay in nanoseconds.
pub const DELAY_NANOS_MAX: i64 = 1_000_000_000;

/// Accent colors are the eight basic ANSI colors.
pub const ACCENT_MAX: i64 = 7;

pub const DEFAULT_FORMAT: &str = "%F";
pub const DEFAULT_ACCENT: u8 = 2;

/// Everything the clock can be started with.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClockOptions {
    pub show_seconds: bool,
    pub screensaver: bool,
    pub show_box: bool,
    pub centered: bool,
    pub bold: bool,
    pub twelve_hour: bool,
    pub use_utc: bool,
    pub rebound: bool,
    pub no_quit: bool,
    pub hide_date: bool,
    pub blink_colon: bool,
    /// Palette index, 0–7.
    pub accent: u8,
    /// strftime-style format for the date line.
    pub date_format: String,
    pub delay_secs: u64,
    pub delay_nanos: u32,
    /// Locale for month and weekday names in the date line.
    pub locale: Locale,
}

impl Default for ClockOptions {
    fn default() -> Self {
        Self {
            show_seconds: false,
            screensaver: false,
            show_box: false,
            centered: false,
            bold: false,
            twelve_hour: false,
            use_utc: false,
            rebound: false,
            no_quit: false,
            hide_date: false,
            blink_colon: false,
            accent: DEFAULT_ACCENT,
            date_format: DEFAULT_FORMAT.to_string(),
            delay_secs: 1,
            delay_nanos: 0,
            locale: Locale::POSIX,
        }
    }
}

impl ClockOptions {
    /// The longest a tick waits for a key.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::new(self.delay_secs, self.delay_nanos)
    }

    /// Set the accent color. Returns `false` (and changes nothing) outside
    /// 0–7.
    pub fn set_accent(&mut self, value: i64) -> bool {
        match u8::try_from(value) {
            Ok(accent) if value <= ACCENT_MAX => {
                self.accent = accent;
                true
            }
            _ => false,
        }
    }

    /// Set the date format, truncated to [`FORMAT_MAX`] bytes.
    pub fn set_date_format(&mut self, format: &str) {
        self.date_format = truncate_format(format).to_string();
    }

    /// Set the whole-second delay. Returns `false` outside `0..100`.
    pub fn set_delay_secs(&mut self, value: i64) -> bool {
        if (0..DELAY_SECS_MAX).contains(&value) {
            #[allow(clippy::cast_sign_loss)]
            {
                self.delay_secs = value as u64;
            }
            true
        } else {
            false
        }
    }

    /// Set the extra nanosecond delay. Returns `false` outside
    /// `0..1_000_000_000`.
    pub fn set_delay_nanos(&mut self, value: i64) -> bool {
        match u32::try_from(value) {
            Ok(nanos) if value < DELAY_NANOS_MAX => {
                self.delay_nanos = nanos;
                true
            }
            _ => false,
        }
    }
}

/// The longest prefix of `format` that fits in [`FORMAT_MAX`] bytes without
/// splitting a character.
#[must_use]
pub fn truncate_format(format: &str) -> &str {
    if format.len() <= FORMAT_MAX {
        return format;
    }
    let mut end = FORMAT_MAX;
    while !format.is_char_boundary(end) {
        end -= 1;
    }
    &format[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let opts = ClockOptions::default();
        assert_eq!(opts.accent, 2);
        assert_eq!(opts.date_format, "%F");
        assert_eq!(opts.delay(), Duration::from_secs(1));
        assert!(!opts.show_seconds && !opts.hide_date && !opts.rebound);
    }

    #[test]
    fn accent_out_of_range_is_ignored() {
        let mut opts = ClockOptions::default();
        assert!(opts.set_accent(5));
        assert!(!opts.set_accent(8));
        assert!(!opts.set_accent(-1));
        assert_eq!(opts.accent, 5);
        assert!(opts.set_accent(0));
        assert_eq!(opts.accent, 0);
    }

    #[test]
    fn delays_respect_their_bounds() {
        let mut opts = ClockOptions::default();
        assert!(opts.set_delay_secs(0));
        assert!(opts.set_delay_nanos(250_000_000));
        assert!(!opts.set_delay_secs(100));
        assert!(!opts.set_delay_secs(-3));
        assert!(!opts.set_delay_nanos(1_000_000_000));
        assert!(!opts.set_delay_nanos(-1));
        assert_eq!(opts.delay(), Duration::from_millis(250));
        assert!(opts.set_delay_secs(99));
        assert_eq!(opts.delay(), Duration::new(99, 250_000_000));
    }

    #[test]
    fn long_format_is_truncated() {
        let mut opts = ClockOptions::default();
        opts.set_date_format(&"%d".repeat(60));
        assert_eq!(opts.date_format.len(), FORMAT_MAX);
    }

    #[test]
    fn truncation_keeps_char_boundaries() {
        // 'é' is two bytes; 49 of them end at byte 98, the 50th would cross 99.
        let format = "é".repeat(60);
        let cut = truncate_format(&format);
        assert_eq!(cut.len(), 98);
        assert_eq!(cut.chars().count(), 49);
    }

    #[test]
    fn short_format_is_untouched() {
        assert_eq!(truncate_format("%A %d %B"), "%A %d %B");
    }
}
