//! Time source adapter.
//!
//! Turns an instant into what the clock displays: six digits, an optional
//! AM/PM marker, and a formatted date line. The instant comes from a
//! [`TimeSource`] so the tick loop can run against a scripted clock in tests.
//!
//! Date formatting uses strftime syntax through chrono's localized formatter.
//! A format chrono cannot render, or one that expands past [`DATE_MAX`]
//! bytes, yields an empty date part instead of an error.

use std::cell::Cell;
use std::fmt::{self, Write as _};

use chrono::{DateTime, Local, Locale, TimeDelta, TimeZone, Timelike, Utc};
use tracing::warn;

/// Longest formatted date kept, in bytes.
pub const DATE_MAX: usize = 127;

// ---------------------------------------------------------------------------
// TimeSource
// ---------------------------------------------------------------------------

/// Where "now" comes from.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that starts at a fixed instant and advances by `step` every time
/// it is read. A zero step makes it a frozen clock.
#[derive(Debug, Clone)]
pub struct FixedClock {
    next: Cell<DateTime<Utc>>,
    step: TimeDelta,
}

impl FixedClock {
    #[must_use]
    pub fn frozen(at: DateTime<Utc>) -> Self {
        Self {
            next: Cell::new(at),
            step: TimeDelta::zero(),
        }
    }

    #[must_use]
    pub const fn ticking(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

// ---------------------------------------------------------------------------
// Meridiem
// ---------------------------------------------------------------------------

/// Morning or afternoon, for twelve-hour display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// `Am` for hours 0–11, `Pm` for 12–23.
    #[must_use]
    pub const fn of_hour(hour: u32) -> Self {
        if hour < 12 { Self::Am } else { Self::Pm }
    }

    /// The text appended to the date line.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Am => " [AM]",
            Self::Pm => " [PM]",
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Am => f.write_str("AM"),
            Self::Pm => f.write_str("PM"),
        }
    }
}

/// The hour shown in twelve-hour mode: 1–12.
#[must_use]
pub const fn twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

// ---------------------------------------------------------------------------
// DigitSet
// ---------------------------------------------------------------------------

/// Tens and ones of the displayed hour, minute and second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigitSet {
    pub hour: [u8; 2],
    pub minute: [u8; 2],
    pub second: [u8; 2],
}

impl DigitSet {
    /// Split each field into tens and ones. Fields are taken modulo 100.
    #[must_use]
    pub const fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour: split(hour),
            minute: split(minute),
            second: split(second),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn split(value: u32) -> [u8; 2] {
    let value = value % 100;
    [(value / 10) as u8, (value % 10) as u8]
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// How an instant should be read.
#[derive(Debug, Clone, Copy)]
pub struct SampleSpec<'a> {
    pub use_utc: bool,
    pub twelve_hour: bool,
    pub format: &'a str,
    pub locale: Locale,
}

/// One reading of the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSample {
    pub digits: DigitSet,
    pub meridiem: Option<Meridiem>,
    /// Formatted date followed by the meridiem suffix, if any.
    pub date: String,
    /// Seconds since the Unix epoch; drives the blinking separator.
    pub unix_seconds: i64,
}

/// Read `now` in local time or UTC and decompose it.
#[must_use]
pub fn sample(now: DateTime<Utc>, spec: &SampleSpec<'_>) -> TimeSample {
    if spec.use_utc {
        sample_in(&now, spec)
    } else {
        sample_in(&now.with_timezone(&Local), spec)
    }
}

fn sample_in<Tz: TimeZone>(at: &DateTime<Tz>, spec: &SampleSpec<'_>) -> TimeSample
where
    Tz::Offset: fmt::Display,
{
    let hour = at.hour();
    let (shown_hour, meridiem) = if spec.twelve_hour {
        (twelve_hour(hour), Some(Meridiem::of_hour(hour)))
    } else {
        (hour, None)
    };

    let mut date = format_date(at, spec.format, spec.locale).unwrap_or_else(|| {
        warn!(format = spec.format, "date format could not be rendered");
        String::new()
    });
    if let Some(meridiem) = meridiem {
        date.push_str(meridiem.suffix());
    }

    TimeSample {
        digits: DigitSet::new(shown_hour, at.minute(), at.second()),
        meridiem,
        date,
        unix_seconds: at.timestamp(),
    }
}

/// strftime-style formatting. `None` when the format is invalid or the
/// result is longer than [`DATE_MAX`] bytes.
#[must_use]
pub fn format_date<Tz: TimeZone>(at: &DateTime<Tz>, format: &str, locale: Locale) -> Option<String>
where
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", at.format_localized(format, locale)).ok()?;
    (out.len() <= DATE_MAX).then_some(out)
}

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// The time locale named by `LC_ALL`, then `LC_TIME`, then `LANG`, the way
/// `setlocale(LC_TIME, "")` picks it. Unknown or unset falls back to POSIX.
#[must_use]
pub fn detect_locale() -> Locale {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    let name = var("LC_ALL").or_else(|| var("LC_TIME")).or_else(|| var("LANG"));
    name.map_or(Locale::POSIX, |name| parse_locale(&name))
}

/// Parse a POSIX locale name such as `de_DE.UTF-8` or `sr_RS@latin`.
#[must_use]
pub fn parse_locale(name: &str) -> Locale {
    let base = name.split('.').next().unwrap_or(name);
    if base.is_empty() || base == "C" || base == "POSIX" {
        return Locale::POSIX;
    }
    let modifier = name.split_once('@').map(|(_, m)| m);
    let base = base.split('@').next().unwrap_or(base);

    let full = modifier.map(|m| format!("{base}@{m}"));
    full.as_deref()
        .and_then(|n| Locale::try_from(n).ok())
        .or_else(|| Locale::try_from(base).ok())
        .unwrap_or(Locale::POSIX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    fn utc(twelve_hour: bool, format: &str) -> SampleSpec<'_> {
        SampleSpec {
            use_utc: true,
            twelve_hour,
            format,
            locale: Locale::POSIX,
        }
    }

    #[test]
    fn twenty_four_hour_digits() {
        let s = sample(at(21, 7, 45), &utc(false, "%F"));
        assert_eq!(
            s.digits,
            DigitSet {
                hour: [2, 1],
                minute: [0, 7],
                second: [4, 5]
            }
        );
        assert_eq!(s.meridiem, None);
        assert_eq!(s.date, "2024-01-01");
    }

    #[test]
    fn twelve_hour_afternoon() {
        let s = sample(at(21, 7, 45), &utc(true, "%F"));
        assert_eq!(s.digits.hour, [0, 9]);
        assert_eq!(s.meridiem, Some(Meridiem::Pm));
        assert_eq!(s.date, "2024-01-01 [PM]");
    }

    #[test]
    fn twelve_hour_edges() {
        assert_eq!(sample(at(0, 0, 0), &utc(true, "")).digits.hour, [1, 2]);
        assert_eq!(sample(at(0, 0, 0), &utc(true, "")).date, " [AM]");
        assert_eq!(sample(at(12, 0, 0), &utc(true, "")).digits.hour, [1, 2]);
        assert_eq!(sample(at(12, 0, 0), &utc(true, "")).meridiem, Some(Meridiem::Pm));
        assert_eq!(sample(at(11, 59, 59), &utc(true, "")).meridiem, Some(Meridiem::Am));
    }

    #[test]
    fn unix_seconds_follow_instant() {
        let s = sample(at(0, 0, 1), &utc(false, "%F"));
        assert_eq!(s.unix_seconds, 1_704_067_201);
    }

    #[test]
    fn invalid_format_degrades_to_empty_date() {
        assert_eq!(format_date(&at(1, 2, 3), "%Q", Locale::POSIX), None);
        let s = sample(at(13, 0, 0), &utc(true, "%Q"));
        assert_eq!(s.date, " [PM]");
        assert_eq!(s.digits.hour, [0, 1]);
    }

    #[test]
    fn oversized_date_is_dropped() {
        let format = "%F".repeat(20);
        assert_eq!(format_date(&at(1, 2, 3), &format, Locale::POSIX), None);
        let fits = "%F".repeat(11);
        assert_eq!(format_date(&at(1, 2, 3), &fits, Locale::POSIX).map(|d| d.len()), Some(110));
    }

    #[test]
    fn localized_month_names() {
        let date = format_date(&at(0, 0, 0), "%B", Locale::de_DE);
        assert_eq!(date.as_deref(), Some("Januar"));
    }

    #[test]
    fn locale_names() {
        assert_eq!(parse_locale("de_DE.UTF-8"), Locale::de_DE);
        assert_eq!(parse_locale("fr_FR"), Locale::fr_FR);
        assert_eq!(parse_locale("C"), Locale::POSIX);
        assert_eq!(parse_locale("C.UTF-8"), Locale::POSIX);
        assert_eq!(parse_locale("xx_YY"), Locale::POSIX);
        assert_eq!(parse_locale(""), Locale::POSIX);
    }

    #[test]
    fn fixed_clock_steps() {
        let clock = FixedClock::ticking(at(0, 0, 0), TimeDelta::seconds(2));
        assert_eq!(clock.now(), at(0, 0, 0));
        assert_eq!(clock.now(), at(0, 0, 2));
        let frozen = FixedClock::frozen(at(5, 0, 0));
        assert_eq!(frozen.now(), frozen.now());
    }

    proptest! {
        #[test]
        fn tens_and_ones_recompose(h in 0u32..24, m in 0u32..60, s in 0u32..60) {
            let d = sample(at(h, m, s), &utc(false, "")).digits;
            prop_assert_eq!(u32::from(d.hour[0]) * 10 + u32::from(d.hour[1]), h);
            prop_assert_eq!(u32::from(d.minute[0]) * 10 + u32::from(d.minute[1]), m);
            prop_assert_eq!(u32::from(d.second[0]) * 10 + u32::from(d.second[1]), s);
        }

        #[test]
        fn twelve_hour_range(h in 0u32..24) {
            let s = sample(at(h, 0, 0), &utc(true, ""));
            let shown = u32::from(s.digits.hour[0]) * 10 + u32::from(s.digits.hour[1]);
            prop_assert!((1..=12).contains(&shown));
            prop_assert_eq!(shown % 12, h % 12);
            let expected = if h < 12 { Meridiem::Am } else { Meridiem::Pm };
            prop_assert_eq!(s.meridiem, Some(expected));
        }
    }
}
