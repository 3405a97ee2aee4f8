// SPDX-License-Identifier: MIT
//
// Command line.
//
// Single-letter flags, one per option, so the usual invocations
// (`tty-clock -sc -C 4`, `tty-clock -f "%A %d %B"`) keep working. Numeric
// values are parsed wide and range-checked by `ClockOptions`: a value out of
// range is logged and ignored, leaving the default in place.

use clap::{ArgAction, Parser};
use tc_core::options::ClockOptions;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "tty-clock", version, about = "A big block-digit clock for the terminal")]
#[command(disable_version_flag = true)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Show seconds
    #[arg(short = 's')]
    pub seconds: bool,

    /// Screensaver mode: any key quits
    #[arg(short = 'S')]
    pub screensaver: bool,

    /// Draw a box around the clock
    #[arg(short = 'x')]
    pub show_box: bool,

    /// Keep the clock centered
    #[arg(short = 'c')]
    pub centered: bool,

    /// Accent color, 0 to 7
    #[arg(short = 'C', value_name = "0-7", allow_negative_numbers = true)]
    pub color: Option<i64>,

    /// Bold: blinking digits and a bold date
    #[arg(short = 'b')]
    pub bold: bool,

    /// Twelve-hour clock
    #[arg(short = 't')]
    pub twelve_hour: bool,

    /// Use UTC instead of local time
    #[arg(short = 'u')]
    pub utc: bool,

    /// Bounce the clock around the screen
    #[arg(short = 'r')]
    pub rebound: bool,

    /// Date format, strftime syntax
    #[arg(short = 'f', value_name = "FORMAT")]
    pub format: Option<String>,

    /// Keys other than Ctrl-C do not quit
    #[arg(short = 'n')]
    pub no_quit: bool,

    /// Hide the date
    #[arg(short = 'D')]
    pub hide_date: bool,

    /// Blink the colon
    #[arg(short = 'B')]
    pub blink: bool,

    /// Delay between redraws in seconds, 0 to 99
    #[arg(short = 'd', value_name = "SECONDS", allow_negative_numbers = true)]
    pub delay: Option<i64>,

    /// Extra delay between redraws in nanoseconds
    #[arg(short = 'a', value_name = "NANOSECONDS", allow_negative_numbers = true)]
    pub nsdelay: Option<i64>,

    /// Print version
    #[arg(short = 'v', action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Print program information
    #[arg(short = 'i')]
    pub info: bool,
}

impl Cli {
    /// The clock configuration these flags describe.
    pub fn to_options(&self) -> ClockOptions {
        let mut options = ClockOptions {
            show_seconds: self.seconds,
            screensaver: self.screensaver,
            show_box: self.show_box,
            centered: self.centered,
            bold: self.bold,
            twelve_hour: self.twelve_hour,
            use_utc: self.utc,
            rebound: self.rebound,
            no_quit: self.no_quit,
            hide_date: self.hide_date,
            blink_colon: self.blink,
            ..ClockOptions::default()
        };

        if let Some(color) = self.color {
            if !options.set_accent(color) {
                warn!(color, "accent color out of range, ignored");
            }
        }
        if let Some(format) = &self.format {
            options.set_date_format(format);
        }
        if let Some(delay) = self.delay {
            if !options.set_delay_secs(delay) {
                warn!(delay, "delay out of range, ignored");
            }
        }
        if let Some(nsdelay) = self.nsdelay {
            if !options.set_delay_nanos(nsdelay) {
                warn!(nsdelay, "nanosecond delay out of range, ignored");
            }
        }
        options
    }
}

/// What `-i` prints.
pub fn info_text() -> String {
    format!(
        "{} {}: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION")
    )
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn options(args: &[&str]) -> ClockOptions {
        let argv = std::iter::once("tty-clock").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().to_options()
    }

    #[test]
    fn no_flags_gives_defaults() {
        assert_eq!(options(&[]), ClockOptions::default());
    }

    #[test]
    fn combined_short_flags() {
        let opts = options(&["-sxcbtu"]);
        assert!(opts.show_seconds && opts.show_box && opts.centered);
        assert!(opts.bold && opts.twelve_hour && opts.use_utc);
        assert!(!opts.rebound);
    }

    #[test]
    fn color_in_and_out_of_range() {
        assert_eq!(options(&["-C", "4"]).accent, 4);
        assert_eq!(options(&["-C", "9"]).accent, 2);
        assert_eq!(options(&["-C", "-1"]).accent, 2);
    }

    #[test]
    fn delays() {
        assert_eq!(options(&["-d", "3", "-a", "500"]).delay(), Duration::new(3, 500));
        assert_eq!(options(&["-d", "100"]).delay(), Duration::from_secs(1));
        assert_eq!(options(&["-a", "1000000000"]).delay(), Duration::from_secs(1));
    }

    #[test]
    fn format_and_toggles() {
        let opts = options(&["-f", "%A %d %B", "-DBnSr"]);
        assert_eq!(opts.date_format, "%A %d %B");
        assert!(opts.hide_date && opts.blink_colon && opts.no_quit);
        assert!(opts.screensaver && opts.rebound);
    }

    #[test]
    fn version_flag_exits_with_version() {
        let err = Cli::try_parse_from(["tty-clock", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn info_flag() {
        let cli = Cli::try_parse_from(["tty-clock", "-i"]).unwrap();
        assert!(cli.info);
        assert!(info_text().starts_with("tty-clock "));
    }

    #[test]
    fn non_numeric_color_is_a_usage_error() {
        let err = Cli::try_parse_from(["tty-clock", "-C", "green"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn tty_device_flag_is_not_accepted() {
        let err = Cli::try_parse_from(["tty-clock", "-T", "/dev/tty2"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
