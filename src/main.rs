// SPDX-License-Identifier: MIT
//
// tty-clock — a big block-digit clock for the terminal.
//
// This is the binary that wires the crates together:
//
//   tc-term → raw terminal, cell grid, windows, diff renderer, key input
//   tc-core → clock state, glyphs, geometry, composer, dispatcher, tick loop
//
// Each tick flows through:
//
//   rebound step → time refresh → compose → framebuffer → diff renderer
//   → terminal, then a bounded wait for a key, a resize or a signal
//
// Layout:
//
//   ┌───────────────────────────────────┐
//   │ ██████  ██    ██████  ██████      │  ← frame: 7 rows, 35 or 54 cols
//   │     ██  ██  ██    ██      ██      │
//   │ ██████  ██        ██  ██████      │
//   └──────────┌──────────────┐─────────┘
//              │  2024-01-01  │            ← date window, hangs below
//              └──────────────┘

mod cli;
mod telemetry;

use std::process;

use clap::Parser;
use tc_core::clock;
use tc_core::error::ClockError;
use tc_core::options::ClockOptions;
use tc_core::time::{SystemClock, detect_locale};
use tc_term::surface::Screen;
use tracing::error;

use crate::cli::Cli;

fn run(options: &ClockOptions) -> Result<(), ClockError> {
    let mut screen = Screen::open().map_err(ClockError::Init)?;
    let result = clock::run(&mut screen, options, &SystemClock);
    // Restore the terminal before anything is printed.
    drop(screen);
    result
}

fn real_main() -> i32 {
    let cli = Cli::parse();
    if cli.info {
        println!("{}", cli::info_text());
        return 0;
    }

    let _telemetry = telemetry::init_tracing("info");
    let mut options = cli.to_options();
    options.locale = detect_locale();

    match run(&options) {
        Ok(()) => 0,
        Err(err) => {
            error!(%err, "clock failed");
            eprintln!("tty-clock: {err}");
            err.exit_code()
        }
    }
}

fn main() {
    process::exit(real_main());
}
