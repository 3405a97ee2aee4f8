// SPDX-License-Identifier: MIT
//
// Logging setup.
//
// The clock owns the whole screen, so logs never go to the terminal. When
// `TTY_CLOCK_LOG` names a file, events are appended to it through a
// non-blocking writer, filtered by `RUST_LOG` (default `info`). Without it
// no subscriber is installed and every event is dropped.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the log file.
pub const LOG_FILE_VAR: &str = "TTY_CLOCK_LOG";

/// Keeps the log writer alive. Dropping it flushes pending events.
#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

impl TelemetryGuard {
    const fn disabled() -> Self {
        Self { _guard: None }
    }
}

/// Install the global subscriber if logging was asked for.
pub fn init_tracing(default_level: &str) -> TelemetryGuard {
    let Some(path) = log_file_path_from_env() else {
        return TelemetryGuard::disabled();
    };

    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("tty-clock: cannot open log file {}: {err}", path.display());
            return TelemetryGuard::disabled();
        }
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (writer, guard) = tracing_appender::non_blocking(file);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return TelemetryGuard::disabled();
    }

    TelemetryGuard { _guard: Some(guard) }
}

fn log_file_path_from_env() -> Option<PathBuf> {
    std::env::var_os(LOG_FILE_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
