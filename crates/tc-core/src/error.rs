//! Fatal clock errors.
//!
//! Only failures of the drawing surface end the tick loop. Bad configuration
//! values are ignored where they are parsed, and a date format that cannot be
//! rendered degrades to an empty date line; neither ever becomes a
//! `ClockError`.

use std::io;

use thiserror::Error;

/// Why the clock stopped abnormally.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("cannot initialize the terminal: {0}")]
    Init(#[source] io::Error),

    #[error("cannot reinitialize the terminal after a resize: {0}")]
    Reinit(#[source] io::Error),

    #[error("cannot draw to the terminal: {0}")]
    Draw(#[source] io::Error),

    #[error("cannot read input: {0}")]
    Input(#[source] io::Error),
}

impl ClockError {
    /// Process exit status for this error. Every variant is distinct and
    /// nonzero.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Init(_) => 1,
            Self::Reinit(_) => 2,
            Self::Draw(_) => 3,
            Self::Input(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn broken() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "gone")
    }

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let codes = [
            ClockError::Init(broken()).exit_code(),
            ClockError::Reinit(broken()).exit_code(),
            ClockError::Draw(broken()).exit_code(),
            ClockError::Input(broken()).exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3, 4]);
    }

    #[test]
    fn message_carries_cause() {
        let err = ClockError::Reinit(broken());
        assert_eq!(
            err.to_string(),
            "cannot reinitialize the terminal after a resize: gone"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
