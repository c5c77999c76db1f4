//! Shell error types

use crate::bus::BusError;

/// Failure of a single token or directive.
///
/// Errors never escape a line: the shell prints them and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// S01: Unrecognized token or directive argument
    BadCommand,
    /// S02: Pin command does not follow `p<port>.<bit>=<level>` / `p<port>.<bit>?`
    BadPin,
    /// S03: Pin command names a port this board does not have
    BadPort,
    /// S04: Peek address missing or malformed
    BadAddress,
    /// S05: The active bus reported a failure
    Bus(BusError),
}

impl CommandError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadCommand => "S01",
            Self::BadPin => "S02",
            Self::BadPort => "S03",
            Self::BadAddress => "S04",
            Self::Bus(_) => "S05",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::BadCommand => "unrecognized command",
            Self::BadPin => "malformed pin command",
            Self::BadPort => "no such port",
            Self::BadAddress => "bad address",
            Self::Bus(_) => "bus error",
        }
    }

    /// Text printed on the console. Existing tooling matches on it.
    pub fn console_text(&self) -> &'static str {
        match self {
            Self::Bus(_) => "BusErr",
            _ => "BadCmd",
        }
    }
}

impl From<BusError> for CommandError {
    fn from(e: BusError) -> Self {
        CommandError::Bus(e)
    }
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "{}: {}", self.code(), e),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}
