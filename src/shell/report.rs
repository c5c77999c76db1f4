//! Console protocol text.
//!
//! Terminal-side tooling parses these lines, so the wording is fixed.

use core::fmt::Write;

use super::CommandError;

/// Line terminator for every report.
pub const NEWLINE: &str = "\r\n";

pub fn write_byte(out: &mut dyn Write, byte: u8) {
    let _ = write!(out, "WRITE: 0x{:02X}{}", byte, NEWLINE);
}

pub fn read_byte(out: &mut dyn Write, byte: u8) {
    let _ = write!(out, "READ: 0x{:02X}{}", byte, NEWLINE);
}

/// Pin level read: `READ: 1` / `READ: 0`.
pub fn read_level(out: &mut dyn Write, high: bool) {
    let _ = write!(out, "READ: {}{}", if high { '1' } else { '0' }, NEWLINE);
}

pub fn frame_enabled(out: &mut dyn Write) {
    let _ = write!(out, "CS ENABLED{}", NEWLINE);
}

pub fn frame_disabled(out: &mut dyn Write) {
    let _ = write!(out, "CS DISABLED{}", NEWLINE);
}

pub fn error(out: &mut dyn Write, err: &CommandError) {
    let _ = write!(out, "{}{}", err.console_text(), NEWLINE);
}
