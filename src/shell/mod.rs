//! Bus command shell.
//!
//! Turns one console line into bus operations. Whole-line directives are
//! matched first; anything else is scanned token by token. Zero heap
//! allocation: tokens are sub-slices of the caller's line.

pub mod directive;
pub mod error;
pub mod interpreter;
pub mod pin;
pub mod report;

pub use directive::{match_directive, Directive, DIRECTIVES};
pub use error::CommandError;
pub use interpreter::{split_repeat, Interpreter};
pub use pin::{parse_pin, PinAction, PinCommand};

use core::fmt::Write;

/// Seam between the line editor and whatever evaluates its lines.
pub trait Evaluate {
    /// Run one complete line (no terminator).
    fn evaluate(&mut self, line: &[u8], out: &mut dyn Write);

    /// Whether typed characters should be echoed back.
    fn echo(&self) -> bool;

    /// Prompt for the next line, without the trailing `> `.
    fn prompt(&self) -> &'static str;
}
