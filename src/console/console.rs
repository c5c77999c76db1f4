//! Main console struct: line editing in front of the shell

use core::fmt::Write;

use super::LineBuffer;
use crate::shell::report::NEWLINE;
use crate::shell::Evaluate;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Console state machine
pub struct Console {
    line: LineBuffer,
    /// Escape sequence state
    escape_state: EscapeState,
    /// Previous byte was CR (swallow the LF of a CRLF pair)
    after_cr: bool,
}

#[derive(Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    Escape,      // Got ESC
    Bracket,     // Got ESC [
}

impl Console {
    /// Create new console
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            escape_state: EscapeState::Normal,
            after_cr: false,
        }
    }

    /// Process a single input byte
    ///
    /// Returns `true` when a non-empty line was handed to the shell.
    pub fn process_byte(&mut self, byte: u8, shell: &mut dyn Evaluate, out: &mut dyn Write) -> bool {
        let after_cr = core::mem::replace(&mut self.after_cr, byte == b'\r');

        match self.escape_state {
            EscapeState::Normal => self.process_normal(byte, after_cr, shell, out),
            EscapeState::Escape => {
                self.escape_state = if byte == b'[' {
                    EscapeState::Bracket
                } else {
                    EscapeState::Normal
                };
                false
            }
            EscapeState::Bracket => {
                // Cursor keys and friends: nothing to navigate, drop them
                self.escape_state = EscapeState::Normal;
                false
            }
        }
    }

    fn process_normal(
        &mut self,
        byte: u8,
        after_cr: bool,
        shell: &mut dyn Evaluate,
        out: &mut dyn Write,
    ) -> bool {
        match byte {
            b'\n' if after_cr => false,

            // Enter
            b'\r' | b'\n' => {
                if shell.echo() {
                    let _ = out.write_str(NEWLINE);
                }

                let submitted = !self.line.is_empty();
                if submitted {
                    shell.evaluate(self.line.as_bytes(), out);
                    self.line.clear();
                }

                self.print_prompt(shell, out);
                submitted
            }

            // Backspace
            0x7F | 0x08 => {
                if self.line.backspace() && shell.echo() {
                    // Echo: backspace, space, backspace
                    let _ = out.write_str("\x08 \x08");
                }
                false
            }

            // Escape
            0x1B => {
                self.escape_state = EscapeState::Escape;
                false
            }

            // Ctrl+C
            0x03 => {
                let _ = write!(out, "^C{}", NEWLINE);
                self.line.clear();
                self.print_prompt(shell, out);
                false
            }

            // Printable character (tab is a token separator)
            b'\t' | 0x20..=0x7E => {
                if self.line.push(byte) && shell.echo() {
                    let _ = out.write_char(byte as char);
                }
                false
            }

            _ => false,
        }
    }

    /// Current (unsubmitted) line
    pub fn line(&self) -> &[u8] {
        self.line.as_bytes()
    }

    /// Print the prompt
    pub fn print_prompt(&self, shell: &dyn Evaluate, out: &mut dyn Write) {
        let _ = write!(out, "{}> ", shell.prompt());
    }

    /// Print welcome banner
    pub fn print_banner(&self, shell: &dyn Evaluate, out: &mut dyn Write) {
        let _ = write!(out, "{nl}{}{nl}", VERSION, nl = NEWLINE);
        let _ = write!(out, "Type 'spi' or 'hiz' to select a bus.{}", NEWLINE);
        self.print_prompt(shell, out);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
