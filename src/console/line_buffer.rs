//! Line buffer for console input

use heapless::Vec;

/// Maximum line length
pub const LINE_SIZE: usize = 64;

/// Line input buffer
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8, LINE_SIZE>,
}

impl LineBuffer {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Push a character. Returns `false` once the line is full.
    pub fn push(&mut self, c: u8) -> bool {
        self.buf.push(c).is_ok()
    }

    /// Remove last character. Returns `false` if the line was empty.
    pub fn backspace(&mut self) -> bool {
        self.buf.pop().is_some()
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}
