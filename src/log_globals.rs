//! Global log stream instance.
//!
//! One stream: the prober runs a single thread of control. Binaries wrap it
//! in a [`crate::logging::StreamLogger`] with their platform clock.

use crate::logging::LogStream;

/// Diagnostic log stream, drained by the console loop between lines.
pub static LOG_STREAM: LogStream = LogStream::new();
