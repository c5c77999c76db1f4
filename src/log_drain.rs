//! Log output.
//!
//! Renders drained [`LogEntry`] values as text lines and pushes them to any
//! `core::fmt::Write` sink: the UART on the chip, stderr on the host.

use core::fmt::Write;

use crate::logging::{LogEntry, LogStream};

/// Format log entry to string.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, out: &mut dyn Write) -> core::fmt::Result {
    write!(
        out,
        "[{:10}] {}: {}\n",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.message()
    )
}

/// Write every pending entry of `stream` to `out`.
///
/// Reports (and resets) the dropped counter afterwards. Returns the number
/// of entries written.
pub fn drain<const N: usize>(stream: &LogStream<N>, out: &mut dyn Write) -> usize {
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let _ = format_log_entry(&entry, out);
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = write!(out, "[WARN] Dropped: {}\n", dropped);
        stream.reset_dropped();
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_format_log_entry() {
        let stream = LogStream::<4>::new();
        stream.push(1234567, Level::Info, b"Hello world");
        let entry = stream.drain().unwrap();

        let mut s = String::new();
        format_log_entry(&entry, &mut s).unwrap();

        assert!(s.contains("1234567"));
        assert!(s.contains("INFO"));
        assert!(s.ends_with("Hello world\n"));
    }

    #[test]
    fn test_drain_reports_dropped() {
        let stream = LogStream::<2>::new();
        stream.push(1, Level::Warn, b"one");
        stream.push(2, Level::Error, b"two");
        stream.push(3, Level::Error, b"lost");

        let mut s = String::new();
        assert_eq!(drain(&stream, &mut s), 2);

        assert!(s.contains("WARN: one"));
        assert!(s.contains("ERROR: two"));
        assert!(!s.contains("lost"));
        assert!(s.contains("Dropped: 1"));
        assert_eq!(stream.dropped(), 0);
    }
}
