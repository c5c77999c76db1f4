//! Diagnostic logging for BusProber.
//!
//! # Architecture
//!
//! ```text
//! shell / bus            LogStream            console idle loop
//! ───────────            ─────────            ─────────────────
//!
//! log::info!() ────────▶ [L0][L1][L2] ──────▶ UART / stderr
//! StreamLogger            lock-free           log_drain::drain
//! non-blocking            MPMC queue
//! ```
//!
//! # Rules
//!
//! - Diagnostics go through the `log` facade, never onto the console
//!   protocol stream
//! - Pushing never blocks; entries are dropped (and counted) when full
//! - Messages longer than [`MAX_MSG_LEN`] are truncated

use core::fmt::Write;
use core::sync::atomic::{AtomicU32, Ordering};

use heapless::mpmc::MpMcQueue;
use heapless::String;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: u64,
    pub level: Level,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: Level::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text. Truncation may split a UTF-8 sequence; the tail is cut.
    pub fn message(&self) -> &str {
        let bytes = &self.msg[..self.len as usize];
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log queue (many producers, many consumers).
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    queue: MpMcQueue<LogEntry, N>,
    dropped: AtomicU32,
}

impl<const N: usize> LogStream<N> {
    /// Create a new empty log stream. `N` must be a power of 2.
    pub const fn new() -> Self {
        Self {
            queue: MpMcQueue::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push an entry. Returns `false` if it was dropped (queue full).
    pub fn push(&self, timestamp_us: u64, level: Level, msg: &[u8]) -> bool {
        let len = msg.len().min(MAX_MSG_LEN);
        let mut entry = LogEntry {
            timestamp_us,
            level,
            len: len as u8,
            ..LogEntry::EMPTY
        };
        entry.msg[..len].copy_from_slice(&msg[..len]);

        if self.queue.enqueue(entry).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Take the oldest entry, if any.
    pub fn drain(&self) -> Option<LogEntry> {
        self.queue.dequeue()
    }

    /// Count of dropped messages.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// `log` backend writing into a [`LogStream`].
///
/// Timestamps come from the clock function handed over at construction, so
/// the same logger runs on the chip (hardware timer) and on the host.
pub struct StreamLogger<const N: usize = LOG_BUFFER_SIZE> {
    stream: &'static LogStream<N>,
    clock: fn() -> u64,
}

impl<const N: usize> StreamLogger<N> {
    pub const fn new(stream: &'static LogStream<N>, clock: fn() -> u64) -> Self {
        Self { stream, clock }
    }
}

impl<const N: usize> Log for StreamLogger<N> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut msg: String<MAX_MSG_LEN> = String::new();
        // A full buffer ends formatting early; keep what fitted.
        let _ = write!(msg, "{}", record.args());
        self.stream.push((self.clock)(), record.level(), msg.as_bytes());
    }

    fn flush(&self) {}
}

/// Install `logger` as the global `log` backend.
///
/// Fails if a logger was already installed.
pub fn init<const N: usize>(
    logger: &'static StreamLogger<N>,
    level: LevelFilter,
) -> Result<(), log::SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}
