//! Switchable bus abstraction.
//!
//! The shell issues the same five verbs against every transport. Exactly one
//! bus is active at a time; switching calls `exit` on the outgoing bus before
//! `init` on the incoming one.

pub mod hiz;
pub mod serial;

pub use hiz::HizBus;
pub use serial::SerialBus;

use embedded_hal::spi::ErrorKind;

/// Handle selecting the active bus variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusKind {
    /// Disconnected, all lines floating.
    Hiz,
    /// Synchronous serial (SPI master).
    Spi,
}

impl BusKind {
    /// Console prompt for this bus.
    pub fn prompt(self) -> &'static str {
        match self {
            BusKind::Hiz => HizBus::PROMPT,
            BusKind::Spi => serial::PROMPT,
        }
    }
}

impl Default for BusKind {
    fn default() -> Self {
        BusKind::Hiz
    }
}

/// Bus operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Transport released by `exit` and not re-initialised.
    NotReady,
    /// Framing line could not be driven.
    Pin,
    /// Peripheral reported a transfer error.
    Transfer(ErrorKind),
    /// Owned lines could not be claimed or released.
    Lines,
}

impl BusError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotReady => "B01",
            Self::Pin => "B02",
            Self::Transfer(_) => "B03",
            Self::Lines => "B04",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotReady => "bus not initialised",
            Self::Pin => "framing pin error",
            Self::Transfer(_) => "transfer failed",
            Self::Lines => "bus lines not claimed or released",
        }
    }
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transfer(kind) => write!(f, "{}: {} ({:?})", self.code(), self.message(), kind),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

/// Capability set every transport exposes to the shell.
pub trait Bus {
    /// Human-readable prompt.
    fn prompt(&self) -> &'static str;

    /// Bring the transport into its ready idle state.
    fn init(&mut self) -> Result<(), BusError>;

    /// Release owned lines to a floating state.
    fn exit(&mut self) -> Result<(), BusError>;

    /// Assert the framing (chip-select) signal.
    fn start(&mut self) -> Result<(), BusError>;

    /// Deassert the framing signal.
    fn stop(&mut self) -> Result<(), BusError>;

    /// Exchange one byte full-duplex, returning the byte clocked in.
    ///
    /// Usable outside a `start`/`stop` bracket. Blocks until complete.
    fn xact(&mut self, byte: u8) -> Result<u8, BusError>;

    /// Read one byte at `addr` in a single framed transaction.
    ///
    /// Sends the address (one byte, or two big-endian when it does not fit)
    /// and clocks a dummy `0xFF` to capture the reply.
    fn peek(&mut self, addr: u16) -> Result<u8, BusError> {
        self.start()?;
        let result = peek_frame(self, addr);
        // Always release the frame, even after a failed exchange
        self.stop()?;
        result
    }
}

fn peek_frame<B: Bus + ?Sized>(bus: &mut B, addr: u16) -> Result<u8, BusError> {
    if addr > 0xFF {
        bus.xact((addr >> 8) as u8)?;
    }
    bus.xact(addr as u8)?;
    bus.xact(0xFF)
}
