//! Module: config
//!
//! Purpose: Start-up configuration for BusProber.
//!
//! Plain values, copied where needed at construction. Nothing is persisted:
//! every boot starts from [`ProbeConfig::DEFAULT`] unless the binary
//! overrides fields.

use embedded_hal::spi::{Mode, MODE_0};
use log::LevelFilter;

use crate::bus::BusKind;

/// Prober configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Bus made active at start-up.
    pub default_bus: BusKind,

    /// Report the byte clocked in alongside every write.
    pub duplex: bool,

    /// Echo typed characters back to the terminal.
    pub echo: bool,

    /// Dummy byte clocked out to pump a read.
    pub read_filler: u8,

    /// Pause per `&` token, in microseconds.
    pub delay_us: u32,

    /// SPI clock rate in Hz.
    pub spi_clock_hz: u32,

    /// SPI clock polarity and phase.
    pub spi_mode: Mode,

    /// Console UART baud rate.
    pub uart_baud: u32,

    /// Maximum level recorded by the diagnostic logger.
    pub log_level: LevelFilter,
}

impl ProbeConfig {
    pub const DEFAULT: Self = Self {
        default_bus: BusKind::Hiz,
        duplex: true,
        echo: true,
        read_filler: 0xFF,
        delay_us: 1,
        spi_clock_hz: 1_000_000,
        spi_mode: MODE_0,
        uart_baud: 115_200,
        log_level: LevelFilter::Info,
    };
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
