//! Synchronous serial (SPI master) bus.
//!
//! Wraps any `embedded-hal` SPI bus plus a chip-select pin. Clock rate and
//! mode are programmed when the peripheral driver is built; this layer tracks
//! readiness, drives the framing line, and hands every owned line back to
//! high impedance on `exit`.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error as _, SpiBus};

use super::{Bus, BusError};
use crate::hal::Detach;

/// Prompt shown while the serial bus is active.
pub const PROMPT: &str = "SPI";

/// SPI master with software chip-select (active low).
pub struct SerialBus<SPI, CS> {
    spi: SPI,
    cs: CS,
    ready: bool,
}

impl<SPI, CS> SerialBus<SPI, CS>
where
    SPI: SpiBus<u8> + Detach,
    CS: OutputPin + Detach,
{
    /// Wrap a configured SPI bus and its chip-select pin.
    ///
    /// The lines are left as they are until `init` claims them.
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self {
            spi,
            cs,
            ready: false,
        }
    }

    /// True between `init` and `exit`.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Borrow the underlying transport.
    pub fn spi(&self) -> &SPI {
        &self.spi
    }

    /// Borrow the chip-select pin.
    pub fn cs(&self) -> &CS {
        &self.cs
    }

    fn deassert(&mut self) -> Result<(), BusError> {
        self.cs.set_high().map_err(|_| BusError::Pin)
    }
}

impl<SPI, CS> Bus for SerialBus<SPI, CS>
where
    SPI: SpiBus<u8> + Detach,
    CS: OutputPin + Detach,
{
    fn prompt(&self) -> &'static str {
        PROMPT
    }

    fn init(&mut self) -> Result<(), BusError> {
        // Latch CS high before driving it so the target is never selected
        self.deassert()?;
        self.cs.attach().map_err(|_| BusError::Lines)?;
        self.spi.attach().map_err(|_| BusError::Lines)?;
        self.ready = true;
        log::debug!("spi: ready");
        Ok(())
    }

    fn exit(&mut self) -> Result<(), BusError> {
        self.ready = false;

        // Every step runs; the first failure is reported
        let flushed = self.spi.flush().map_err(|e| BusError::Transfer(e.kind()));
        let deasserted = self.deassert();
        let cs_released = self.cs.detach().map_err(|_| BusError::Lines);
        let spi_released = self.spi.detach().map_err(|_| BusError::Lines);

        log::debug!("spi: released");
        flushed.and(deasserted).and(cs_released).and(spi_released)
    }

    fn start(&mut self) -> Result<(), BusError> {
        if !self.ready {
            return Err(BusError::NotReady);
        }
        self.cs.set_low().map_err(|_| BusError::Pin)
    }

    fn stop(&mut self) -> Result<(), BusError> {
        if !self.ready {
            return Err(BusError::NotReady);
        }
        self.deassert()
    }

    fn xact(&mut self, byte: u8) -> Result<u8, BusError> {
        if !self.ready {
            return Err(BusError::NotReady);
        }

        let mut word = [byte];
        self.spi
            .transfer_in_place(&mut word)
            .map_err(|e| BusError::Transfer(e.kind()))?;
        // Wait for the last clock edge before reporting the byte
        self.spi
            .flush()
            .map_err(|e| BusError::Transfer(e.kind()))?;

        Ok(word[0])
    }
}
