//! Host-side stand-ins for the hardware collaborators.
//!
//! Used by the host build of the prober and by tests. Everything here is
//! deterministic and allocation-free.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::{ErrorType as SpiErrorType, SpiBus};
use heapless::Vec;

use super::gpio::{Detach, DigitalPort, PortBank};

/// Bytes of outgoing traffic remembered by [`LoopbackSpi`].
pub const SPI_LOG_SIZE: usize = 64;

/// SPI transport with MOSI wired to MISO.
///
/// Every byte sent comes straight back, unless a fixed reply is set. Starts
/// detached, like pads fresh out of reset.
#[derive(Debug, Default)]
pub struct LoopbackSpi {
    sent: Vec<u8, SPI_LOG_SIZE>,
    reply: Option<u8>,
    attached: bool,
}

impl LoopbackSpi {
    pub const fn new() -> Self {
        Self {
            sent: Vec::new(),
            reply: None,
            attached: false,
        }
    }

    /// Answer every exchange with `byte` instead of echoing.
    pub fn with_reply(byte: u8) -> Self {
        Self {
            reply: Some(byte),
            ..Self::new()
        }
    }

    /// Outgoing bytes, oldest first. Stops recording when full.
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// True while SCLK and SDO are driven.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn exchange(&mut self, out: u8) -> u8 {
        let _ = self.sent.push(out);
        self.reply.unwrap_or(out)
    }
}

impl SpiErrorType for LoopbackSpi {
    type Error = Infallible;
}

impl SpiBus<u8> for LoopbackSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(0x00);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.exchange(word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let len = read.len().max(write.len());
        for i in 0..len {
            let incoming = self.exchange(write.get(i).copied().unwrap_or(0x00));
            if let Some(slot) = read.get_mut(i) {
                *slot = incoming;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(*word);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Detach for LoopbackSpi {
    type Fault = Infallible;

    fn attach(&mut self) -> Result<(), Infallible> {
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), Infallible> {
        self.attached = false;
        Ok(())
    }
}

/// Output pin that remembers its level and counts edges.
///
/// Starts floating. The latched level only reaches the line while the pin
/// is attached.
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
    driven: bool,
    edges: u32,
}

impl SimPin {
    pub const fn new() -> Self {
        Self {
            high: false,
            driven: false,
            edges: 0,
        }
    }

    /// Latched output level.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// False while the pin floats.
    pub fn is_driven(&self) -> bool {
        self.driven
    }

    /// Level changes seen so far.
    pub fn edges(&self) -> u32 {
        self.edges
    }

    fn set(&mut self, high: bool) {
        if self.high != high {
            self.edges += 1;
        }
        self.high = high;
    }
}

impl PinErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

impl Detach for SimPin {
    type Fault = Infallible;

    fn attach(&mut self) -> Result<(), Infallible> {
        self.driven = true;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), Infallible> {
        self.driven = false;
        Ok(())
    }
}

/// Register-backed port with pull resistors enabled.
///
/// Input bits not driven from outside follow their output latch (the latch
/// selects pull-up or pull-down), so a level written as output reads back
/// after switching the bit to input.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimPort {
    dir: u8,
    out: u8,
    /// Bits forced by something outside the port.
    driven: u8,
    /// Levels of the driven bits.
    external: u8,
}

impl SimPort {
    pub const fn new() -> Self {
        Self {
            dir: 0,
            out: 0,
            driven: 0,
            external: 0,
        }
    }

    /// Force the bits in `mask` to `high` from outside.
    pub fn apply_external(&mut self, mask: u8, high: bool) {
        self.driven |= mask;
        if high {
            self.external |= mask;
        } else {
            self.external &= !mask;
        }
    }

    /// Stop forcing the bits in `mask`.
    pub fn release_external(&mut self, mask: u8) {
        self.driven &= !mask;
    }
}

impl DigitalPort for SimPort {
    fn direction(&self) -> u8 {
        self.dir
    }

    fn set_direction(&mut self, dir: u8) {
        self.dir = dir;
    }

    fn output(&self) -> u8 {
        self.out
    }

    fn set_output(&mut self, out: u8) {
        self.out = out;
    }

    fn input(&self) -> u8 {
        let inputs = !self.dir;
        (self.dir & self.out)
            | (inputs & self.driven & self.external)
            | (inputs & !self.driven & self.out)
    }
}

/// `N` simulated ports numbered from 1.
#[derive(Debug, Clone, Copy)]
pub struct SimPortBank<const N: usize> {
    ports: [SimPort; N],
}

impl<const N: usize> SimPortBank<N> {
    pub const fn new() -> Self {
        Self {
            ports: [SimPort::new(); N],
        }
    }

    /// Inspect port `id`.
    pub fn get(&self, id: u8) -> Option<&SimPort> {
        self.ports.get((id as usize).checked_sub(1)?)
    }

    /// Mutable access for test setup.
    pub fn get_mut(&mut self, id: u8) -> Option<&mut SimPort> {
        self.ports.get_mut((id as usize).checked_sub(1)?)
    }
}

impl<const N: usize> Default for SimPortBank<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PortBank for SimPortBank<N> {
    fn port(&mut self, id: u8) -> Option<&mut dyn DigitalPort> {
        self.get_mut(id).map(|p| p as &mut dyn DigitalPort)
    }
}

/// Delay that only adds up the requested time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimDelay {
    elapsed_ns: u64,
}

impl SimDelay {
    pub const fn new() -> Self {
        Self { elapsed_ns: 0 }
    }

    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}
