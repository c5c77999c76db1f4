//! Disconnected (high-impedance) bus.
//!
//! Owns no lines. Default bus at start-up and the safe state between
//! transports.

use super::{Bus, BusError};

/// Byte read back from a floating, pulled-up line.
const IDLE_BYTE: u8 = 0xFF;

/// High-impedance bus: every operation is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct HizBus;

impl HizBus {
    pub const PROMPT: &'static str = "HiZ";

    pub const fn new() -> Self {
        Self
    }
}

impl Bus for HizBus {
    fn prompt(&self) -> &'static str {
        Self::PROMPT
    }

    fn init(&mut self) -> Result<(), BusError> {
        Ok(())
    }

    fn exit(&mut self) -> Result<(), BusError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), BusError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BusError> {
        Ok(())
    }

    fn xact(&mut self, _byte: u8) -> Result<u8, BusError> {
        Ok(IDLE_BYTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hiz_is_inert() {
        let mut bus = HizBus::new();

        assert_eq!(bus.prompt(), "HiZ");
        assert!(bus.init().is_ok());
        assert!(bus.start().is_ok());
        assert_eq!(bus.xact(0x00), Ok(0xFF));
        assert_eq!(bus.xact(0x5A), Ok(0xFF));
        assert!(bus.stop().is_ok());
        assert!(bus.exit().is_ok());
    }

    #[test]
    fn test_hiz_peek_reads_idle() {
        let mut bus = HizBus::new();
        assert_eq!(bus.peek(0x1234), Ok(0xFF));
    }
}
