//! Pin commands
//!
//! `p<port>.<bit>=<level>` drives a bit as output, `p<port>.<bit>?` turns it
//! into an input and reports its level. Port and bit are single digits.

use core::fmt::Write;

use crate::hal::PortBank;

use super::{report, CommandError};

/// What to do with the addressed bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    /// Configure as output and drive the level.
    Write(bool),
    /// Configure as input and report the level.
    Read,
}

/// Decoded pin command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinCommand {
    /// Port number (value of the port digit).
    pub port: u8,
    /// Single-bit mask for the addressed bit.
    pub mask: u8,
    pub action: PinAction,
}

/// Decode a pin token.
pub fn parse_pin(token: &[u8]) -> Result<PinCommand, CommandError> {
    let (port, bit, action) = match *token {
        [b'p', port, b'.', bit, b'=', level] => {
            let high = match level {
                b'0' => false,
                b'1' => true,
                _ => return Err(CommandError::BadPin),
            };
            (port, bit, PinAction::Write(high))
        }
        [b'p', port, b'.', bit, b'?'] => (port, bit, PinAction::Read),
        _ => return Err(CommandError::BadPin),
    };

    if !port.is_ascii_digit() {
        return Err(CommandError::BadPort);
    }
    if !(b'0'..=b'7').contains(&bit) {
        return Err(CommandError::BadPin);
    }

    Ok(PinCommand {
        port: port - b'0',
        mask: 1 << (bit - b'0'),
        action,
    })
}

/// Apply a decoded pin command to the port bank.
pub fn execute_pin(
    cmd: &PinCommand,
    ports: &mut dyn PortBank,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let port = ports.port(cmd.port).ok_or(CommandError::BadPort)?;

    match cmd.action {
        PinAction::Write(high) => port.drive(cmd.mask, high),
        PinAction::Read => {
            let high = port.sample(cmd.mask);
            report::read_level(out, high);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimPortBank;
    use crate::hal::DigitalPort;

    #[test]
    fn test_parse_write() {
        assert_eq!(
            parse_pin(b"p1.3=1"),
            Ok(PinCommand { port: 1, mask: 0x08, action: PinAction::Write(true) })
        );
        assert_eq!(
            parse_pin(b"p2.0=0"),
            Ok(PinCommand { port: 2, mask: 0x01, action: PinAction::Write(false) })
        );
    }

    #[test]
    fn test_parse_read() {
        assert_eq!(
            parse_pin(b"p1.7?"),
            Ok(PinCommand { port: 1, mask: 0x80, action: PinAction::Read })
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_pin(b"p1-3=1"), Err(CommandError::BadPin));
        assert_eq!(parse_pin(b"p1.3!"), Err(CommandError::BadPin));
        assert_eq!(parse_pin(b"p1.8=1"), Err(CommandError::BadPin));
        assert_eq!(parse_pin(b"p1.3=2"), Err(CommandError::BadPin));
        assert_eq!(parse_pin(b"p1.3=1x"), Err(CommandError::BadPin));
        assert_eq!(parse_pin(b"pA.3=1"), Err(CommandError::BadPort));
        assert_eq!(parse_pin(b"p"), Err(CommandError::BadPin));
    }

    #[test]
    fn test_execute_unknown_port() {
        let mut bank = SimPortBank::<2>::new();
        let mut out = String::new();
        let cmd = parse_pin(b"p3.1?").unwrap();

        assert_eq!(execute_pin(&cmd, &mut bank, &mut out), Err(CommandError::BadPort));
        assert!(out.is_empty());
    }

    #[test]
    fn test_execute_write_sets_registers() {
        let mut bank = SimPortBank::<2>::new();
        let mut out = String::new();

        execute_pin(&parse_pin(b"p2.5=1").unwrap(), &mut bank, &mut out).unwrap();

        let port = bank.get(2).unwrap();
        assert_eq!(port.direction(), 0x20);
        assert_eq!(port.output(), 0x20);
        assert!(out.is_empty());
    }

    #[test]
    fn test_execute_read_reports_level() {
        let mut bank = SimPortBank::<2>::new();
        let mut out = String::new();

        execute_pin(&parse_pin(b"p1.3=1").unwrap(), &mut bank, &mut out).unwrap();
        execute_pin(&parse_pin(b"p1.3?").unwrap(), &mut bank, &mut out).unwrap();

        assert_eq!(out, "READ: 1\r\n");
        assert_eq!(bank.get(1).unwrap().direction(), 0x00);
    }
}
