//! Hardware Abstraction Layer for BusProber.
//!
//! Thin traits over the things the shell pokes at. Business logic stays in
//! core modules, HAL is just I/O. SPI transport, chip-select and delays come
//! straight from `embedded-hal`; only the register-style port needs its own
//! trait, plus [`Detach`] for handing owned lines back to high impedance.

pub mod gpio;
pub mod sim;

pub use gpio::{Detach, DigitalPort, PortBank};
