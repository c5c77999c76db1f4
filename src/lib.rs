//! # BusProber
//!
//! Firmware core of a hand-held serial bus prober.
//!
//! ## Architecture
//!
//! A console line flows one way:
//! - [`console::Console`] edits bytes into a line and hands it over
//! - [`shell::Interpreter`] matches directives or scans bus tokens
//! - [`bus::Bus`] implementations turn tokens into wire traffic
//!
//! Everything below the console is single-threaded and allocation-free.
//! Hardware comes in through `embedded-hal` traits and [`hal::DigitalPort`],
//! so the whole stack runs on the host against [`hal::sim`].

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod config;
pub mod console;
pub mod hal;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod number;
pub mod shell;

pub use bus::{Bus, BusError, BusKind, HizBus, SerialBus};
pub use config::ProbeConfig;
pub use console::Console;
pub use log_globals::LOG_STREAM;
pub use number::{parse_number, ParsedNumber};
pub use shell::{CommandError, Evaluate, Interpreter};
