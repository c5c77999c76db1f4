//! Shared test fixtures: a recording bus and shell builders.

#![allow(dead_code)]

use bus_prober::bus::{Bus, BusError, BusKind};
use bus_prober::hal::sim::{SimDelay, SimPortBank};
use bus_prober::{Interpreter, ProbeConfig};
use embedded_hal::spi::ErrorKind;

/// One call made on a [`RecordingBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Init,
    Exit,
    Start,
    Stop,
    Xact(u8),
}

/// Bus that logs every call and answers exchanges with a fixed byte.
#[derive(Debug)]
pub struct RecordingBus {
    pub ops: Vec<Op>,
    pub reply: u8,
    /// Exchanges that succeed before every further one fails.
    pub fail_after: Option<usize>,
    /// Control operations that always fail (still recorded).
    pub failing: Vec<Op>,
    xacts: usize,
}

impl RecordingBus {
    pub fn new(reply: u8) -> Self {
        Self {
            ops: Vec::new(),
            reply,
            fail_after: None,
            failing: Vec::new(),
            xacts: 0,
        }
    }

    pub fn failing_after(reply: u8, ok: usize) -> Self {
        Self {
            fail_after: Some(ok),
            ..Self::new(reply)
        }
    }

    /// Bus whose `op` (one of init, exit, start, stop) always fails.
    pub fn failing_on(reply: u8, op: Op) -> Self {
        Self {
            failing: vec![op],
            ..Self::new(reply)
        }
    }

    fn record(&mut self, op: Op) -> Result<(), BusError> {
        self.ops.push(op);
        if self.failing.contains(&op) {
            return Err(BusError::Pin);
        }
        Ok(())
    }

    /// Bytes sent through `xact`, in order.
    pub fn sent(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Xact(b) => Some(*b),
                _ => None,
            })
            .collect()
    }
}

impl Bus for RecordingBus {
    fn prompt(&self) -> &'static str {
        "REC"
    }

    fn init(&mut self) -> Result<(), BusError> {
        self.record(Op::Init)
    }

    fn exit(&mut self) -> Result<(), BusError> {
        self.record(Op::Exit)
    }

    fn start(&mut self) -> Result<(), BusError> {
        self.record(Op::Start)
    }

    fn stop(&mut self) -> Result<(), BusError> {
        self.record(Op::Stop)
    }

    fn xact(&mut self, byte: u8) -> Result<u8, BusError> {
        if let Some(limit) = self.fail_after {
            if self.xacts >= limit {
                return Err(BusError::Transfer(ErrorKind::Other));
            }
        }
        self.xacts += 1;
        self.ops.push(Op::Xact(byte));
        Ok(self.reply)
    }
}

pub type TestShell = Interpreter<RecordingBus, SimPortBank<2>, SimDelay>;

/// Shell with `bus` already active as the serial bus.
pub fn shell_on(bus: RecordingBus) -> TestShell {
    let config = ProbeConfig {
        default_bus: BusKind::Spi,
        ..ProbeConfig::default()
    };
    Interpreter::new(bus, SimPortBank::new(), SimDelay::new(), &config).unwrap()
}

/// Shell in the power-on state (HiZ active).
pub fn hiz_shell(bus: RecordingBus) -> TestShell {
    Interpreter::new(bus, SimPortBank::new(), SimDelay::new(), &ProbeConfig::default()).unwrap()
}

/// Evaluate `line` and return everything printed.
pub fn run(shell: &mut TestShell, line: &str) -> String {
    let mut out = String::new();
    shell.evaluate(line.as_bytes(), &mut out);
    out
}

/// Printed lines without terminators.
pub fn lines(out: &str) -> Vec<&str> {
    out.lines().collect()
}
