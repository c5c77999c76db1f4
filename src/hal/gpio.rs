//! Register-style digital ports for pin commands.
//!
//! A port is eight bits wide with a direction register (1 = output), an
//! output latch and an input register, like the classic MCU `PxDIR`,
//! `PxOUT`, `PxIN` triple.

/// One eight-bit digital I/O port.
pub trait DigitalPort {
    /// Direction register, 1 = output.
    fn direction(&self) -> u8;

    fn set_direction(&mut self, dir: u8);

    /// Output latch.
    fn output(&self) -> u8;

    fn set_output(&mut self, out: u8);

    /// Pin levels as currently sampled.
    fn input(&self) -> u8;

    /// Configure the bits in `mask` as outputs and drive them.
    fn drive(&mut self, mask: u8, high: bool) {
        self.set_direction(self.direction() | mask);
        if high {
            self.set_output(self.output() | mask);
        } else {
            self.set_output(self.output() & !mask);
        }
    }

    /// Configure the bits in `mask` as inputs and sample them.
    ///
    /// Returns true if any masked bit reads high.
    fn sample(&mut self, mask: u8) -> bool {
        self.set_direction(self.direction() & !mask);
        self.input() & mask != 0
    }
}

/// Set of ports addressable by their single-digit number.
pub trait PortBank {
    /// Port for `id` (the numeric value of the port digit), if it exists.
    fn port(&mut self, id: u8) -> Option<&mut dyn DigitalPort>;
}

/// Lines that can be let go to high impedance and claimed back.
///
/// After `detach` nothing the implementor owns is driven; the lines float
/// until the next `attach`. Levels written while detached are latched and
/// appear on the line at `attach`.
pub trait Detach {
    type Fault: core::fmt::Debug;

    /// Start driving the owned lines again.
    fn attach(&mut self) -> Result<(), Self::Fault>;

    /// Stop driving the owned lines.
    fn detach(&mut self) -> Result<(), Self::Fault>;
}
