//! Command interpreter.
//!
//! Single pass over the line with two states: between tokens and inside a
//! token. Framing characters act on their own; everything else forms a token
//! that is resolved as soon as a delimiter (or end of line) closes it.
//!
//! # Token forms
//!
//! - `<number>` writes a byte, `r`/`R` reads one, `&` pauses
//! - any of those with `:<count>` repeats it
//! - `p<port>.<bit>=<level>` / `p<port>.<bit>?` are pin commands
//! - `[` / `{` assert chip-select (`{` also turns duplex on)
//! - `]` / `}` deassert it and turn duplex off
//! - `#` ends the line

use core::fmt::Write;

use embedded_hal::delay::DelayNs;

use crate::bus::{Bus, BusKind, HizBus};
use crate::config::ProbeConfig;
use crate::hal::PortBank;
use crate::number::parse_exact;

use super::directive::{self, Directive};
use super::pin::{execute_pin, parse_pin};
use super::{report, CommandError, Evaluate};

/// Scanner state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scan {
    Searching,
    InToken { start: usize },
}

/// Resolved token, before repetition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Write(u8),
    Read,
    Delay,
    Pin(&'a [u8]),
    Unknown,
}

/// Characters that close a token. The delimiter itself is then rescanned.
#[inline]
fn ends_token(ch: u8) -> bool {
    matches!(ch, b'{' | b' ' | b'\t' | b',' | b'[' | b']' | b'}' | b'#')
}

/// Split a `:<count>` suffix off a token.
///
/// Only a `:` after the first character counts. When the count does not
/// parse, the command is neutralised: the token is still truncated and the
/// count is 0. Without a suffix the count is 1.
pub fn split_repeat(token: &[u8]) -> (&[u8], u16) {
    let colon = token
        .iter()
        .skip(1)
        .position(|&c| c == b':')
        .map(|i| i + 1);

    match colon {
        Some(i) => (&token[..i], parse_exact(&token[i + 1..]).unwrap_or(0)),
        None => (token, 1),
    }
}

fn classify(token: &[u8]) -> Token<'_> {
    if let Some(value) = parse_exact(token) {
        return Token::Write(value as u8);
    }
    match token {
        b"r" | b"R" => Token::Read,
        b"&" => Token::Delay,
        [b'p', ..] => Token::Pin(token),
        _ => Token::Unknown,
    }
}

/// Interpreter context: active bus, port bank and the line-to-line flags.
pub struct Interpreter<S, P, D> {
    hiz: HizBus,
    serial: S,
    ports: P,
    delay: D,
    active: BusKind,
    duplex: bool,
    echo: bool,
    read_filler: u8,
    delay_us: u32,
}

impl<S, P, D> Interpreter<S, P, D>
where
    S: Bus,
    P: PortBank,
    D: DelayNs,
{
    /// Build the interpreter and bring up the configured default bus.
    pub fn new(serial: S, ports: P, delay: D, config: &ProbeConfig) -> Result<Self, CommandError> {
        let mut shell = Self {
            hiz: HizBus::new(),
            serial,
            ports,
            delay,
            active: config.default_bus,
            duplex: config.duplex,
            echo: config.echo,
            read_filler: config.read_filler,
            delay_us: config.delay_us,
        };

        shell.bus().init()?;
        log::info!("shell: {} bus active", shell.active.prompt());

        Ok(shell)
    }

    /// Evaluate one line, writing results to `out`.
    pub fn evaluate(&mut self, line: &[u8], out: &mut dyn Write) {
        if let Some((directive, rest)) = directive::match_directive(line) {
            if let Err(e) = self.run_directive(directive, rest, out) {
                self.fail(&e, out);
            }
            return;
        }

        self.scan(line, out);
    }

    /// Currently selected bus.
    pub fn active_bus(&self) -> BusKind {
        self.active
    }

    pub fn duplex(&self) -> bool {
        self.duplex
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    /// Borrow the serial bus.
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Borrow the port bank.
    pub fn ports(&self) -> &P {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    /// Borrow the delay provider.
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Switch buses: `exit` the current one, then `init` the new one.
    ///
    /// The new bus stays selected even if either step fails.
    pub fn select_bus(&mut self, kind: BusKind) -> Result<(), CommandError> {
        let exited = self.bus().exit();
        self.active = kind;
        let started = self.bus().init();

        log::info!("shell: {} bus active", kind.prompt());

        exited?;
        started?;
        Ok(())
    }

    fn bus(&mut self) -> &mut dyn Bus {
        match self.active {
            BusKind::Hiz => &mut self.hiz,
            BusKind::Spi => &mut self.serial,
        }
    }

    fn run_directive(
        &mut self,
        directive: Directive,
        rest: &[u8],
        out: &mut dyn Write,
    ) -> Result<(), CommandError> {
        match directive {
            Directive::EchoOn => self.echo = true,
            Directive::EchoOff => self.echo = false,
            Directive::Select(kind) => self.select_bus(kind)?,
            Directive::Peek => {
                let addr = directive::parse_address(rest)?;
                let byte = self.bus().peek(addr)?;
                report::read_byte(out, byte);
            }
        }
        Ok(())
    }

    fn scan(&mut self, line: &[u8], out: &mut dyn Write) {
        let mut state = Scan::Searching;
        let mut pos = 0;

        while pos < line.len() {
            let ch = line[pos];

            match state {
                Scan::Searching => {
                    match ch {
                        b'#' => return,
                        b' ' | b'\t' | b',' => {}
                        b'{' => {
                            self.force_duplex();
                            self.frame_start(out);
                        }
                        b'[' => self.frame_start(out),
                        b'}' | b']' => {
                            self.frame_stop(out);
                            self.duplex = false;
                        }
                        _ => state = Scan::InToken { start: pos },
                    }
                    pos += 1;
                }
                Scan::InToken { start } => {
                    if ends_token(ch) {
                        self.resolve(&line[start..pos], out);
                        state = Scan::Searching;
                    } else {
                        pos += 1;
                    }
                }
            }
        }

        if let Scan::InToken { start } = state {
            self.resolve(&line[start..], out);
        }
    }

    fn force_duplex(&mut self) {
        self.duplex = true;
    }

    fn frame_start(&mut self, out: &mut dyn Write) {
        match self.bus().start() {
            Ok(()) => report::frame_enabled(out),
            Err(e) => self.fail(&CommandError::from(e), out),
        }
    }

    fn frame_stop(&mut self, out: &mut dyn Write) {
        match self.bus().stop() {
            Ok(()) => report::frame_disabled(out),
            Err(e) => self.fail(&CommandError::from(e), out),
        }
    }

    /// Run one token. Errors stay local to it.
    fn resolve(&mut self, token: &[u8], out: &mut dyn Write) {
        if let Err(e) = self.run_token(token, out) {
            self.fail(&e, out);
        }
    }

    fn run_token(&mut self, token: &[u8], out: &mut dyn Write) -> Result<(), CommandError> {
        let (token, repeat) = split_repeat(token);

        match classify(token) {
            Token::Write(byte) => {
                for _ in 0..repeat {
                    self.write_byte(byte, out)?;
                }
            }
            Token::Read => {
                for _ in 0..repeat {
                    self.read_byte(out)?;
                }
            }
            Token::Delay => {
                for _ in 0..repeat {
                    self.delay.delay_us(self.delay_us);
                }
            }
            // Repeat count is accepted but a pin command runs at most once
            Token::Pin(token) if repeat > 0 => {
                let cmd = parse_pin(token)?;
                execute_pin(&cmd, &mut self.ports, out)?;
            }
            Token::Pin(_) => {}
            Token::Unknown => return Err(CommandError::BadCommand),
        }

        Ok(())
    }

    fn write_byte(&mut self, byte: u8, out: &mut dyn Write) -> Result<(), CommandError> {
        let incoming = self.bus().xact(byte)?;
        report::write_byte(out, byte);
        if self.duplex {
            report::read_byte(out, incoming);
        }
        Ok(())
    }

    fn read_byte(&mut self, out: &mut dyn Write) -> Result<(), CommandError> {
        let filler = self.read_filler;
        let incoming = self.bus().xact(filler)?;
        report::read_byte(out, incoming);
        Ok(())
    }

    fn fail(&self, err: &CommandError, out: &mut dyn Write) {
        match err {
            CommandError::Bus(_) => log::warn!("{} bus: {}", self.active.prompt(), err),
            _ => log::debug!("{}", err),
        }
        report::error(out, err);
    }
}

impl<S, P, D> Evaluate for Interpreter<S, P, D>
where
    S: Bus,
    P: PortBank,
    D: DelayNs,
{
    fn evaluate(&mut self, line: &[u8], out: &mut dyn Write) {
        Interpreter::evaluate(self, line, out);
    }

    fn echo(&self) -> bool {
        self.echo
    }

    fn prompt(&self) -> &'static str {
        self.active.prompt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::{LoopbackSpi, SimDelay, SimPin, SimPortBank};
    use crate::bus::SerialBus;

    type SimShell = Interpreter<SerialBus<LoopbackSpi, SimPin>, SimPortBank<2>, SimDelay>;

    fn make_shell() -> SimShell {
        let serial = SerialBus::new(LoopbackSpi::new(), SimPin::new());
        Interpreter::new(serial, SimPortBank::new(), SimDelay::new(), &ProbeConfig::default()).unwrap()
    }

    fn run(shell: &mut SimShell, line: &str) -> String {
        let mut out = String::new();
        shell.evaluate(line.as_bytes(), &mut out);
        out
    }

    #[test]
    fn test_split_repeat() {
        assert_eq!(split_repeat(b"5:3"), (&b"5"[..], 3));
        assert_eq!(split_repeat(b"r:0x10"), (&b"r"[..], 16));
        assert_eq!(split_repeat(b"0x20"), (&b"0x20"[..], 1));
        assert_eq!(split_repeat(b"r:q"), (&b"r"[..], 0));
        assert_eq!(split_repeat(b"r:"), (&b"r"[..], 0));
        assert_eq!(split_repeat(b"5:3x"), (&b"5"[..], 0));
        // Leading colon is not a suffix
        assert_eq!(split_repeat(b":3"), (&b":3"[..], 1));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(b"0x3F"), Token::Write(0x3F));
        assert_eq!(classify(b"300"), Token::Write(300u16 as u8));
        assert_eq!(classify(b"r"), Token::Read);
        assert_eq!(classify(b"R"), Token::Read);
        assert_eq!(classify(b"&"), Token::Delay);
        assert_eq!(classify(b"p1.0?"), Token::Pin(b"p1.0?"));
        assert_eq!(classify(b"rr"), Token::Unknown);
        assert_eq!(classify(b"5x"), Token::Unknown);
        assert_eq!(classify(b"0x"), Token::Unknown);
    }

    #[test]
    fn test_starts_on_hiz() {
        let shell = make_shell();
        assert_eq!(shell.active_bus(), BusKind::Hiz);
        assert_eq!(Evaluate::prompt(&shell), "HiZ");
        assert!(shell.duplex());
    }

    #[test]
    fn test_spi_directive_initialises_serial_bus() {
        let mut shell = make_shell();
        assert_eq!(run(&mut shell, "spi"), "");

        assert_eq!(shell.active_bus(), BusKind::Spi);
        assert!(shell.serial().is_ready());
        assert!(shell.serial().cs().is_high());
    }

    #[test]
    fn test_hiz_directive_releases_serial_bus() {
        let mut shell = make_shell();
        run(&mut shell, "spi");
        run(&mut shell, "hiz");

        assert_eq!(shell.active_bus(), BusKind::Hiz);
        assert!(!shell.serial().is_ready());
        assert!(!shell.serial().cs().is_driven());
        assert!(!shell.serial().spi().is_attached());
    }

    #[test]
    fn test_delay_token_repeats() {
        let mut shell = make_shell();
        assert_eq!(run(&mut shell, "&:5 &"), "");
        assert_eq!(shell.delay().elapsed_ns(), 6_000);
    }

    #[test]
    fn test_brace_closes_token_then_frames() {
        let mut shell = make_shell();
        run(&mut shell, "spi");
        run(&mut shell, "]");
        assert!(!shell.duplex());

        let out = run(&mut shell, "0x01{0x02}");
        assert_eq!(
            out,
            "WRITE: 0x01\r\nCS ENABLED\r\nWRITE: 0x02\r\nREAD: 0x02\r\nCS DISABLED\r\n"
        );
        assert_eq!(shell.serial().spi().sent(), &[0x01, 0x02]);
    }

    #[test]
    fn test_peek_on_serial_bus() {
        let mut shell = make_shell();
        run(&mut shell, "spi");

        assert_eq!(run(&mut shell, "peek 0x42"), "READ: 0xFF\r\n");
        assert_eq!(shell.serial().spi().sent(), &[0x42, 0xFF]);
        assert!(shell.serial().cs().is_high());
    }

    #[test]
    fn test_peek_bad_address() {
        let mut shell = make_shell();
        assert_eq!(run(&mut shell, "peek zz"), "BadCmd\r\n");
    }
}
