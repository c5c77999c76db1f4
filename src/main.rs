//! BusProber - Main entry point
//!
//! On the chip (ESP-IDF):
//! 1. Bring up the console UART, the log UART and the SPI master
//! 2. Build the shell on top of them
//! 3. Feed console bytes to the line editor forever
//!
//! On the host the same shell runs over simulated hardware, stdin and stdout.

use bus_prober::console::Console;
use bus_prober::logging::StreamLogger;
use bus_prober::{log_drain, logging, Evaluate, ProbeConfig, LOG_STREAM};

#[cfg(target_os = "espidf")]
fn main() {
    if let Err(e) = firmware::run() {
        log::error!("startup failed: {:?}", e);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    host::run();
}

/// Pass console bytes to the line editor, draining logs after each line.
fn pump<I, F>(
    input: I,
    console: &mut Console,
    shell: &mut dyn Evaluate,
    out: &mut dyn core::fmt::Write,
    mut on_line: F,
) where
    I: IntoIterator<Item = u8>,
    F: FnMut(),
{
    for byte in input {
        if console.process_byte(byte, shell, out) {
            on_line();
        }
    }
}

#[cfg(target_os = "espidf")]
mod firmware {
    use super::*;

    use bus_prober::hal::{Detach, DigitalPort, PortBank};
    use bus_prober::{Interpreter, SerialBus};
    use embedded_hal::digital::{self, OutputPin};
    use embedded_hal::spi::{self, SpiBus};
    use esp_idf_svc::hal::delay::Ets;
    use esp_idf_svc::hal::gpio::{AnyIOPin, Gpio10, Gpio11, Gpio12, Gpio13, Pin};
    use esp_idf_svc::hal::peripheral::Peripheral;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::spi::{config::Config as SpiConfig, SpiBusDriver, SpiDriver, SpiDriverConfig, SPI2};
    use esp_idf_svc::hal::uart::{config::Config as UartConfig, UartDriver, UartTxDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::{self as esp_idf_sys, esp, esp_err_t, EspError};

    static LOGGER: StreamLogger = StreamLogger::new(&LOG_STREAM, timestamp_us);

    fn timestamp_us() -> u64 {
        unsafe { esp_idf_sys::esp_timer_get_time() as u64 }
    }

    /// Log a failed pad call. The pad keeps its previous state.
    fn check(what: &str, pin: i32, err: esp_err_t) {
        if let Some(e) = EspError::from(err) {
            log::warn!("gpio{}: {} failed: {}", pin, what, e);
        }
    }

    /// Input, no pull: the pad floats.
    fn float_pad(pin: i32) -> Result<(), EspError> {
        // SAFETY: callers own `pin` and no driver is attached to it
        unsafe {
            esp!(esp_idf_sys::gpio_set_direction(pin, esp_idf_sys::gpio_mode_t_GPIO_MODE_INPUT))?;
            esp!(esp_idf_sys::gpio_set_pull_mode(pin, esp_idf_sys::gpio_pull_mode_t_GPIO_FLOATING))?;
        }
        Ok(())
    }

    /// Pads of `pins` whose bit differs between `old` and `new`, with the new bit.
    fn changed(pins: &[i32; 8], old: u8, new: u8) -> impl Iterator<Item = (i32, bool)> + '_ {
        pins.iter().enumerate().filter_map(move |(bit, &pin)| {
            let mask = 1u8 << bit;
            ((old ^ new) & mask != 0).then_some((pin, new & mask != 0))
        })
    }

    /// Failure on a bus pad or on the SPI peripheral.
    #[derive(Debug)]
    enum PadError {
        Esp(EspError),
        /// SPI pads are floating; `init` claims them back.
        Detached,
    }

    impl From<EspError> for PadError {
        fn from(e: EspError) -> Self {
            PadError::Esp(e)
        }
    }

    impl digital::Error for PadError {
        fn kind(&self) -> digital::ErrorKind {
            digital::ErrorKind::Other
        }
    }

    impl spi::Error for PadError {
        fn kind(&self) -> spi::ErrorKind {
            spi::ErrorKind::Other
        }
    }

    /// Chip-select pad, floating until attached.
    struct CsLine {
        pad: Gpio10,
    }

    impl CsLine {
        fn new(pad: Gpio10) -> Result<Self, EspError> {
            esp!(unsafe { esp_idf_sys::gpio_reset_pin(pad.pin()) })?;
            float_pad(pad.pin())?;
            Ok(Self { pad })
        }

        fn set_level(&mut self, high: bool) -> Result<(), PadError> {
            esp!(unsafe { esp_idf_sys::gpio_set_level(self.pad.pin(), u32::from(high)) })?;
            Ok(())
        }
    }

    impl digital::ErrorType for CsLine {
        type Error = PadError;
    }

    impl OutputPin for CsLine {
        fn set_low(&mut self) -> Result<(), PadError> {
            self.set_level(false)
        }

        fn set_high(&mut self) -> Result<(), PadError> {
            self.set_level(true)
        }
    }

    impl Detach for CsLine {
        type Fault = PadError;

        fn attach(&mut self) -> Result<(), PadError> {
            esp!(unsafe {
                esp_idf_sys::gpio_set_direction(self.pad.pin(), esp_idf_sys::gpio_mode_t_GPIO_MODE_OUTPUT)
            })?;
            Ok(())
        }

        fn detach(&mut self) -> Result<(), PadError> {
            float_pad(self.pad.pin())?;
            Ok(())
        }
    }

    type SpiBusOnSpi2 = SpiBusDriver<'static, SpiDriver<'static>>;

    /// SPI2 master whose pads can be handed back.
    ///
    /// The driver exists only while attached. Dropping it frees the bus,
    /// then the pads are floated.
    struct SpiLines {
        spi: SPI2,
        sclk: Gpio12,
        sdo: Gpio11,
        sdi: Gpio13,
        config: SpiConfig,
        driver: Option<SpiBusOnSpi2>,
    }

    impl SpiLines {
        fn new(spi: SPI2, sclk: Gpio12, sdo: Gpio11, sdi: Gpio13, config: SpiConfig) -> Self {
            Self { spi, sclk, sdo, sdi, config, driver: None }
        }

        fn driver(&mut self) -> Result<&mut SpiBusOnSpi2, PadError> {
            self.driver.as_mut().ok_or(PadError::Detached)
        }
    }

    impl spi::ErrorType for SpiLines {
        type Error = PadError;
    }

    impl SpiBus<u8> for SpiLines {
        fn read(&mut self, words: &mut [u8]) -> Result<(), PadError> {
            self.driver()?.read(words)?;
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), PadError> {
            self.driver()?.write(words)?;
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), PadError> {
            self.driver()?.transfer(read, write)?;
            Ok(())
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), PadError> {
            self.driver()?.transfer_in_place(words)?;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), PadError> {
            // Nothing can be in flight without a driver
            if let Some(driver) = self.driver.as_mut() {
                driver.flush()?;
            }
            Ok(())
        }
    }

    impl Detach for SpiLines {
        type Fault = PadError;

        fn attach(&mut self) -> Result<(), PadError> {
            if self.driver.is_some() {
                return Ok(());
            }
            // SAFETY: the clones live only inside the driver, which is
            // dropped before the next attach
            let driver = unsafe {
                SpiDriver::new(
                    self.spi.clone_unchecked(),
                    self.sclk.clone_unchecked(),
                    self.sdo.clone_unchecked(),
                    Some(self.sdi.clone_unchecked()),
                    &SpiDriverConfig::new(),
                )?
            };
            self.driver = Some(SpiBusDriver::new(driver, &self.config)?);
            Ok(())
        }

        fn detach(&mut self) -> Result<(), PadError> {
            self.driver = None;
            for pin in [self.sclk.pin(), self.sdo.pin(), self.sdi.pin()] {
                float_pad(pin)?;
            }
            Ok(())
        }
    }

    /// Eight GPIOs presented as one register-style port.
    ///
    /// Direction and output latch are shadowed; levels are sampled live.
    /// Only pads whose bit changes are reprogrammed.
    struct GpioPort {
        pins: [i32; 8],
        dir: u8,
        out: u8,
    }

    impl GpioPort {
        /// Reset every pad to a plain GPIO input with its latch low.
        fn new(pins: [i32; 8]) -> Self {
            for &pin in &pins {
                // SAFETY: pins listed in the port table are not claimed by any driver
                check("reset", pin, unsafe { esp_idf_sys::gpio_reset_pin(pin) });
                check("set_level", pin, unsafe { esp_idf_sys::gpio_set_level(pin, 0) });
            }
            Self { pins, dir: 0, out: 0 }
        }
    }

    impl DigitalPort for GpioPort {
        fn direction(&self) -> u8 {
            self.dir
        }

        fn set_direction(&mut self, dir: u8) {
            for (pin, output) in changed(&self.pins, self.dir, dir) {
                let mode = if output {
                    esp_idf_sys::gpio_mode_t_GPIO_MODE_INPUT_OUTPUT
                } else {
                    esp_idf_sys::gpio_mode_t_GPIO_MODE_INPUT
                };
                check("set_direction", pin, unsafe { esp_idf_sys::gpio_set_direction(pin, mode) });
            }
            self.dir = dir;
        }

        fn output(&self) -> u8 {
            self.out
        }

        fn set_output(&mut self, out: u8) {
            for (pin, high) in changed(&self.pins, self.out, out) {
                check("set_level", pin, unsafe { esp_idf_sys::gpio_set_level(pin, u32::from(high)) });
            }
            self.out = out;
        }

        fn input(&self) -> u8 {
            self.pins.iter().enumerate().fold(0, |acc, (bit, &pin)| {
                let high = unsafe { esp_idf_sys::gpio_get_level(pin) } != 0;
                acc | (u8::from(high) << bit)
            })
        }
    }

    /// P1 and P2, on pins free of the SPI and UART drivers.
    struct Ports {
        p1: GpioPort,
        p2: GpioPort,
    }

    impl PortBank for Ports {
        fn port(&mut self, id: u8) -> Option<&mut dyn DigitalPort> {
            match id {
                1 => Some(&mut self.p1),
                2 => Some(&mut self.p2),
                _ => None,
            }
        }
    }

    struct UartOut<'a, 'd>(&'a UartDriver<'d>);

    impl core::fmt::Write for UartOut<'_, '_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
        }
    }

    struct LogOut<'a, 'd>(&'a mut UartTxDriver<'d>);

    impl core::fmt::Write for LogOut<'_, '_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
        }
    }

    pub fn run() -> Result<(), EspError> {
        esp_idf_sys::link_patches();

        let config = ProbeConfig::default();
        let _ = logging::init(&LOGGER, config.log_level);

        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        // Console on UART0 (USB bridge), logs on UART1 TX (GPIO6)
        let console_uart = UartDriver::new(
            peripherals.uart0,
            pins.gpio43,
            pins.gpio44,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &UartConfig::default().baudrate(Hertz(config.uart_baud)),
        )?;
        let mut log_uart = UartTxDriver::new(
            peripherals.uart1,
            pins.gpio6,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &UartConfig::default().baudrate(Hertz(115_200)),
        )?;

        // SPI2: SCLK 12, SDO 11, SDI 13, CS 10. Floating until `spi`.
        let spi = SpiLines::new(
            peripherals.spi2,
            pins.gpio12,
            pins.gpio11,
            pins.gpio13,
            SpiConfig::new()
                .baudrate(Hertz(config.spi_clock_hz))
                .data_mode(config.spi_mode),
        );
        let cs = CsLine::new(pins.gpio10)?;

        let ports = Ports {
            p1: GpioPort::new([1, 2, 3, 4, 5, 7, 8, 9]),
            p2: GpioPort::new([14, 15, 16, 17, 18, 21, 38, 39]),
        };

        let mut shell = match Interpreter::new(SerialBus::new(spi, cs), ports, Ets, &config) {
            Ok(shell) => shell,
            Err(e) => {
                log::error!("shell: {}", e);
                return Ok(());
            }
        };

        let mut console = Console::new();
        let mut out = UartOut(&console_uart);
        console.print_banner(&shell, &mut out);

        let mut buf = [0u8; 32];
        loop {
            // Short timeout so logs still drain while the console is idle
            let n = console_uart.read(&mut buf, 10).unwrap_or(0);
            pump(buf[..n].iter().copied(), &mut console, &mut shell, &mut out, || {});
            log_drain::drain(&LOG_STREAM, &mut LogOut(&mut log_uart));
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use super::*;

    use std::io::{Read, Write};
    use std::sync::OnceLock;
    use std::time::Instant;

    use bus_prober::hal::sim::{LoopbackSpi, SimDelay, SimPin, SimPortBank};
    use bus_prober::{Interpreter, SerialBus};

    static LOGGER: StreamLogger = StreamLogger::new(&LOG_STREAM, timestamp_us);

    fn timestamp_us() -> u64 {
        static START: OnceLock<Instant> = OnceLock::new();
        START.get_or_init(Instant::now).elapsed().as_micros() as u64
    }

    /// `fmt::Write` over an `io::Write`, flushing on every call.
    struct IoOut<W: Write>(W);

    impl<W: Write> core::fmt::Write for IoOut<W> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            self.0.write_all(s.as_bytes()).map_err(|_| core::fmt::Error)?;
            self.0.flush().map_err(|_| core::fmt::Error)
        }
    }

    pub fn run() {
        let mut config = ProbeConfig::default();
        // The terminal already echoes what is typed
        config.echo = false;
        let _ = logging::init(&LOGGER, config.log_level);

        let serial = SerialBus::new(LoopbackSpi::new(), SimPin::new());
        let mut shell = match Interpreter::new(serial, SimPortBank::<2>::new(), SimDelay::new(), &config) {
            Ok(shell) => shell,
            Err(e) => {
                eprintln!("shell: {}", e);
                return;
            }
        };

        let mut console = Console::new();
        let mut out = IoOut(std::io::stdout());
        let mut err = IoOut(std::io::stderr());
        console.print_banner(&shell, &mut out);

        let input = std::io::stdin().lock().bytes().map_while(Result::ok);
        pump(input, &mut console, &mut shell, &mut out, || {
            log_drain::drain(&LOG_STREAM, &mut err);
        });
        log_drain::drain(&LOG_STREAM, &mut err);
    }
}
