//! Pin command tests through the interpreter

mod common;

use bus_prober::hal::DigitalPort;
use common::{lines, run, shell_on, RecordingBus};

#[test]
fn test_write_then_read_back() {
    let mut shell = shell_on(RecordingBus::new(0x00));

    let out = run(&mut shell, "p1.3=1 p1.3?");

    assert_eq!(lines(&out), ["READ: 1"]);
    // Read switched the bit back to input
    let port = shell.ports().get(1).unwrap();
    assert_eq!(port.direction() & 0x08, 0);
    assert_eq!(port.output() & 0x08, 0x08);
}

#[test]
fn test_write_low_reads_low() {
    let mut shell = shell_on(RecordingBus::new(0x00));

    run(&mut shell, "p2.7=1");
    let out = run(&mut shell, "p2.7=0 p2.7?");

    assert_eq!(lines(&out), ["READ: 0"]);
}

#[test]
fn test_write_sets_direction_and_latch() {
    let mut shell = shell_on(RecordingBus::new(0x00));

    assert_eq!(run(&mut shell, "p1.0=1 p1.5=1"), "");

    let port = shell.ports().get(1).unwrap();
    assert_eq!(port.direction(), 0x21);
    assert_eq!(port.output(), 0x21);
    // Other port untouched
    assert_eq!(shell.ports().get(2).unwrap().direction(), 0);
}

#[test]
fn test_read_external_level() {
    let mut shell = shell_on(RecordingBus::new(0x00));
    shell.ports_mut().get_mut(2).unwrap().apply_external(0x04, true);

    assert_eq!(lines(&run(&mut shell, "p2.2?")), ["READ: 1"]);

    shell.ports_mut().get_mut(2).unwrap().apply_external(0x04, false);
    assert_eq!(lines(&run(&mut shell, "p2.2?")), ["READ: 0"]);
}

#[test]
fn test_pin_ops_do_not_touch_bus() {
    let mut shell = shell_on(RecordingBus::new(0x00));

    run(&mut shell, "[p1.1=1 p1.1?]");

    assert!(shell.serial().sent().is_empty());
}

#[test]
fn test_unknown_port_is_bad_command() {
    let mut shell = shell_on(RecordingBus::new(0x00));

    let out = run(&mut shell, "p9.1=1 p0.1? pX.1?");

    assert_eq!(lines(&out), ["BadCmd", "BadCmd", "BadCmd"]);
}

#[test]
fn test_malformed_pin_is_bad_command() {
    let mut shell = shell_on(RecordingBus::new(0x00));
    run(&mut shell, "]");

    let out = run(&mut shell, "p1.8=1 p1.3=2 p1 p1.3=1? p1.3 0x01");

    assert_eq!(
        lines(&out),
        ["BadCmd", "BadCmd", "BadCmd", "BadCmd", "BadCmd", "WRITE: 0x01"]
    );
}

#[test]
fn test_repeat_runs_pin_once() {
    let mut shell = shell_on(RecordingBus::new(0x00));

    let out = run(&mut shell, "p1.4=1:3 p1.4?:5");

    assert_eq!(lines(&out), ["READ: 1"]);
}

#[test]
fn test_zero_repeat_skips_pin() {
    let mut shell = shell_on(RecordingBus::new(0x00));

    let out = run(&mut shell, "p1.4=1:0 p1.4?:0 p9.9=9:0");

    assert_eq!(out, "");
    assert_eq!(shell.ports().get(1).unwrap().direction(), 0);
}
