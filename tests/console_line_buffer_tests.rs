//! Line buffer tests

use bus_prober::console::line_buffer::{LineBuffer, LINE_SIZE};

#[test]
fn test_line_buffer_push() {
    let mut buf = LineBuffer::new();

    for &c in b"0x3F" {
        assert!(buf.push(c));
    }

    assert_eq!(buf.as_bytes(), b"0x3F");
}

#[test]
fn test_line_buffer_backspace() {
    let mut buf = LineBuffer::new();

    for &c in b"spi" {
        buf.push(c);
    }
    assert!(buf.backspace());
    assert!(buf.backspace());

    assert_eq!(buf.as_bytes(), b"s");
}

#[test]
fn test_line_buffer_backspace_empty() {
    let mut buf = LineBuffer::new();

    assert!(!buf.backspace()); // should not panic
    assert!(buf.is_empty());
}

#[test]
fn test_line_buffer_clear() {
    let mut buf = LineBuffer::new();

    for &c in b"r:4" {
        buf.push(c);
    }
    buf.clear();

    assert_eq!(buf.as_bytes(), b"");
    assert!(buf.is_empty());
}

#[test]
fn test_line_buffer_overflow() {
    let mut buf = LineBuffer::new();

    // Push 70 characters (buffer is 64)
    for i in 0..70u8 {
        buf.push(b'a' + (i % 26));
    }

    // Should be truncated to 64
    assert_eq!(buf.len(), LINE_SIZE);
    assert!(!buf.push(b'z'));
}
