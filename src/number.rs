//! Numeric literal parser.
//!
//! Accepts `0b` (binary), `0x` (hex) or plain decimal literals. Pure function
//! over an immutable slice: nothing is written back into the caller's line.
//!
//! Overflow is not checked; the accumulator wraps like unsigned arithmetic on
//! the target.

/// Digit value returned for characters that are not digits in any base.
pub const BAD_DIGIT: u8 = 127;

/// Result of a successful literal parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedNumber {
    /// Accumulated value (wrapping).
    pub value: u16,
    /// Characters consumed, base prefix included.
    pub len: usize,
}

/// Decode one ASCII digit (`0-9`, `A-Z`, `a-z`) into its value.
///
/// Letters fold to upper case, so `a` and `A` both decode to 10. Anything
/// else decodes to [`BAD_DIGIT`].
#[inline]
pub fn digit_value(ch: u8) -> u8 {
    match ch {
        b'0'..=b'9' => ch - b'0',
        b'A'..=b'Z' => ch - b'A' + 10,
        b'a'..=b'z' => ch - b'a' + 10,
        _ => BAD_DIGIT,
    }
}

/// Select the base from the literal prefix.
///
/// Returns `(base, prefix_len)`.
#[inline]
fn base_of(s: &[u8]) -> (u8, usize) {
    match s {
        [b'0', b'b', ..] => (2, 2),
        [b'0', b'x', ..] => (16, 2),
        _ => (10, 0),
    }
}

/// Parse a literal from the start of `s`.
///
/// Digits are consumed greedily; the first character whose value is not
/// below the base ends the literal. Returns `None` when no digit follows the
/// prefix, so a bare `0x` or `0b` is a failure rather than zero.
pub fn parse_number(s: &[u8]) -> Option<ParsedNumber> {
    let (base, prefix_len) = base_of(s);

    let mut value: u16 = 0;
    let mut digits = 0;

    for &ch in &s[prefix_len..] {
        let digit = digit_value(ch);
        if digit >= base {
            break;
        }
        value = value.wrapping_mul(base as u16).wrapping_add(digit as u16);
        digits += 1;
    }

    if digits == 0 {
        return None;
    }

    Some(ParsedNumber {
        value,
        len: prefix_len + digits,
    })
}

/// Parse a literal that must span all of `s`.
///
/// Trailing characters after the last digit make the whole parse fail.
pub fn parse_exact(s: &[u8]) -> Option<u16> {
    parse_number(s)
        .filter(|n| n.len == s.len())
        .map(|n| n.value)
}
