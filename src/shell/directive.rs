//! Whole-line directives
//!
//! Matched by case-sensitive prefix against the start of the line only. A
//! directive takes the whole line; no token scanning follows.

use crate::bus::BusKind;
use crate::number::parse_exact;

use super::CommandError;

/// What a directive does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    EchoOn,
    EchoOff,
    /// Make the given bus active.
    Select(BusKind),
    /// Read one byte at the address that follows.
    Peek,
}

/// Directive descriptor
pub struct DirectiveDescriptor {
    pub prefix: &'static str,
    pub directive: Directive,
}

/// All directives, checked in order.
pub static DIRECTIVES: &[DirectiveDescriptor] = &[
    DirectiveDescriptor { prefix: "echo on", directive: Directive::EchoOn },
    DirectiveDescriptor { prefix: "echo off", directive: Directive::EchoOff },
    DirectiveDescriptor { prefix: "spi", directive: Directive::Select(BusKind::Spi) },
    DirectiveDescriptor { prefix: "hiz", directive: Directive::Select(BusKind::Hiz) },
    DirectiveDescriptor { prefix: "peek", directive: Directive::Peek },
];

/// Find the directive `line` starts with.
///
/// Returns the directive and whatever follows its prefix.
pub fn match_directive(line: &[u8]) -> Option<(Directive, &[u8])> {
    DIRECTIVES
        .iter()
        .find(|d| line.starts_with(d.prefix.as_bytes()))
        .map(|d| (d.directive, &line[d.prefix.len()..]))
}

/// Parse the argument of `peek`.
///
/// Surrounding blanks are ignored; the literal must fill the rest.
pub fn parse_address(rest: &[u8]) -> Result<u16, CommandError> {
    let rest = trim_blanks(rest);
    if rest.is_empty() {
        return Err(CommandError::BadAddress);
    }
    parse_exact(rest).ok_or(CommandError::BadAddress)
}

fn trim_blanks(s: &[u8]) -> &[u8] {
    let is_blank = |c: &u8| *c == b' ' || *c == b'\t';
    let start = s.iter().position(|c| !is_blank(c)).unwrap_or(s.len());
    let end = s.iter().rposition(|c| !is_blank(c)).map_or(start, |i| i + 1);
    &s[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_echo() {
        assert_eq!(match_directive(b"echo on"), Some((Directive::EchoOn, &b""[..])));
        assert_eq!(match_directive(b"echo off"), Some((Directive::EchoOff, &b""[..])));
    }

    #[test]
    fn test_match_bus_select_is_prefix() {
        assert_eq!(
            match_directive(b"spi mode"),
            Some((Directive::Select(BusKind::Spi), &b" mode"[..]))
        );
        assert_eq!(match_directive(b"hiz"), Some((Directive::Select(BusKind::Hiz), &b""[..])));
    }

    #[test]
    fn test_no_match_mid_line_or_other_case() {
        assert_eq!(match_directive(b" spi"), None);
        assert_eq!(match_directive(b"SPI"), None);
        assert_eq!(match_directive(b"0x10 spi"), None);
        assert_eq!(match_directive(b"echo"), None);
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address(b" 0x20"), Ok(0x20));
        assert_eq!(parse_address(b"\t300 "), Ok(300));
        assert_eq!(parse_address(b""), Err(CommandError::BadAddress));
        assert_eq!(parse_address(b"   "), Err(CommandError::BadAddress));
        assert_eq!(parse_address(b" 0x"), Err(CommandError::BadAddress));
        assert_eq!(parse_address(b" 12 34"), Err(CommandError::BadAddress));
    }
}
