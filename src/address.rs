//! ## Address parser
//! Converts a dotted-quad IPv4 token into its 32-bit key.
//!
//! Key layout:
//! - 24..31 bits   - 1-st octet
//! - 16..23 bits   - 2-nd octet
//! - 8..15 bits    - 3-rd octet
//! - 0..7 bits     - 4-th octet
//!
//! Parsing works on raw bytes so that worker threads never have to validate UTF-8 of the
//! chunks they receive.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Number of dot separated segments in a dotted-quad
const SEGMENTS: usize = 4;

/// A token that does not encode a valid IPv4 address.
///
/// Malformed lines are skipped by the counting pipeline, so this error never reaches the
/// caller of a run. It is cheap to build and carries no copy of the offending token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("malformed IPv4 address: {reason}")]
pub struct MalformedAddress {
    pub reason: Malformation,
}

/// Reason a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    /// Token does not split into exactly four segments
    SegmentCount,
    /// One of the segments is empty
    EmptySegment,
    /// A segment contains something other than decimal digits
    InvalidDigit,
    /// A segment is greater than 255
    OctetOverflow,
}

impl std::fmt::Display for Malformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Malformation::SegmentCount => "expected four dot separated segments",
            Malformation::EmptySegment => "empty segment",
            Malformation::InvalidDigit => "non-decimal character in segment",
            Malformation::OctetOverflow => "segment greater than 255",
        };
        f.write_str(msg)
    }
}

impl From<Malformation> for MalformedAddress {
    #[inline]
    fn from(reason: Malformation) -> Self {
        Self { reason }
    }
}

/// Parse a single input line, ignoring surrounding ASCII whitespace (including `\r`).
#[inline]
pub fn parse_line(line: &[u8]) -> Result<u32, MalformedAddress> {
    parse_address(line.trim_ascii())
}

/// Parse an already trimmed dotted-quad token into its address key.
#[inline]
pub fn parse_address(token: &[u8]) -> Result<u32, MalformedAddress> {
    let mut key = 0u32;
    let mut segments = 0;
    for segment in token.split(|&b| b == b'.') {
        segments += 1;
        if segments > SEGMENTS {
            return Err(Malformation::SegmentCount.into());
        }
        key = (key << 8) | u32::from(parse_octet(segment)?);
    }

    if segments != SEGMENTS {
        return Err(Malformation::SegmentCount.into());
    }
    Ok(key)
}

/// Render an address key back into its dotted-quad form
#[inline]
pub fn format_address(key: u32) -> String {
    Ipv4Addr::from(key).to_string()
}

/// Parse one decimal octet, rejecting overflow as soon as it happens
#[inline]
fn parse_octet(segment: &[u8]) -> Result<u8, Malformation> {
    if segment.is_empty() {
        return Err(Malformation::EmptySegment);
    }

    let mut value: u16 = 0;
    for &b in segment {
        if !b.is_ascii_digit() {
            return Err(Malformation::InvalidDigit);
        }
        value = value * 10 + u16::from(b - b'0');
        if value > u16::from(u8::MAX) {
            return Err(Malformation::OctetOverflow);
        }
    }
    u8::try_from(value).map_err(|_| Malformation::OctetOverflow)
}
