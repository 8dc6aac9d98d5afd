//! Target packet parsing
//!
//! Structural rules:
//!
//! - `MSG:` at offset 0
//! - the first `;X:` and the first `;Y:` both present, `;Y:` after `;X:`
//! - text is everything between `MSG:` and `;X:`
//! - each number is trimmed, non-empty and made only of `0-9 + - .`
//!
//! The character check is loose: tokens such as `1.2.3` or
//! `--5` pass it and are then converted best-effort by [`lenient_float`].

use core::fmt;

const MSG_PREFIX: &str = "MSG:";
const X_MARKER: &str = ";X:";
const Y_MARKER: &str = ";Y:";

/// Parsed target update, borrowing from the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPacket<'a> {
    /// Free text shown on the telemetry stream
    pub msg: &'a str,
    /// Target pitch offset (degrees)
    pub x: f32,
    /// Target yaw offset (degrees)
    pub y: f32,
}

/// Structural grammar violation; the whole line is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Line does not start with `MSG:`
    MissingMsgPrefix,
    /// No `;X:` marker
    MissingXMarker,
    /// No `;Y:` marker
    MissingYMarker,
    /// `;Y:` appears before the end of `;X:`
    MarkersOutOfOrder,
    /// A numeric field is empty after trimming
    EmptyField,
    /// A numeric field contains a character outside `0-9 + - .`
    InvalidCharacter,
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::MissingMsgPrefix => write!(f, "missing MSG: prefix"),
            PacketError::MissingXMarker => write!(f, "missing ;X: marker"),
            PacketError::MissingYMarker => write!(f, "missing ;Y: marker"),
            PacketError::MarkersOutOfOrder => write!(f, ";Y: before ;X:"),
            PacketError::EmptyField => write!(f, "empty numeric field"),
            PacketError::InvalidCharacter => write!(f, "invalid character in numeric field"),
        }
    }
}

/// Parse one (already trimmed) line into a [`TargetPacket`]
pub fn parse_packet(line: &str) -> Result<TargetPacket<'_>, PacketError> {
    if !line.starts_with(MSG_PREFIX) {
        return Err(PacketError::MissingMsgPrefix);
    }
    let x_at = line.find(X_MARKER).ok_or(PacketError::MissingXMarker)?;
    let y_at = line.find(Y_MARKER).ok_or(PacketError::MissingYMarker)?;
    if y_at < x_at + X_MARKER.len() {
        return Err(PacketError::MarkersOutOfOrder);
    }

    let msg = &line[MSG_PREFIX.len()..x_at];
    let x_field = numeric_field(&line[x_at + X_MARKER.len()..y_at])?;
    let y_field = numeric_field(&line[y_at + Y_MARKER.len()..])?;

    Ok(TargetPacket {
        msg,
        x: lenient_float(x_field),
        y: lenient_float(y_field),
    })
}

fn numeric_field(raw: &str) -> Result<&str, PacketError> {
    let field = raw.trim();
    if field.is_empty() {
        return Err(PacketError::EmptyField);
    }
    if !field
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'))
    {
        return Err(PacketError::InvalidCharacter);
    }
    Ok(field)
}

/// Best-effort float conversion.
///
/// Converts the longest prefix shaped like `[+-]digits[.digits]` and ignores
/// the rest. Returns `0.0` when no such prefix exists.
///
/// ```
/// use sightline_core::protocol::packet::lenient_float;
///
/// assert_eq!(lenient_float("12.5"), 12.5);
/// assert_eq!(lenient_float("1.2.3"), 1.2);
/// assert_eq!(lenient_float("--5"), 0.0);
/// assert_eq!(lenient_float("7-"), 7.0);
/// ```
pub fn lenient_float(token: &str) -> f32 {
    let bytes = token.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    token[..end].parse::<f32>().unwrap_or(0.0)
}
