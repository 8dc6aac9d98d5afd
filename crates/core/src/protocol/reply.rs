//! Reply lines
//!
//! Replies are rendered without the line terminator; the link appends it.

use super::packet::TargetPacket;
use crate::config::MAX_LINE_LEN;
use core::fmt::{self, Write};
use heapless::String;

/// Capacity of a rendered reply.
///
/// An inbound line is at most [`MAX_LINE_LEN`] bytes. The reply adds a short
/// prefix and, for `ACK`, reformats the two numbers with two decimals, which
/// grows each of them by at most four bytes.
pub const REPLY_CAPACITY: usize = MAX_LINE_LEN + 64;

/// Answer to one inbound line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply<'a> {
    /// Packet accepted; echoes the original (unquantized) values
    Ack { msg: &'a str, x: f32, y: f32 },
    /// Packet rejected; echoes the offending line
    Rejected { line: &'a str },
}

impl<'a> Reply<'a> {
    pub fn ack(packet: &TargetPacket<'a>) -> Self {
        Reply::Ack {
            msg: packet.msg,
            x: packet.x,
            y: packet.y,
        }
    }

    pub fn rejected(line: &'a str) -> Self {
        Reply::Rejected { line }
    }

    pub fn is_ack(&self) -> bool {
        matches!(self, Reply::Ack { .. })
    }

    /// Render into a bounded buffer
    pub fn render(&self) -> Result<String<REPLY_CAPACITY>, fmt::Error> {
        let mut out = String::new();
        write!(out, "{}", self)?;
        Ok(out)
    }
}

impl fmt::Display for Reply<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // + 0.0 turns -0.0 into 0.0
            Reply::Ack { msg, x, y } => {
                write!(f, "ACK;MSG:{};X:{:.2};Y:{:.2}", msg, x + 0.0, y + 0.0)
            }
            Reply::Rejected { line } => write!(f, "ERR;BAD_PACKET;{}", line),
        }
    }
}
