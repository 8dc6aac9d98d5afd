//! Target update line protocol
//!
//! One update per newline-terminated line:
//!
//! ```text
//! MSG:<text>;X:<number>;Y:<number>
//! ```
//!
//! Every non-empty inbound line gets exactly one reply:
//!
//! ```text
//! ACK;MSG:<text>;X:<x, 2 decimals>;Y:<y, 2 decimals>
//! ERR;BAD_PACKET;<line>
//! ```
//!
//! - [`line`]: byte stream → lines (CR dropped, 256-byte cap)
//! - [`packet`]: line → [`TargetPacket`]
//! - [`reply`]: [`Reply`] rendering

pub mod line;
pub mod packet;
pub mod reply;

pub use line::{Line, LineAssembler};
pub use packet::{parse_packet, PacketError, TargetPacket};
pub use reply::{Reply, REPLY_CAPACITY};
