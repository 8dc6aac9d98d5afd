//! Device traits
//!
//! Hardware-independent trait definitions for device drivers, so the
//! tracking subsystem can be unit tested with mocks and does not depend on
//! a particular sensor.

pub mod fusion;

pub use fusion::{
    DmpHeader, DmpHeader2, DmpPacket, FaultKind, FusionError, FusionSource, FOOTER_BYTES,
};
