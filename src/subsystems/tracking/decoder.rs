//! Orientation decoder
//!
//! Reads one packet from the fusion source and converts its Quat6 payload
//! to Euler angles. A faulted stream is resynchronized here so callers only
//! need to stop reading for the current cycle.

use crate::devices::traits::{FaultKind, FusionError, FusionSource};
use core::fmt;
use sightline_core::orientation::EulerAngles;

/// Decode error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum DecodeError {
    /// FIFO is empty
    NoData,
    /// Source faulted and has been resynchronized
    Fault(FaultKind),
    /// Packet carried no Quat6 payload
    MissingOrientation,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NoData => write!(f, "no data"),
            DecodeError::Fault(kind) => write!(f, "fault: {}", kind),
            DecodeError::MissingOrientation => write!(f, "packet without orientation"),
        }
    }
}

/// Read one packet and decode its orientation in degrees
pub async fn read_orientation<F: FusionSource>(source: &mut F) -> Result<EulerAngles, DecodeError> {
    match source.read_packet().await {
        Ok(packet) => packet
            .quat6
            .map(|q| q.to_euler_deg())
            .ok_or(DecodeError::MissingOrientation),
        Err(FusionError::NoData) => Err(DecodeError::NoData),
        Err(FusionError::Fault(kind)) => {
            crate::log_warn!("Fusion source fault ({}), resyncing", kind);
            source.resync().await;
            Err(DecodeError::Fault(kind))
        }
    }
}
