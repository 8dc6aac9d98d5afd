//! Fusion Source Trait and DMP Packet Types
//!
//! Device-independent interface for sensors whose on-chip motion processor
//! pushes fused orientation packets into a FIFO, such as the ICM-20948 DMP
//! configured for the 6-axis game rotation vector.
//!
//! ## Usage
//!
//! ```ignore
//! use sightline::devices::traits::{FusionSource, FusionError};
//!
//! async fn poll<F: FusionSource>(source: &mut F) {
//!     match source.read_packet().await {
//!         Ok(packet) => { /* packet.quat6 */ }
//!         Err(FusionError::NoData) => {}
//!         Err(FusionError::Fault(_)) => source.resync().await,
//!     }
//! }
//! ```

use bitflags::bitflags;
use core::fmt;
use sightline_core::orientation::RawQuaternion;

bitflags! {
    /// Primary DMP FIFO header bitmap
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DmpHeader: u16 {
        const ACCEL = 0x8000;
        const GYRO = 0x4000;
        const COMPASS = 0x2000;
        const ALS = 0x1000;
        const QUAT6 = 0x0800;
        const QUAT9 = 0x0400;
        const PQUAT6 = 0x0200;
        const GEOMAG = 0x0100;
        const PRESSURE = 0x0080;
        const GYRO_CALIBR = 0x0040;
        const COMPASS_CALIBR = 0x0020;
        const STEP_DETECTOR = 0x0010;
        /// A second header word follows
        const HEADER2 = 0x0008;
    }
}

bitflags! {
    /// Secondary DMP FIFO header bitmap (present when `DmpHeader::HEADER2`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DmpHeader2: u16 {
        const ACCEL_ACCURACY = 0x4000;
        const GYRO_ACCURACY = 0x2000;
        const COMPASS_ACCURACY = 0x1000;
        const FSYNC = 0x0800;
        const PICKUP = 0x0400;
        const ACTIVITY_RECOG = 0x0080;
        const SECONDARY_ON_OFF = 0x0040;
    }
}

/// Payload bytes per primary header bit, in FIFO order
pub const HEADER_PAYLOADS: [(DmpHeader, usize); 12] = [
    (DmpHeader::ACCEL, 6),
    (DmpHeader::GYRO, 12),
    (DmpHeader::COMPASS, 6),
    (DmpHeader::ALS, 8),
    (DmpHeader::QUAT6, 12),
    (DmpHeader::QUAT9, 14),
    (DmpHeader::PQUAT6, 6),
    (DmpHeader::GEOMAG, 14),
    (DmpHeader::PRESSURE, 6),
    (DmpHeader::GYRO_CALIBR, 12),
    (DmpHeader::COMPASS_CALIBR, 12),
    (DmpHeader::STEP_DETECTOR, 4),
];

/// Payload bytes per secondary header bit, in FIFO order
pub const HEADER2_PAYLOADS: [(DmpHeader2, usize); 7] = [
    (DmpHeader2::ACCEL_ACCURACY, 2),
    (DmpHeader2::GYRO_ACCURACY, 2),
    (DmpHeader2::COMPASS_ACCURACY, 2),
    (DmpHeader2::FSYNC, 2),
    (DmpHeader2::PICKUP, 2),
    (DmpHeader2::ACTIVITY_RECOG, 6),
    (DmpHeader2::SECONDARY_ON_OFF, 2),
];

/// Trailing footer on every frame
pub const FOOTER_BYTES: usize = 2;

impl DmpHeader {
    /// Bytes following the header words for the primary payloads
    pub fn payload_len(self) -> usize {
        HEADER_PAYLOADS
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, len)| len)
            .sum()
    }

    /// Offset of the Quat6 block inside the payload
    pub fn quat6_offset(self) -> Option<usize> {
        if !self.contains(DmpHeader::QUAT6) {
            return None;
        }
        Some(
            HEADER_PAYLOADS
                .iter()
                .take_while(|(bit, _)| *bit != DmpHeader::QUAT6)
                .filter(|(bit, _)| self.contains(*bit))
                .map(|(_, len)| len)
                .sum(),
        )
    }
}

impl DmpHeader2 {
    pub fn payload_len(self) -> usize {
        HEADER2_PAYLOADS
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, len)| len)
            .sum()
    }
}

/// Why a packet could not be taken from the FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum FaultKind {
    /// I2C transfer failed
    Bus,
    /// FIFO holds part of a frame that never completed
    IncompleteFrame,
    /// FIFO filled up and dropped data
    Overflow,
    /// DMP memory read back differently from the image written
    ImageMismatch,
}

/// Fusion source error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum FusionError {
    /// Nothing queued; not an error condition for the caller
    NoData,
    /// Stream is out of step and needs a resync
    Fault(FaultKind),
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Bus => write!(f, "bus error"),
            FaultKind::IncompleteFrame => write!(f, "incomplete frame"),
            FaultKind::Overflow => write!(f, "FIFO overflow"),
            FaultKind::ImageMismatch => write!(f, "DMP image verify failed"),
        }
    }
}

impl fmt::Display for FusionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusionError::NoData => write!(f, "no data available"),
            FusionError::Fault(kind) => write!(f, "fusion fault: {}", kind),
        }
    }
}

/// One frame popped from the DMP FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmpPacket {
    pub header: DmpHeader,
    /// Game rotation vector, present when the header carries `QUAT6`
    pub quat6: Option<RawQuaternion>,
}

impl DmpPacket {
    /// Packet carrying only a Quat6 payload
    pub fn quat6(q: RawQuaternion) -> Self {
        Self {
            header: DmpHeader::QUAT6,
            quat6: Some(q),
        }
    }

    /// Packet with the given header and no orientation payload
    pub fn without_orientation(header: DmpHeader) -> Self {
        Self {
            header: header.difference(DmpHeader::QUAT6),
            quat6: None,
        }
    }
}

/// Device-independent interface for FIFO-based fusion sensors
///
/// `read_packet` pops exactly one frame per call and must not block when
/// the FIFO is empty. After a [`FusionError::Fault`] the caller is expected
/// to call [`resync`](FusionSource::resync) before reading again.
#[allow(async_fn_in_trait)]
pub trait FusionSource {
    async fn read_packet(&mut self) -> Result<DmpPacket, FusionError>;

    /// Discard buffered data and restart the motion processor
    async fn resync(&mut self);
}

impl<T: FusionSource> FusionSource for &mut T {
    async fn read_packet(&mut self) -> Result<DmpPacket, FusionError> {
        (**self).read_packet().await
    }

    async fn resync(&mut self) {
        (**self).resync().await
    }
}
