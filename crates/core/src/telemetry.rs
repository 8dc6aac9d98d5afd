//! Telemetry record
//!
//! One comma-separated row per completed cycle, preceded once by
//! [`TELEMETRY_HEADER`]. Angles are calibrated degrees after the roll/pitch
//! swap, with the stabilized yaw. Flags are `0`/`1`.

use crate::orientation::EulerAngles;
use crate::quantize::QuantizedAttitude;
use core::fmt::{self, Write};
use heapless::String;

/// Column header, emitted once at startup
pub const TELEMETRY_HEADER: &str =
    "t_ms,roll,pitch,yaw,rollQ,pitchQ,yawQ,spawnSet,spawnPitchQ,spawnYawQ,onTarget,msg,ip";

/// Capacity of one rendered row
pub const TELEMETRY_LINE_CAPACITY: usize = 192;

/// Borrowed view of one telemetry row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRecord<'a> {
    pub t_ms: u64,
    pub angles: EulerAngles,
    pub quantized: QuantizedAttitude,
    pub spawn_set: bool,
    pub spawn_pitch_q: i16,
    pub spawn_yaw_q: i16,
    pub on_target: bool,
    pub msg: &'a str,
    pub ip: &'a str,
}

impl TelemetryRecord<'_> {
    /// Render into a bounded buffer (no line terminator)
    pub fn render(&self) -> Result<String<TELEMETRY_LINE_CAPACITY>, fmt::Error> {
        let mut out = String::new();
        write!(out, "{}", self)?;
        Ok(out)
    }
}

impl fmt::Display for TelemetryRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{:.2},{:.2},{:.2},{},{},{},{},{},{},{},{},{}",
            self.t_ms,
            self.angles.roll,
            self.angles.pitch,
            self.angles.yaw,
            self.quantized.roll,
            self.quantized.pitch,
            self.quantized.yaw,
            u8::from(self.spawn_set),
            self.spawn_pitch_q,
            self.spawn_yaw_q,
            u8::from(self.on_target),
            self.msg,
            self.ip,
        )
    }
}
