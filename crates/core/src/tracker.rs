//! Tracker state aggregate
//!
//! Everything the control loop mutates between cycles lives in
//! [`TrackerState`]: the zero reference, the yaw hold, the remote target
//! and the two display buffers. It is created once at startup and owned by
//! the loop for the lifetime of the process.

use crate::config::{IP_BUFFER_LEN, MSG_BUFFER_LEN, MSG_DISPLAY_LEN};
use crate::orientation::{EulerAngles, YawHold, ZeroReference};
use crate::protocol::{parse_packet, Reply};
use crate::quantize::{quantize_deg, QuantizedAttitude};
use crate::target::{AlignmentVerdict, TargetTracker};
use crate::telemetry::TelemetryRecord;
use crate::text::BoundedText;
use core::fmt::Write;

/// Initial last-message text
pub const NO_MESSAGE: &str = "-";

/// Address reported until the network is up
pub const UNBOUND_IP: &str = "0.0.0.0";

/// Mutable tracking state owned by the control loop
#[derive(Debug, Clone)]
pub struct TrackerState {
    zero: ZeroReference,
    yaw_hold: YawHold,
    target: TargetTracker,
    last_msg: BoundedText<MSG_BUFFER_LEN>,
    ip: BoundedText<IP_BUFFER_LEN>,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerState {
    pub fn new() -> Self {
        Self {
            zero: ZeroReference::new(),
            yaw_hold: YawHold::new(),
            target: TargetTracker::new(),
            last_msg: BoundedText::from_str_truncated(NO_MESSAGE),
            ip: BoundedText::from_str_truncated(UNBOUND_IP),
        }
    }

    /// Condition one freshly decoded sample.
    ///
    /// Subtracts the zero reference (captured from the first sample) and
    /// replaces yaw with the gimbal-lock stabilized value. Runs for every
    /// decoded sample, not only the last of a cycle, so the yaw hold sees
    /// the full pitch history.
    pub fn condition(&mut self, raw: EulerAngles) -> EulerAngles {
        let calibrated = self.zero.apply(raw);
        let yaw = self.yaw_hold.apply(calibrated.yaw, calibrated.pitch);
        EulerAngles { yaw, ..calibrated }
    }

    /// Process one trimmed, non-empty inbound line and build its reply.
    ///
    /// On a valid packet the target and the last-message buffer are
    /// updated; on a malformed one nothing changes.
    pub fn handle_line<'a>(&mut self, line: &'a str) -> Reply<'a> {
        match parse_packet(line) {
            Ok(packet) => {
                self.target
                    .update(quantize_deg(packet.x), quantize_deg(packet.y));
                self.last_msg.set_limited(packet.msg, MSG_DISPLAY_LEN);
                Reply::ack(&packet)
            }
            Err(_) => Reply::rejected(line),
        }
    }

    pub fn evaluate(&self, device: &QuantizedAttitude) -> AlignmentVerdict {
        self.target.evaluate(device)
    }

    /// Record the bound network address in dotted-quad form
    pub fn set_ip(&mut self, octets: [u8; 4]) {
        let mut text = heapless::String::<IP_BUFFER_LEN>::new();
        // "255.255.255.255" is 15 bytes
        let _ = write!(
            text,
            "{}.{}.{}.{}",
            octets[0], octets[1], octets[2], octets[3]
        );
        self.ip.set(&text);
    }

    /// Assemble the telemetry row for this cycle
    pub fn telemetry(
        &self,
        t_ms: u64,
        angles: EulerAngles,
        quantized: QuantizedAttitude,
        verdict: &AlignmentVerdict,
    ) -> TelemetryRecord<'_> {
        TelemetryRecord {
            t_ms,
            angles,
            quantized,
            spawn_set: self.target.is_set(),
            spawn_pitch_q: self.target.spawn_pitch_q(),
            spawn_yaw_q: self.target.spawn_yaw_q(),
            on_target: verdict.on_target,
            msg: self.last_msg.as_str(),
            ip: self.ip.as_str(),
        }
    }

    pub fn zero_reference(&self) -> &ZeroReference {
        &self.zero
    }

    pub fn target(&self) -> &TargetTracker {
        &self.target
    }

    pub fn last_msg(&self) -> &str {
        self.last_msg.as_str()
    }

    pub fn ip(&self) -> &str {
        self.ip.as_str()
    }
}
