//! Yaw hold near gimbal lock
//!
//! As pitch approaches ±90° the atan2 yaw term degenerates and the reading
//! turns into noise. While the pitch magnitude is at or above the lock
//! threshold the last trustworthy yaw is held instead.

use crate::config::PITCH_LOCK_THRESHOLD_DEG;
use libm::fabsf;

/// Holds the last yaw observed outside the gimbal-lock band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawHold {
    threshold_deg: f32,
    stable: Option<f32>,
}

impl Default for YawHold {
    fn default() -> Self {
        Self::new()
    }
}

impl YawHold {
    /// Create with the default 80° pitch lock threshold
    pub const fn new() -> Self {
        Self::with_threshold(PITCH_LOCK_THRESHOLD_DEG)
    }

    pub const fn with_threshold(threshold_deg: f32) -> Self {
        Self {
            threshold_deg,
            stable: None,
        }
    }

    /// Feed one calibrated sample and return the stabilized yaw.
    ///
    /// The first call always latches `yaw`, even inside the lock band.
    pub fn apply(&mut self, yaw: f32, pitch: f32) -> f32 {
        let held = match self.stable {
            None => yaw,
            Some(_) if fabsf(pitch) < self.threshold_deg => yaw,
            Some(held) => held,
        };
        self.stable = Some(held);
        held
    }

    pub fn stable_yaw(&self) -> Option<f32> {
        self.stable
    }
}
