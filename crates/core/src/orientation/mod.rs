//! Orientation conditioning
//!
//! Turns fused quaternions from the DMP into Euler angles in degrees and
//! applies the per-sample conditioning steps:
//!
//! 1. [`quaternion`]: Q30 quaternion → roll/pitch/yaw
//! 2. [`calibration`]: subtract the zero reference captured at boot
//! 3. [`yaw_hold`]: freeze yaw near gimbal lock
//!
//! The roll/pitch swap required by the mounting orientation is applied by
//! [`EulerAngles::swap_roll_pitch`] after the drain loop has picked the
//! latest sample of a cycle.

pub mod calibration;
pub mod quaternion;
pub mod yaw_hold;

pub use calibration::ZeroReference;
pub use quaternion::RawQuaternion;
pub use yaw_hold::YawHold;

use core::ops::Sub;

/// Roll, pitch and yaw in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl EulerAngles {
    /// All-zero orientation
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Exchange roll and pitch.
    ///
    /// The sensor is mounted rotated by 90° about its vertical axis, so the
    /// sensor's roll is the device's pitch and vice versa. Yaw is untouched.
    pub const fn swap_roll_pitch(self) -> Self {
        Self {
            roll: self.pitch,
            pitch: self.roll,
            yaw: self.yaw,
        }
    }
}

impl Sub for EulerAngles {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            roll: self.roll - rhs.roll,
            pitch: self.pitch - rhs.pitch,
            yaw: self.yaw - rhs.yaw,
        }
    }
}
