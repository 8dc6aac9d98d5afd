//! DMP quaternion decoding
//!
//! The DMP game rotation vector (Quat6) delivers the vector part of a unit
//! quaternion as three Q30 fixed-point values. The scalar part is implicit
//! and reconstructed here before converting to Euler angles.

use super::EulerAngles;
use crate::config::QUAT_Q30_SCALE;
use libm::{asinf, atan2f, sqrtf};
use nalgebra::Quaternion;

const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Raw Quat6 sample: vector part of the orientation quaternion in Q30
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawQuaternion {
    pub q1: i32,
    pub q2: i32,
    pub q3: i32,
}

impl RawQuaternion {
    pub const fn new(q1: i32, q2: i32, q3: i32) -> Self {
        Self { q1, q2, q3 }
    }

    /// Reconstruct the full quaternion (w, i, j, k).
    ///
    /// The scalar part is `sqrt(1 - (q1² + q2² + q3²))`. Accumulated
    /// fixed-point error can push the sum of squares slightly above 1, so the
    /// radicand is clamped to `[0, 1]` instead of producing NaN.
    pub fn to_quaternion(self) -> Quaternion<f32> {
        let q1 = self.q1 as f32 / QUAT_Q30_SCALE;
        let q2 = self.q2 as f32 / QUAT_Q30_SCALE;
        let q3 = self.q3 as f32 / QUAT_Q30_SCALE;

        let sum = (q1 * q1 + q2 * q2 + q3 * q3).clamp(0.0, 1.0);
        let q0 = sqrtf(1.0 - sum);

        Quaternion::new(q0, q1, q2, q3)
    }

    /// Decode to roll/pitch/yaw in degrees
    pub fn to_euler_deg(self) -> EulerAngles {
        quaternion_to_euler_deg(&self.to_quaternion())
    }
}

/// Convert a unit quaternion to aerospace roll/pitch/yaw in degrees.
///
/// ```text
/// roll  = atan2(2(q0q1 + q2q3), 1 - 2(q1² + q2²))
/// pitch = asin(2(q0q2 - q1q3))
/// yaw   = atan2(2(q0q3 + q1q2), 1 - 2(q2² + q3²))
/// ```
pub fn quaternion_to_euler_deg(q: &Quaternion<f32>) -> EulerAngles {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);

    let roll = atan2f(2.0 * (q0 * q1 + q2 * q3), 1.0 - 2.0 * (q1 * q1 + q2 * q2));
    // asin is undefined past ±1, which rounding can reach at ±90° pitch
    let pitch = asinf((2.0 * (q0 * q2 - q1 * q3)).clamp(-1.0, 1.0));
    let yaw = atan2f(2.0 * (q0 * q3 + q1 * q2), 1.0 - 2.0 * (q2 * q2 + q3 * q3));

    EulerAngles::new(roll * RAD_TO_DEG, pitch * RAD_TO_DEG, yaw * RAD_TO_DEG)
}
