//! Angle quantizer
//!
//! Device angles and target angles are both snapped to the same 2° grid
//! before they are compared, so the alignment check never flickers on
//! sub-step noise.

use crate::config::ANGLE_STEP_DEG;
use crate::orientation::EulerAngles;
use libm::roundf;

/// Round `angle_deg` to the nearest multiple of [`ANGLE_STEP_DEG`].
///
/// Ties round away from zero (`-5.0 → -6`, `5.0 → 6`). Values beyond the
/// `i16` range saturate to the outermost even values, `-32768` and `32766`,
/// and NaN maps to 0.
pub fn quantize_deg(angle_deg: f32) -> i16 {
    let step = ANGLE_STEP_DEG as f32;
    (step * roundf(angle_deg / step)).clamp(-32768.0, 32766.0) as i16
}

/// Quantized device attitude (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantizedAttitude {
    pub roll: i16,
    pub pitch: i16,
    pub yaw: i16,
}

impl QuantizedAttitude {
    pub fn from_euler(angles: &EulerAngles) -> Self {
        Self {
            roll: quantize_deg(angles.roll),
            pitch: quantize_deg(angles.pitch),
            yaw: quantize_deg(angles.yaw),
        }
    }
}
