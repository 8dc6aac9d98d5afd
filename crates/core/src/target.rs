//! Remote target tracking
//!
//! The client sends a target ("spawn") orientation as an offset pair. The
//! latest accepted target is kept in quantized degrees and compared against
//! the quantized device attitude every cycle.
//!
//! The client's `x` is a pitch offset and its `y` a yaw offset.

use crate::config::TARGET_TOL_DEG;
use crate::quantize::QuantizedAttitude;

/// Latest accepted target in quantized degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetTracker {
    spawn_pitch_q: i16,
    spawn_yaw_q: i16,
    is_set: bool,
}

/// Device attitude relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentVerdict {
    /// Quantized pitch minus target pitch (degrees)
    pub pitch_rel_q: i32,
    /// Quantized stabilized yaw minus target yaw (degrees)
    pub yaw_rel_q: i32,
    /// Both deviations within [`TARGET_TOL_DEG`]
    pub on_target: bool,
}

impl TargetTracker {
    pub const fn new() -> Self {
        Self {
            spawn_pitch_q: 0,
            spawn_yaw_q: 0,
            is_set: false,
        }
    }

    /// Overwrite the target; once set it stays set
    pub fn update(&mut self, pitch_q: i16, yaw_q: i16) {
        self.spawn_pitch_q = pitch_q;
        self.spawn_yaw_q = yaw_q;
        self.is_set = true;
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    /// Target pitch, or 0 while no target has been received
    pub fn spawn_pitch_q(&self) -> i16 {
        if self.is_set {
            self.spawn_pitch_q
        } else {
            0
        }
    }

    /// Target yaw, or 0 while no target has been received
    pub fn spawn_yaw_q(&self) -> i16 {
        if self.is_set {
            self.spawn_yaw_q
        } else {
            0
        }
    }

    /// Compare the quantized device attitude against the target.
    ///
    /// Roll does not take part in the verdict. Without a target the device
    /// is compared against (0, 0).
    pub fn evaluate(&self, device: &QuantizedAttitude) -> AlignmentVerdict {
        let pitch_rel_q = i32::from(device.pitch) - i32::from(self.spawn_pitch_q());
        let yaw_rel_q = i32::from(device.yaw) - i32::from(self.spawn_yaw_q());
        let tol = i32::from(TARGET_TOL_DEG);

        AlignmentVerdict {
            pitch_rel_q,
            yaw_rel_q,
            on_target: pitch_rel_q.abs() <= tol && yaw_rel_q.abs() <= tol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attitude(pitch: i16, yaw: i16) -> QuantizedAttitude {
        QuantizedAttitude {
            roll: 0,
            pitch,
            yaw,
        }
    }

    #[test]
    fn starts_unset_and_reports_zero_target() {
        let tracker = TargetTracker::new();
        assert!(!tracker.is_set());
        assert_eq!(tracker.spawn_pitch_q(), 0);
        assert_eq!(tracker.spawn_yaw_q(), 0);
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let mut tracker = TargetTracker::new();
        tracker.update(0, 0);

        for (p, y) in [(6, 6), (-6, -6), (6, -6), (0, 6)] {
            assert!(tracker.evaluate(&attitude(p, y)).on_target, "({}, {})", p, y);
        }
        for (p, y) in [(8, 0), (-8, 0), (0, 8), (0, -8)] {
            assert!(!tracker.evaluate(&attitude(p, y)).on_target, "({}, {})", p, y);
        }
    }

    #[test]
    fn unset_target_compares_against_origin() {
        let tracker = TargetTracker::new();
        let verdict = tracker.evaluate(&attitude(4, -2));
        assert_eq!(verdict.pitch_rel_q, 4);
        assert_eq!(verdict.yaw_rel_q, -2);
        assert!(verdict.on_target);
    }

    #[test]
    fn relative_offsets_use_target() {
        let mut tracker = TargetTracker::new();
        tracker.update(4, -6);

        let verdict = tracker.evaluate(&attitude(0, 0));
        assert_eq!(verdict.pitch_rel_q, -4);
        assert_eq!(verdict.yaw_rel_q, 6);
        assert!(verdict.on_target);
    }

    #[test]
    fn roll_is_ignored() {
        let tracker = TargetTracker::new();
        let device = QuantizedAttitude {
            roll: 90,
            pitch: 0,
            yaw: 0,
        };
        assert!(tracker.evaluate(&device).on_target);
    }

    #[test]
    fn update_overwrites_previous_target() {
        let mut tracker = TargetTracker::new();
        tracker.update(10, 10);
        tracker.update(-20, 30);
        assert!(tracker.is_set());
        assert_eq!(tracker.spawn_pitch_q(), -20);
        assert_eq!(tracker.spawn_yaw_q(), 30);
    }

    #[test]
    fn extreme_targets_do_not_overflow() {
        let mut tracker = TargetTracker::new();
        tracker.update(i16::MAX, i16::MIN);
        let verdict = tracker.evaluate(&attitude(-180, 180));
        assert_eq!(verdict.pitch_rel_q, -180 - 32767);
        assert_eq!(verdict.yaw_rel_q, 180 + 32768);
        assert!(!verdict.on_target);
    }
}
