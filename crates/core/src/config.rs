//! Compile-time tuning constants
//!
//! None of these are runtime-configurable. Network settings (SSID, port)
//! live in the firmware crate and are baked in by its build script.

/// Quantization step applied to device and target angles (degrees)
pub const ANGLE_STEP_DEG: i16 = 2;

/// Maximum relative pitch/yaw deviation still counted as on-target (degrees)
pub const TARGET_TOL_DEG: i16 = 6;

/// Pitch magnitude at or above which yaw updates are frozen (degrees)
pub const PITCH_LOCK_THRESHOLD_DEG: f32 = 80.0;

/// Wall-clock budget for draining the fusion source each cycle (microseconds)
pub const SAMPLE_DRAIN_BUDGET_US: u64 = 2_500;

/// Fixed-point scale of DMP quaternion components (Q30)
pub const QUAT_Q30_SCALE: f32 = 1_073_741_824.0;

/// Maximum inbound line length; longer lines are truncated before parsing
pub const MAX_LINE_LEN: usize = 256;

/// Capacity of the last-message display buffer (bytes)
pub const MSG_BUFFER_LEN: usize = 48;

/// Visible part of the last-message display buffer (bytes)
pub const MSG_DISPLAY_LEN: usize = 30;

/// Capacity of the dotted-quad address buffer (bytes)
pub const IP_BUFFER_LEN: usize = 20;
