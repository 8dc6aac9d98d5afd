//! Device drivers
//!
//! ## Modules
//!
//! - `imu`: orientation sensor drivers (ICM-20948 DMP, mock)
//! - `traits`: device trait definitions (`FusionSource`)

pub mod imu;
pub mod traits;
