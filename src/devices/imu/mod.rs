//! Orientation sensor drivers
//!
//! ## Available Drivers
//!
//! - `icm20948`: ICM-20948 DMP FIFO reader
//! - `mock`: scripted fusion source for testing (`mock` feature or tests)

pub mod icm20948;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use icm20948::{Icm20948Dmp, ICM20948_ADDR, ICM20948_ADDR_ALT};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockFusion;
