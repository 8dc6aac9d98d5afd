//! ICM-20948 DMP Driver
//!
//! I2C driver for the TDK InvenSense ICM-20948 digital motion processor:
//! uploads the DMP image, configures Quat6 (game rotation vector) output
//! and reads the resulting frames from the FIFO.
//!
//! ## Usage
//!
//! ```ignore
//! use sightline::devices::imu::Icm20948Dmp;
//! use sightline::devices::traits::FusionSource;
//!
//! let mut dmp = Icm20948Dmp::new(i2c, ICM20948_ADDR_ALT);
//! dmp.start(DMP3_IMAGE).await?;
//! let packet = dmp.read_packet().await?;
//! ```

pub mod dmp;
mod driver;
pub mod registers;

pub use driver::Icm20948Dmp;
pub use registers::{ICM20948_ADDR, ICM20948_ADDR_ALT};
