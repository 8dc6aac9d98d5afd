//! ICM-20948 DMP firmware
//!
//! The stock InvenSense DMP3 image (`icm20948_img.dmp3a.h` in the
//! InvenSense eMD / SparkFun ICM-20948 sources) converted to a raw binary.
//! It is not redistributed with this repository; drop it into
//! `icm20948-firmware/` before building for the board.

/// Image uploaded by `Icm20948Dmp::start` on every boot
pub static DMP3_IMAGE: &[u8] = include_bytes!("../../../icm20948-firmware/icm20948_dmp3a.bin");
