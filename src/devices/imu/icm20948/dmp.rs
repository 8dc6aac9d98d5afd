//! ICM-20948 DMP memory map and configuration
//!
//! The DMP has no persistent program store. After every power-on the host
//! writes the InvenSense DMP3 image into DMP memory, points the program
//! counter at it and fills in a handful of configuration words. All
//! addresses below are byte offsets into DMP memory; the high byte selects
//! the 256-byte memory bank.

use crate::devices::traits::DmpHeader;

/// DMP memory bank size
pub const MEM_BANK_SIZE: usize = 256;

/// Largest burst the memory port accepts
pub const MAX_SERIAL_WRITE: usize = 16;

/// Image load address
pub const DMP_LOAD_START: u16 = 0x90;

/// Program counter start address written to PRGM_START_ADDRH/L
pub const DMP_START_ADDRESS: u16 = 0x1000;

/// Size of the stock DMP3 image (`icm20948_img.dmp3a`)
pub const DMP3_IMAGE_LEN: usize = 14_301;

/// Gyro sample rate divider: 1125 Hz / (1 + 19) = 56.25 Hz
pub const GYRO_SAMPLE_DIV: u8 = 19;

/// Accel sample rate divider, same rate as the gyro
pub const ACCEL_SAMPLE_DIV: u8 = 19;

/// Gyro full scale code (3 = ±2000 dps)
pub const GYRO_LEVEL_2000DPS: u8 = 3;

// =============================================================================
// DMP memory addresses
// =============================================================================

pub const DATA_OUT_CTL1: u16 = 4 * 16;
pub const DATA_OUT_CTL2: u16 = 4 * 16 + 2;
pub const DATA_INTR_CTL: u16 = 4 * 16 + 12;
pub const MOTION_EVENT_CTL: u16 = 4 * 16 + 14;
pub const DATA_RDY_STATUS: u16 = 8 * 16 + 10;
pub const ODR_CNTR_QUAT6: u16 = 8 * 16 + 12;
pub const ODR_QUAT6: u16 = 10 * 16 + 12;
pub const ACCEL_ONLY_GAIN: u16 = 16 * 16 + 12;
pub const GYRO_SF: u16 = 19 * 16;
pub const ACC_SCALE: u16 = 30 * 16;
pub const GYRO_FULLSCALE: u16 = 72 * 16 + 12;
pub const ACC_SCALE2: u16 = 79 * 16 + 4;
pub const ACCEL_ALPHA_VAR: u16 = 91 * 16;
pub const ACCEL_A_VAR: u16 = 92 * 16;
pub const ACCEL_CAL_RATE: u16 = 94 * 16 + 4;
pub const B2S_MTX_00: u16 = 208 * 16;
pub const B2S_MTX_11: u16 = 209 * 16;
pub const B2S_MTX_22: u16 = 210 * 16;

// =============================================================================
// Control words
// =============================================================================

/// Quat6 only, no second header word
pub const DATA_OUTPUT_QUAT6: u16 = DmpHeader::QUAT6.bits();

/// MOTION_EVENT_CTL: run the accel and gyro calibrators
pub const MOTION_EVENT_ACCEL_GYRO_CALIBR: u16 = 0x0300;

/// DATA_RDY_STATUS: gyro and accel samples feed the DMP
pub const DATA_READY_GYRO_ACCEL: u16 = 0x0003;

/// Identity body-to-sensor mount matrix, diagonal entry (1.0 in Q30)
const B2S_ONE: [u8; 4] = [0x40, 0x00, 0x00, 0x00];

/// Static configuration written after the image, for ±4 g / ±2000 dps at 56 Hz
pub const DMP_CONFIG: [(u16, &[u8]); 11] = [
    (ACC_SCALE, &[0x04, 0x00, 0x00, 0x00]),
    (ACC_SCALE2, &[0x00, 0x04, 0x00, 0x00]),
    (B2S_MTX_00, &B2S_ONE),
    (B2S_MTX_11, &B2S_ONE),
    (B2S_MTX_22, &B2S_ONE),
    (GYRO_FULLSCALE, &[0x10, 0x00, 0x00, 0x00]),
    (ACCEL_ONLY_GAIN, &[0x03, 0xA4, 0x92, 0x49]),
    (ACCEL_ALPHA_VAR, &[0x34, 0x92, 0x49, 0x25]),
    (ACCEL_A_VAR, &[0x0B, 0x6D, 0xB6, 0xDB]),
    (ACCEL_CAL_RATE, &[0x00, 0x00]),
    (ODR_QUAT6, &[0x00, 0x00]),
];

/// DMP gyro scale factor for a sample divider, full scale code and PLL trim
///
/// Bit 7 of the trim is a sign bit for the remaining seven bits. The result
/// saturates at `i32::MAX`.
pub fn gyro_scale_factor(div: u8, gyro_level: u8, pll: u8) -> u32 {
    const MAGIC: u64 = 264_446_880_937_391;
    const MAGIC_SCALE: u64 = 100_000;

    let trim = u64::from(pll & 0x7F);
    let base = if pll & 0x80 != 0 { 1270 - trim } else { 1270 + trim };
    let result =
        MAGIC * (1u64 << gyro_level) * (1 + u64::from(div)) / base / MAGIC_SCALE;
    result.min(0x7FFF_FFFF) as u32
}

/// Split a memory write into bursts that stay inside one bank
///
/// Yields `(address, byte range)` pairs.
pub fn bursts(start: u16, len: usize) -> impl Iterator<Item = (u16, core::ops::Range<usize>)> {
    let mut done = 0usize;
    core::iter::from_fn(move || {
        if done >= len {
            return None;
        }
        let addr = usize::from(start) + done;
        let room = MEM_BANK_SIZE - addr % MEM_BANK_SIZE;
        let n = (len - done).min(MAX_SERIAL_WRITE).min(room);
        let range = done..done + n;
        done += n;
        Some((addr as u16, range))
    })
}
