//! ICM-20948 register subset used by the DMP driver
//!
//! REG_BANK_SEL is mapped at 0x7F in every bank. Bring-up touches banks 0,
//! 1 and 2; the FIFO reader runs entirely in bank 0, so `start()` always
//! leaves bank 0 selected.

// =============================================================================
// I2C Addresses
// =============================================================================

/// Default I2C address (AD0 = LOW)
pub const ICM20948_ADDR: u8 = 0x68;

/// Alternate I2C address (AD0 = HIGH), used by the SparkFun breakout
pub const ICM20948_ADDR_ALT: u8 = 0x69;

// =============================================================================
// Bank Selection
// =============================================================================

pub const REG_BANK_SEL: u8 = 0x7F;

pub const BANK_0: u8 = 0x00;
pub const BANK_1: u8 = 0x10;
pub const BANK_2: u8 = 0x20;

// =============================================================================
// Bank 0 Registers
// =============================================================================

pub const WHO_AM_I: u8 = 0x00;

pub const USER_CTRL: u8 = 0x03;

/// Duty-cycle mode control
pub const LP_CONFIG: u8 = 0x05;

pub const PWR_MGMT_1: u8 = 0x06;

pub const PWR_MGMT_2: u8 = 0x07;

pub const INT_ENABLE_1: u8 = 0x11;

/// Interrupt status 2 (FIFO overflow bits)
pub const INT_STATUS_2: u8 = 0x1B;

/// Per-FIFO priority select used by the DMP
pub const SINGLE_FIFO_PRIORITY_SEL: u8 = 0x26;

pub const FIFO_EN_1: u8 = 0x66;

pub const FIFO_EN_2: u8 = 0x67;

pub const FIFO_RST: u8 = 0x68;

pub const FIFO_COUNTH: u8 = 0x70;

pub const FIFO_R_W: u8 = 0x72;

pub const HW_FIX_DISABLE: u8 = 0x75;

/// Offset within the selected DMP memory bank
pub const MEM_START_ADDR: u8 = 0x7C;

/// DMP memory data port (auto-increments `MEM_START_ADDR`)
pub const MEM_R_W: u8 = 0x7D;

/// DMP memory bank (256 bytes each)
pub const MEM_BANK_SEL: u8 = 0x7E;

// =============================================================================
// Bank 1 Registers
// =============================================================================

/// Factory PLL trim, feeds the DMP gyro scale factor
pub const TIMEBASE_CORRECTION_PLL: u8 = 0x28;

// =============================================================================
// Bank 2 Registers
// =============================================================================

pub const GYRO_SMPLRT_DIV: u8 = 0x00;

pub const GYRO_CONFIG_1: u8 = 0x01;

pub const ACCEL_SMPLRT_DIV_1: u8 = 0x10;

pub const ACCEL_SMPLRT_DIV_2: u8 = 0x11;

pub const ACCEL_CONFIG: u8 = 0x14;

/// DMP program start address, high byte first
pub const PRGM_START_ADDRH: u8 = 0x50;

// =============================================================================
// Bit Definitions
// =============================================================================

pub const USER_CTRL_DMP_EN: u8 = 0x80;
pub const USER_CTRL_FIFO_EN: u8 = 0x40;
pub const USER_CTRL_I2C_MST_EN: u8 = 0x20;
pub const USER_CTRL_DMP_RST: u8 = 0x08;

/// PWR_MGMT_1: auto-select the best clock source, sleep off
pub const PWR_MGMT_1_CLKSEL_AUTO: u8 = 0x01;

/// PWR_MGMT_2: accel and gyro on, pressure sensor (unpopulated) off
pub const PWR_MGMT_2_SENSORS_ON: u8 = 0x40;

/// LP_CONFIG: I2C master runs in duty-cycled mode
pub const LP_CONFIG_I2C_MST_CYCLE: u8 = 0x40;

/// GYRO_CONFIG_1: ±2000 dps, DLPF enabled
pub const GYRO_CONFIG_1_2000DPS_DLPF: u8 = 0x07;

/// ACCEL_CONFIG: ±4 g
pub const ACCEL_CONFIG_4G: u8 = 0x02;

/// HW_FIX_DISABLE value required before the DMP runs
pub const HW_FIX_DISABLE_VALUE: u8 = 0x48;

/// SINGLE_FIFO_PRIORITY_SEL value required before the DMP runs
pub const SINGLE_FIFO_PRIORITY_VALUE: u8 = 0xE4;

/// Assert reset on all FIFOs
pub const FIFO_RST_ASSERT: u8 = 0x1F;

/// Release reset, keeping FIFO 0 in reset (DMP uses FIFO 1..4)
pub const FIFO_RST_RELEASE: u8 = 0x1E;

/// Any FIFO overflow bit in INT_STATUS_2
pub const INT_STATUS_2_FIFO_OVERFLOW: u8 = 0x1F;

pub const ICM20948_WHO_AM_I_VALUE: u8 = 0xEA;

// =============================================================================
// FIFO Geometry
// =============================================================================

/// Header word size
pub const FIFO_HEADER_BYTES: usize = 2;

/// Largest frame the DMP can emit: both header words, every payload, footer
pub const MAX_FRAME_BYTES: usize = 2 + 2 + 112 + 18 + 2;
