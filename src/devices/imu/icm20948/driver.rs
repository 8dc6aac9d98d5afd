//! ICM-20948 DMP driver
//!
//! Brings the sensor up, uploads the DMP image, configures the DMP for the
//! Quat6 (game rotation vector) output and then pulls fused orientation
//! frames out of the DMP FIFO over I2C, keeping the stream in step.
//!
//! This driver is platform-agnostic and works with any
//! `embedded_hal_async::i2c::I2c` implementation.

use super::dmp::{self, bursts, MAX_SERIAL_WRITE};
use super::registers::{self, FIFO_HEADER_BYTES, MAX_FRAME_BYTES};
use crate::devices::traits::{
    DmpHeader, DmpHeader2, DmpPacket, FaultKind, FusionError, FusionSource, FOOTER_BYTES,
};
use embedded_hal_async::i2c::I2c;
use sightline_core::orientation::RawQuaternion;

/// Maximum consecutive errors before marking sensor unhealthy
const MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// FIFO count re-reads while waiting for the rest of a frame
const MAX_COUNT_RETRIES: u32 = 3;

/// ICM-20948 DMP driver
///
/// # Type Parameters
///
/// * `I2C` - Any type implementing `embedded_hal_async::i2c::I2c`
pub struct Icm20948Dmp<I2C>
where
    I2C: I2c,
{
    i2c: I2C,
    address: u8,
    healthy: bool,
    error_count: u32,
    started: bool,
}

impl<I2C> Icm20948Dmp<I2C>
where
    I2C: I2c,
{
    /// Create a driver; nothing is sent until [`start`](Self::start)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            healthy: false,
            error_count: 0,
            started: false,
        }
    }

    /// Bring the sensor up, load `image` into the DMP and start Quat6 output
    ///
    /// Leaves register bank 0 selected, which the FIFO reader relies on. A
    /// read-back mismatch after the upload fails with
    /// [`FaultKind::ImageMismatch`] and leaves the DMP disabled.
    pub async fn start(&mut self, image: &[u8]) -> Result<(), FusionError> {
        self.started = false;
        self.select_bank(registers::BANK_0).await?;

        let whoami = self.read_register(registers::WHO_AM_I).await?;
        if whoami != registers::ICM20948_WHO_AM_I_VALUE {
            crate::log_warn!("ICM-20948 WHO_AM_I mismatch: {:#x}", whoami);
        }
        if image.len() != dmp::DMP3_IMAGE_LEN {
            crate::log_warn!("DMP image is {} bytes", image.len());
        }

        // Wake up with gyro and accel on, I2C master duty cycled
        self.write_register(registers::PWR_MGMT_1, registers::PWR_MGMT_1_CLKSEL_AUTO)
            .await?;
        self.write_register(registers::PWR_MGMT_2, registers::PWR_MGMT_2_SENSORS_ON)
            .await?;
        self.write_register(registers::LP_CONFIG, registers::LP_CONFIG_I2C_MST_CYCLE)
            .await?;
        self.modify_user_ctrl(0, registers::USER_CTRL_FIFO_EN | registers::USER_CTRL_DMP_EN)
            .await?;

        self.select_bank(registers::BANK_2).await?;
        self.write_register(registers::GYRO_CONFIG_1, registers::GYRO_CONFIG_1_2000DPS_DLPF)
            .await?;
        self.write_register(registers::ACCEL_CONFIG, registers::ACCEL_CONFIG_4G)
            .await?;
        self.write_register(registers::GYRO_SMPLRT_DIV, dmp::GYRO_SAMPLE_DIV)
            .await?;
        self.write_register(registers::ACCEL_SMPLRT_DIV_1, 0).await?;
        self.write_register(registers::ACCEL_SMPLRT_DIV_2, dmp::ACCEL_SAMPLE_DIV)
            .await?;
        self.select_bank(registers::BANK_0).await?;

        // The DMP owns the FIFO; no raw sensor data goes in
        self.write_register(registers::FIFO_EN_1, 0).await?;
        self.write_register(registers::FIFO_EN_2, 0).await?;
        self.write_register(registers::INT_ENABLE_1, 0).await?;
        self.reset_fifo().await?;

        self.load_image(image).await?;

        self.select_bank(registers::BANK_2).await?;
        self.write_block(
            registers::PRGM_START_ADDRH,
            &dmp::DMP_START_ADDRESS.to_be_bytes(),
        )
        .await?;
        self.select_bank(registers::BANK_0).await?;
        self.write_register(registers::HW_FIX_DISABLE, registers::HW_FIX_DISABLE_VALUE)
            .await?;
        self.write_register(
            registers::SINGLE_FIFO_PRIORITY_SEL,
            registers::SINGLE_FIFO_PRIORITY_VALUE,
        )
        .await?;

        for (addr, bytes) in dmp::DMP_CONFIG {
            self.write_mem(addr, bytes).await?;
        }

        self.select_bank(registers::BANK_1).await?;
        let pll = self.read_register(registers::TIMEBASE_CORRECTION_PLL).await?;
        self.select_bank(registers::BANK_0).await?;
        let gyro_sf = dmp::gyro_scale_factor(dmp::GYRO_SAMPLE_DIV, dmp::GYRO_LEVEL_2000DPS, pll);
        self.write_mem(dmp::GYRO_SF, &gyro_sf.to_be_bytes()).await?;

        // Quat6 only, at the full sensor rate
        let quat6 = dmp::DATA_OUTPUT_QUAT6.to_be_bytes();
        self.write_mem(dmp::DATA_OUT_CTL1, &quat6).await?;
        self.write_mem(dmp::DATA_OUT_CTL2, &[0, 0]).await?;
        self.write_mem(dmp::DATA_INTR_CTL, &quat6).await?;
        self.write_mem(
            dmp::MOTION_EVENT_CTL,
            &dmp::MOTION_EVENT_ACCEL_GYRO_CALIBR.to_be_bytes(),
        )
        .await?;
        self.write_mem(dmp::DATA_RDY_STATUS, &dmp::DATA_READY_GYRO_ACCEL.to_be_bytes())
            .await?;
        self.write_mem(dmp::ODR_CNTR_QUAT6, &[0, 0]).await?;

        self.modify_user_ctrl(registers::USER_CTRL_FIFO_EN, 0).await?;
        self.modify_user_ctrl(registers::USER_CTRL_DMP_EN, 0).await?;
        self.reset_dmp().await?;
        self.reset_fifo().await?;

        self.started = true;
        self.healthy = true;
        crate::log_info!("ICM-20948 DMP streaming, gyro SF {}", gyro_sf);
        Ok(())
    }

    /// Upload the DMP image and read it back
    async fn load_image(&mut self, image: &[u8]) -> Result<(), FusionError> {
        self.write_mem(dmp::DMP_LOAD_START, image).await?;

        let mut readback = [0u8; MAX_SERIAL_WRITE];
        for (addr, range) in bursts(dmp::DMP_LOAD_START, image.len()) {
            let chunk = &mut readback[..range.len()];
            self.read_mem(addr, chunk).await?;
            if *chunk != image[range] {
                crate::log_error!("DMP image mismatch at {:#x}", addr);
                return Err(FusionError::Fault(FaultKind::ImageMismatch));
            }
        }
        crate::log_debug!("DMP image loaded, {} bytes", image.len());
        Ok(())
    }

    async fn select_bank(&mut self, bank: u8) -> Result<(), FusionError> {
        self.write_register(registers::REG_BANK_SEL, bank).await
    }

    /// Point the memory port at `addr`
    async fn set_mem_address(&mut self, addr: u16) -> Result<(), FusionError> {
        let [bank, offset] = addr.to_be_bytes();
        self.write_register(registers::MEM_BANK_SEL, bank).await?;
        self.write_register(registers::MEM_START_ADDR, offset).await
    }

    async fn write_mem(&mut self, addr: u16, data: &[u8]) -> Result<(), FusionError> {
        for (chunk_addr, range) in bursts(addr, data.len()) {
            self.set_mem_address(chunk_addr).await?;
            self.write_block(registers::MEM_R_W, &data[range]).await?;
        }
        Ok(())
    }

    async fn read_mem(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), FusionError> {
        for (chunk_addr, range) in bursts(addr, buf.len()) {
            self.set_mem_address(chunk_addr).await?;
            self.read_bytes(registers::MEM_R_W, &mut buf[range]).await?;
        }
        Ok(())
    }

    /// Set and clear bits in USER_CTRL
    async fn modify_user_ctrl(&mut self, set: u8, clear: u8) -> Result<(), FusionError> {
        let ctrl = self.read_register(registers::USER_CTRL).await?;
        self.write_register(registers::USER_CTRL, (ctrl & !clear) | set)
            .await
    }

    async fn reset_dmp(&mut self) -> Result<(), FusionError> {
        self.modify_user_ctrl(registers::USER_CTRL_DMP_RST, 0).await
    }

    async fn reset_fifo(&mut self) -> Result<(), FusionError> {
        self.write_register(registers::FIFO_RST, registers::FIFO_RST_ASSERT)
            .await?;
        self.write_register(registers::FIFO_RST, registers::FIFO_RST_RELEASE)
            .await
    }

    fn record_error(&mut self) -> FusionError {
        self.error_count += 1;
        if self.error_count >= MAX_CONSECUTIVE_ERRORS {
            self.healthy = false;
        }
        FusionError::Fault(FaultKind::Bus)
    }

    async fn read_register(&mut self, reg: u8) -> Result<u8, FusionError> {
        let mut buf = [0u8; 1];
        self.read_bytes(reg, &mut buf).await?;
        Ok(buf[0])
    }

    async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), FusionError> {
        self.write_block(reg, &[value]).await
    }

    /// Burst write of at most `MAX_SERIAL_WRITE` bytes starting at `reg`
    async fn write_block(&mut self, reg: u8, data: &[u8]) -> Result<(), FusionError> {
        let mut buf = [0u8; 1 + MAX_SERIAL_WRITE];
        buf[0] = reg;
        buf[1..=data.len()].copy_from_slice(data);
        match self.i2c.write(self.address, &buf[..=data.len()]).await {
            Ok(()) => {
                self.error_count = 0;
                self.healthy = true;
                Ok(())
            }
            Err(_) => Err(self.record_error()),
        }
    }

    async fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), FusionError> {
        match self.i2c.write_read(self.address, &[reg], buf).await {
            Ok(()) => {
                self.error_count = 0;
                self.healthy = true;
                Ok(())
            }
            Err(_) => Err(self.record_error()),
        }
    }

    /// Bytes currently queued in the FIFO
    pub async fn fifo_count(&mut self) -> Result<usize, FusionError> {
        let mut buf = [0u8; 2];
        self.read_bytes(registers::FIFO_COUNTH, &mut buf).await?;
        Ok(usize::from(u16::from_be_bytes(buf) & 0x1FFF))
    }

    /// Wait (by re-reading the count) until `needed` bytes are queued
    async fn ensure_available(
        &mut self,
        available: &mut usize,
        needed: usize,
    ) -> Result<(), FusionError> {
        let mut retries = 0;
        while *available < needed {
            if retries == MAX_COUNT_RETRIES {
                return Err(FusionError::Fault(FaultKind::IncompleteFrame));
            }
            *available = self.fifo_count().await?;
            retries += 1;
        }
        Ok(())
    }

    async fn read_fifo(&mut self, buf: &mut [u8]) -> Result<(), FusionError> {
        self.read_bytes(registers::FIFO_R_W, buf).await
    }

    async fn read_word(&mut self, available: &mut usize) -> Result<u16, FusionError> {
        self.ensure_available(available, FIFO_HEADER_BYTES).await?;
        let mut word = [0u8; FIFO_HEADER_BYTES];
        self.read_fifo(&mut word).await?;
        *available -= FIFO_HEADER_BYTES;
        Ok(u16::from_be_bytes(word))
    }

    /// Pop one frame from the FIFO
    async fn read_frame(&mut self) -> Result<DmpPacket, FusionError> {
        let mut available = self.fifo_count().await?;
        if available < FIFO_HEADER_BYTES {
            return Err(FusionError::NoData);
        }

        let status = self.read_register(registers::INT_STATUS_2).await?;
        if status & registers::INT_STATUS_2_FIFO_OVERFLOW != 0 {
            return Err(FusionError::Fault(FaultKind::Overflow));
        }

        let header = DmpHeader::from_bits_retain(self.read_word(&mut available).await?);
        let header2 = if header.contains(DmpHeader::HEADER2) {
            DmpHeader2::from_bits_retain(self.read_word(&mut available).await?)
        } else {
            DmpHeader2::empty()
        };

        let frame_len = header.payload_len() + header2.payload_len() + FOOTER_BYTES;
        let mut frame = [0u8; MAX_FRAME_BYTES];
        let frame = &mut frame[..frame_len];
        self.ensure_available(&mut available, frame_len).await?;
        self.read_fifo(frame).await?;

        let quat6 = header
            .quat6_offset()
            .map(|offset| parse_quat6(&frame[offset..offset + 12]));

        Ok(DmpPacket { header, quat6 })
    }

    pub fn is_healthy(&self) -> bool {
        self.started && self.healthy
    }

    pub fn address(&self) -> u8 {
        self.address
    }
}

/// Decode three big-endian Q30 components
fn parse_quat6(bytes: &[u8]) -> RawQuaternion {
    let component = |i: usize| {
        i32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
    };
    RawQuaternion::new(component(0), component(4), component(8))
}

impl<I2C> FusionSource for Icm20948Dmp<I2C>
where
    I2C: I2c,
{
    async fn read_packet(&mut self) -> Result<DmpPacket, FusionError> {
        self.read_frame().await
    }

    async fn resync(&mut self) {
        if let Err(e) = self.reset_fifo().await {
            crate::log_warn!("FIFO reset failed: {}", e);
        }
        if let Err(e) = self.reset_dmp().await {
            crate::log_warn!("DMP reset failed: {}", e);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockI2c;

    const ADDR: u8 = registers::ICM20948_ADDR_ALT;

    fn q30_bytes(q1: i32, q2: i32, q3: i32) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&q1.to_be_bytes());
        out[4..8].copy_from_slice(&q2.to_be_bytes());
        out[8..12].copy_from_slice(&q3.to_be_bytes());
        out
    }

    fn quat6_frame(i2c: &mut MockI2c, q: [i32; 3]) {
        i2c.push_fifo(&DmpHeader::QUAT6.bits().to_be_bytes());
        i2c.push_fifo(&q30_bytes(q[0], q[1], q[2]));
        i2c.push_fifo(&[0x00, 0x00]);
    }

    /// Synthetic image long enough to cross a memory bank
    fn image() -> [u8; 300] {
        core::array::from_fn(|i| (i * 7 + 3) as u8)
    }

    async fn started(i2c: MockI2c) -> Icm20948Dmp<MockI2c> {
        let mut dmp = Icm20948Dmp::new(i2c, ADDR);
        dmp.start(&image()).await.unwrap();
        dmp
    }

    #[tokio::test]
    async fn start_enables_fifo_and_dmp() {
        let mut i2c = MockI2c::new(ADDR);
        i2c.set_register(registers::WHO_AM_I, registers::ICM20948_WHO_AM_I_VALUE);
        let dmp = started(i2c).await;

        let ctrl = dmp.i2c.register(registers::USER_CTRL);
        assert_eq!(
            ctrl & (registers::USER_CTRL_DMP_EN | registers::USER_CTRL_FIFO_EN),
            registers::USER_CTRL_DMP_EN | registers::USER_CTRL_FIFO_EN
        );
        assert_eq!(dmp.i2c.fifo_resets(), 2);
        assert_eq!(dmp.i2c.bank(), 0);
        assert!(dmp.is_healthy());
    }

    #[tokio::test]
    async fn start_uploads_image_across_banks() {
        let dmp = started(MockI2c::new(ADDR)).await;
        let image = image();

        assert_eq!(dmp.i2c.memory(dmp::DMP_LOAD_START, image.len()), &image[..]);
        assert_eq!(dmp.i2c.bank_register(2, registers::PRGM_START_ADDRH), 0x10);
        assert_eq!(dmp.i2c.bank_register(2, registers::PRGM_START_ADDRH + 1), 0x00);
    }

    #[tokio::test]
    async fn start_configures_sensors() {
        let dmp = started(MockI2c::new(ADDR)).await;

        assert_eq!(dmp.i2c.register(registers::PWR_MGMT_1), 0x01);
        assert_eq!(dmp.i2c.register(registers::PWR_MGMT_2), 0x40);
        assert_eq!(dmp.i2c.register(registers::HW_FIX_DISABLE), 0x48);
        assert_eq!(dmp.i2c.register(registers::SINGLE_FIFO_PRIORITY_SEL), 0xE4);
        assert_eq!(dmp.i2c.register(registers::FIFO_EN_1), 0);
        assert_eq!(dmp.i2c.bank_register(2, registers::GYRO_CONFIG_1), 0x07);
        assert_eq!(dmp.i2c.bank_register(2, registers::ACCEL_CONFIG), 0x02);
        assert_eq!(dmp.i2c.bank_register(2, registers::GYRO_SMPLRT_DIV), 19);
        assert_eq!(dmp.i2c.bank_register(2, registers::ACCEL_SMPLRT_DIV_2), 19);
    }

    #[tokio::test]
    async fn start_selects_quat6_output() {
        let dmp = started(MockI2c::new(ADDR)).await;

        assert_eq!(dmp.i2c.memory(dmp::DATA_OUT_CTL1, 2), &[0x08, 0x00]);
        assert_eq!(dmp.i2c.memory(dmp::DATA_OUT_CTL2, 2), &[0x00, 0x00]);
        assert_eq!(dmp.i2c.memory(dmp::DATA_INTR_CTL, 2), &[0x08, 0x00]);
        assert_eq!(dmp.i2c.memory(dmp::MOTION_EVENT_CTL, 2), &[0x03, 0x00]);
        assert_eq!(dmp.i2c.memory(dmp::DATA_RDY_STATUS, 2), &[0x00, 0x03]);
        assert_eq!(dmp.i2c.memory(dmp::ODR_QUAT6, 2), &[0x00, 0x00]);
        assert_eq!(dmp.i2c.memory(dmp::B2S_MTX_11, 4), &[0x40, 0, 0, 0]);
    }

    #[tokio::test]
    async fn gyro_scale_factor_uses_pll_trim() {
        let mut i2c = MockI2c::new(ADDR);
        i2c.set_bank_register(1, registers::TIMEBASE_CORRECTION_PLL, 0x85);
        let dmp = started(i2c).await;

        let expected = dmp::gyro_scale_factor(19, 3, 0x85).to_be_bytes();
        assert_eq!(dmp.i2c.memory(dmp::GYRO_SF, 4), &expected);
    }

    #[tokio::test]
    async fn image_readback_mismatch_fails_start() {
        let mut i2c = MockI2c::new(ADDR);
        i2c.set_corrupt_memory_reads(true);
        let mut dmp = Icm20948Dmp::new(i2c, ADDR);

        assert_eq!(
            dmp.start(&image()).await,
            Err(FusionError::Fault(FaultKind::ImageMismatch))
        );
        assert!(!dmp.is_healthy());
        assert_eq!(dmp.i2c.register(registers::USER_CTRL) & registers::USER_CTRL_DMP_EN, 0);
    }

    #[tokio::test]
    async fn empty_fifo_reports_no_data() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        assert_eq!(dmp.read_packet().await, Err(FusionError::NoData));
    }

    #[tokio::test]
    async fn reads_quat6_frame() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        quat6_frame(&mut dmp.i2c, [1 << 29, -(1 << 28), 12345]);

        let packet = dmp.read_packet().await.unwrap();
        assert_eq!(packet.header, DmpHeader::QUAT6);
        assert_eq!(
            packet.quat6,
            Some(RawQuaternion::new(1 << 29, -(1 << 28), 12345))
        );
        assert_eq!(dmp.i2c.fifo_len(), 0);
    }

    #[tokio::test]
    async fn consecutive_frames_stay_aligned() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        quat6_frame(&mut dmp.i2c, [1, 2, 3]);
        quat6_frame(&mut dmp.i2c, [4, 5, 6]);

        let first = dmp.read_packet().await.unwrap();
        let second = dmp.read_packet().await.unwrap();
        assert_eq!(first.quat6, Some(RawQuaternion::new(1, 2, 3)));
        assert_eq!(second.quat6, Some(RawQuaternion::new(4, 5, 6)));
        assert_eq!(dmp.read_packet().await, Err(FusionError::NoData));
    }

    #[tokio::test]
    async fn quat6_after_other_payloads_and_header2() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        let header = DmpHeader::ACCEL | DmpHeader::QUAT6 | DmpHeader::HEADER2;
        dmp.i2c.push_fifo(&header.bits().to_be_bytes());
        dmp.i2c
            .push_fifo(&DmpHeader2::ACCEL_ACCURACY.bits().to_be_bytes());
        dmp.i2c.push_fifo(&[0xAA; 6]);
        dmp.i2c.push_fifo(&q30_bytes(7, 8, 9));
        dmp.i2c.push_fifo(&[0x00, 0x03]);
        dmp.i2c.push_fifo(&[0x00, 0x00]);

        let packet = dmp.read_packet().await.unwrap();
        assert_eq!(packet.quat6, Some(RawQuaternion::new(7, 8, 9)));
        assert_eq!(dmp.i2c.fifo_len(), 0);
    }

    #[tokio::test]
    async fn frame_without_quat6() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        dmp.i2c.push_fifo(&DmpHeader::ACCEL.bits().to_be_bytes());
        dmp.i2c.push_fifo(&[0u8; 6 + 2]);

        let packet = dmp.read_packet().await.unwrap();
        assert_eq!(packet.header, DmpHeader::ACCEL);
        assert!(packet.quat6.is_none());
    }

    #[tokio::test]
    async fn truncated_frame_is_incomplete() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        dmp.i2c.push_fifo(&DmpHeader::QUAT6.bits().to_be_bytes());
        dmp.i2c.push_fifo(&[0u8; 5]);

        assert_eq!(
            dmp.read_packet().await,
            Err(FusionError::Fault(FaultKind::IncompleteFrame))
        );
    }

    #[tokio::test]
    async fn overflow_status_is_a_fault() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        quat6_frame(&mut dmp.i2c, [0, 0, 0]);
        dmp.i2c.set_register(registers::INT_STATUS_2, 0x01);

        assert_eq!(
            dmp.read_packet().await,
            Err(FusionError::Fault(FaultKind::Overflow))
        );
    }

    #[tokio::test]
    async fn bus_error_is_a_fault_and_degrades_health() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        dmp.i2c.set_fail(true);

        for _ in 0..MAX_CONSECUTIVE_ERRORS {
            assert_eq!(
                dmp.read_packet().await,
                Err(FusionError::Fault(FaultKind::Bus))
            );
        }
        assert!(!dmp.is_healthy());
    }

    #[tokio::test]
    async fn resync_clears_fifo_and_resets_dmp() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        dmp.i2c.push_fifo(&[0x08, 0x00, 0x01]);
        let resets_before = dmp.i2c.fifo_resets();

        dmp.resync().await;

        assert_eq!(dmp.i2c.fifo_len(), 0);
        assert_eq!(dmp.i2c.fifo_resets(), resets_before + 1);
        assert_ne!(dmp.i2c.register(registers::USER_CTRL) & registers::USER_CTRL_DMP_RST, 0);
    }

    #[tokio::test]
    async fn resync_tolerates_bus_errors() {
        let mut dmp = started(MockI2c::new(ADDR)).await;
        dmp.i2c.set_fail(true);
        dmp.resync().await;
    }
}
