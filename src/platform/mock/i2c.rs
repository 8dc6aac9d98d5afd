//! Mock I2C register file for testing
//!
//! Emulates a single ICM-20948 on the bus: four banked register arrays
//! switched by `REG_BANK_SEL`, a byte FIFO behind `FIFO_R_W`, the FIFO
//! count pair, the FIFO reset register and DMP memory behind the
//! `MEM_BANK_SEL`/`MEM_START_ADDR`/`MEM_R_W` port. Reads of `INT_STATUS_2`
//! clear it, as on the real part.

use crate::devices::imu::icm20948::registers;
use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use heapless::Deque;

/// Bytes the emulated FIFO can hold
pub const MOCK_FIFO_CAPACITY: usize = 512;

/// Emulated DMP memory (64 banks of 256 bytes)
pub const MOCK_DMP_MEMORY: usize = 64 * 256;

/// Mock I2C implementation
#[derive(Debug)]
pub struct MockI2c {
    address: u8,
    registers: [[u8; 128]; 4],
    bank: usize,
    pointer: u8,
    fifo: Deque<u8, MOCK_FIFO_CAPACITY>,
    fifo_resets: u32,
    memory: [u8; MOCK_DMP_MEMORY],
    corrupt_memory_reads: bool,
    fail: bool,
}

impl MockI2c {
    /// Create a device answering at `address`
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [[0; 128]; 4],
            bank: 0,
            pointer: 0,
            fifo: Deque::new(),
            fifo_resets: 0,
            memory: [0; MOCK_DMP_MEMORY],
            corrupt_memory_reads: false,
            fail: false,
        }
    }

    /// Queue bytes as if the DMP had written them
    pub fn push_fifo(&mut self, bytes: &[u8]) {
        for &b in bytes {
            let _ = self.fifo.push_back(b);
        }
    }

    pub fn fifo_len(&self) -> usize {
        self.fifo.len()
    }

    /// Number of times the FIFO reset bits were asserted
    pub fn fifo_resets(&self) -> u32 {
        self.fifo_resets
    }

    /// Bank 0 register value
    pub fn register(&self, reg: u8) -> u8 {
        self.bank_register(0, reg)
    }

    /// Set a bank 0 register
    pub fn set_register(&mut self, reg: u8, value: u8) {
        self.set_bank_register(0, reg, value);
    }

    pub fn bank_register(&self, bank: usize, reg: u8) -> u8 {
        self.registers[bank & 0x03][usize::from(reg & 0x7F)]
    }

    pub fn set_bank_register(&mut self, bank: usize, reg: u8, value: u8) {
        self.registers[bank & 0x03][usize::from(reg & 0x7F)] = value;
    }

    /// Currently selected user bank
    pub fn bank(&self) -> usize {
        self.bank
    }

    /// DMP memory starting at `addr`
    pub fn memory(&self, addr: u16, len: usize) -> &[u8] {
        let start = usize::from(addr);
        &self.memory[start..start + len]
    }

    /// Flip every bit read back through `MEM_R_W`
    pub fn set_corrupt_memory_reads(&mut self, corrupt: bool) {
        self.corrupt_memory_reads = corrupt;
    }

    /// Make every following transaction fail with a bus error
    pub fn set_fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// Data ports keep their address during bursts
    fn is_port(&self, reg: u8) -> bool {
        self.bank == 0 && matches!(reg, registers::FIFO_R_W | registers::MEM_R_W)
    }

    /// Absolute DMP memory index, advancing the start address
    fn next_memory_index(&mut self) -> usize {
        let bank = usize::from(self.register(registers::MEM_BANK_SEL));
        let offset = self.register(registers::MEM_START_ADDR);
        self.set_register(registers::MEM_START_ADDR, offset.wrapping_add(1));
        (bank * 256 + usize::from(offset)) % MOCK_DMP_MEMORY
    }

    fn write_byte(&mut self, reg: u8, value: u8) {
        if reg == registers::REG_BANK_SEL {
            self.bank = usize::from(value >> 4) & 0x03;
            for bank in 0..4 {
                self.set_bank_register(bank, reg, value);
            }
            return;
        }
        if self.bank == 0 {
            match reg {
                registers::FIFO_RST if value == registers::FIFO_RST_ASSERT => {
                    self.fifo.clear();
                    self.fifo_resets += 1;
                }
                registers::MEM_R_W => {
                    let index = self.next_memory_index();
                    self.memory[index] = value;
                    return;
                }
                _ => {}
            }
        }
        self.set_bank_register(self.bank, reg, value);
    }

    fn read_byte(&mut self, reg: u8, index: usize) -> u8 {
        if self.bank != 0 {
            return self.bank_register(self.bank, reg.wrapping_add(index as u8));
        }
        let count = self.fifo.len().to_be_bytes();
        match reg {
            registers::FIFO_R_W => self.fifo.pop_front().unwrap_or(0),
            registers::MEM_R_W => {
                let value = self.memory[self.next_memory_index()];
                if self.corrupt_memory_reads {
                    !value
                } else {
                    value
                }
            }
            registers::FIFO_COUNTH => match index {
                0 => count[count.len() - 2] & 0x1F,
                _ => count[count.len() - 1],
            },
            registers::INT_STATUS_2 => {
                let value = self.register(reg);
                self.set_register(reg, 0);
                value
            }
            _ => self.register(reg.wrapping_add(index as u8)),
        }
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(ErrorKind::Bus);
        }
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for op in operations.iter_mut() {
            match op {
                Operation::Write(data) => {
                    if let Some((&reg, values)) = data.split_first() {
                        self.pointer = reg;
                        let port = self.is_port(reg);
                        for (i, &value) in values.iter().enumerate() {
                            let target = if port { reg } else { reg.wrapping_add(i as u8) };
                            self.write_byte(target, value);
                        }
                    }
                }
                Operation::Read(buf) => {
                    let reg = self.pointer;
                    for (i, slot) in buf.iter_mut().enumerate() {
                        *slot = self.read_byte(reg, i);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_register() {
        let mut i2c = MockI2c::new(0x69);
        i2c.write(0x69, &[0x03, 0x40]).await.unwrap();

        let mut buf = [0u8; 1];
        i2c.write_read(0x69, &[0x03], &mut buf).await.unwrap();
        assert_eq!(buf, [0x40]);
    }

    #[tokio::test]
    async fn fifo_count_and_drain() {
        let mut i2c = MockI2c::new(0x69);
        i2c.push_fifo(&[1, 2, 3]);

        let mut count = [0u8; 2];
        i2c.write_read(0x69, &[registers::FIFO_COUNTH], &mut count)
            .await
            .unwrap();
        assert_eq!(count, [0, 3]);

        let mut data = [0u8; 4];
        i2c.write_read(0x69, &[registers::FIFO_R_W], &mut data)
            .await
            .unwrap();
        assert_eq!(data, [1, 2, 3, 0]);
        assert_eq!(i2c.fifo_len(), 0);
    }

    #[tokio::test]
    async fn fifo_reset_clears_queue() {
        let mut i2c = MockI2c::new(0x69);
        i2c.push_fifo(&[9; 10]);
        i2c.write(0x69, &[registers::FIFO_RST, registers::FIFO_RST_ASSERT])
            .await
            .unwrap();
        assert_eq!(i2c.fifo_len(), 0);
        assert_eq!(i2c.fifo_resets(), 1);
    }

    #[tokio::test]
    async fn bank_select_switches_register_files() {
        let mut i2c = MockI2c::new(0x69);
        i2c.write(0x69, &[registers::REG_BANK_SEL, registers::BANK_2])
            .await
            .unwrap();
        i2c.write(0x69, &[0x11, 19]).await.unwrap();
        assert_eq!(i2c.bank(), 2);
        assert_eq!(i2c.bank_register(2, 0x11), 19);
        assert_eq!(i2c.register(0x11), 0);
    }

    #[tokio::test]
    async fn memory_port_bursts_auto_increment() {
        let mut i2c = MockI2c::new(0x69);
        i2c.write(0x69, &[registers::MEM_BANK_SEL, 0x01]).await.unwrap();
        i2c.write(0x69, &[registers::MEM_START_ADDR, 0x10]).await.unwrap();
        i2c.write(0x69, &[registers::MEM_R_W, 0xA1, 0xB2, 0xC3])
            .await
            .unwrap();
        assert_eq!(i2c.memory(0x110, 3), &[0xA1, 0xB2, 0xC3]);

        i2c.write(0x69, &[registers::MEM_START_ADDR, 0x11]).await.unwrap();
        let mut buf = [0u8; 2];
        i2c.write_read(0x69, &[registers::MEM_R_W], &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, [0xB2, 0xC3]);
    }

    #[tokio::test]
    async fn wrong_address_is_nacked() {
        let mut i2c = MockI2c::new(0x69);
        let result = i2c.write(0x68, &[0x03, 0x00]).await;
        assert_eq!(
            result,
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
    }

    #[tokio::test]
    async fn failing_bus() {
        let mut i2c = MockI2c::new(0x69);
        i2c.set_fail(true);
        assert_eq!(i2c.write(0x69, &[0x03, 0x00]).await, Err(ErrorKind::Bus));
    }
}
