// 24-series I2C EEPROM (24C32 and up)
//
// 16-bit big-endian word address, 32-byte pages, 5 ms self-timed write
// cycle. The 4-byte float slots are 4-aligned so a slot never crosses a
// page boundary.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::board::NvStorage;

pub const DEFAULT_ADDRESS: u8 = 0x50;
pub const PAGE_SIZE: u16 = 32;
const WRITE_CYCLE_MS: u32 = 5;

#[derive(Debug)]
pub enum Error<E> {
    I2c(E),
    /// Slot straddles a page boundary; the chip would wrap inside the page.
    Unaligned(u16),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "eeprom i2c: {:?}", e),
            Error::Unaligned(addr) => write!(f, "eeprom write crosses page at {:#06x}", addr),
        }
    }
}

pub struct Eeprom<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Eeprom<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self { i2c, delay, address }
    }

    pub fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &addr.to_be_bytes(), buf)
            .map_err(Error::I2c)
    }

    /// Write one 4-byte slot and wait out the write cycle.
    pub fn write_word(&mut self, addr: u16, bytes: [u8; 4]) -> Result<(), Error<I2C::Error>> {
        if addr % PAGE_SIZE > PAGE_SIZE - 4 {
            return Err(Error::Unaligned(addr));
        }
        let [hi, lo] = addr.to_be_bytes();
        let frame = [hi, lo, bytes[0], bytes[1], bytes[2], bytes[3]];
        self.i2c.write(self.address, &frame).map_err(Error::I2c)?;
        self.delay.delay_ms(WRITE_CYCLE_MS);
        Ok(())
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C: I2c, D: DelayNs> NvStorage for Eeprom<I2C, D> {
    fn read_f32(&mut self, addr: u16) -> f32 {
        let mut buf = [0u8; 4];
        match self.read(addr, &mut buf) {
            Ok(()) => f32::from_le_bytes(buf),
            Err(e) => {
                warn!("eeprom: read {:#06x}: {}", addr, e);
                f32::NAN
            }
        }
    }

    fn write_f32(&mut self, addr: u16, value: f32) {
        if let Err(e) = self.write_word(addr, value.to_le_bytes()) {
            warn!("eeprom: write {:#06x}: {}", addr, e);
        }
    }
}
