//! Glue between `linux-embedded-hal` and the driver, shared by the examples.
use std::path::Path;

use anyhow::Context;
use embedded_hal::blocking::i2c;
use linux_embedded_hal::I2cdev;
use unit_thermal2::BusClock;

/// An I²C bus on Linux.
///
/// Linux sets the bus speed when the controller is configured (usually in the device tree), so
/// the clock rate is only recorded here. For 16Hz and faster refresh rates, make sure the bus is
/// configured for at least the rate given by `unit_thermal2::clock::pixel_read_clock`.
pub struct LinuxBus {
    device: I2cdev,
    clock: u32,
}

impl LinuxBus {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let device = I2cdev::new(path)
            .with_context(|| format!("{} should be an I²C controller", path.display()))?;
        Ok(Self {
            device,
            clock: 100_000,
        })
    }
}

impl BusClock for LinuxBus {
    fn bus_clock(&self) -> u32 {
        self.clock
    }

    fn set_bus_clock(&mut self, frequency: u32) {
        self.clock = frequency;
    }
}

impl i2c::Write for LinuxBus {
    type Error = <I2cdev as i2c::Write>::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        i2c::Write::write(&mut self.device, address, bytes)
    }
}

impl i2c::WriteRead for LinuxBus {
    type Error = <I2cdev as i2c::WriteRead>::Error;

    fn write_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        i2c::WriteRead::write_read(&mut self.device, address, bytes, buffer)
    }
}

impl i2c::Transactional for LinuxBus {
    type Error = <I2cdev as i2c::Transactional>::Error;

    fn exec<'a>(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'a>],
    ) -> Result<(), Self::Error> {
        i2c::Transactional::exec(&mut self.device, address, operations)
    }
}

/// Parse an I²C address, either in decimal or hexadecimal with a leading "0x".
pub fn parse_address(arg: &str) -> anyhow::Result<u8> {
    let address = match arg.strip_prefix("0x") {
        Some(hex_digits) => u8::from_str_radix(hex_digits, 16)?,
        None => arg.parse()?,
    };
    Ok(address)
}
