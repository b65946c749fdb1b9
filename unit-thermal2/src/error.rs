// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
#[cfg(feature = "std")]
extern crate std;

use core::fmt;

use embedded_hal::blocking::i2c;

/// Problems the driver detects itself, independent of the bus.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LibraryError {
    /// The device answered, but the identification bytes didn't match a Unit Thermal2.
    UnknownDevice { id: [u8; 2] },

    /// The requested I²C address is outside of the range the module accepts (0x08–0x77).
    InvalidAddress(u8),

    /// The module hasn't finished capturing a new frame yet.
    FrameNotReady,

    /// The captured frame failed validation (the lowest temperature must be lower than the
    /// highest temperature).
    InvalidFrame { lowest: u16, highest: u16 },
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::UnknownDevice { id } => write!(
                f,
                "unexpected identification bytes {:#04x} {:#04x}",
                id[0], id[1]
            ),
            LibraryError::InvalidAddress(address) => {
                write!(f, "I²C address {:#04x} is outside of 0x08-0x77", address)
            }
            LibraryError::FrameNotReady => write!(f, "no new frame is available"),
            LibraryError::InvalidFrame { lowest, highest } => write!(
                f,
                "frame lowest value ({}) is not below the highest value ({})",
                lowest, highest
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LibraryError {}

/// Everything that can go wrong talking to a Unit Thermal2.
///
/// Bus failures are split up by which `embedded-hal` trait reported them, since each trait has
/// its own associated error type.
pub enum Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write + i2c::Transactional,
{
    /// A plain write (config, alarm, or acknowledge) failed on the bus.
    I2cWriteError(<I2C as i2c::Write>::Error),

    /// A register read failed on the bus.
    I2cWriteReadError(<I2C as i2c::WriteRead>::Error),

    /// The chunked overview and pixel read failed on the bus.
    I2cTransactionError(<I2C as i2c::Transactional>::Error),

    /// The bus was fine, but the module's answer (or the request) wasn't.
    LibraryError(LibraryError),
}

impl<I2C> Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write + i2c::Transactional,
{
    /// Whether this error came from the bus (as opposed to the library rejecting something).
    pub fn is_transport_error(&self) -> bool {
        !matches!(self, Error::LibraryError(_))
    }
}

// Written out by hand so only the bus error types need Debug, not the bus itself.
impl<I2C> fmt::Debug for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write + i2c::Transactional,
    <I2C as i2c::Write>::Error: fmt::Debug,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Transactional>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteError(bus_err) => f
                .debug_tuple("Error::I2cWriteError")
                .field(bus_err)
                .finish(),
            Error::I2cWriteReadError(bus_err) => f
                .debug_tuple("Error::I2cWriteReadError")
                .field(bus_err)
                .finish(),
            Error::I2cTransactionError(bus_err) => f
                .debug_tuple("Error::I2cTransactionError")
                .field(bus_err)
                .finish(),
            Error::LibraryError(err) => f.debug_tuple("Error::LibraryError").field(err).finish(),
        }
    }
}

impl<I2C> fmt::Display for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write + i2c::Transactional,
    <I2C as i2c::Write>::Error: fmt::Debug,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Transactional>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteError(bus_err) => write!(f, "I²C write failed: {:?}", bus_err),
            Error::I2cWriteReadError(bus_err) => {
                write!(f, "I²C register read failed: {:?}", bus_err)
            }
            Error::I2cTransactionError(bus_err) => {
                write!(f, "I²C frame transaction failed: {:?}", bus_err)
            }
            Error::LibraryError(err) => fmt::Display::fmt(err, f),
        }
    }
}

#[cfg(feature = "std")]
impl<I2C> std::error::Error for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write + i2c::Transactional,
    <I2C as i2c::Write>::Error: std::error::Error + 'static,
    <I2C as i2c::WriteRead>::Error: std::error::Error + 'static,
    <I2C as i2c::Transactional>::Error: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::I2cWriteError(bus_err) => Some(bus_err),
            Error::I2cWriteReadError(bus_err) => Some(bus_err),
            Error::I2cTransactionError(bus_err) => Some(bus_err),
            Error::LibraryError(err) => Some(err),
        }
    }
}

impl<I2C> From<LibraryError> for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write + i2c::Transactional,
{
    fn from(err: LibraryError) -> Self {
        Self::LibraryError(err)
    }
}
