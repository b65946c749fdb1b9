// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Constants and bus-facing traits shared by the rest of the crate.
//!
//! The Unit Thermal2 is an MLX90640 paired with a small microcontroller that does the calibration
//! math, keeps a few summary statistics, and drives a buzzer, an RGB LED and a button. All of that
//! is exposed as a flat, byte-addressed register map. Register indices are a single byte, and the
//! module auto-increments its internal read pointer, so a block can be read in one go (or in
//! several consecutive reads).
use core::ops::RangeInclusive;

use crate::clock::pixel_read_clock;
use crate::register::RefreshRate;

/// The I²C address the module uses out of the factory.
pub const DEFAULT_ADDRESS: u8 = 0x32;

/// The range of addresses the module will accept when [changing its
/// address][crate::Thermal2Driver::change_address].
pub const VALID_ADDRESSES: RangeInclusive<u8> = 0x08..=0x77;

/// The two identification bytes found at offsets 4 and 5 of the status register.
pub const DEVICE_ID: [u8; 2] = [0x90, 0x64];

/// The number of pixels in each frame read from the module.
///
/// The MLX90640 inside the module is 32×24, but only one subpage (half of the pixels) is updated
/// each frame.
pub const NUM_PIXELS: usize = 384;

/// The largest read the module will service in one go, in bytes.
pub const PIXEL_CHUNK_LENGTH: usize = 128;

/// How many reads it takes to pull a full frame of pixel data off the module.
pub const PIXEL_CHUNK_COUNT: usize = NUM_PIXELS * 2 / PIXEL_CHUNK_LENGTH;

/// Check whether the module would accept `address` as its new I²C address.
pub fn is_valid_address(address: u8) -> bool {
    VALID_ADDRESSES.contains(&address)
}

/// Access to the clock rate of an I²C bus.
///
/// `embedded-hal` doesn't have a way to change the bus speed after the bus has been created, but
/// the module needs a faster clock to keep up with its higher refresh rates. Implement this for
/// your bus (a no-op implementation that just remembers the value is fine for buses with a fixed
/// speed).
pub trait BusClock {
    /// The current clock rate, in Hz.
    fn bus_clock(&self) -> u32;

    /// Change the clock rate, in Hz.
    fn set_bus_clock(&mut self, frequency: u32);
}

impl<T: BusClock + ?Sized> BusClock for &mut T {
    fn bus_clock(&self) -> u32 {
        (**self).bus_clock()
    }

    fn set_bus_clock(&mut self, frequency: u32) {
        (**self).set_bus_clock(frequency)
    }
}

/// Settings for talking to a module.
///
/// Higher refresh rates move more data per second, so while polling a frame the bus is sped up to
/// the fastest of the [rate the refresh rate needs][crate::clock::pixel_read_clock],
/// `pixel_read_clock` and `bus_clock`. Frame reads never run slower than the rest of the traffic,
/// which always uses `bus_clock`.
///
/// Rough guide for `pixel_read_clock`: 16Hz needs 200kHz, 32Hz needs 400kHz and 64Hz needs 800kHz.
/// Above 400kHz the error rate will depend a lot on the cabling and what else is on the bus.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thermal2Config {
    /// The I²C address of the module.
    pub address: u8,

    /// Clock rate for identification and configuration traffic, in Hz.
    pub bus_clock: u32,

    /// The minimum clock rate used while reading a frame, in Hz.
    pub pixel_read_clock: u32,
}

impl Thermal2Config {
    /// Standard mode (100kHz) for everything except frame reads, which run at 400kHz.
    pub const STANDARD: Self = Self {
        address: DEFAULT_ADDRESS,
        bus_clock: 100_000,
        pixel_read_clock: 400_000,
    };

    /// Fast mode (400kHz) for everything.
    pub const FAST: Self = Self {
        address: DEFAULT_ADDRESS,
        bus_clock: 400_000,
        pixel_read_clock: 400_000,
    };

    /// The clock rate used while polling a frame at `rate`.
    pub fn poll_clock(&self, rate: RefreshRate) -> u32 {
        pixel_read_clock(rate, self.bus_clock.max(self.pixel_read_clock))
    }

    /// The same settings, but for a module at a different address.
    pub const fn with_address(self, address: u8) -> Self {
        Self { address, ..self }
    }
}

impl Default for Thermal2Config {
    fn default() -> Self {
        Self::FAST
    }
}
