// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Bus clock selection.
use core::ops::{Deref, DerefMut};

use crate::common::BusClock;
use crate::register::RefreshRate;

/// The bus clock needed to keep up with the slowest refresh rate (0.5Hz), in Hz.
///
/// Each step up in refresh rate doubles the amount of pixel data per second, and so doubles the
/// required clock.
const BASE_PIXEL_READ_CLOCK: u32 = 6_250;

/// The clock rate to use while reading frames at the given refresh rate.
///
/// This is the faster of what the refresh rate needs and the configured `minimum`.
/// ```
/// # use unit_thermal2::{clock::pixel_read_clock, RefreshRate};
/// assert_eq!(pixel_read_clock(RefreshRate::Half, 0), 6_250);
/// assert_eq!(pixel_read_clock(RefreshRate::SixtyFour, 400_000), 800_000);
/// assert_eq!(pixel_read_clock(RefreshRate::Two, 400_000), 400_000);
/// ```
pub fn pixel_read_clock(rate: RefreshRate, minimum: u32) -> u32 {
    let needed = BASE_PIXEL_READ_CLOCK << u8::from(rate);
    needed.max(minimum)
}

/// Temporarily run a bus at a different clock rate.
///
/// The previous clock rate is recorded when the guard is created, and put back when the guard is
/// dropped, no matter how the enclosing function returns. The guard dereferences to the bus.
pub struct ClockGuard<'a, B: BusClock> {
    bus: &'a mut B,
    previous: u32,
}

impl<'a, B: BusClock> ClockGuard<'a, B> {
    pub fn new(bus: &'a mut B, frequency: u32) -> Self {
        let previous = bus.bus_clock();
        bus.set_bus_clock(frequency);
        Self { bus, previous }
    }

    /// The clock rate that will be restored.
    pub fn previous(&self) -> u32 {
        self.previous
    }
}

impl<B: BusClock> Deref for ClockGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &Self::Target {
        self.bus
    }
}

impl<B: BusClock> DerefMut for ClockGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.bus
    }
}

impl<B: BusClock> Drop for ClockGuard<'_, B> {
    fn drop(&mut self) {
        self.bus.set_bus_clock(self.previous);
    }
}
