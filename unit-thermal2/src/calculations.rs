// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Conversions between the module's raw temperature values and degrees Celsius.
//!
//! The module does all of the calibration math itself, so unlike a bare MLX90640 there's very
//! little left to do here. Raw values are unsigned fixed point with 7 fractional bits and an
//! offset of 64℃, covering -64℃ to just under 448℃ in steps of 1/128℃.
use num_traits::Float;

/// The number of raw steps per degree Celsius.
const STEPS_PER_DEGREE: f32 = 128.0;

/// The temperature a raw value of 0 represents.
const OFFSET: f32 = 64.0;

/// Convert a raw temperature value into degrees Celsius.
pub fn raw_to_celsius(raw: u16) -> f32 {
    f32::from(raw) / STEPS_PER_DEGREE - OFFSET
}

/// Convert a temperature in degrees Celsius to the closest raw value.
///
/// Temperatures outside of what the module can represent are clamped to 0 (-64℃) or
/// `u16::MAX` (just under 448℃). `NaN` maps to 0.
pub fn celsius_to_raw(celsius: f32) -> u16 {
    let scaled = Float::round((celsius + OFFSET) * STEPS_PER_DEGREE);
    // Written so that NaN falls into the first branch.
    if !(scaled > 0.0) {
        0
    } else if scaled >= f32::from(u16::MAX) {
        u16::MAX
    } else {
        scaled as u16
    }
}

/// Convert a raw temperature *difference* into degrees Celsius.
///
/// Differences don't have the 64℃ offset applied.
pub fn raw_difference_to_celsius(raw: u16) -> f32 {
    f32::from(raw) / STEPS_PER_DEGREE
}
