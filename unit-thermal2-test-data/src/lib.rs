// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Canned register contents for a Unit Thermal2 module.
//!
//! These are shared between the unit tests of `unit-thermal2` (where they back the mock I²C
//! device) and the benchmarks. All multi-byte values are little-endian, same as on the device.
#![no_std]

/// The factory default I²C address of the module.
pub const DEVICE_ADDRESS: u8 = 0x32;

/// The number of bytes read during identification (status through the highest alarm block).
pub const REGISTER_BLOCK_LENGTH: usize = 0x38;

/// The number of bytes in the temperature overview block.
pub const OVERVIEW_LENGTH: usize = 16;

/// The number of bytes of pixel data following the overview block.
pub const PIXEL_DATA_LENGTH: usize = 384 * 2;

/// A register snapshot as read from a module during identification.
///
/// * Status: no button events, firmware 1.2.
/// * Config: address 0x32, host clears the frame-ready flag, 2Hz, noise filter 4, the full
///   monitor area, no alarms enabled, 4kHz buzzer at volume 0x40, dim blue LED.
/// * Lowest alarm: 0℃, 1kHz, 200ms interval, blue.
/// * Highest alarm: 100℃, 3kHz, 100ms interval, red.
#[rustfmt::skip]
pub const REGISTER_BLOCK: [u8; REGISTER_BLOCK_LENGTH] = [
    // 0x00 status
    0x00, 0x00, 0x00, 0x00, 0x90, 0x64, 0x01, 0x02,
    // 0x08 config
    0x32, 0xCD, 0x04, 0x02, 0x04, 0x00, 0x00, 0x00,
    0xBF, 0x00, 0xA0, 0x0F, 0x40, 0x00, 0x00, 0x20,
    // 0x18 reserved
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    // 0x20 lowest alarm
    0x00, 0x20, 0xE8, 0x03, 0x14, 0x00, 0x00, 0xFF,
    // 0x28 reserved
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    // 0x30 highest alarm
    0x00, 0x52, 0xB8, 0x0B, 0x0A, 0xFF, 0x00, 0x00,
];

/// Refresh control contents with a new frame of subpage 1 available.
pub const REFRESH_CONTROL_READY: [u8; 2] = [0x01, 0x01];

/// Refresh control contents while the module is still capturing.
pub const REFRESH_CONTROL_NOT_READY: [u8; 2] = [0x00, 0x00];

/// The raw value of the first pixel in [`frame_pixels`], 25℃.
pub const FIRST_PIXEL_RAW: u16 = 0x2C80;

/// Overview block matching [`frame_pixels`].
///
/// Median 0x2D3F, average 0x2D40, most different by 383 at (31, 23), lowest 0x2C80 at (0, 0) and
/// highest 0x2DFF at (31, 23).
#[rustfmt::skip]
pub const FRAME_OVERVIEW: [u8; OVERVIEW_LENGTH] = [
    0x3F, 0x2D,
    0x40, 0x2D,
    0x7F, 0x01, 0x1F, 0x17,
    0x80, 0x2C, 0x00, 0x00,
    0xFF, 0x2D, 0x1F, 0x17,
];

/// An overview block where the lowest and highest values are the same.
#[rustfmt::skip]
pub const UNIFORM_OVERVIEW: [u8; OVERVIEW_LENGTH] = [
    0x80, 0x2C,
    0x80, 0x2C,
    0x00, 0x00, 0x00, 0x00,
    0x80, 0x2C, 0x00, 0x00,
    0x80, 0x2C, 0x00, 0x00,
];

/// Pixel data where each pixel is one raw step (1/128℃) warmer than the last, starting at 25℃.
pub fn frame_pixels() -> [u8; PIXEL_DATA_LENGTH] {
    frame_pixels_from(FIRST_PIXEL_RAW)
}

/// Pixel data ramping up by one raw step per pixel from `start`.
pub fn frame_pixels_from(start: u16) -> [u8; PIXEL_DATA_LENGTH] {
    let mut pixels = [0u8; PIXEL_DATA_LENGTH];
    pixels
        .chunks_exact_mut(2)
        .enumerate()
        .for_each(|(index, pixel)| {
            let raw = start.wrapping_add(index as u16);
            pixel.copy_from_slice(&raw.to_le_bytes());
        });
    pixels
}
