// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Temperature frames read from the module.
use crate::calculations::{raw_difference_to_celsius, raw_to_celsius};
use crate::common::NUM_PIXELS;
use crate::register::{Register, Subpage};
use crate::util::Buffer;

/// A single notable point in a frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hotspot {
    pub(crate) raw: u16,
    pub(crate) x: u8,
    pub(crate) y: u8,
}

impl Hotspot {
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// The column of the point, 0 to 31.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// The row of the point, 0 to 23.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// The temperature at this point in ℃.
    pub fn temperature(&self) -> f32 {
        raw_to_celsius(self.raw)
    }

    fn read(buf: &mut &[u8]) -> Self {
        Self {
            raw: buf.get_u16(),
            x: buf.get_u8(),
            y: buf.get_u8(),
        }
    }
}

/// The summary statistics the module calculates for each frame (0x70).
///
/// Only the pixels within the [monitor area][crate::register::MonitorArea] are considered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overview {
    pub(crate) median: u16,
    pub(crate) average: u16,
    /// The pixel that differs the most from the average. The raw value is a difference, so it
    /// doesn't have the usual offset.
    pub(crate) most_difference: Hotspot,
    pub(crate) lowest: Hotspot,
    pub(crate) highest: Hotspot,
}

impl Overview {
    pub fn median_raw(&self) -> u16 {
        self.median
    }

    pub fn average_raw(&self) -> u16 {
        self.average
    }

    pub fn lowest_raw(&self) -> u16 {
        self.lowest.raw
    }

    pub fn highest_raw(&self) -> u16 {
        self.highest.raw
    }

    pub fn most_difference_raw(&self) -> u16 {
        self.most_difference.raw
    }

    pub fn median_temperature(&self) -> f32 {
        raw_to_celsius(self.median)
    }

    pub fn average_temperature(&self) -> f32 {
        raw_to_celsius(self.average)
    }

    pub fn lowest_temperature(&self) -> f32 {
        self.lowest.temperature()
    }

    pub fn highest_temperature(&self) -> f32 {
        self.highest.temperature()
    }

    /// How far (in ℃) the most different pixel is from the average.
    pub fn most_difference_temperature(&self) -> f32 {
        raw_difference_to_celsius(self.most_difference.raw)
    }

    pub fn lowest(&self) -> Hotspot {
        self.lowest
    }

    pub fn highest(&self) -> Hotspot {
        self.highest
    }

    /// The location and raw *difference* of the most different pixel.
    ///
    /// [`Hotspot::temperature`] is meaningless for this point, use
    /// [`most_difference_temperature`][Overview::most_difference_temperature] instead.
    pub fn most_difference(&self) -> Hotspot {
        self.most_difference
    }

    /// A frame is only usable if the lowest temperature is below the highest.
    pub fn is_valid(&self) -> bool {
        self.lowest.raw < self.highest.raw
    }
}

impl Register for Overview {
    const LENGTH: usize = 16;
}

impl<'a> From<&'a [u8]> for Overview {
    /// Decode the overview block.
    ///
    /// This method will `panic` if there aren't enough bytes in the slice.
    fn from(buf: &'a [u8]) -> Self {
        let mut buf = &buf[..Self::LENGTH];
        let median = buf.get_u16();
        let average = buf.get_u16();
        let most_difference = Hotspot::read(&mut buf);
        let lowest = Hotspot::read(&mut buf);
        let highest = Hotspot::read(&mut buf);
        Self {
            median,
            average,
            most_difference,
            lowest,
            highest,
        }
    }
}

/// One frame of temperature data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemperatureFrame {
    overview: Overview,
    pixels: [u16; NUM_PIXELS],
    subpage: Subpage,
}

impl TemperatureFrame {
    /// An all-zero frame, used until the first frame has been read.
    pub const fn new() -> Self {
        Self {
            overview: Overview {
                median: 0,
                average: 0,
                most_difference: Hotspot { raw: 0, x: 0, y: 0 },
                lowest: Hotspot { raw: 0, x: 0, y: 0 },
                highest: Hotspot { raw: 0, x: 0, y: 0 },
            },
            pixels: [0; NUM_PIXELS],
            subpage: Subpage::Zero,
        }
    }

    /// Replace the contents of this frame with freshly read data.
    ///
    /// `pixel_data` is the little-endian pixel block as read from 0x80. This method will `panic`
    /// if `pixel_data` is shorter than `NUM_PIXELS * 2` bytes.
    pub fn update(&mut self, overview: Overview, pixel_data: &[u8], subpage: Subpage) {
        let pixel_data = &pixel_data[..(NUM_PIXELS * 2)];
        self.pixels
            .iter_mut()
            .zip(pixel_data.chunks_exact(2))
            .for_each(|(pixel, bytes)| *pixel = u16::from_le_bytes([bytes[0], bytes[1]]));
        self.overview = overview;
        self.subpage = subpage;
    }

    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    pub fn subpage(&self) -> Subpage {
        self.subpage
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// The raw value of a pixel, or 0 if `index` is out of range.
    pub fn pixel_raw(&self, index: usize) -> u16 {
        self.pixels.get(index).copied().unwrap_or(0)
    }

    /// The temperature of a pixel in ℃.
    ///
    /// Out of range indices give the temperature of a raw 0 (-64℃).
    pub fn pixel_temperature(&self, index: usize) -> f32 {
        raw_to_celsius(self.pixel_raw(index))
    }

    /// Iterate over the temperature of each pixel in ℃.
    pub fn temperatures(&self) -> impl Iterator<Item = f32> + '_ {
        self.pixels.iter().copied().map(raw_to_celsius)
    }

    pub fn lowest_temperature(&self) -> f32 {
        self.overview.lowest_temperature()
    }

    pub fn highest_temperature(&self) -> f32 {
        self.overview.highest_temperature()
    }

    pub fn median_temperature(&self) -> f32 {
        self.overview.median_temperature()
    }

    pub fn average_temperature(&self) -> f32 {
        self.overview.average_temperature()
    }

    pub fn most_difference_temperature(&self) -> f32 {
        self.overview.most_difference_temperature()
    }
}

impl Default for TemperatureFrame {
    fn default() -> Self {
        Self::new()
    }
}
