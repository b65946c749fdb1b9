// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A pure-Rust driver for the M5Stack Unit Thermal2 thermal camera module over I²C.
//!
//! The Unit Thermal2 pairs an MLX90640 thermopile array with a microcontroller that does all of
//! the calibration math, so frames come off of the module as temperatures already. The module
//! also has a buzzer, an RGB LED, a button, and can raise alarms when the scene gets too hot or
//! too cold. Everything is exposed as a small register map, which this crate reads and writes.
//!
//! This library uses the [`embedded-hal`][embedded-hal] I²C traits, so it should work on any
//! platform with an `embedded-hal` I²C implementation. The bus also has to implement
//! [`BusClock`], as faster refresh rates need a faster bus clock while frames are read. This
//! library is `no_std` compatible and does not allocate.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/0.2/embedded_hal/blocking/i2c/index.html
//!
//! # Example
//! ```no_run
//! # use embedded_hal::blocking::{delay::DelayMs, i2c};
//! # use unit_thermal2::BusClock;
//! use unit_thermal2::{LibraryError, Thermal2Config, Thermal2Driver, Error};
//!
//! # fn run<I2C, D>(bus: I2C, delay: &mut D) -> Result<(), Error<I2C>>
//! # where
//! #     I2C: i2c::WriteRead + i2c::Write + i2c::Transactional + BusClock,
//! #     D: DelayMs<u8>,
//! # {
//! let mut camera = Thermal2Driver::new(bus, Thermal2Config::default());
//! // Give the module a moment to come up
//! camera.begin(delay)?;
//! loop {
//!     match camera.poll() {
//!         Ok(()) => {
//!             let frame = camera.frame();
//!             let hottest = frame.overview().highest();
//!             // ...do something with the hot spot, or frame.temperatures()
//!             # let _ = hottest;
//!         }
//!         // The default refresh rate is 2Hz, so most polls will find nothing new.
//!         Err(Error::LibraryError(LibraryError::FrameNotReady)) => (),
//!         Err(err) => return Err(err),
//!     }
//!     # break;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Frames
//! The MLX90640 inside the module only updates one half of its pixels (a
//! [subpage][register::Subpage]) each frame, so each [`TemperatureFrame`] has 384 pixels. Along with
//! the pixels, the module provides some [summary statistics][frame::Overview] for each frame.
//!
//! # Configuration
//! The driver keeps a copy of the module's configuration, which is loaded when the module is
//! identified. Each of the `set_*` methods on [`Thermal2Driver`] updates that copy and writes the
//! entire configuration block back to the module. The module saves its configuration, so
//! settings (including [the I²C address][Thermal2Driver::change_address]) survive power cycles.

#![no_std]
#![allow(clippy::float_cmp)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("Either the 'std' or 'libm' feature must be enabled.");

pub mod calculations;
pub mod clock;
pub mod common;
#[doc(hidden)]
pub mod driver;
#[doc(hidden)]
pub mod error;
pub mod frame;
pub mod register;
mod util;

#[cfg(test)]
mod test;

pub use common::{BusClock, Thermal2Config};
#[doc(inline)]
pub use driver::{SessionState, Thermal2Driver};
#[doc(inline)]
pub use error::{Error, LibraryError};
pub use frame::{Hotspot, Overview, TemperatureFrame};
pub use register::{
    AlarmFlags, AlarmKind, AlarmRegister, ButtonState, MonitorArea, RefreshRate, Rgb,
};
