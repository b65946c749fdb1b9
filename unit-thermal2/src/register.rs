// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use core::ops::{BitAnd, BitOr, BitOrAssign, Not};

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::calculations::{celsius_to_raw, raw_to_celsius};
use crate::common::{DEFAULT_ADDRESS, DEVICE_ID};
use crate::util::{is_bit_set, Buffer, BufferMut};

/// Trait for common register block functionality.
///
/// Register blocks are decoded field by field from the bytes read off of the module, so nothing
/// depends on the host's byte order or struct layout.
pub trait Register: for<'a> From<&'a [u8]> {
    /// The size of this register block in bytes.
    const LENGTH: usize;
}

/// Register blocks that can be written back to the module.
pub trait WriteRegister: Register {
    /// Encode this register block into the first [`LENGTH`][Register::LENGTH] bytes of `buf`.
    ///
    /// This method will `panic` if `buf` is too short.
    fn encode(&self, buf: &mut [u8]);
}

/// The starting index of each register block in the module's memory map.
// NOTE: To make it easier to compare against the register map, discriminant values should
// *always* be explicitly written out.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RegisterIndex {
    Status = 0x00,
    Config = 0x08,
    LowestAlarm = 0x20,
    HighestAlarm = 0x30,
    RefreshControl = 0x6E,
    /// The temperature summary. The pixel data follows immediately after.
    Overview = 0x70,
    Pixels = 0x80,
}

/// The state of the button on the module.
///
/// The module latches button events until the controller writes the same bits back to the status
/// register. [`Thermal2Driver::poll`][crate::Thermal2Driver::poll] takes care of that.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    /// The button is currently held down (bit 0). This is a level, not an event.
    pub(crate) is_pressed: bool,

    /// The button went down (bit 1).
    pub(crate) was_pressed: bool,

    /// The button came up (bit 2).
    pub(crate) was_released: bool,

    /// The button was clicked, a short press (bit 3).
    pub(crate) was_clicked: bool,

    /// The button was held for at least 500ms (bit 4).
    pub(crate) was_held: bool,
}

impl ButtonState {
    pub fn is_pressed(&self) -> bool {
        self.is_pressed
    }

    pub fn is_released(&self) -> bool {
        !self.is_pressed
    }

    pub fn was_pressed(&self) -> bool {
        self.was_pressed
    }

    pub fn was_released(&self) -> bool {
        self.was_released
    }

    pub fn was_clicked(&self) -> bool {
        self.was_clicked
    }

    pub fn was_held(&self) -> bool {
        self.was_held
    }

    /// Whether any of the latched event flags are set.
    pub fn has_events(&self) -> bool {
        self.was_pressed || self.was_released || self.was_clicked || self.was_held
    }

    /// The flags packed back into the register's bit layout.
    pub fn bits(&self) -> u8 {
        u8::from(*self)
    }
}

impl From<u8> for ButtonState {
    fn from(raw: u8) -> Self {
        Self {
            is_pressed: is_bit_set(raw, 0),
            was_pressed: is_bit_set(raw, 1),
            was_released: is_bit_set(raw, 2),
            was_clicked: is_bit_set(raw, 3),
            was_held: is_bit_set(raw, 4),
        }
    }
}

impl From<ButtonState> for u8 {
    fn from(state: ButtonState) -> Self {
        (state.is_pressed as u8)
            | (state.was_pressed as u8) << 1
            | (state.was_released as u8) << 2
            | (state.was_clicked as u8) << 3
            | (state.was_held as u8) << 4
    }
}

/// A set of temperature alarms.
///
/// The module computes four statistics for each frame (lowest, median, average and highest) and
/// can raise an alarm when any of them drops below the [lowest alarm][AlarmKind::Lowest]
/// threshold or rises above the [highest alarm][AlarmKind::Highest] threshold. The same bit layout
/// is used both for enabling alarms and for reporting which alarms are active.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmFlags(u8);

impl AlarmFlags {
    pub const LOWEST_BELOW_LOW: Self = Self(1 << 0);
    pub const MEDIAN_BELOW_LOW: Self = Self(1 << 1);
    pub const AVERAGE_BELOW_LOW: Self = Self(1 << 2);
    pub const HIGHEST_BELOW_LOW: Self = Self(1 << 3);
    pub const LOWEST_ABOVE_HIGH: Self = Self(1 << 4);
    pub const MEDIAN_ABOVE_HIGH: Self = Self(1 << 5);
    pub const AVERAGE_ABOVE_HIGH: Self = Self(1 << 6);
    pub const HIGHEST_ABOVE_HIGH: Self = Self(1 << 7);

    /// All of the alarms tied to the lowest alarm threshold.
    pub const ALL_LOW: Self = Self(0x0F);
    /// All of the alarms tied to the highest alarm threshold.
    pub const ALL_HIGH: Self = Self(0xF0);
    pub const ALL: Self = Self(0xFF);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is also set in `self`.
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for AlarmFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AlarmFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs)
    }
}

impl BitAnd for AlarmFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl Not for AlarmFlags {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// The function control byte of the configuration register.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FunctionControl {
    /// Sound the buzzer when no alarm is active (bit 0).
    pub(crate) buzzer_enabled: bool,

    /// Light the LED when no alarm is active (bit 1).
    pub(crate) led_enabled: bool,

    /// Disable the module clearing the frame-ready flag by itself (bit 2).
    ///
    /// When set, the controller has to clear the flag after reading each frame, and the driver
    /// also checks each frame for consistency.
    pub(crate) auto_clear_disabled: bool,

    // Bits 3-7 aren't documented, so keep whatever the module had.
    reserved: u8,
}

impl FunctionControl {
    const RESERVED_MASK: u8 = 0xF8;

    pub fn buzzer_enabled(&self) -> bool {
        self.buzzer_enabled
    }

    pub fn led_enabled(&self) -> bool {
        self.led_enabled
    }

    pub fn auto_clear_disabled(&self) -> bool {
        self.auto_clear_disabled
    }
}

impl From<u8> for FunctionControl {
    fn from(raw: u8) -> Self {
        Self {
            buzzer_enabled: is_bit_set(raw, 0),
            led_enabled: is_bit_set(raw, 1),
            auto_clear_disabled: is_bit_set(raw, 2),
            reserved: raw & Self::RESERVED_MASK,
        }
    }
}

impl From<FunctionControl> for u8 {
    fn from(control: FunctionControl) -> Self {
        (control.buzzer_enabled as u8)
            | (control.led_enabled as u8) << 1
            | (control.auto_clear_disabled as u8) << 2
            | control.reserved
    }
}

/// The possible refresh rates of the camera.
///
/// Faster refresh rates need a faster I²C bus to keep up, see
/// [`pixel_read_clock`][crate::clock::pixel_read_clock].
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RefreshRate {
    /// 0.5 Hz, one frame every two seconds.
    Half = 0,

    /// 1Hz.
    One = 1,

    /// 2Hz, the factory default.
    Two = 2,

    // 4Hz.
    Four = 3,

    // 8Hz.
    Eight = 4,

    // 16 Hz.
    Sixteen = 5,

    // 32Hz.
    ThirtyTwo = 6,

    // 64Hz.
    SixtyFour = 7,
}

/// The bits of config offset 3 that hold the refresh rate.
const REFRESH_RATE_MASK: u8 = 0x07;

/// The bits of config offset 4 that hold the noise filter level.
const NOISE_FILTER_MASK: u8 = 0x0F;

impl RefreshRate {
    /// Decode the refresh rate from the low three bits of a byte.
    pub(crate) fn from_bits(raw: u8) -> Self {
        match raw & REFRESH_RATE_MASK {
            0 => Self::Half,
            1 => Self::One,
            2 => Self::Two,
            3 => Self::Four,
            4 => Self::Eight,
            5 => Self::Sixteen,
            6 => Self::ThirtyTwo,
            _ => Self::SixtyFour,
        }
    }

    /// Find the refresh rate matching a frequency in Hz.
    ///
    /// This will only work if the number *exactly* matches one of the rates.
    /// ```
    /// # use unit_thermal2::RefreshRate;
    /// assert_eq!(RefreshRate::from_hz(0.5), Some(RefreshRate::Half));
    /// assert_eq!(RefreshRate::from_hz(64.0), Some(RefreshRate::SixtyFour));
    /// assert!(RefreshRate::from_hz(3.0).is_none());
    /// ```
    #[allow(clippy::float_cmp)]
    pub fn from_hz(hz: f32) -> Option<Self> {
        (0..=7u8)
            .map(Self::from_bits)
            .find(|rate| rate.hz() == hz)
    }

    /// The refresh rate in Hz.
    pub fn hz(self) -> f32 {
        // 0.5 * 2^n
        f32::from(1u8 << u8::from(self)) / 2.0
    }
}

impl Default for RefreshRate {
    fn default() -> Self {
        Self::Two
    }
}

/// The area of the image used for the temperature statistics, centered on the image.
///
/// Both dimensions are in units of two pixels, less one, so 15×11 (the default) covers the entire
/// 32×24 image, while 7×7 covers the center 16×16 pixels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorArea {
    pub(crate) width: u8,
    pub(crate) height: u8,
}

impl MonitorArea {
    /// The largest value either dimension can hold.
    pub const MAX: u8 = 15;

    /// Create a new area, clamping each dimension to [`MAX`][MonitorArea::MAX].
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width: width.min(Self::MAX),
            height: height.min(Self::MAX),
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }
}

impl Default for MonitorArea {
    fn default() -> Self {
        Self::new(15, 11)
    }
}

impl From<u8> for MonitorArea {
    fn from(raw: u8) -> Self {
        Self {
            width: raw & 0x0F,
            height: raw >> 4,
        }
    }
}

impl From<MonitorArea> for u8 {
    fn from(area: MonitorArea) -> Self {
        area.width | area.height << 4
    }
}

/// An LED color.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(raw: [u8; 3]) -> Self {
        Self::new(raw[0], raw[1], raw[2])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.r, color.g, color.b]
    }
}

fn get_rgb(buf: &mut &[u8]) -> Rgb {
    Rgb::new(buf.get_u8(), buf.get_u8(), buf.get_u8())
}

/// Identify which subpage a frame covers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Subpage {
    #[default]
    Zero = 0,
    One = 1,
}

/// The status register block (0x00).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusRegister {
    /// The button state. Event flags are latched until written back.
    pub(crate) buttons: ButtonState,

    /// Which alarms are currently active.
    pub(crate) alarms: AlarmFlags,

    /// Two fixed bytes identifying the module, see [`DEVICE_ID`].
    pub(crate) device_id: [u8; 2],

    pub(crate) version_major: u8,

    pub(crate) version_minor: u8,
}

impl StatusRegister {
    pub fn buttons(&self) -> ButtonState {
        self.buttons
    }

    pub fn alarms(&self) -> AlarmFlags {
        self.alarms
    }

    pub fn device_id(&self) -> [u8; 2] {
        self.device_id
    }

    /// Whether the identification bytes are the ones a Unit Thermal2 reports.
    pub fn is_thermal2(&self) -> bool {
        self.device_id == DEVICE_ID
    }

    /// The firmware version as (major, minor).
    pub fn version(&self) -> (u8, u8) {
        (self.version_major, self.version_minor)
    }
}

impl Register for StatusRegister {
    const LENGTH: usize = 8;
}

impl<'a> From<&'a [u8]> for StatusRegister {
    /// Decode the status register.
    ///
    /// This method will `panic` if there aren't enough bytes in the slice.
    fn from(buf: &'a [u8]) -> Self {
        let mut buf = &buf[..Self::LENGTH];
        let buttons = ButtonState::from(buf.get_u8());
        let alarms = AlarmFlags::from_bits(buf.get_u8());
        // Two reserved bytes
        buf.advance(2);
        let device_id = [buf.get_u8(), buf.get_u8()];
        Self {
            buttons,
            alarms,
            device_id,
            version_major: buf.get_u8(),
            version_minor: buf.get_u8(),
        }
    }
}

/// The configuration register block (0x08).
///
/// The module persists this block, including the I²C address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRegister {
    /// The I²C address the module will use after the next power cycle.
    pub(crate) address: u8,

    /// The bitwise complement of `address`. The module ignores address changes where the two
    /// don't match.
    pub(crate) address_inverted: u8,

    pub(crate) function_control: FunctionControl,

    pub(crate) refresh_rate: RefreshRate,

    /// Noise filter strength, 0 (disabled) to 15.
    pub(crate) noise_filter: u8,

    // The bits of offsets 3 and 4 above the refresh rate and noise filter, written back unchanged.
    upper_bits: [u8; 2],

    // Offsets 5-7 are reserved, carry them through as-is.
    reserved: [u8; 3],

    pub(crate) monitor_area: MonitorArea,

    /// Which alarms are enabled.
    pub(crate) alarm_enable: AlarmFlags,

    /// Buzzer frequency in Hz when no alarm is active. 0 silences the buzzer.
    pub(crate) buzzer_frequency: u16,

    pub(crate) buzzer_volume: u8,

    /// LED color when no alarm is active.
    pub(crate) led: Rgb,
}

impl ConfigRegister {
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Whether the address and its complement agree.
    pub fn is_address_consistent(&self) -> bool {
        self.address_inverted == !self.address
    }

    /// Set the address, keeping the complement in sync.
    pub(crate) fn set_address(&mut self, address: u8) {
        self.address = address;
        self.address_inverted = !address;
    }

    pub fn function_control(&self) -> FunctionControl {
        self.function_control
    }

    pub fn refresh_rate(&self) -> RefreshRate {
        self.refresh_rate
    }

    pub fn noise_filter(&self) -> u8 {
        self.noise_filter
    }

    pub(crate) fn set_noise_filter(&mut self, level: u8) {
        self.noise_filter = level & NOISE_FILTER_MASK;
    }

    pub fn monitor_area(&self) -> MonitorArea {
        self.monitor_area
    }

    pub fn alarm_enable(&self) -> AlarmFlags {
        self.alarm_enable
    }

    pub fn buzzer_frequency(&self) -> u16 {
        self.buzzer_frequency
    }

    pub fn buzzer_volume(&self) -> u8 {
        self.buzzer_volume
    }

    pub fn led(&self) -> Rgb {
        self.led
    }
}

impl Default for ConfigRegister {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            address_inverted: !DEFAULT_ADDRESS,
            function_control: FunctionControl::default(),
            refresh_rate: RefreshRate::default(),
            noise_filter: 0,
            upper_bits: [0; 2],
            reserved: [0; 3],
            monitor_area: MonitorArea::default(),
            alarm_enable: AlarmFlags::empty(),
            buzzer_frequency: 0,
            buzzer_volume: 0,
            led: Rgb::default(),
        }
    }
}

impl Register for ConfigRegister {
    const LENGTH: usize = 16;
}

impl<'a> From<&'a [u8]> for ConfigRegister {
    /// Decode the configuration register.
    ///
    /// This method will `panic` if there aren't enough bytes in the slice.
    fn from(buf: &'a [u8]) -> Self {
        let mut buf = &buf[..Self::LENGTH];
        let address = buf.get_u8();
        let address_inverted = buf.get_u8();
        let function_control = FunctionControl::from(buf.get_u8());
        let refresh_byte = buf.get_u8();
        let noise_byte = buf.get_u8();
        let refresh_rate = RefreshRate::from_bits(refresh_byte);
        let noise_filter = noise_byte & NOISE_FILTER_MASK;
        let upper_bits = [refresh_byte & !REFRESH_RATE_MASK, noise_byte & !NOISE_FILTER_MASK];
        let reserved = [buf.get_u8(), buf.get_u8(), buf.get_u8()];
        let monitor_area = MonitorArea::from(buf.get_u8());
        let alarm_enable = AlarmFlags::from_bits(buf.get_u8());
        let buzzer_frequency = buf.get_u16();
        let buzzer_volume = buf.get_u8();
        let led = get_rgb(&mut buf);
        Self {
            address,
            address_inverted,
            function_control,
            refresh_rate,
            noise_filter,
            upper_bits,
            reserved,
            monitor_area,
            alarm_enable,
            buzzer_frequency,
            buzzer_volume,
            led,
        }
    }
}

impl WriteRegister for ConfigRegister {
    fn encode(&self, mut buf: &mut [u8]) {
        buf.put_u8(self.address);
        buf.put_u8(self.address_inverted);
        buf.put_u8(self.function_control.into());
        buf.put_u8(u8::from(self.refresh_rate) | self.upper_bits[0]);
        buf.put_u8(self.noise_filter | self.upper_bits[1]);
        buf.put_slice(&self.reserved);
        buf.put_u8(self.monitor_area.into());
        buf.put_u8(self.alarm_enable.bits());
        buf.put_u16(self.buzzer_frequency);
        buf.put_u8(self.buzzer_volume);
        buf.put_slice(&<[u8; 3]>::from(self.led));
    }
}

/// Which of the two alarm register blocks to use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmKind {
    /// Triggered when a statistic drops below the threshold.
    Lowest,

    /// Triggered when a statistic rises above the threshold.
    Highest,
}

impl AlarmKind {
    pub fn index(self) -> RegisterIndex {
        match self {
            Self::Lowest => RegisterIndex::LowestAlarm,
            Self::Highest => RegisterIndex::HighestAlarm,
        }
    }
}

/// An alarm register block (0x20 for the lowest alarm, 0x30 for the highest).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmRegister {
    /// The raw temperature threshold.
    pub(crate) threshold: u16,

    /// Buzzer frequency in Hz while the alarm is active. 0 silences the buzzer.
    pub(crate) buzzer_frequency: u16,

    /// On/off cycle of the buzzer and LED, in units of 10ms.
    pub(crate) interval: u8,

    /// LED color while the alarm is active.
    pub(crate) led: Rgb,
}

impl AlarmRegister {
    /// The allowed range for the blink interval, in units of 10ms.
    pub const MIN_INTERVAL: u8 = 5;
    pub const MAX_INTERVAL: u8 = 255;

    /// Create an alarm configuration.
    ///
    /// `threshold` is in ℃, and `interval` (in units of 10ms) is clamped to 50ms–2.55s.
    pub fn new(threshold: f32, interval: u16, buzzer_frequency: u16, led: Rgb) -> Self {
        let interval = interval.clamp(Self::MIN_INTERVAL.into(), Self::MAX_INTERVAL.into()) as u8;
        Self {
            threshold: celsius_to_raw(threshold),
            buzzer_frequency,
            interval,
            led,
        }
    }

    pub fn threshold_raw(&self) -> u16 {
        self.threshold
    }

    pub fn threshold(&self) -> f32 {
        raw_to_celsius(self.threshold)
    }

    pub fn buzzer_frequency(&self) -> u16 {
        self.buzzer_frequency
    }

    pub fn interval(&self) -> u8 {
        self.interval
    }

    pub fn led(&self) -> Rgb {
        self.led
    }
}

impl Default for AlarmRegister {
    /// A 0℃ threshold with the shortest interval, silent and dark.
    fn default() -> Self {
        Self::new(0.0, Self::MIN_INTERVAL.into(), 0, Rgb::default())
    }
}

impl Register for AlarmRegister {
    const LENGTH: usize = 8;
}

impl<'a> From<&'a [u8]> for AlarmRegister {
    /// Decode an alarm register.
    ///
    /// This method will `panic` if there aren't enough bytes in the slice.
    fn from(buf: &'a [u8]) -> Self {
        let mut buf = &buf[..Self::LENGTH];
        Self {
            threshold: buf.get_u16(),
            buzzer_frequency: buf.get_u16(),
            interval: buf.get_u8(),
            led: get_rgb(&mut buf),
        }
    }
}

impl WriteRegister for AlarmRegister {
    fn encode(&self, mut buf: &mut [u8]) {
        buf.put_u16(self.threshold);
        buf.put_u16(self.buzzer_frequency);
        buf.put_u8(self.interval);
        buf.put_slice(&<[u8; 3]>::from(self.led));
    }
}

/// The refresh control register (0x6E).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshControl {
    /// Set by the module when a new frame has been captured.
    pub(crate) frame_ready: bool,

    /// Which subpage the captured frame covers.
    pub(crate) subpage: Subpage,
}

impl RefreshControl {
    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn subpage(&self) -> Subpage {
        self.subpage
    }
}

impl Register for RefreshControl {
    const LENGTH: usize = 2;
}

impl<'a> From<&'a [u8]> for RefreshControl {
    fn from(buf: &'a [u8]) -> Self {
        let mut buf = &buf[..Self::LENGTH];
        let frame_ready = is_bit_set(buf.get_u8(), 0);
        let subpage = if buf.get_u8() != 0 {
            Subpage::One
        } else {
            Subpage::Zero
        };
        Self {
            frame_ready,
            subpage,
        }
    }
}

/// Everything from the status register through the highest alarm (0x00-0x37).
///
/// This is what gets read when identifying a module.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterBlock {
    pub status: StatusRegister,
    pub config: ConfigRegister,
    pub lowest_alarm: AlarmRegister,
    pub highest_alarm: AlarmRegister,
}

impl Register for RegisterBlock {
    const LENGTH: usize = 0x38;
}

impl<'a> From<&'a [u8]> for RegisterBlock {
    /// Decode the register blocks.
    ///
    /// This method will `panic` if there aren't enough bytes in the slice.
    fn from(buf: &'a [u8]) -> Self {
        let offset = |index: RegisterIndex| usize::from(u8::from(index));
        Self {
            status: StatusRegister::from(&buf[offset(RegisterIndex::Status)..]),
            config: ConfigRegister::from(&buf[offset(RegisterIndex::Config)..]),
            lowest_alarm: AlarmRegister::from(&buf[offset(RegisterIndex::LowestAlarm)..]),
            highest_alarm: AlarmRegister::from(&buf[offset(RegisterIndex::HighestAlarm)..]),
        }
    }
}
