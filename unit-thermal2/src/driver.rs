// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use log::{debug, trace, warn};
use paste::paste;

use crate::clock::ClockGuard;
use crate::common::*;
use crate::error::{Error, LibraryError};
use crate::frame::{Overview, TemperatureFrame};
use crate::register::*;

/// How many times [`Thermal2Driver::begin`] tries to identify the module.
const IDENTIFY_ATTEMPTS: u8 = 16;

/// The pause between identification attempts, in milliseconds.
const IDENTIFY_RETRY_DELAY_MS: u8 = 16;

/// DRY macro for the set_* methods in `Thermal2Driver` that change a single configuration field.
///
/// The first identifier is the name of the setting, followed by the path to the field within
/// [`ConfigRegister`], then the type of the new value.
macro_rules! set_config_field {
    { $name:ident, $($field:ident).+, $typ:ty, $doc:literal } => {
    paste! {
        #[doc = $doc]
        pub fn [< set_ $name >](&mut self, new_value: $typ) -> Result<(), Error<I2C>> {
            self.ensure_identified()?;
            self.config.$($field).+ = new_value;
            self.write_config()
        }
    }};
}

/// Whether the driver has confirmed it is talking to a Unit Thermal2.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    NotIdentified,
    Identified,
}

/// Driver for the M5Stack Unit Thermal2.
///
/// The driver keeps a copy of the module's status, configuration and alarm registers. Reading
/// those (through [`config`][Thermal2Driver::config] and friends) never touches the bus, while
/// every `set_*` method updates the copy and then writes the whole block back to the module.
///
/// Nothing is read from the module until it is identified, either explicitly with
/// [`begin`][Thermal2Driver::begin] or [`identify`][Thermal2Driver::identify], or implicitly by
/// the first method that needs to talk to the module.
#[derive(Clone, Debug)]
pub struct Thermal2Driver<I2C> {
    /// The I²C bus the module is accessible on.
    bus: I2C,

    /// Address and clock rates.
    settings: Thermal2Config,

    state: SessionState,

    status: StatusRegister,

    config: ConfigRegister,

    lowest_alarm: AlarmRegister,

    highest_alarm: AlarmRegister,

    /// The most recent complete frame.
    frame: TemperatureFrame,

    /// Buffer for reading pixel data off of the module.
    ///
    /// Pixel data is read into here first, and only copied into `frame` once the entire frame has
    /// been read and checked.
    pixel_buffer: [u8; NUM_PIXELS * 2],
}

impl<I2C> Thermal2Driver<I2C>
where
    I2C: i2c::WriteRead + i2c::Write + i2c::Transactional + BusClock,
{
    /// Create a driver for the module described by `settings`.
    ///
    /// This does not communicate with the module.
    pub fn new(bus: I2C, settings: Thermal2Config) -> Self {
        Self {
            bus,
            settings,
            state: SessionState::NotIdentified,
            status: StatusRegister::default(),
            config: ConfigRegister::default(),
            lowest_alarm: AlarmRegister::default(),
            highest_alarm: AlarmRegister::default(),
            frame: TemperatureFrame::new(),
            pixel_buffer: [0; NUM_PIXELS * 2],
        }
    }

    /// Identify the module, retrying for a little while.
    ///
    /// Modules take a moment to start responding after being powered on. This makes up to 16
    /// attempts, 16ms apart. On success the number of attempts that were left (including the
    /// successful one) is returned, so 16 means the first attempt worked. If every attempt fails,
    /// the error from the last attempt is returned.
    pub fn begin<D: DelayMs<u8>>(&mut self, delay: &mut D) -> Result<u8, Error<I2C>> {
        let mut remaining = IDENTIFY_ATTEMPTS;
        loop {
            match self.identify() {
                Ok(()) => return Ok(remaining),
                Err(err) => {
                    remaining -= 1;
                    if remaining == 0 {
                        warn!(
                            "Giving up on identifying the module at {:#04x}",
                            self.settings.address
                        );
                        return Err(err);
                    }
                    debug!("Identification failed, {} attempts left", remaining);
                    delay.delay_ms(IDENTIFY_RETRY_DELAY_MS);
                }
            }
        }
    }

    /// Check that a Unit Thermal2 is present, and load its registers.
    ///
    /// All of the cached registers are replaced with the module's current values when the
    /// identification bytes match. On any failure the cached registers are left alone and the
    /// driver is marked as not identified.
    pub fn identify(&mut self) -> Result<(), Error<I2C>> {
        let mut buf = [0u8; RegisterBlock::LENGTH];
        let result = {
            let mut bus = ClockGuard::new(&mut self.bus, self.settings.bus_clock);
            bus.write_read(
                self.settings.address,
                &[u8::from(RegisterIndex::Status)],
                &mut buf,
            )
        };
        if let Err(err) = result {
            self.state = SessionState::NotIdentified;
            return Err(Error::I2cWriteReadError(err));
        }
        let block = RegisterBlock::from(&buf[..]);
        if !block.status.is_thermal2() {
            let id = block.status.device_id();
            warn!(
                "Device at {:#04x} is not a Unit Thermal2 (ID {:#04x} {:#04x})",
                self.settings.address, id[0], id[1]
            );
            self.state = SessionState::NotIdentified;
            return Err(LibraryError::UnknownDevice { id }.into());
        }
        self.status = block.status;
        self.config = block.config;
        self.lowest_alarm = block.lowest_alarm;
        self.highest_alarm = block.highest_alarm;
        self.state = SessionState::Identified;
        let (major, minor) = self.status.version();
        debug!(
            "Found Unit Thermal2 at {:#04x}, firmware {}.{}",
            self.settings.address, major, minor
        );
        Ok(())
    }

    fn ensure_identified(&mut self) -> Result<(), Error<I2C>> {
        match self.state {
            SessionState::Identified => Ok(()),
            SessionState::NotIdentified => self.identify(),
        }
    }

    /// Write a register block at the base clock rate.
    ///
    /// A failure here means the module may be in an unknown state, so it will be identified again
    /// before the next access.
    fn write_block(&mut self, bytes: &[u8]) -> Result<(), Error<I2C>> {
        let result = {
            let mut bus = ClockGuard::new(&mut self.bus, self.settings.bus_clock);
            bus.write(self.settings.address, bytes)
        };
        result.map_err(|err| {
            warn!("Writing register {:#04x} failed", bytes[0]);
            self.state = SessionState::NotIdentified;
            Error::I2cWriteError(err)
        })
    }

    /// Write the cached configuration to the module.
    pub fn write_config(&mut self) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        let mut buf = [0u8; ConfigRegister::LENGTH + 1];
        buf[0] = RegisterIndex::Config.into();
        self.config.encode(&mut buf[1..]);
        debug!("Writing configuration: {:?}", self.config);
        self.write_block(&buf)
    }

    /// Write one of the cached alarm configurations to the module.
    pub fn write_alarm(&mut self, kind: AlarmKind) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        let mut buf = [0u8; AlarmRegister::LENGTH + 1];
        buf[0] = kind.index().into();
        self.alarm(kind).encode(&mut buf[1..]);
        debug!("Writing {:?} alarm: {:?}", kind, self.alarm(kind));
        self.write_block(&buf)
    }

    /// Read a new frame from the module, if one is ready.
    ///
    /// This also picks up the button and alarm state, and acknowledges any button events. The
    /// [frame][Thermal2Driver::frame] and [status][Thermal2Driver::status] are only updated if
    /// every step succeeds. If the module hasn't captured a new frame yet,
    /// [`LibraryError::FrameNotReady`] is returned.
    pub fn poll(&mut self) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        let address = self.settings.address;
        let clock = self.settings.poll_clock(self.config.refresh_rate);
        let mut bus = ClockGuard::new(&mut self.bus, clock);

        let mut status = [0u8; 2];
        bus.write_read(address, &[u8::from(RegisterIndex::Status)], &mut status)
            .map_err(Error::I2cWriteReadError)?;
        // Bit 0 is the live button state, the rest are events that stay set until written back.
        if status[0] & !0x01 != 0 {
            trace!("Acknowledging button events {:#010b}", status[0]);
            bus.write(address, &[u8::from(RegisterIndex::Status), status[0]])
                .map_err(Error::I2cWriteError)?;
        }

        let mut refresh = [0u8; RefreshControl::LENGTH];
        bus.write_read(
            address,
            &[u8::from(RegisterIndex::RefreshControl)],
            &mut refresh,
        )
        .map_err(Error::I2cWriteReadError)?;
        let refresh = RefreshControl::from(&refresh[..]);
        if !refresh.frame_ready() {
            return Err(LibraryError::FrameNotReady.into());
        }

        // The module advances its read pointer as it sends data, so after the overview the pixels
        // follow on without another register index. Adjacent reads in one transaction are a single
        // burst on the wire, and the module can't send more than 128 bytes in a burst, so each
        // chunk is its own read.
        let mut overview = [0u8; Overview::LENGTH];
        let start = [u8::from(RegisterIndex::Overview)];
        bus.exec(
            address,
            &mut [
                i2c::Operation::Write(&start),
                i2c::Operation::Read(&mut overview),
            ],
        )
        .map_err(Error::I2cTransactionError)?;
        for chunk in self.pixel_buffer.chunks_exact_mut(PIXEL_CHUNK_LENGTH) {
            bus.exec(address, &mut [i2c::Operation::Read(chunk)])
                .map_err(Error::I2cTransactionError)?;
        }
        let overview = Overview::from(&overview[..]);
        trace!("Read frame for subpage {:?}", refresh.subpage());

        if self.config.function_control.auto_clear_disabled {
            bus.write(address, &[u8::from(RegisterIndex::RefreshControl), 0x00])
                .map_err(Error::I2cWriteError)?;
            if !overview.is_valid() {
                return Err(LibraryError::InvalidFrame {
                    lowest: overview.lowest_raw(),
                    highest: overview.highest_raw(),
                }
                .into());
            }
        }
        drop(bus);

        self.frame
            .update(overview, &self.pixel_buffer, refresh.subpage());
        self.status.buttons = ButtonState::from(status[0]);
        self.status.alarms = AlarmFlags::from_bits(status[1]);
        Ok(())
    }

    set_config_field! {
        buzzer_enabled,
        function_control.buzzer_enabled,
        bool,
        "Enable (or disable) the buzzer while no alarm is active."
    }

    pub fn buzzer_on(&mut self) -> Result<(), Error<I2C>> {
        self.set_buzzer_enabled(true)
    }

    pub fn buzzer_off(&mut self) -> Result<(), Error<I2C>> {
        self.set_buzzer_enabled(false)
    }

    set_config_field! {
        led_enabled,
        function_control.led_enabled,
        bool,
        "Enable (or disable) the LED while no alarm is active."
    }

    pub fn led_on(&mut self) -> Result<(), Error<I2C>> {
        self.set_led_enabled(true)
    }

    pub fn led_off(&mut self) -> Result<(), Error<I2C>> {
        self.set_led_enabled(false)
    }

    set_config_field! {
        auto_clear_disabled,
        function_control.auto_clear_disabled,
        bool,
        "Stop the module from clearing the frame-ready flag itself.\n\nWhen disabled, `poll` \
         clears the flag after each frame and also rejects inconsistent frames."
    }

    set_config_field! {
        buzzer_frequency,
        buzzer_frequency,
        u16,
        "Set the buzzer frequency (in Hz) used while no alarm is active."
    }

    set_config_field! {
        buzzer_volume,
        buzzer_volume,
        u8,
        "Set the buzzer volume used while no alarm is active."
    }

    set_config_field! {
        led,
        led,
        Rgb,
        "Set the LED color used while no alarm is active."
    }

    set_config_field! {
        refresh_rate,
        refresh_rate,
        RefreshRate,
        "Set the module's refresh rate."
    }

    /// Set the buzzer frequency (in Hz) and volume together.
    pub fn set_buzzer(&mut self, frequency: u16, volume: u8) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        self.config.buzzer_frequency = frequency;
        self.config.buzzer_volume = volume;
        self.write_config()
    }

    /// Set the noise filter level, from 0 (off) to 15. Only the low four bits are used.
    pub fn set_noise_filter_level(&mut self, level: u8) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        self.config.set_noise_filter(level);
        self.write_config()
    }

    /// Set the area used for the temperature statistics.
    ///
    /// See [`MonitorArea`] for the units. Both dimensions are clamped to 15.
    pub fn set_monitor_area(&mut self, width: u8, height: u8) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        self.config.monitor_area = MonitorArea::new(width, height);
        self.write_config()
    }

    /// Enable the given alarms, leaving the others as they are.
    pub fn enable_alarms(&mut self, alarms: AlarmFlags) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        self.config.alarm_enable.insert(alarms);
        self.write_config()
    }

    /// Disable the given alarms, leaving the others as they are.
    pub fn disable_alarms(&mut self, alarms: AlarmFlags) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        self.config.alarm_enable.remove(alarms);
        self.write_config()
    }

    /// Replace the configuration of one of the alarms.
    pub fn set_alarm(&mut self, kind: AlarmKind, alarm: AlarmRegister) -> Result<(), Error<I2C>> {
        self.ensure_identified()?;
        match kind {
            AlarmKind::Lowest => self.lowest_alarm = alarm,
            AlarmKind::Highest => self.highest_alarm = alarm,
        }
        self.write_alarm(kind)
    }

    pub fn set_lowest_alarm(&mut self, alarm: AlarmRegister) -> Result<(), Error<I2C>> {
        self.set_alarm(AlarmKind::Lowest, alarm)
    }

    pub fn set_highest_alarm(&mut self, alarm: AlarmRegister) -> Result<(), Error<I2C>> {
        self.set_alarm(AlarmKind::Highest, alarm)
    }

    /// Change the module's I²C address.
    ///
    /// Addresses outside of 0x08–0x77 are rejected without touching the bus. The module only
    /// starts using the new address after it is power cycled, so this driver keeps using the
    /// current address. Create a new driver for the new address afterwards.
    pub fn change_address(&mut self, new_address: u8) -> Result<(), Error<I2C>> {
        if !is_valid_address(new_address) {
            return Err(LibraryError::InvalidAddress(new_address).into());
        }
        self.ensure_identified()?;
        self.config.set_address(new_address);
        debug!(
            "Changing address from {:#04x} to {:#04x}",
            self.settings.address, new_address
        );
        self.write_config()
    }

    /// Change the clock rates used for the module.
    ///
    /// This takes effect with the next bus access.
    pub fn set_i2c_clock(&mut self, bus_clock: u32, pixel_read_clock: u32) {
        self.settings.bus_clock = bus_clock;
        self.settings.pixel_read_clock = pixel_read_clock;
    }

    pub fn settings(&self) -> &Thermal2Config {
        &self.settings
    }

    /// The address this driver is talking to.
    pub fn address(&self) -> u8 {
        self.settings.address
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_identified(&self) -> bool {
        self.state == SessionState::Identified
    }

    /// The status register as of the last identification or poll.
    pub fn status(&self) -> &StatusRegister {
        &self.status
    }

    /// The button state as of the last poll.
    pub fn buttons(&self) -> ButtonState {
        self.status.buttons
    }

    /// The alarms that were active as of the last poll.
    pub fn active_alarms(&self) -> AlarmFlags {
        self.status.alarms
    }

    pub fn config(&self) -> &ConfigRegister {
        &self.config
    }

    pub fn refresh_rate(&self) -> RefreshRate {
        self.config.refresh_rate
    }

    pub fn noise_filter_level(&self) -> u8 {
        self.config.noise_filter
    }

    pub fn monitor_area(&self) -> MonitorArea {
        self.config.monitor_area
    }

    pub fn alarm(&self, kind: AlarmKind) -> &AlarmRegister {
        match kind {
            AlarmKind::Lowest => &self.lowest_alarm,
            AlarmKind::Highest => &self.highest_alarm,
        }
    }

    pub fn lowest_alarm(&self) -> &AlarmRegister {
        &self.lowest_alarm
    }

    pub fn highest_alarm(&self) -> &AlarmRegister {
        &self.highest_alarm
    }

    /// The most recent complete frame.
    ///
    /// Before the first successful [poll][Thermal2Driver::poll] this is all zeros.
    pub fn frame(&self) -> &TemperatureFrame {
        &self.frame
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.bus
    }
}

#[cfg(test)]
mod test {
    use arrayvec::ArrayVec;
    use float_cmp::assert_approx_eq;
    use unit_thermal2_test_data::{frame_pixels_from, FIRST_PIXEL_RAW, UNIFORM_OVERVIEW};

    use super::*;
    use crate::test::*;

    /// A delay that fixes the mock bus the first time it's called.
    struct FixingDelay {
        bus: MockThermal2Bus,
        calls: usize,
    }

    impl FixingDelay {
        fn new(bus: &MockThermal2Bus) -> Self {
            Self {
                bus: bus.clone(),
                calls: 0,
            }
        }
    }

    impl DelayMs<u8> for FixingDelay {
        fn delay_ms(&mut self, ms: u8) {
            assert_eq!(ms, IDENTIFY_RETRY_DELAY_MS);
            self.calls += 1;
            self.bus.clear_faults();
        }
    }

    /// A delay that just counts how often it is called.
    #[derive(Default)]
    struct CountingDelay {
        calls: usize,
    }

    impl DelayMs<u8> for CountingDelay {
        fn delay_ms(&mut self, _ms: u8) {
            self.calls += 1;
        }
    }

    fn create_driver() -> (Thermal2Driver<MockThermal2Bus>, MockThermal2Bus) {
        let mocked = mock_thermal2();
        let driver = Thermal2Driver::new(mocked.clone(), Thermal2Config::FAST);
        (driver, mocked)
    }

    fn create_identified_driver() -> (Thermal2Driver<MockThermal2Bus>, MockThermal2Bus) {
        let (mut driver, mocked) = create_driver();
        driver.identify().unwrap();
        mocked.clear_operations();
        (driver, mocked)
    }

    fn config_memory(mocked: &MockThermal2Bus) -> [u8; ConfigRegister::LENGTH] {
        let mut config = [0u8; ConfigRegister::LENGTH];
        config.copy_from_slice(&mocked.memory()[0x08..0x18]);
        config
    }

    #[test]
    fn new_does_not_touch_bus() {
        let (driver, mocked) = create_driver();
        assert_eq!(driver.state(), SessionState::NotIdentified);
        assert!(mocked.operations().is_empty());
        assert_eq!(mocked.clock_changes(), 0);
        assert_eq!(driver.frame(), &TemperatureFrame::new());
    }

    #[test]
    fn identify() {
        let (mut driver, mocked) = create_driver();
        driver.identify().unwrap();
        assert!(driver.is_identified());
        assert_eq!(
            mocked.operations()[..],
            [I2cOperation::WriteRead {
                index: 0x00,
                length: 0x38,
                clock: 400_000,
            }]
        );
        assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
        assert_eq!(driver.status().version(), (1, 2));
        assert_eq!(driver.config().address(), 0x32);
        assert_eq!(driver.refresh_rate(), RefreshRate::Two);
        assert_eq!(driver.noise_filter_level(), 4);
        assert_eq!(driver.monitor_area(), MonitorArea::new(15, 11));
        assert_eq!(driver.lowest_alarm().interval(), 20);
        assert_approx_eq!(f32, driver.highest_alarm().threshold(), 100.0);
    }

    #[test]
    fn identify_is_idempotent() {
        let (mut driver, _mocked) = create_identified_driver();
        let config = *driver.config();
        driver.identify().unwrap();
        assert!(driver.is_identified());
        assert_eq!(driver.config(), &config);
    }

    #[test]
    fn identify_mismatch() {
        let (mut driver, mocked) = create_driver();
        mocked.poke(0x04, &[0x12, 0x34]);
        let err = driver.identify().unwrap_err();
        assert!(matches!(
            err,
            Error::LibraryError(LibraryError::UnknownDevice { id: [0x12, 0x34] })
        ));
        assert_eq!(driver.state(), SessionState::NotIdentified);
        assert_eq!(driver.config(), &ConfigRegister::default());
        assert_eq!(driver.status(), &StatusRegister::default());
    }

    #[test]
    fn identify_half_match() {
        let (mut driver, mocked) = create_driver();
        mocked.poke(0x05, &[0x65]);
        assert!(driver.identify().is_err());
        assert!(!driver.is_identified());
    }

    #[test]
    fn identify_mismatch_keeps_cached_registers() {
        let (mut driver, mocked) = create_identified_driver();
        let config = *driver.config();
        // Different config, but also a different device
        mocked.poke(0x0B, &[0x07]);
        mocked.poke(0x04, &[0x00, 0x00]);
        assert!(driver.identify().is_err());
        assert!(!driver.is_identified());
        assert_eq!(driver.config(), &config);
        assert_eq!(driver.refresh_rate(), RefreshRate::Two);
    }

    #[test]
    fn identify_transport_failure() {
        let (mut driver, mocked) = create_identified_driver();
        mocked.set_faults(Faults {
            fail_write_reads: true,
            ..Faults::default()
        });
        let err = driver.identify().unwrap_err();
        assert!(matches!(err, Error::I2cWriteReadError(MockError::Injected)));
        assert!(err.is_transport_error());
        assert!(!driver.is_identified());
        assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
    }

    #[test]
    fn begin_first_attempt() {
        let (mut driver, mocked) = create_driver();
        let mut delay = CountingDelay::default();
        assert_eq!(driver.begin(&mut delay).unwrap(), 16);
        assert_eq!(delay.calls, 0);
        assert_eq!(mocked.operations().len(), 1);
    }

    #[test]
    fn begin_retries() {
        let (mut driver, mocked) = create_driver();
        mocked.set_faults(Faults {
            fail_write_reads: true,
            ..Faults::default()
        });
        let mut delay = FixingDelay::new(&mocked);
        assert_eq!(driver.begin(&mut delay).unwrap(), 15);
        assert_eq!(delay.calls, 1);
        assert!(driver.is_identified());
        assert_eq!(mocked.operations().len(), 2);
    }

    #[test]
    fn begin_exhausted() {
        let (mut driver, mocked) = create_driver();
        mocked.poke(0x04, &[0x00, 0x00]);
        let mut delay = CountingDelay::default();
        let err = driver.begin(&mut delay).unwrap_err();
        assert!(matches!(
            err,
            Error::LibraryError(LibraryError::UnknownDevice { .. })
        ));
        assert_eq!(delay.calls, 15);
        assert_eq!(mocked.operations().len(), 16);
        assert!(!driver.is_identified());
    }

    #[test]
    fn poll() {
        let (mut driver, mocked) = create_identified_driver();
        driver.poll().unwrap();
        let frame = driver.frame();
        assert_eq!(frame.pixel_raw(0), FIRST_PIXEL_RAW);
        assert_eq!(frame.pixel_raw(383), FIRST_PIXEL_RAW + 383);
        assert_eq!(frame.subpage(), Subpage::One);
        assert_approx_eq!(f32, frame.lowest_temperature(), 25.0);
        assert_eq!(frame.overview().highest().x(), 31);
        let mut clear = ArrayVec::<u8, 17>::new();
        clear.extend([0x6E, 0x00]);
        assert_eq!(
            mocked.operations()[..],
            [
                I2cOperation::WriteRead {
                    index: 0x00,
                    length: 2,
                    clock: 400_000,
                },
                I2cOperation::WriteRead {
                    index: 0x6E,
                    length: 2,
                    clock: 400_000,
                },
                I2cOperation::Transaction {
                    start: 0x70,
                    length: 16,
                    clock: 400_000,
                },
                I2cOperation::Transaction {
                    start: 0x80,
                    length: 128,
                    clock: 400_000,
                },
                I2cOperation::Transaction {
                    start: 0x100,
                    length: 128,
                    clock: 400_000,
                },
                I2cOperation::Transaction {
                    start: 0x180,
                    length: 128,
                    clock: 400_000,
                },
                I2cOperation::Transaction {
                    start: 0x200,
                    length: 128,
                    clock: 400_000,
                },
                I2cOperation::Transaction {
                    start: 0x280,
                    length: 128,
                    clock: 400_000,
                },
                I2cOperation::Transaction {
                    start: 0x300,
                    length: 128,
                    clock: 400_000,
                },
                I2cOperation::Write {
                    index: 0x6E,
                    data: clear,
                    clock: 400_000,
                },
            ]
        );
        // The frame-ready flag was cleared
        assert_eq!(mocked.memory()[0x6E], 0x00);
        assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
    }

    #[test]
    fn poll_identifies_first() {
        let (mut driver, mocked) = create_driver();
        driver.poll().unwrap();
        assert!(driver.is_identified());
        assert_eq!(mocked.operations()[0].index(), 0x00);
        assert_eq!(
            mocked.operations()[0],
            I2cOperation::WriteRead {
                index: 0x00,
                length: 0x38,
                clock: 400_000,
            }
        );
        assert_eq!(mocked.operations().len(), 11);
    }

    #[test]
    fn poll_clock_follows_refresh_rate() {
        let mocked = mock_thermal2();
        let mut driver = Thermal2Driver::new(mocked.clone(), Thermal2Config::STANDARD);
        driver.set_refresh_rate(RefreshRate::SixtyFour).unwrap();
        assert_eq!(mocked.memory()[0x0B], 7);
        mocked.clear_operations();
        driver.poll().unwrap();
        assert!(mocked
            .operations()
            .iter()
            .all(|operation| operation.clock() == 800_000));
        assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
        // Config writes use the base clock
        driver.set_buzzer_volume(0x10).unwrap();
        assert_eq!(mocked.operations().last().unwrap().clock(), 100_000);
        assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
    }

    #[test]
    fn poll_frame_not_ready() {
        let (mut driver, mocked) = create_identified_driver();
        mocked.set_frame_ready(false);
        let err = driver.poll().unwrap_err();
        assert!(matches!(
            err,
            Error::LibraryError(LibraryError::FrameNotReady)
        ));
        assert!(!err.is_transport_error());
        let ops = mocked.operations();
        assert_eq!(ops.len(), 2);
        assert!(!ops
            .iter()
            .any(|operation| matches!(operation, I2cOperation::Transaction { .. })));
        assert_eq!(driver.frame(), &TemperatureFrame::new());
        assert!(driver.is_identified());
    }

    #[test]
    fn poll_chunk_failure_keeps_frame() {
        let (mut driver, mocked) = create_identified_driver();
        driver.poll().unwrap();
        let published = driver.frame().clone();
        // Put a different frame on the module
        mocked.poke(0x80, &frame_pixels_from(0x3000));
        // The overview, then each of the pixel chunks
        let read_starts = core::iter::once(0x70)
            .chain((0..PIXEL_CHUNK_COUNT).map(|chunk| 0x80 + chunk * PIXEL_CHUNK_LENGTH));
        for failing_read in read_starts {
            mocked.set_frame_ready(true);
            mocked.set_faults(Faults {
                fail_read_from: Some(failing_read),
                ..Faults::default()
            });
            let err = driver.poll().unwrap_err();
            assert!(matches!(
                err,
                Error::I2cTransactionError(MockError::Injected)
            ));
            assert_eq!(driver.frame(), &published, "read from {:#x}", failing_read);
            assert!(driver.is_identified());
            assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
        }
        mocked.clear_faults();
        mocked.set_frame_ready(true);
        driver.poll().unwrap();
        assert_eq!(driver.frame().pixel_raw(0), 0x3000);
        assert_eq!(driver.frame().pixel_raw(383), 0x3000 + 383);
    }

    #[test]
    fn poll_acknowledges_button_events() {
        let (mut driver, mocked) = create_identified_driver();
        mocked.poke(0x00, &[0b0000_1001]);
        driver.poll().unwrap();
        let mut ack = ArrayVec::<u8, 17>::new();
        ack.extend([0x00, 0b0000_1001]);
        assert_eq!(
            mocked.operations()[1],
            I2cOperation::Write {
                index: 0x00,
                data: ack,
                clock: 400_000,
            }
        );
        assert!(driver.buttons().was_clicked());
        assert!(driver.buttons().is_pressed());
        // The module cleared the event, but the button is still down
        assert_eq!(mocked.memory()[0x00], 0b0000_0001);
        mocked.clear_operations();
        mocked.set_frame_ready(true);
        driver.poll().unwrap();
        assert!(!mocked
            .operations()
            .iter()
            .any(|operation| matches!(operation, I2cOperation::Write { index: 0x00, .. })));
        assert!(driver.buttons().is_pressed());
        assert!(!driver.buttons().has_events());
    }

    #[test]
    fn poll_button_acknowledge_failure() {
        let (mut driver, mocked) = create_identified_driver();
        mocked.poke(0x00, &[0b0001_0000]);
        mocked.set_faults(Faults {
            fail_writes: true,
            ..Faults::default()
        });
        let err = driver.poll().unwrap_err();
        assert!(matches!(err, Error::I2cWriteError(MockError::Injected)));
        assert_eq!(mocked.operations().len(), 2);
        assert_eq!(driver.frame(), &TemperatureFrame::new());
        assert!(!driver.buttons().was_held());
        // Failed polls don't change the identification state
        assert!(driver.is_identified());
    }

    /// Poll with a new frame on the module and one injected fault, checking nothing was published.
    fn poll_fails_cleanly(faults: Faults) -> Error<MockThermal2Bus> {
        let (mut driver, mocked) = create_identified_driver();
        driver.poll().unwrap();
        let published = driver.frame().clone();
        let status = *driver.status();
        mocked.poke(0x80, &frame_pixels_from(0x3000));
        mocked.poke(0x00, &[0b0000_0011, AlarmFlags::ALL_HIGH.bits()]);
        mocked.set_frame_ready(true);
        mocked.set_faults(faults);
        let err = driver.poll().unwrap_err();
        assert!(err.is_transport_error());
        assert_eq!(driver.frame(), &published);
        assert_eq!(driver.status(), &status);
        assert!(driver.is_identified());
        assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
        err
    }

    #[test]
    fn poll_status_read_failure() {
        let err = poll_fails_cleanly(Faults {
            fail_write_read_index: Some(0x00),
            ..Faults::default()
        });
        assert!(matches!(err, Error::I2cWriteReadError(MockError::Injected)));
    }

    #[test]
    fn poll_refresh_control_failure() {
        let err = poll_fails_cleanly(Faults {
            fail_write_read_index: Some(0x6E),
            ..Faults::default()
        });
        assert!(matches!(err, Error::I2cWriteReadError(MockError::Injected)));
    }

    #[test]
    fn poll_frame_ready_clear_failure() {
        let err = poll_fails_cleanly(Faults {
            fail_write_index: Some(0x6E),
            ..Faults::default()
        });
        assert!(matches!(err, Error::I2cWriteError(MockError::Injected)));
    }

    #[test]
    fn poll_reads_stay_within_chunk_limit() {
        let (mut driver, mocked) = create_identified_driver();
        driver.poll().unwrap();
        let ops = mocked.operations();
        let reads: ArrayVec<usize, 8> = ops
            .iter()
            .filter_map(|operation| match operation {
                I2cOperation::Transaction { length, .. } => Some(*length),
                _ => None,
            })
            .collect();
        assert_eq!(reads.len(), PIXEL_CHUNK_COUNT + 1);
        assert!(reads.iter().all(|length| *length <= PIXEL_CHUNK_LENGTH));
        assert_eq!(reads[1..].iter().sum::<usize>(), NUM_PIXELS * 2);
    }

    #[test]
    fn poll_reports_alarms() {
        let (mut driver, mocked) = create_identified_driver();
        mocked.poke(0x01, &[AlarmFlags::HIGHEST_ABOVE_HIGH.bits()]);
        driver.poll().unwrap();
        assert_eq!(driver.active_alarms(), AlarmFlags::HIGHEST_ABOVE_HIGH);
    }

    #[test]
    fn poll_invalid_frame() {
        let (mut driver, mocked) = create_identified_driver();
        mocked.poke(0x70, &UNIFORM_OVERVIEW);
        let err = driver.poll().unwrap_err();
        assert!(matches!(
            err,
            Error::LibraryError(LibraryError::InvalidFrame {
                lowest: 0x2C80,
                highest: 0x2C80
            })
        ));
        // The flag is still cleared
        assert_eq!(mocked.memory()[0x6E], 0x00);
        assert_eq!(driver.frame(), &TemperatureFrame::new());
    }

    #[test]
    fn poll_with_auto_clear() {
        let (mut driver, mocked) = create_driver();
        // Function control with bit 2 clear, the module handles the frame-ready flag.
        mocked.poke(0x0A, &[0x00]);
        driver.identify().unwrap();
        assert!(!driver.config().function_control().auto_clear_disabled());
        mocked.poke(0x70, &UNIFORM_OVERVIEW);
        mocked.clear_operations();
        driver.poll().unwrap();
        assert_eq!(mocked.operations().len(), 9);
        assert_eq!(mocked.memory()[0x6E], 0x01);
        assert_eq!(driver.frame().pixel_raw(0), FIRST_PIXEL_RAW);
    }

    #[test]
    fn write_config_single_write() {
        let (mut driver, mocked) = create_identified_driver();
        driver.set_buzzer(2000, 0x80).unwrap();
        let ops = mocked.operations();
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            I2cOperation::Write { index, data, clock } => {
                assert_eq!(*index, 0x08);
                assert_eq!(data.len(), 17);
                assert_eq!(*clock, 400_000);
            }
            other => panic!("Unexpected operation {:?}", other),
        }
        let config = config_memory(&mocked);
        assert_eq!(config[10..13], [0xD0, 0x07, 0x80]);
        assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
    }

    #[test]
    fn write_requires_identification() {
        let (mut driver, mocked) = create_driver();
        driver.set_led(Rgb::new(1, 2, 3)).unwrap();
        let ops = mocked.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].index(), 0x00);
        assert_eq!(ops[1].index(), 0x08);
        // The change isn't lost to the identification
        assert_eq!(driver.config().led(), Rgb::new(1, 2, 3));
        assert_eq!(config_memory(&mocked)[13..16], [1, 2, 3]);
    }

    #[test]
    fn write_config_failure() {
        let (mut driver, mocked) = create_identified_driver();
        mocked.set_faults(Faults {
            fail_writes: true,
            ..Faults::default()
        });
        let err = driver.set_buzzer_frequency(1234).unwrap_err();
        assert!(matches!(err, Error::I2cWriteError(MockError::Injected)));
        assert_eq!(driver.state(), SessionState::NotIdentified);
        assert_eq!(driver.config().buzzer_frequency(), 1234);
        assert_eq!(mocked.bus_clock(), INITIAL_CLOCK);
        // The next write identifies the module again
        mocked.clear_faults();
        mocked.clear_operations();
        driver.set_buzzer_volume(1).unwrap();
        assert_eq!(mocked.operations().len(), 2);
        assert!(driver.is_identified());
    }

    #[test]
    fn function_control_setters() {
        let (mut driver, mocked) = create_identified_driver();
        driver.buzzer_on().unwrap();
        assert_eq!(mocked.memory()[0x0A], 0x05);
        driver.led_on().unwrap();
        assert_eq!(mocked.memory()[0x0A], 0x07);
        driver.buzzer_off().unwrap();
        assert_eq!(mocked.memory()[0x0A], 0x06);
        driver.set_auto_clear_disabled(false).unwrap();
        assert_eq!(mocked.memory()[0x0A], 0x02);
        driver.led_off().unwrap();
        assert_eq!(mocked.memory()[0x0A], 0x00);
        assert_eq!(mocked.operations().len(), 5);
    }

    #[test]
    fn noise_filter_masked() {
        let (mut driver, mocked) = create_identified_driver();
        driver.set_noise_filter_level(0x1F).unwrap();
        assert_eq!(driver.noise_filter_level(), 0x0F);
        assert_eq!(mocked.memory()[0x0C], 0x0F);
    }

    #[test]
    fn monitor_area_clamped() {
        let (mut driver, mocked) = create_identified_driver();
        driver.set_monitor_area(20, 20).unwrap();
        assert_eq!(mocked.memory()[0x10], 0xFF);
        driver.set_monitor_area(7, 3).unwrap();
        assert_eq!(mocked.memory()[0x10], 0x37);
    }

    #[test]
    fn alarm_enable_flags() {
        let (mut driver, mocked) = create_identified_driver();
        driver
            .enable_alarms(AlarmFlags::HIGHEST_ABOVE_HIGH | AlarmFlags::LOWEST_BELOW_LOW)
            .unwrap();
        assert_eq!(mocked.memory()[0x11], 0x81);
        driver.disable_alarms(AlarmFlags::ALL_LOW).unwrap();
        assert_eq!(mocked.memory()[0x11], 0x80);
        assert_eq!(driver.config().alarm_enable(), AlarmFlags::HIGHEST_ABOVE_HIGH);
    }

    #[test]
    fn set_alarms() {
        let (mut driver, mocked) = create_identified_driver();
        driver
            .set_lowest_alarm(AlarmRegister::new(-10.0, 2, 500, Rgb::new(0, 0xFF, 0)))
            .unwrap();
        assert_eq!(
            mocked.memory()[0x20..0x28],
            [0x00, 0x1B, 0xF4, 0x01, 0x05, 0x00, 0xFF, 0x00]
        );
        assert_approx_eq!(f32, driver.lowest_alarm().threshold(), -10.0);
        driver
            .set_highest_alarm(AlarmRegister::new(50.0, 300, 0, Rgb::default()))
            .unwrap();
        assert_eq!(
            mocked.memory()[0x30..0x38],
            [0x00, 0x39, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00]
        );
        let ops = mocked.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].index(), 0x20);
        assert_eq!(ops[1].index(), 0x30);
    }

    #[test]
    fn default_alarm_interval() {
        let (mut driver, mocked) = create_identified_driver();
        driver
            .set_alarm(AlarmKind::Lowest, AlarmRegister::default())
            .unwrap();
        assert_eq!(
            mocked.memory()[0x20..0x28],
            [0x00, 0x20, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn alarm_write_failure() {
        let (mut driver, mocked) = create_identified_driver();
        mocked.set_faults(Faults {
            fail_writes: true,
            ..Faults::default()
        });
        let alarm = AlarmRegister::new(80.0, 50, 4000, Rgb::new(0xFF, 0, 0));
        assert!(driver.set_highest_alarm(alarm).is_err());
        assert!(!driver.is_identified());
        assert_eq!(driver.alarm(AlarmKind::Highest), &alarm);
    }

    #[test]
    fn change_address_out_of_range() {
        let (mut driver, mocked) = create_identified_driver();
        for address in [0x05, 0x07, 0x78, 0xFF] {
            let err = driver.change_address(address).unwrap_err();
            assert!(matches!(
                err,
                Error::LibraryError(LibraryError::InvalidAddress(a)) if a == address
            ));
        }
        assert!(mocked.operations().is_empty());
        assert_eq!(driver.config().address(), 0x32);
    }

    #[test]
    fn change_address() {
        let (mut driver, mocked) = create_identified_driver();
        driver.change_address(0x40).unwrap();
        assert_eq!(mocked.memory()[0x08..0x0A], [0x40, 0xBF]);
        assert!(driver.config().is_address_consistent());
        assert_eq!(driver.config().address(), 0x40);
        // Still talking to the old address until the module restarts
        assert_eq!(driver.address(), 0x32);
        assert!(driver.poll().is_ok());
    }

    #[test]
    fn non_default_address() {
        let mocked = mock_thermal2_at_address(0x40);
        let mut driver =
            Thermal2Driver::new(mocked.clone(), Thermal2Config::FAST.with_address(0x40));
        driver.identify().unwrap();
        assert_eq!(driver.address(), 0x40);
        let mut wrong = Thermal2Driver::new(mocked, Thermal2Config::FAST);
        assert!(matches!(
            wrong.identify().unwrap_err(),
            Error::I2cWriteReadError(MockError::UnknownI2cAddress(0x32))
        ));
    }

    #[test]
    fn set_i2c_clock() {
        let (mut driver, mocked) = create_identified_driver();
        driver.set_i2c_clock(50_000, 0);
        driver.identify().unwrap();
        assert_eq!(mocked.operations()[0].clock(), 50_000);
        mocked.clear_operations();
        driver.poll().unwrap();
        // 2Hz only needs 25kHz, but frames aren't read slower than everything else
        assert!(mocked
            .operations()
            .iter()
            .all(|operation| operation.clock() == 50_000));
        driver.set_i2c_clock(50_000, 100_000);
        mocked.clear_operations();
        mocked.set_frame_ready(true);
        driver.poll().unwrap();
        assert_eq!(mocked.operations()[0].clock(), 100_000);
        assert_eq!(driver.settings().bus_clock, 50_000);
    }

    #[test]
    fn release() {
        let (driver, mocked) = create_identified_driver();
        let bus = driver.release();
        assert_eq!(bus.memory()[..], mocked.memory()[..]);
    }
}
