use std::env;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{anyhow, bail};
use linux_embedded_hal::Delay;

use unit_thermal2::{Error, LibraryError, RefreshRate, Thermal2Config, Thermal2Driver};

mod common;

use common::{parse_address, LinuxBus};

const WIDTH: usize = 32;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 5 {
        bail!("Usage: <I2C bus> [address] [refresh rate] [num frames]");
    }
    let address = match args.get(2) {
        Some(arg) => parse_address(arg)?,
        None => Thermal2Config::default().address,
    };
    let refresh_rate = match args.get(3) {
        Some(arg) => {
            let hz: f32 = arg.parse()?;
            RefreshRate::from_hz(hz)
                .ok_or_else(|| anyhow!("{}Hz is not a valid refresh rate", hz))?
        }
        None => RefreshRate::Two,
    };
    let num_frames: usize = match args.get(4) {
        Some(arg) => arg.parse()?,
        None => 4,
    };

    let bus = LinuxBus::open(&args[1])?;
    let mut camera = Thermal2Driver::new(bus, Thermal2Config::FAST.with_address(address));
    let remaining = camera.begin(&mut Delay)?;
    let (major, minor) = camera.status().version();
    println!(
        "Found a Unit Thermal2 (firmware {}.{}) after {} attempt(s)",
        major,
        minor,
        17 - remaining
    );
    if camera.refresh_rate() != refresh_rate {
        camera.set_refresh_rate(refresh_rate)?;
    }

    // Poll at twice the refresh rate
    let poll_interval = Duration::from_secs_f32(0.5 / refresh_rate.hz());
    let mut frames = 0;
    while frames < num_frames {
        match camera.poll() {
            Ok(()) => {
                frames += 1;
                print_frame(&camera);
            }
            Err(Error::LibraryError(LibraryError::FrameNotReady)) => (),
            Err(err) => return Err(err.into()),
        }
        sleep(poll_interval);
    }
    Ok(())
}

fn print_frame(camera: &Thermal2Driver<LinuxBus>) {
    let frame = camera.frame();
    let overview = frame.overview();
    println!(
        "Subpage {:?}: lowest {:.2}℃ at ({}, {}), highest {:.2}℃ at ({}, {}), average {:.2}℃",
        frame.subpage(),
        overview.lowest_temperature(),
        overview.lowest().x(),
        overview.lowest().y(),
        overview.highest_temperature(),
        overview.highest().x(),
        overview.highest().y(),
        overview.average_temperature(),
    );
    for (count, temperature) in frame.temperatures().enumerate() {
        if count % WIDTH == 0 {
            println!();
        }
        print!("{:6.2} ", temperature);
    }
    println!();
    let buttons = camera.buttons();
    if buttons.was_clicked() {
        println!("Button clicked");
    }
    if !camera.active_alarms().is_empty() {
        println!("Alarms active: {:#010b}", camera.active_alarms().bits());
    }
}
