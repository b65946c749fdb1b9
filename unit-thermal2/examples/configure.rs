use std::env;

use anyhow::bail;
use linux_embedded_hal::Delay;

use unit_thermal2::{AlarmFlags, AlarmRegister, Rgb, Thermal2Config, Thermal2Driver};

mod common;

use common::{parse_address, LinuxBus};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!(
            "Usage: <I2C bus> <address> [show | area <width> <height> | alarm <low ℃> <high ℃> | \
             noise <level> | address <new address>]"
        );
    }
    let address = parse_address(&args[2])?;
    let bus = LinuxBus::open(&args[1])?;
    let mut camera = Thermal2Driver::new(bus, Thermal2Config::STANDARD.with_address(address));
    camera.begin(&mut Delay)?;

    match args.get(3).map(String::as_str) {
        None | Some("show") => (),
        Some("area") if args.len() == 6 => {
            camera.set_monitor_area(args[4].parse()?, args[5].parse()?)?;
        }
        Some("alarm") if args.len() == 6 => {
            let low: f32 = args[4].parse()?;
            let high: f32 = args[5].parse()?;
            camera.set_lowest_alarm(AlarmRegister::new(low, 20, 1000, Rgb::new(0, 0, 0xFF)))?;
            camera.set_highest_alarm(AlarmRegister::new(high, 10, 3000, Rgb::new(0xFF, 0, 0)))?;
            camera.enable_alarms(AlarmFlags::LOWEST_BELOW_LOW | AlarmFlags::HIGHEST_ABOVE_HIGH)?;
        }
        Some("noise") if args.len() == 5 => {
            camera.set_noise_filter_level(args[4].parse()?)?;
        }
        Some("address") if args.len() == 5 => {
            let new_address = parse_address(&args[4])?;
            camera.change_address(new_address)?;
            println!(
                "The module will use address {:#04x} after it is power cycled",
                new_address
            );
        }
        Some(other) => bail!("Unknown or incomplete command '{}'", other),
    }
    print_config(&camera);
    Ok(())
}

fn print_config(camera: &Thermal2Driver<LinuxBus>) {
    let config = camera.config();
    let control = config.function_control();
    println!("Address:         {:#04x}", config.address());
    println!("Refresh rate:    {}Hz", config.refresh_rate().hz());
    println!("Noise filter:    {}", config.noise_filter());
    println!(
        "Monitor area:    {}×{}",
        config.monitor_area().width(),
        config.monitor_area().height()
    );
    println!(
        "Buzzer:          {} ({}Hz, volume {})",
        if control.buzzer_enabled() { "on" } else { "off" },
        config.buzzer_frequency(),
        config.buzzer_volume()
    );
    println!(
        "LED:             {} ({:?})",
        if control.led_enabled() { "on" } else { "off" },
        config.led()
    );
    println!("Alarms enabled:  {:#010b}", config.alarm_enable().bits());
    for (name, alarm) in [
        ("Lowest alarm: ", camera.lowest_alarm()),
        ("Highest alarm:", camera.highest_alarm()),
    ] {
        println!(
            "{}   {:.2}℃, {}Hz, {}ms, {:?}",
            name,
            alarm.threshold(),
            alarm.buzzer_frequency(),
            u16::from(alarm.interval()) * 10,
            alarm.led()
        );
    }
}
