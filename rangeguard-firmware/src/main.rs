//! Rangeguard - Distance Monitor Firmware
//!
//! Main firmware binary for an RP2040 board with a VL53L0X time-of-flight
//! sensor, an SSD1306 OLED, two indicator LEDs and a passive buzzer.
//!
//! Wiring:
//! - VL53L0X on I2C0 (SDA GPIO0, SCL GPIO1) at 100 kHz
//! - SSD1306 on I2C1 (SDA GPIO14, SCL GPIO15) at 400 kHz
//! - LEDs on GPIO13 (OPEN) and GPIO11 (CLOSE)
//! - Buzzer on GPIO21 (PWM slice 2, channel B)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::pwm::Pwm;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use rangeguard_core::config::{parse_config, AppConfig};
use rangeguard_core::Outputs;
use rangeguard_drivers::buzzer::PwmBuzzer;
use rangeguard_drivers::display::{ssd1306, Ssd1306};
use rangeguard_drivers::indicator::GpioIndicators;
use rangeguard_drivers::sensor::{Vl53l0x, Vl53l0xConfig};
use rangeguard_hal::I2cConfig;
use rangeguard_hal_rp2040::pwm::{tone_pwm_config, SYS_CLK_HZ};
use rangeguard_hal_rp2040::{flash_log, EmbassyClock, Rp2040Output};

use crate::log::ChannelLog;

mod channels;
mod log;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit monitor.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../monitor.toml");

static CONFIG: StaticCell<AppConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Rangeguard firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static AppConfig = CONFIG.init(load_config());

    // Range sensor bus
    let mut sensor_i2c = i2c::Config::default();
    sensor_i2c.frequency = I2cConfig::STANDARD.frequency;
    let sensor_bus = I2c::new_blocking(p.I2C0, p.PIN_1, p.PIN_0, sensor_i2c);
    let sensor = Vl53l0x::new(
        sensor_bus,
        EmbassyClock,
        Vl53l0xConfig {
            timeout_ms: config.sensor.timeout_ms,
            timing_budget_us: config.sensor.timing_budget_us,
            ..Default::default()
        },
    );

    // Display
    let mut display_i2c = i2c::Config::default();
    display_i2c.frequency = I2cConfig::FAST.frequency;
    let display_bus = I2c::new_blocking(p.I2C1, p.PIN_15, p.PIN_14, display_i2c);
    let mut display = Ssd1306::new(display_bus, ssd1306::DEFAULT_ADDRESS);
    match display.init() {
        Ok(()) => info!("Display SSD1306 OK"),
        Err(e) => warn!("Display init failed, retrying on first frame: {:?}", Debug2Format(&e)),
    }

    // Indicator LEDs
    let lights = GpioIndicators::new_active_high(
        Rp2040Output::new(p.PIN_13),
        Rp2040Output::new(p.PIN_11),
    );

    // Buzzer
    let pwm = Pwm::new_output_b(
        p.PWM_SLICE2,
        p.PIN_21,
        tone_pwm_config(SYS_CLK_HZ, config.alert.frequency_hz),
    );
    let (_, buzzer_channel) = pwm.split();
    let buzzer = unwrap!(PwmBuzzer::new(unwrap!(buzzer_channel)));
    info!("Buzzer configured at {} Hz", config.alert.frequency_hz);

    let outputs = Outputs::new(display, lights, buzzer, ChannelLog);

    // Distance log
    let log = flash_log(p.FLASH, p.DMA_CH0);

    spawner.spawn(tasks::log_writer_task(log)).unwrap();
    spawner
        .spawn(tasks::monitor_task(sensor, outputs, config))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Load the embedded configuration
///
/// Falls back to the built-in defaults if the embedded TOML does not parse
/// or fails validation. build.rs rejects both cases, so this only happens
/// if the two validators disagree.
fn load_config() -> AppConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            return AppConfig::default();
        }
    };

    if let Err(e) = config.validate() {
        error!("Embedded config rejected: {:?}", e);
        error!("Using default configuration");
        return AppConfig::default();
    }

    info!(
        "Configuration loaded: proximity {} cm, range {} cm, poll {} ms",
        config.monitor.proximity_threshold_cm,
        config.monitor.max_range_cm,
        config.monitor.poll_interval_ms
    );
    config
}
