//! Distance monitor task
//!
//! Boots the range sensor, then runs the read-classify-actuate loop at
//! the configured cadence. A boot failure halts the appliance with an
//! error frame; every other failure is logged and the loop carries on.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::{I2C0, I2C1};
use embassy_rp::pwm::PwmOutput;
use embassy_time::{Duration, Timer};

use rangeguard_core::config::AppConfig;
use rangeguard_core::format::{DistanceText, Frame};
use rangeguard_core::reading::{Classification, Reading};
use rangeguard_core::{ApplyReport, Monitor, Outputs};
use rangeguard_drivers::buzzer::PwmBuzzer;
use rangeguard_drivers::display::Ssd1306;
use rangeguard_drivers::indicator::GpioIndicators;
use rangeguard_drivers::sensor::Vl53l0x;
use rangeguard_hal::Monotonic;
use rangeguard_hal_rp2040::{EmbassyClock, Rp2040Output};

use crate::log::ChannelLog;

/// VL53L0X on I2C0
pub type RangeSensor = Vl53l0x<I2c<'static, I2C0, Blocking>, EmbassyClock>;

/// Display, LEDs, buzzer and log
pub type MonitorOutputs = Outputs<
    Ssd1306<I2c<'static, I2C1, Blocking>>,
    GpioIndicators<Rp2040Output<'static>, Rp2040Output<'static>>,
    PwmBuzzer<PwmOutput<'static>>,
    ChannelLog,
>;

/// Distance monitor task
#[embassy_executor::task]
pub async fn monitor_task(
    mut sensor: RangeSensor,
    mut outputs: MonitorOutputs,
    config: &'static AppConfig,
) {
    info!("Monitor task started");

    let mut monitor = Monitor::new(config);

    if config.log.enabled {
        if let Err(e) = outputs.start() {
            warn!("Could not start log session: {:?}", e);
        }
    }

    info!("Starting VL53L0X...");
    match sensor.boot() {
        Ok(calibration) => {
            info!(
                "VL53L0X booted (stop variable {=u8:#x}, budget {} us)",
                calibration.stop_variable, calibration.timing_budget_us
            );
        }
        Err(e) => {
            error!("VL53L0X boot failed: {:?}", Debug2Format(&e));
            halt(&mut outputs, monitor.title()).await;
        }
    }

    if let Err(e) = sensor.start_continuous(config.sensor.continuous_period_ms) {
        error!("Failed to start continuous ranging: {:?}", Debug2Format(&e));
        halt(&mut outputs, monitor.title()).await;
    }
    info!("Sensor in continuous mode");

    let poll_interval = Duration::from_millis(config.monitor.poll_interval_ms as u64);

    loop {
        let reading = match sensor.measure() {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Sensor read failed: {:?}", Debug2Format(&e));
                Reading::invalid(EmbassyClock.now_ms())
            }
        };

        let (decision, report) = monitor.step(&reading, &mut outputs);

        let text = DistanceText::from_cm(reading.distance_cm);
        info!(
            "Status: {} | Distance: {} {}",
            decision.status.label(),
            text.value.as_str(),
            text.unit.symbol()
        );

        match decision.classification {
            Classification::Invalid => warn!("Reading error"),
            Classification::OutOfRange { cm } => warn!("Out of range: {} cm", cm),
            Classification::InRange { .. } => {}
        }

        report_failures(&report);

        Timer::after(poll_interval).await;
    }
}

/// Log collaborator failures without stopping the loop
fn report_failures(report: &ApplyReport) {
    if let Err(e) = report.display {
        warn!("Display update failed: {:?}", e);
    }
    if let Err(e) = report.tone {
        warn!("Buzzer update failed: {:?}", e);
    }
    if let Some(Err(e)) = report.log {
        warn!("Log record dropped: {:?}", e);
    }
}

/// Show the boot failure frame, silence everything and park forever
async fn halt(outputs: &mut MonitorOutputs, title: &str) -> ! {
    let report = outputs.halt(&Frame::boot_failed(title));
    report_failures(&report);
    error!("Halted");

    loop {
        Timer::after_secs(60).await;
    }
}
