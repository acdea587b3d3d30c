//! PWM configuration for the alert buzzer
//!
//! The buzzer needs a square wave at a fixed audible frequency. The slice
//! counter wraps at `top`; the compare level is set per tone state by the
//! buzzer driver (half of `top` for on, zero for off).

use embassy_rp::pwm::Config;
use fixed::types::extra::U4;
use fixed::FixedU16;

/// Default system clock on the RP2040 (Hz)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Largest divider in 1/16 steps (8.4 fixed point, 255 + 15/16)
const MAX_DIVIDER_X16: u32 = 0xFFF;

/// Divider and wrap value for one tone frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToneTiming {
    /// Clock divider in 1/16 steps
    pub divider_x16: u16,
    /// Counter wrap value
    pub top: u16,
}

/// Calculate the slice timing for a target frequency
///
/// The divider is the smallest 1/16 step that keeps one period within the
/// 16-bit counter, but never below 1.0. The counter then wraps at
/// `sys_clk / divider / freq - 1`.
pub fn tone_timing(sys_clk_hz: u32, freq_hz: u32) -> ToneTiming {
    if freq_hz == 0 {
        return ToneTiming {
            divider_x16: MAX_DIVIDER_X16 as u16,
            top: u16::MAX,
        };
    }

    let clk = sys_clk_hz as u64;
    let freq = freq_hz as u64;

    // clk * 16 / divider_x16 / freq <= 65536, rounded up
    let mut divider_x16 = clk / freq / 4096 + u64::from(clk % (freq * 4096) != 0);
    if divider_x16 / 16 == 0 {
        divider_x16 = 16;
    }
    let divider_x16 = divider_x16.min(MAX_DIVIDER_X16 as u64);

    let wrap = (clk * 16 / divider_x16 / freq).saturating_sub(1);

    ToneTiming {
        divider_x16: divider_x16 as u16,
        top: wrap.min(u16::MAX as u64) as u16,
    }
}

/// Build the slice configuration for a tone at `freq_hz`
///
/// Both compare levels start at zero so the buzzer is silent until the
/// driver switches it on.
pub fn tone_pwm_config(sys_clk_hz: u32, freq_hz: u32) -> Config {
    let timing = tone_timing(sys_clk_hz, freq_hz);

    let mut config = Config::default();
    config.divider = FixedU16::<U4>::from_bits(timing.divider_x16);
    config.top = timing.top;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}
