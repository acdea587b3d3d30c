//! PWM buzzer
//!
//! A passive buzzer driven by a PWM channel. The frequency is fixed when
//! the channel is configured; this driver only gates the square wave by
//! switching between 50% duty and fully off.

use embedded_hal::pwm::SetDutyCycle;
use rangeguard_core::traits::{AlertTone, ToneError};

/// Buzzer on a PWM channel
pub struct PwmBuzzer<P> {
    pwm: P,
    on: bool,
}

impl<P: SetDutyCycle> PwmBuzzer<P> {
    /// Create a silent buzzer
    pub fn new(pwm: P) -> Result<Self, ToneError> {
        let mut buzzer = Self { pwm, on: true };
        buzzer.set_tone(false)?;
        Ok(buzzer)
    }

    /// Release the PWM channel
    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> AlertTone for PwmBuzzer<P> {
    fn set_tone(&mut self, on: bool) -> Result<(), ToneError> {
        if on == self.on {
            return Ok(());
        }

        let result = if on {
            self.pwm.set_duty_cycle_fraction(1, 2)
        } else {
            self.pwm.set_duty_cycle_fully_off()
        };
        result.map_err(|_| ToneError::Output)?;

        self.on = on;
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::pwm::{ErrorKind, ErrorType};

    struct MockPwm {
        duty: u16,
        writes: usize,
        fail: bool,
    }

    impl MockPwm {
        fn new() -> Self {
            Self {
                duty: 0xFFFF,
                writes: 0,
                fail: false,
            }
        }
    }

    impl ErrorType for MockPwm {
        type Error = ErrorKind;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            31_250
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            self.writes += 1;
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_starts_silent() {
        let buzzer = PwmBuzzer::new(MockPwm::new()).unwrap();
        assert!(!buzzer.is_on());
        assert_eq!(buzzer.pwm.duty, 0);
    }

    #[test]
    fn test_half_duty_when_on() {
        let mut buzzer = PwmBuzzer::new(MockPwm::new()).unwrap();
        buzzer.set_tone(true).unwrap();
        assert!(buzzer.is_on());
        assert_eq!(buzzer.pwm.duty, 15_625);

        buzzer.set_tone(false).unwrap();
        assert_eq!(buzzer.pwm.duty, 0);
    }

    #[test]
    fn test_unchanged_state_skips_write() {
        let mut buzzer = PwmBuzzer::new(MockPwm::new()).unwrap();
        let writes = buzzer.pwm.writes;
        buzzer.set_tone(false).unwrap();
        assert_eq!(buzzer.pwm.writes, writes);
    }

    #[test]
    fn test_output_error() {
        let mut buzzer = PwmBuzzer::new(MockPwm::new()).unwrap();
        buzzer.pwm.fail = true;
        assert_eq!(buzzer.set_tone(true), Err(ToneError::Output));
        assert!(!buzzer.is_on());
    }
}
