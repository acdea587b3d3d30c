//! Read-classify-actuate control loop
//!
//! [`Monitor`] turns one [`Reading`] into a [`Decision`]: what the panel
//! shows, which indicator is lit, whether the tone sounds and what gets
//! logged. [`Outputs`] bundles the collaborators and applies a decision
//! to them. The loop itself (timestamping, sleeping) lives in firmware.

use heapless::String;

use crate::alert::AlertTimer;
use crate::config::AppConfig;
use crate::format::{Frame, LogRecord, LINE_LEN};
use crate::reading::{classify, Classification, OperatingStatus, Reading, Thresholds};
use crate::traits::{
    AlertTone, DisplayError, DisplayRenderer, IndicatorLights, IndicatorState, LogError, LogSink,
    ToneError,
};

/// Everything the outputs should do for one reading
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decision {
    pub classification: Classification,
    /// Operating status after this reading
    pub status: OperatingStatus,
    pub frame: Frame,
    pub indicators: IndicatorState,
    pub tone_on: bool,
    /// Record to append, only for IN_RANGE readings
    pub log: Option<LogRecord>,
}

/// Control loop state
pub struct Monitor {
    title: String<LINE_LEN>,
    thresholds: Thresholds,
    alert_enabled: bool,
    alert_threshold_cm: u16,
    log_enabled: bool,
    alert: AlertTimer,
    status: OperatingStatus,
}

impl Monitor {
    /// Create a monitor from a validated configuration
    pub fn new(config: &AppConfig) -> Self {
        Self {
            title: config.display.title.clone(),
            thresholds: config.thresholds(),
            alert_enabled: config.alert.enabled,
            alert_threshold_cm: config.alert.threshold_cm,
            log_enabled: config.log.enabled,
            alert: AlertTimer::new(config.alert_pattern()),
            status: OperatingStatus::default(),
        }
    }

    /// Classify a reading and decide the outputs
    ///
    /// Only IN_RANGE readings update the operating status, light an
    /// indicator, produce a log record or run the alert timer. Everything
    /// else forces lights and tone off and disarms the timer.
    pub fn evaluate(&mut self, reading: &Reading) -> Decision {
        let now = reading.timestamp_ms;
        let classification = classify(reading.distance_cm, &self.thresholds);

        let (indicators, tone_on, log) = match classification {
            Classification::InRange { cm, status } => {
                self.status = status;

                let tone_on = if self.alert_enabled && cm < self.alert_threshold_cm {
                    self.alert.update(now)
                } else {
                    self.alert.reset(now);
                    false
                };

                let log = self.log_enabled.then_some(LogRecord {
                    elapsed_ms: now,
                    distance_cm: Some(cm),
                    status,
                });

                (IndicatorState::from(status), tone_on, log)
            }
            Classification::Invalid | Classification::OutOfRange { .. } => {
                self.alert.reset(now);
                (IndicatorState::Off, false, None)
            }
        };

        Decision {
            classification,
            status: self.status,
            frame: Frame::for_classification(&self.title, &classification, self.status),
            indicators,
            tone_on,
            log,
        }
    }

    /// Evaluate a reading and apply the result to `outputs`
    pub fn step<D, I, T, L>(
        &mut self,
        reading: &Reading,
        outputs: &mut Outputs<D, I, T, L>,
    ) -> (Decision, ApplyReport)
    where
        D: DisplayRenderer,
        I: IndicatorLights,
        T: AlertTone,
        L: LogSink,
    {
        let decision = self.evaluate(reading);
        let report = outputs.apply(&decision);
        (decision, report)
    }

    /// Current operating status
    pub fn status(&self) -> OperatingStatus {
        self.status
    }

    /// Configured panel title
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn alert_timer(&self) -> &AlertTimer {
        &self.alert
    }
}

/// Result of applying a decision to the collaborators
///
/// Failures are reported here and never stop the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApplyReport {
    pub display: Result<(), DisplayError>,
    pub tone: Result<(), ToneError>,
    /// `None` when the decision carried no record
    pub log: Option<Result<(), LogError>>,
}

impl ApplyReport {
    /// Check if every collaborator accepted its update
    pub fn is_ok(&self) -> bool {
        self.display.is_ok() && self.tone.is_ok() && !matches!(self.log, Some(Err(_)))
    }
}

/// The output collaborators driven by the control loop
pub struct Outputs<D, I, T, L> {
    pub display: D,
    pub lights: I,
    pub tone: T,
    pub log: L,
}

impl<D, I, T, L> Outputs<D, I, T, L>
where
    D: DisplayRenderer,
    I: IndicatorLights,
    T: AlertTone,
    L: LogSink,
{
    pub fn new(display: D, lights: I, tone: T, log: L) -> Self {
        Self {
            display,
            lights,
            tone,
            log,
        }
    }

    /// Start a new log session
    pub fn start(&mut self) -> Result<(), LogError> {
        self.log.start_session()
    }

    /// Apply one decision: display, log, lights, then tone
    pub fn apply(&mut self, decision: &Decision) -> ApplyReport {
        let display = self.display.show(&decision.frame);
        let log = decision.log.as_ref().map(|record| self.log.append(record));
        self.lights.show(decision.indicators);
        let tone = self.tone.set_tone(decision.tone_on);

        ApplyReport { display, tone, log }
    }

    /// Show a terminal frame and silence everything
    pub fn halt(&mut self, frame: &Frame) -> ApplyReport {
        let display = self.display.show(frame);
        self.lights.show(IndicatorState::Off);
        let tone = self.tone.set_tone(false);

        ApplyReport {
            display,
            tone,
            log: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockDisplay {
        frames: Vec<Frame>,
        pending: Option<Frame>,
        fail: bool,
    }

    impl DisplayRenderer for MockDisplay {
        fn draw(&mut self, frame: &Frame) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Bus);
            }
            self.pending = Some(frame.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<(), DisplayError> {
            let frame = self.pending.take().ok_or(DisplayError::NotReady)?;
            self.frames.push(frame);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockLights {
        state: IndicatorState,
    }

    impl IndicatorLights for MockLights {
        fn show(&mut self, state: IndicatorState) {
            self.state = state;
        }

        fn state(&self) -> IndicatorState {
            self.state
        }
    }

    #[derive(Default)]
    struct MockTone {
        on: bool,
    }

    impl AlertTone for MockTone {
        fn set_tone(&mut self, on: bool) -> Result<(), ToneError> {
            self.on = on;
            Ok(())
        }

        fn is_on(&self) -> bool {
            self.on
        }
    }

    #[derive(Default)]
    struct MockLog {
        sessions: usize,
        records: Vec<LogRecord>,
        busy: bool,
    }

    impl LogSink for MockLog {
        fn start_session(&mut self) -> Result<(), LogError> {
            self.sessions += 1;
            self.records.clear();
            Ok(())
        }

        fn append(&mut self, record: &LogRecord) -> Result<(), LogError> {
            if self.busy {
                return Err(LogError::Busy);
            }
            self.records.push(*record);
            Ok(())
        }
    }

    type TestOutputs = Outputs<MockDisplay, MockLights, MockTone, MockLog>;

    fn outputs() -> TestOutputs {
        Outputs::new(
            MockDisplay::default(),
            MockLights::default(),
            MockTone::default(),
            MockLog::default(),
        )
    }

    fn last_frame(outputs: &TestOutputs) -> &Frame {
        outputs.display.frames.last().unwrap()
    }

    #[test]
    fn test_scenario_invalid_reading() {
        let mut monitor = Monitor::new(&AppConfig::default());
        let mut out = outputs();
        out.start().unwrap();

        let (decision, report) = monitor.step(&Reading::from_mm(2001, 400), &mut out);
        assert!(report.is_ok());
        assert_eq!(decision.classification, Classification::Invalid);
        assert_eq!(last_frame(&out).distance.as_str(), "SENSOR ERROR");
        assert!(out.log.records.is_empty());
        assert_eq!(report.log, None);
        assert_eq!(out.lights.state(), IndicatorState::Off);
        assert!(!out.tone.is_on());
    }

    #[test]
    fn test_scenario_open_reading_is_logged() {
        let mut monitor = Monitor::new(&AppConfig::default());
        let mut out = outputs();
        out.start().unwrap();

        let (decision, report) = monitor.step(&Reading::from_mm(50, 65_000), &mut out);
        assert!(report.is_ok());
        assert_eq!(
            decision.classification,
            Classification::InRange {
                cm: 5,
                status: OperatingStatus::Open
            }
        );
        assert_eq!(out.lights.state(), IndicatorState::Open);
        assert_eq!(out.log.records.len(), 1);
        assert_eq!(out.log.records[0].to_line().as_str(), "01:05,5,cm,OPEN");
        assert_eq!(last_frame(&out).distance.as_str(), "DISTANCE: 5 cm");
        assert_eq!(last_frame(&out).status.as_str(), "AUT-ACCESS: OPEN");
        // 5 cm is below the alert threshold: first tick of a fresh window
        assert!(out.tone.is_on());
    }

    #[test]
    fn test_scenario_beyond_ceiling() {
        let mut config = AppConfig::default();
        config.monitor.max_range_cm = 120;
        let mut monitor = Monitor::new(&config);
        let mut out = outputs();

        let (decision, _) = monitor.step(&Reading::from_mm(1500, 1000), &mut out);
        assert_eq!(decision.classification, Classification::OutOfRange { cm: 150 });
        assert_eq!(last_frame(&out).distance.as_str(), "OUT OF RANGE");
        assert!(out.log.records.is_empty());
        assert_eq!(out.lights.state(), IndicatorState::Off);
        assert!(!out.tone.is_on());
    }

    #[test]
    fn test_150cm_within_default_ceiling() {
        let mut monitor = Monitor::new(&AppConfig::default());
        let mut out = outputs();

        let (decision, _) = monitor.step(&Reading::from_mm(1500, 1000), &mut out);
        assert_eq!(
            decision.classification,
            Classification::InRange {
                cm: 150,
                status: OperatingStatus::Close
            }
        );
        assert_eq!(last_frame(&out).distance.as_str(), "DISTANCE: 1.50 m");
        assert_eq!(out.log.records[0].to_line().as_str(), "00:01,1.50,m,CLOSE");
        assert_eq!(out.lights.state(), IndicatorState::Close);
        assert!(!out.tone.is_on());
    }

    #[test]
    fn test_status_retained_across_errors() {
        let mut monitor = Monitor::new(&AppConfig::default());
        let mut out = outputs();

        monitor.step(&Reading::from_mm(40, 0), &mut out);
        assert_eq!(monitor.status(), OperatingStatus::Open);

        let (decision, _) = monitor.step(&Reading::invalid(200), &mut out);
        assert_eq!(decision.status, OperatingStatus::Open);
        assert_eq!(last_frame(&out).status.as_str(), "AUT-ACCESS: OPEN");
        assert_eq!(out.lights.state(), IndicatorState::Off);
    }

    #[test]
    fn test_alert_pulses_and_restarts() {
        let mut config = AppConfig::default();
        config.alert.threshold_cm = 8;
        let mut monitor = Monitor::new(&config);

        let near = |t| Reading::from_cm(Some(5), t);
        assert!(monitor.evaluate(&near(1000)).tone_on);
        assert!(!monitor.evaluate(&near(1200)).tone_on);
        assert!(monitor.evaluate(&near(2100)).tone_on);
        assert!(!monitor.evaluate(&near(2200)).tone_on);

        // 9 cm: still OPEN but above the alert threshold
        let decision = monitor.evaluate(&Reading::from_cm(Some(9), 2400));
        assert!(!decision.tone_on);
        assert_eq!(decision.indicators, IndicatorState::Open);
        assert!(!monitor.alert_timer().is_armed());
        assert_eq!(monitor.alert_timer().last_transition_ms(), 2400);

        // Fresh window, not the old phase
        assert!(monitor.evaluate(&near(2750)).tone_on);
        assert!(monitor.evaluate(&near(2849)).tone_on);
        assert!(!monitor.evaluate(&near(2850)).tone_on);
    }

    #[test]
    fn test_alert_threshold_is_exclusive() {
        // Defaults: proximity and alert threshold both 10 cm
        let mut monitor = Monitor::new(&AppConfig::default());
        let mut out = outputs();

        let (decision, _) = monitor.step(&Reading::from_cm(Some(9), 0), &mut out);
        assert!(decision.tone_on);
        assert!(out.tone.is_on());
        assert!(monitor.alert_timer().is_armed());

        // Exactly at the threshold, still inside the on-phase
        let (decision, _) = monitor.step(&Reading::from_cm(Some(10), 50), &mut out);
        assert!(!decision.tone_on);
        assert!(!out.tone.is_on());
        assert!(!monitor.alert_timer().is_armed());
        assert_eq!(monitor.alert_timer().last_transition_ms(), 50);
        assert_eq!(decision.status, OperatingStatus::Close);
        assert_eq!(out.lights.state(), IndicatorState::Close);

        // Back below: a fresh pulse starts at once
        let (decision, _) = monitor.step(&Reading::from_cm(Some(9), 500), &mut out);
        assert!(decision.tone_on);
        assert_eq!(monitor.alert_timer().last_transition_ms(), 500);
    }

    #[test]
    fn test_error_reading_resets_alert() {
        let mut monitor = Monitor::new(&AppConfig::default());
        assert!(monitor.evaluate(&Reading::from_cm(Some(3), 0)).tone_on);
        assert!(!monitor.evaluate(&Reading::invalid(50)).tone_on);
        assert!(!monitor.alert_timer().is_armed());
        assert!(monitor.evaluate(&Reading::from_cm(Some(3), 1000)).tone_on);
    }

    #[test]
    fn test_alert_disabled() {
        let mut config = AppConfig::default();
        config.alert.enabled = false;
        let mut monitor = Monitor::new(&config);
        assert!(!monitor.evaluate(&Reading::from_cm(Some(1), 0)).tone_on);
    }

    #[test]
    fn test_log_disabled() {
        let mut config = AppConfig::default();
        config.log.enabled = false;
        let mut monitor = Monitor::new(&config);
        assert_eq!(monitor.evaluate(&Reading::from_cm(Some(42), 0)).log, None);
    }

    #[test]
    fn test_collaborator_failures_are_reported() {
        let mut monitor = Monitor::new(&AppConfig::default());
        let mut out = outputs();
        out.display.fail = true;
        out.log.busy = true;

        let (_, report) = monitor.step(&Reading::from_cm(Some(30), 0), &mut out);
        assert!(!report.is_ok());
        assert_eq!(report.display, Err(DisplayError::Bus));
        assert_eq!(report.log, Some(Err(LogError::Busy)));
        // Remaining outputs still updated
        assert_eq!(out.lights.state(), IndicatorState::Close);
        assert_eq!(report.tone, Ok(()));
    }

    #[test]
    fn test_halt_silences_outputs() {
        let mut monitor = Monitor::new(&AppConfig::default());
        let mut out = outputs();
        monitor.step(&Reading::from_cm(Some(2), 0), &mut out);
        assert!(out.tone.is_on());

        let report = out.halt(&Frame::boot_failed(monitor.title()));
        assert!(report.is_ok());
        assert!(!out.tone.is_on());
        assert_eq!(out.lights.state(), IndicatorState::Off);
        assert_eq!(last_frame(&out).lines()[1], "SENSOR BOOT FAILED");
    }
}
