//! Battery monitor
//!
//! Runs entirely off the fixed 10 ms sampling tick: accumulates ADC
//! readings, computes a calibrated voltage every 17 samples, classifies the
//! power status, and sequences the debounced, confirmable shutdown. The
//! hardware power cut is the one irreversible transition in the system.

use crate::traits::{DisplaySink, PowerLatch};

/// Classification thresholds in 10 mV units
pub const BAT_LOW: u16 = 1050;
pub const BAT_SHUTDOWN: u16 = 950;
pub const BAT_EXTERNAL: u16 = 890;

/// ADC samples accumulated per voltage computation
const SAMPLES_PER_VOLTAGE: u8 = 17;

/// Voltage computations per housekeeping pass
const VOLTAGE_UPDATES_PER_HOUSEKEEPING: u8 = 16;

/// Housekeeping ticks from shutdown start to power cut
const SHUTDOWN_TICKS: u16 = 6;

/// Housekeeping ticks a shutdown request stays open for confirmation
const CONFIRMATION_TICKS: u16 = 5;

/// Button polls (10 ms each) before a press registers
const BUTTON_REQUEST_COUNT: u32 = 5;

/// Button polls before the hold forces an immediate power cut (~10 s)
const BUTTON_FORCE_COUNT: u32 = 1000;

/// Power status in escalation order.
///
/// Classification by voltage threshold only runs below `External`; from
/// `External` upward the status changes only through explicit triggers or
/// the confirmation-window timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BatteryStatus {
    /// Battery healthy
    Ok = 0,
    /// Battery low, still usable
    Low = 1,
    /// Battery critically low
    Shutdown = 2,
    /// No battery detected, running on external power
    External = 3,
    /// Operator confirmed a shutdown request
    ShutdownRequested = 4,
    /// Shutdown countdown running
    ShutdownActive = 5,
}

impl BatteryStatus {
    /// Two-letter code used on the console protocol
    pub fn code(self) -> &'static str {
        match self {
            BatteryStatus::Ok => "OK",
            BatteryStatus::Low => "BL",
            BatteryStatus::Shutdown => "SB",
            BatteryStatus::External => "BE",
            BatteryStatus::ShutdownRequested => "SR",
            BatteryStatus::ShutdownActive => "SX",
        }
    }

    /// Whether voltage thresholds may still reclassify this status
    fn reclassifiable(self) -> bool {
        self < BatteryStatus::External
    }
}

/// Battery supervisor state.
///
/// [`tick`](Self::tick) is the only mutation path besides the calibration
/// setters and the explicit shutdown entry points; it is driven from the
/// 10 ms timer context, while the setters run from command dispatch in the
/// main loop.
pub struct BatteryMonitor {
    adc_sum: u32,
    sample_count: u8,
    voltage: u16,
    voltage_raw: u16,
    slope: u16,
    intercept: u16,
    status: BatteryStatus,
    update_count: u8,
    shutdown_countdown: u16,
    confirmation_countdown: u16,
    button_hold_count: u32,
}

impl BatteryMonitor {
    /// Create a monitor with calibration loaded from the persistent store
    pub fn new(slope: u16, intercept: u16) -> Self {
        Self {
            adc_sum: 0,
            sample_count: 0,
            voltage: 0,
            voltage_raw: 0,
            slope,
            intercept,
            status: BatteryStatus::Ok,
            update_count: 0,
            shutdown_countdown: 0,
            confirmation_countdown: 0,
            button_hold_count: 0,
        }
    }

    /// Process one 10 ms sampling tick.
    ///
    /// `sample` is the raw ADC reading, `button_held` the (active) state of
    /// the shutdown button. Returns true on the housekeeping passes where
    /// the caller should refresh the displayed battery status.
    pub fn tick<D: DisplaySink, L: PowerLatch>(
        &mut self,
        sample: u16,
        button_held: bool,
        display: &mut D,
        latch: &mut L,
    ) -> bool {
        self.accumulate(sample, display);
        self.poll_button(button_held, display, latch);
        self.housekeeping(button_held, display, latch)
    }

    fn accumulate<D: DisplaySink>(&mut self, sample: u16, display: &mut D) {
        self.adc_sum += sample as u32;
        self.sample_count += 1;
        if self.sample_count >= SAMPLES_PER_VOLTAGE {
            self.sample_count = 0;
            self.voltage_raw = self.adc_sum as u16;
            self.voltage = (self.intercept as u32 + self.slope as u32 * self.adc_sum / 10_000) as u16;
            if self.voltage < BAT_EXTERNAL {
                // below the detection floor means no battery at all
                self.voltage = 0;
            }
            self.adc_sum = 0;
            self.update_count += 1;

            if self.status.reclassifiable() {
                let previous = self.status;
                self.status = classify(self.voltage);
                if self.status == BatteryStatus::Shutdown && previous != BatteryStatus::Shutdown {
                    self.request_bat_shutdown(display);
                }
            }
        }
    }

    fn poll_button<D: DisplaySink, L: PowerLatch>(
        &mut self,
        button_held: bool,
        display: &mut D,
        latch: &mut L,
    ) {
        if button_held {
            self.button_hold_count += 1;
            match self.button_hold_count {
                BUTTON_REQUEST_COUNT => self.request_shutdown(display),
                BUTTON_FORCE_COUNT => latch.cut_power(),
                _ => {}
            }
        } else {
            self.button_hold_count = 0;
        }
    }

    fn housekeeping<D: DisplaySink, L: PowerLatch>(
        &mut self,
        button_held: bool,
        display: &mut D,
        latch: &mut L,
    ) -> bool {
        if self.update_count < VOLTAGE_UPDATES_PER_HOUSEKEEPING {
            return false;
        }
        self.update_count = 0;

        // An open confirmation window counts down only while the button is
        // released; expiry cancels the pending request.
        if self.status != BatteryStatus::ShutdownActive
            && !button_held
            && self.confirmation_countdown > 0
        {
            self.confirmation_countdown -= 1;
            if self.confirmation_countdown == 0 {
                display.print_message("Shutdown cancelled");
                self.status = BatteryStatus::Ok;
            }
        }

        if self.shutdown_countdown > 0 {
            self.shutdown_countdown -= 1;
            display.set_shutdown_timer(self.shutdown_countdown);
            if self.shutdown_countdown == 0 {
                latch.cut_power();
            }
        }
        true
    }

    /// First registered button press asks for confirmation; a second press
    /// while the window is open confirms the request. Either way the window
    /// is (re)armed.
    fn request_shutdown<D: DisplaySink>(&mut self, display: &mut D) {
        if self.confirmation_countdown == 0 {
            display.print_message("Shutdown - are you sure?");
        } else {
            self.status = BatteryStatus::ShutdownRequested;
            display.print_message("Shutdown requested");
        }
        self.confirmation_countdown = CONFIRMATION_TICKS;
    }

    /// Begin the timed shutdown sequence (console `BX` command).
    ///
    /// Reuses the `Shutdown` status code rather than `ShutdownActive`,
    /// matching the long-standing wire behavior hosts already parse.
    pub fn start_shutdown<D: DisplaySink>(&mut self, display: &mut D) {
        self.status = BatteryStatus::Shutdown;
        self.shutdown_countdown = SHUTDOWN_TICKS;
        display.print_message("Shutdown ...");
    }

    /// Low-battery shutdown request: notify the operator and open a
    /// confirmation window; the supervising host decides whether to act.
    pub fn request_bat_shutdown<D: DisplaySink>(&mut self, display: &mut D) {
        self.status = BatteryStatus::Shutdown;
        display.print_message("Battery shutdown");
        self.confirmation_countdown = CONFIRMATION_TICKS;
    }

    /// Calibrated voltage in 10 mV units (0 = external power / no battery)
    pub fn voltage(&self) -> u16 {
        self.voltage
    }

    /// Last accumulated raw ADC sum
    pub fn raw_voltage(&self) -> u16 {
        self.voltage_raw
    }

    pub fn status(&self) -> BatteryStatus {
        self.status
    }

    pub fn slope(&self) -> u16 {
        self.slope
    }

    pub fn intercept(&self) -> u16 {
        self.intercept
    }

    /// Update the live calibration slope (persistence is the caller's job)
    pub fn set_slope(&mut self, slope: u16) {
        self.slope = slope;
    }

    /// Update the live calibration intercept
    pub fn set_intercept(&mut self, intercept: u16) {
        self.intercept = intercept;
    }
}

fn classify(voltage: u16) -> BatteryStatus {
    if voltage > BAT_LOW {
        BatteryStatus::Ok
    } else if voltage > BAT_SHUTDOWN {
        BatteryStatus::Low
    } else if voltage > BAT_EXTERNAL {
        BatteryStatus::Shutdown
    } else {
        BatteryStatus::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotorChannel;
    use heapless::{String, Vec};

    #[derive(Default)]
    struct MockDisplay {
        messages: Vec<String<32>, 16>,
        shutdown_timer: Option<u16>,
    }

    impl MockDisplay {
        fn last_message(&self) -> Option<&str> {
            self.messages.last().map(|s| s.as_str())
        }
    }

    impl DisplaySink for MockDisplay {
        fn print_message(&mut self, text: &str) {
            let mut s = String::new();
            let _ = s.push_str(text);
            let _ = self.messages.push(s);
        }
        fn print_title(&mut self, _text: &str) {}
        fn clear(&mut self) {}
        fn set_motor_enabled(&mut self, _channel: MotorChannel, _enabled: bool) {}
        fn set_motor_power(&mut self, _channel: MotorChannel, _on: bool) {}
        fn set_motor_rpm(&mut self, _channel: MotorChannel, _rpm: u32) {}
        fn set_shutdown_timer(&mut self, remaining: u16) {
            self.shutdown_timer = Some(remaining);
        }
    }

    #[derive(Default)]
    struct MockLatch {
        cut: bool,
    }

    impl PowerLatch for MockLatch {
        fn cut_power(&mut self) {
            self.cut = true;
        }
    }

    /// ADC sample that lands the computed voltage exactly on `voltage_10mv`
    /// with the default calibration (intercept 825, slope 372):
    /// voltage = 825 + 372 * (17 * sample) / 10000
    fn sample_for(voltage_10mv: u16) -> u16 {
        let sum = (voltage_10mv as u32 - 825) * 10_000 / 372;
        (sum / 17) as u16 + 1
    }

    fn monitor() -> BatteryMonitor {
        BatteryMonitor::new(372, 825)
    }

    /// Run exactly one voltage computation's worth of samples
    fn feed_update(
        bat: &mut BatteryMonitor,
        sample: u16,
        button: bool,
        display: &mut MockDisplay,
        latch: &mut MockLatch,
    ) {
        for _ in 0..17 {
            bat.tick(sample, button, display, latch);
        }
    }

    #[test]
    fn voltage_computed_after_17_samples() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());

        for _ in 0..16 {
            bat.tick(600, false, &mut display, &mut latch);
            assert_eq!(bat.voltage(), 0);
        }
        bat.tick(600, false, &mut display, &mut latch);
        // 825 + 372 * 10200 / 10000 = 1204
        assert_eq!(bat.voltage(), 1204);
        assert_eq!(bat.raw_voltage(), 10_200);
        assert_eq!(bat.status(), BatteryStatus::Ok);
    }

    #[test]
    fn below_detection_floor_reads_as_external() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());

        feed_update(&mut bat, 1, false, &mut display, &mut latch);
        assert_eq!(bat.voltage(), 0);
        assert_eq!(bat.status(), BatteryStatus::External);
    }

    #[test]
    fn discharge_walks_status_down_without_reversal() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());

        feed_update(&mut bat, sample_for(1100), false, &mut display, &mut latch);
        assert_eq!(bat.status(), BatteryStatus::Ok);

        feed_update(&mut bat, sample_for(1000), false, &mut display, &mut latch);
        assert_eq!(bat.status(), BatteryStatus::Low);

        feed_update(&mut bat, sample_for(920), false, &mut display, &mut latch);
        assert_eq!(bat.status(), BatteryStatus::Shutdown);
        assert_eq!(display.last_message(), Some("Battery shutdown"));

        feed_update(&mut bat, 1, false, &mut display, &mut latch);
        assert_eq!(bat.status(), BatteryStatus::External);

        // back at a healthy voltage, External stays latched
        feed_update(&mut bat, sample_for(1100), false, &mut display, &mut latch);
        assert_eq!(bat.status(), BatteryStatus::External);
    }

    #[test]
    fn button_debounce_opens_confirmation_window() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());
        let healthy = sample_for(1200);

        // four polls: nothing yet
        for _ in 0..4 {
            bat.tick(healthy, true, &mut display, &mut latch);
        }
        assert!(display.messages.is_empty());

        // fifth poll asks for confirmation
        bat.tick(healthy, true, &mut display, &mut latch);
        assert_eq!(display.last_message(), Some("Shutdown - are you sure?"));
        assert_eq!(bat.status(), BatteryStatus::Ok);
    }

    #[test]
    fn second_press_confirms_request() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());
        let healthy = sample_for(1200);

        for _ in 0..5 {
            bat.tick(healthy, true, &mut display, &mut latch);
        }
        // release, then press again through the debounce
        bat.tick(healthy, false, &mut display, &mut latch);
        for _ in 0..5 {
            bat.tick(healthy, true, &mut display, &mut latch);
        }
        assert_eq!(display.last_message(), Some("Shutdown requested"));
        assert_eq!(bat.status(), BatteryStatus::ShutdownRequested);
    }

    #[test]
    fn unconfirmed_request_times_out_and_cancels() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());
        let healthy = sample_for(1200);

        for _ in 0..5 {
            bat.tick(healthy, true, &mut display, &mut latch);
        }
        bat.tick(healthy, false, &mut display, &mut latch);
        for _ in 0..5 {
            bat.tick(healthy, true, &mut display, &mut latch);
        }
        assert_eq!(bat.status(), BatteryStatus::ShutdownRequested);

        // button released: five housekeeping passes expire the window
        for _ in 0..(17 * 16 * 5) {
            bat.tick(healthy, false, &mut display, &mut latch);
        }
        assert_eq!(display.last_message(), Some("Shutdown cancelled"));
        assert_eq!(bat.status(), BatteryStatus::Ok);
        assert!(!latch.cut);
    }

    #[test]
    fn long_hold_forces_power_cut() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());
        let healthy = sample_for(1200);

        for _ in 0..999 {
            bat.tick(healthy, true, &mut display, &mut latch);
        }
        assert!(!latch.cut);
        bat.tick(healthy, true, &mut display, &mut latch);
        assert!(latch.cut);
    }

    #[test]
    fn started_shutdown_counts_down_to_power_cut() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());
        let healthy = sample_for(1200);

        bat.start_shutdown(&mut display);
        assert_eq!(display.last_message(), Some("Shutdown ..."));
        assert_eq!(bat.status(), BatteryStatus::Shutdown);

        // five housekeeping passes tick the counter 5 -> 1
        for _ in 0..(17 * 16 * 5) {
            bat.tick(healthy, false, &mut display, &mut latch);
        }
        assert_eq!(display.shutdown_timer, Some(1));
        assert!(!latch.cut);

        // the sixth cuts power
        for _ in 0..(17 * 16) {
            bat.tick(healthy, false, &mut display, &mut latch);
        }
        assert_eq!(display.shutdown_timer, Some(0));
        assert!(latch.cut);
    }

    #[test]
    fn housekeeping_cadence_flags_refresh() {
        let mut bat = monitor();
        let (mut display, mut latch) = (MockDisplay::default(), MockLatch::default());

        let mut refreshes = 0;
        for _ in 0..(17 * 16 * 3) {
            if bat.tick(600, false, &mut display, &mut latch) {
                refreshes += 1;
            }
        }
        assert_eq!(refreshes, 3);
    }
}
