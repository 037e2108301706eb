//! Single stepper channel state and ramp tick

use crate::traits::ChannelPins;

/// Shortest allowed step period in microseconds (fastest speed)
pub const STEP_PERIOD_MIN: u32 = 100;

/// Longest allowed step period in microseconds; doubles as the idle marker
/// for a stopped channel
pub const STEP_PERIOD_MAX: u32 = 150_000;

/// RPM-to-period conversion: period_us = CONVERSION_FACTOR / rpm
pub const CONVERSION_FACTOR: u32 = 150_000;

/// Highest commandable speed
pub const RPM_MAX: u32 = 1500;

/// Identifies one of the two wheel channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorChannel {
    A,
    B,
}

/// One stepper channel: direction/enable/power outputs plus the step-period
/// pair driven by the ramp.
///
/// Field ownership is split by execution context. Direction, enable and
/// power mode are only written from main-loop context (command dispatch);
/// the step periods are only written by [`ramp_tick`](Self::ramp_tick),
/// which runs from the channel's own timer context and is read-only
/// everywhere else.
pub struct StepperChannel<P: ChannelPins> {
    pins: P,
    direction: bool,
    enabled: bool,
    power_mode: bool,
    current_period: u32,
    target_period: u32,
}

impl<P: ChannelPins> StepperChannel<P> {
    /// Create a channel and drive its outputs to the boot state
    /// (forward, disabled, power mode off, stopped).
    pub fn new(mut pins: P) -> Self {
        pins.set_direction(true);
        pins.set_enabled(false);
        pins.set_power(false);
        Self {
            pins,
            direction: true,
            enabled: false,
            power_mode: false,
            current_period: STEP_PERIOD_MAX,
            target_period: STEP_PERIOD_MAX,
        }
    }

    /// Set the rotation direction (true = forward).
    ///
    /// Takes effect on the very next pulse regardless of ramp state.
    pub fn set_direction(&mut self, forward: bool) {
        self.direction = forward;
        self.pins.set_direction(forward);
    }

    pub fn direction(&self) -> bool {
        self.direction
    }

    /// Enable or disable the motor driver
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.pins.set_enabled(enabled);
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Switch the driver power mode
    pub fn set_power(&mut self, on: bool) {
        self.power_mode = on;
        self.pins.set_power(on);
    }

    pub fn power(&self) -> bool {
        self.power_mode
    }

    /// Set the period the ramp converges toward, clamped to the valid domain
    pub fn set_target_period(&mut self, period: u32) {
        self.target_period = period.clamp(STEP_PERIOD_MIN, STEP_PERIOD_MAX);
    }

    pub fn target_period(&self) -> u32 {
        self.target_period
    }

    pub fn current_period(&self) -> u32 {
        self.current_period
    }

    /// True when the channel idles at the maximum period
    pub fn is_stopped(&self) -> bool {
        self.current_period == STEP_PERIOD_MAX && self.target_period == STEP_PERIOD_MAX
    }

    /// Advance the ramp by one pulse.
    ///
    /// Moves the current period one increment toward the target, emits the
    /// step pulse, and returns the new period. The caller reschedules
    /// itself that many microseconds ahead, so each firing determines its
    /// own successor. The increment is `current_period / ramp_rate`
    /// (floored at 1 µs): a smaller ramp rate corrects harder per tick.
    /// Never overshoots the target; always stays inside
    /// `[STEP_PERIOD_MIN, STEP_PERIOD_MAX]`.
    ///
    /// Only this method writes the current period.
    pub fn ramp_tick(&mut self, ramp_rate: u8) -> u32 {
        if self.current_period != self.target_period {
            let step = (self.current_period / ramp_rate.max(1) as u32).max(1);
            self.current_period = if self.current_period < self.target_period {
                (self.current_period + step).min(self.target_period)
            } else {
                self.current_period.saturating_sub(step).max(self.target_period)
            };
            self.current_period = self.current_period.clamp(STEP_PERIOD_MIN, STEP_PERIOD_MAX);
        }
        self.pins.pulse_step();
        self.current_period
    }
}
