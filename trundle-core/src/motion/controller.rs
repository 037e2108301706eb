//! Two-channel motor controller

use super::channel::{
    MotorChannel, StepperChannel, CONVERSION_FACTOR, RPM_MAX, STEP_PERIOD_MAX,
};
use crate::config::CalKey;
use crate::traits::ChannelPins;

/// Owns both wheel channels and the shared ramp rate.
///
/// Created at boot from the persisted calibration; the ramp rate changes
/// only through the config command.
pub struct MotorController<P: ChannelPins> {
    a: StepperChannel<P>,
    b: StepperChannel<P>,
    ramp_rate: u8,
}

impl<P: ChannelPins> MotorController<P> {
    pub fn new(a_pins: P, b_pins: P, ramp_rate: u8) -> Self {
        Self {
            a: StepperChannel::new(a_pins),
            b: StepperChannel::new(b_pins),
            ramp_rate: clamp_ramp(ramp_rate),
        }
    }

    pub fn channel(&self, channel: MotorChannel) -> &StepperChannel<P> {
        match channel {
            MotorChannel::A => &self.a,
            MotorChannel::B => &self.b,
        }
    }

    pub fn channel_mut(&mut self, channel: MotorChannel) -> &mut StepperChannel<P> {
        match channel {
            MotorChannel::A => &mut self.a,
            MotorChannel::B => &mut self.b,
        }
    }

    /// Command a channel speed in RPM.
    ///
    /// Zero parks the channel on the maximum (slowest) period as the idle
    /// marker rather than a zero-frequency sentinel. The command path
    /// validates the range before calling; the clamp here is defensive.
    pub fn set_rpm(&mut self, channel: MotorChannel, rpm: u32) {
        let rpm = rpm.min(RPM_MAX);
        let target = if rpm > 0 {
            CONVERSION_FACTOR / rpm
        } else {
            STEP_PERIOD_MAX
        };
        self.channel_mut(channel).set_target_period(target);
    }

    /// Commanded speed of a channel, derived back from its target period
    pub fn rpm(&self, channel: MotorChannel) -> u32 {
        let target = self.channel(channel).target_period();
        if target == STEP_PERIOD_MAX {
            0
        } else {
            CONVERSION_FACTOR / target
        }
    }

    /// Set the shared ramp rate (clamped to its calibration range)
    pub fn set_ramp_rate(&mut self, ramp_rate: u8) {
        self.ramp_rate = clamp_ramp(ramp_rate);
    }

    pub fn ramp_rate(&self) -> u8 {
        self.ramp_rate
    }

    /// Advance one channel's ramp by one pulse; returns the new period
    pub fn ramp_tick(&mut self, channel: MotorChannel) -> u32 {
        let ramp_rate = self.ramp_rate;
        self.channel_mut(channel).ramp_tick(ramp_rate)
    }
}

fn clamp_ramp(ramp_rate: u8) -> u8 {
    ramp_rate.clamp(CalKey::RampRate.min() as u8, CalKey::RampRate.max() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::STEP_PERIOD_MIN;

    #[derive(Default)]
    struct MockPins {
        forward: bool,
        enabled: bool,
        power: bool,
        pulses: u32,
    }

    impl ChannelPins for &mut MockPins {
        fn set_direction(&mut self, forward: bool) {
            self.forward = forward;
        }
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
        fn set_power(&mut self, on: bool) {
            self.power = on;
        }
        fn pulse_step(&mut self) {
            self.pulses += 1;
        }
    }

    fn controller<'a>(
        a: &'a mut MockPins,
        b: &'a mut MockPins,
    ) -> MotorController<&'a mut MockPins> {
        MotorController::new(a, b, 15)
    }

    #[test]
    fn rpm_maps_to_step_period() {
        let (mut a, mut b) = (MockPins::default(), MockPins::default());
        let mut motors = controller(&mut a, &mut b);

        motors.set_rpm(MotorChannel::A, 500);
        assert_eq!(motors.channel(MotorChannel::A).target_period(), 300);
        assert_eq!(motors.rpm(MotorChannel::A), 500);

        motors.set_rpm(MotorChannel::A, 0);
        assert_eq!(
            motors.channel(MotorChannel::A).target_period(),
            STEP_PERIOD_MAX
        );
        assert_eq!(motors.rpm(MotorChannel::A), 0);
    }

    #[test]
    fn rpm_clamps_to_maximum() {
        let (mut a, mut b) = (MockPins::default(), MockPins::default());
        let mut motors = controller(&mut a, &mut b);

        motors.set_rpm(MotorChannel::B, 40_000);
        assert_eq!(
            motors.channel(MotorChannel::B).target_period(),
            STEP_PERIOD_MIN
        );
        assert_eq!(motors.rpm(MotorChannel::B), RPM_MAX);
    }

    #[test]
    fn ramp_converges_monotonically_without_overshoot() {
        let (mut a, mut b) = (MockPins::default(), MockPins::default());
        let mut motors = controller(&mut a, &mut b);

        motors.set_rpm(MotorChannel::A, 1000); // target 150 us
        let mut previous = motors.channel(MotorChannel::A).current_period();
        for _ in 0..200 {
            let period = motors.ramp_tick(MotorChannel::A);
            assert!(period <= previous, "accelerating ramp must not slow down");
            assert!((STEP_PERIOD_MIN..=STEP_PERIOD_MAX).contains(&period));
            previous = period;
        }
        assert_eq!(previous, 150);

        // Retarget mid-run: converge back up, again without overshoot
        motors.set_rpm(MotorChannel::A, 100); // target 1500 us
        for _ in 0..200 {
            let period = motors.ramp_tick(MotorChannel::A);
            assert!(period >= previous, "decelerating ramp must not speed up");
            assert!(period <= 1500);
            previous = period;
        }
        assert_eq!(previous, 1500);
    }

    #[test]
    fn smaller_ramp_rate_converges_faster() {
        let (mut a1, mut b1) = (MockPins::default(), MockPins::default());
        let mut fast = MotorController::new(&mut a1, &mut b1, 1);
        let (mut a2, mut b2) = (MockPins::default(), MockPins::default());
        let mut slow = MotorController::new(&mut a2, &mut b2, 50);

        fast.set_rpm(MotorChannel::A, 1500);
        slow.set_rpm(MotorChannel::A, 1500);

        let mut fast_ticks = 0;
        while fast.channel(MotorChannel::A).current_period() != STEP_PERIOD_MIN {
            fast.ramp_tick(MotorChannel::A);
            fast_ticks += 1;
        }
        let mut slow_ticks = 0;
        while slow.channel(MotorChannel::A).current_period() != STEP_PERIOD_MIN {
            slow.ramp_tick(MotorChannel::A);
            slow_ticks += 1;
        }
        assert!(fast_ticks < slow_ticks);
    }

    #[test]
    fn direction_applies_immediately_while_ramping() {
        let (mut a, mut b) = (MockPins::default(), MockPins::default());
        {
            let mut motors = controller(&mut a, &mut b);
            motors.set_rpm(MotorChannel::A, 1000);
            motors.ramp_tick(MotorChannel::A);
            motors.channel_mut(MotorChannel::A).set_direction(false);
            assert!(!motors.channel(MotorChannel::A).direction());
            // ramp target untouched by the direction change
            assert_eq!(motors.channel(MotorChannel::A).target_period(), 150);
        }
        assert!(!a.forward);
        // boot state left on the other outputs
        assert!(!a.enabled);
        assert!(!a.power);
    }

    #[test]
    fn ramp_rate_setter_clamps() {
        let (mut a, mut b) = (MockPins::default(), MockPins::default());
        let mut motors = controller(&mut a, &mut b);
        motors.set_ramp_rate(0);
        assert_eq!(motors.ramp_rate(), 1);
        motors.set_ramp_rate(200);
        assert_eq!(motors.ramp_rate(), 50);
    }

    #[test]
    fn pulses_are_emitted_every_tick() {
        let (mut a, mut b) = (MockPins::default(), MockPins::default());
        {
            let mut motors = controller(&mut a, &mut b);
            motors.set_rpm(MotorChannel::A, 200);
            for _ in 0..10 {
                motors.ramp_tick(MotorChannel::A);
            }
        }
        assert_eq!(a.pulses, 10);
        assert_eq!(b.pulses, 0);
    }
}
