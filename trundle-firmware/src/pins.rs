//! GPIO implementations of the core pin traits

use embassy_rp::gpio::Output;

use trundle_core::traits::{ChannelPins, PowerLatch};

/// Step-pulse high time in CPU cycles (~2 us at 125 MHz)
const STEP_PULSE_CYCLES: u32 = 250;

/// The four outputs of one stepper channel.
pub struct MotorPins {
    step: Output<'static>,
    dir: Output<'static>,
    enable: Output<'static>,
    power: Output<'static>,
}

impl MotorPins {
    pub fn new(
        step: Output<'static>,
        dir: Output<'static>,
        enable: Output<'static>,
        power: Output<'static>,
    ) -> Self {
        Self {
            step,
            dir,
            enable,
            power,
        }
    }
}

impl ChannelPins for MotorPins {
    fn set_direction(&mut self, forward: bool) {
        if forward {
            self.dir.set_high();
        } else {
            self.dir.set_low();
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        // driver enable input is active-low
        if enabled {
            self.enable.set_low();
        } else {
            self.enable.set_high();
        }
    }

    fn set_power(&mut self, on: bool) {
        if on {
            self.power.set_high();
        } else {
            self.power.set_low();
        }
    }

    fn pulse_step(&mut self) {
        self.step.set_high();
        cortex_m::asm::delay(STEP_PULSE_CYCLES);
        self.step.set_low();
    }
}

/// System power latch; driving the pin low cuts our own supply.
pub struct LatchPin(Output<'static>);

impl LatchPin {
    pub fn new(pin: Output<'static>) -> Self {
        Self(pin)
    }
}

impl PowerLatch for LatchPin {
    fn cut_power(&mut self) {
        self.0.set_low();
    }
}
