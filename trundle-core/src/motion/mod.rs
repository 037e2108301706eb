//! Stepper ramp engine
//!
//! Each wheel is an open-loop stepper channel: speed is commanded as a
//! target step period and the channel's own timer tick walks the current
//! period toward it, one increment per emitted pulse.

pub mod channel;
pub mod controller;

pub use channel::{
    MotorChannel, StepperChannel, CONVERSION_FACTOR, RPM_MAX, STEP_PERIOD_MAX, STEP_PERIOD_MIN,
};
pub use controller::MotorController;
