//! Per-channel step pulse task
//!
//! Each firing advances the channel's ramp by one increment, emits the step
//! pulse, and sleeps for the period it just computed, rescheduling itself
//! exactly like the hardware timer callback it replaces. The lock is held
//! only for the tick itself, never across the sleep.

use defmt::*;
use embassy_time::Timer;

use trundle_core::motion::MotorChannel;

use crate::shared::SharedMotors;

#[embassy_executor::task(pool_size = 2)]
pub async fn stepper_task(motors: &'static SharedMotors, channel: MotorChannel) {
    info!("Stepper task started for channel {}", channel);

    loop {
        let period_us = motors.lock(|m| m.borrow_mut().ramp_tick(channel));
        Timer::after_micros(period_us as u64).await;
    }
}
