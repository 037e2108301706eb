//! Battery sampling task
//!
//! Fixed 10 ms cadence: read the battery sense ADC and the shutdown button,
//! run the supervisor tick, and raise the refresh job when the tick says
//! the displayed status is due for an update.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::{Input, Output};
use embassy_time::{Duration, Ticker};

use trundle_core::jobs::JOB_BATTERY_REFRESH;

use crate::pins::LatchPin;
use crate::shared::{SharedBattery, SharedDisplay, JOB_FLAGS};

/// Sampling interval in milliseconds
pub const SAMPLE_INTERVAL_MS: u64 = 10;

#[embassy_executor::task]
pub async fn battery_task(
    battery: &'static SharedBattery,
    display: &'static SharedDisplay,
    mut adc: Adc<'static, Async>,
    mut sense: Channel<'static>,
    button: Input<'static>,
    latch: Output<'static>,
) {
    info!("Battery task started");

    let mut latch = LatchPin::new(latch);
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        ticker.next().await;

        let sample = match adc.read(&mut sense).await {
            // the calibration slope is fitted for 10-bit readings
            Ok(raw) => raw >> 2,
            Err(_) => {
                warn!("battery ADC read failed");
                continue;
            }
        };
        let button_held = button.is_low();

        let refresh = battery.lock(|b| {
            display.lock(|d| {
                b.borrow_mut()
                    .tick(sample, button_held, &mut *d.borrow_mut(), &mut latch)
            })
        });

        if refresh {
            JOB_FLAGS.raise(JOB_BATTERY_REFRESH);
        }
    }
}
