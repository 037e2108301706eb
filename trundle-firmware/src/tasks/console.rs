//! Serial console task
//!
//! The cooperative main loop: polls the host UART and the pending-job
//! bitset, never blocks on anything but the select itself. Completed lines
//! dispatch synchronously under the subsystem locks; responses are staged
//! in a bounded buffer and written back asynchronously.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{Duration, Ticker};
use embedded_io_async::{Read, Write};
use heapless::String;

use trundle_core::config::PersistentCalibration;
use trundle_core::jobs::JOB_BATTERY_REFRESH;
use trundle_protocol::fmt::write_fixed;
use trundle_protocol::CommandDecoder;

use crate::flash::FlashCalibration;
use crate::shared::{SharedBattery, SharedDisplay, SharedMotors, JOB_FLAGS};

/// Job-bitset polling interval
const JOB_POLL_MS: u64 = 50;

/// Staging buffer for one response (the config dump is the longest)
const RESPONSE_CAPACITY: usize = 512;

#[embassy_executor::task]
pub async fn console_task(
    mut rx: BufferedUartRx<'static>,
    mut tx: BufferedUartTx<'static>,
    motors: &'static SharedMotors,
    battery: &'static SharedBattery,
    display: &'static SharedDisplay,
    mut calibration: PersistentCalibration<FlashCalibration<'static>>,
) {
    info!("Console task started");

    let mut decoder = CommandDecoder::new();
    let mut poll = Ticker::every(Duration::from_millis(JOB_POLL_MS));
    let mut buf = [0u8; 16];

    loop {
        match select(rx.read(&mut buf), poll.next()).await {
            Either::First(Ok(n)) => {
                for &byte in &buf[..n] {
                    if !decoder.feed(byte) {
                        continue;
                    }
                    let mut response: String<RESPONSE_CAPACITY> = String::new();
                    let result = motors.lock(|m| {
                        battery.lock(|b| {
                            display.lock(|d| {
                                decoder.dispatch(
                                    &mut *m.borrow_mut(),
                                    &mut *b.borrow_mut(),
                                    &mut calibration,
                                    &mut *d.borrow_mut(),
                                    &mut response,
                                )
                            })
                        })
                    });
                    if result.is_err() {
                        warn!("response truncated");
                    }
                    if tx.write_all(response.as_bytes()).await.is_err() {
                        warn!("console write failed");
                    }
                }
            }
            Either::First(Err(_)) => warn!("console read error"),
            Either::Second(()) => run_pending_jobs(battery, display),
        }
    }
}

/// Drain the level-triggered job flags raised from timer contexts
fn run_pending_jobs(battery: &'static SharedBattery, display: &'static SharedDisplay) {
    let jobs = JOB_FLAGS.take();

    if jobs & JOB_BATTERY_REFRESH != 0 {
        let (voltage, code) = battery.lock(|b| {
            let b = b.borrow();
            (b.voltage(), b.status().code())
        });
        let mut text: String<16> = String::new();
        let _ = write_fixed(&mut text, voltage as u32, 2);
        let _ = text.push(' ');
        let _ = text.push_str(code);
        display.lock(|d| d.borrow_mut().print_title(&text));
    }
}
