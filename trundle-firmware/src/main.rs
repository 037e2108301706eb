//! Trundle - Two-Wheeled Robot Motor Driver Firmware
//!
//! RP2040 firmware for the robot base: two open-loop stepper channels with
//! ramped speed control, a battery supervisor with a confirmable shutdown
//! sequence, and an ASCII console to the host computer on UART0. Status is
//! pushed to a display head on UART1.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart, UartTx};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use trundle_core::config::{CalKey, PersistentCalibration};
use trundle_core::motion::{MotorChannel, MotorController};
use trundle_core::power::BatteryMonitor;

use crate::display::UartDisplay;
use crate::flash::FlashCalibration;
use crate::pins::MotorPins;
use crate::shared::{SharedBattery, SharedDisplay, SharedMotors};

mod display;
mod flash;
mod pins;
mod shared;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Shared subsystem state (must live forever for task references)
static MOTORS: StaticCell<SharedMotors> = StaticCell::new();
static BATTERY: StaticCell<SharedBattery> = StaticCell::new();
static DISPLAY: StaticCell<SharedDisplay> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Trundle firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Calibration first - the controllers are built from it
    let mut calibration = PersistentCalibration::new(FlashCalibration::new(p.FLASH));
    let ramp_rate = calibration.load(CalKey::RampRate) as u8;
    let slope = calibration.load(CalKey::BatSlope);
    let intercept = calibration.load(CalKey::BatIntercept);
    info!(
        "Calibration: ramp={} slope={} intercept={}",
        ramp_rate, slope, intercept
    );

    // Motor channel outputs (drivers disabled until the host enables them)
    let a_pins = MotorPins::new(
        Output::new(p.PIN_20, Level::Low),  // step
        Output::new(p.PIN_19, Level::Low),  // dir
        Output::new(p.PIN_22, Level::High), // enable (active-low)
        Output::new(p.PIN_21, Level::Low),  // power mode
    );
    let b_pins = MotorPins::new(
        Output::new(p.PIN_17, Level::Low),
        Output::new(p.PIN_16, Level::Low),
        Output::new(p.PIN_15, Level::High),
        Output::new(p.PIN_18, Level::Low),
    );
    let motors = MOTORS.init(Mutex::new(RefCell::new(MotorController::new(
        a_pins, b_pins, ramp_rate,
    ))));
    let battery = BATTERY.init(Mutex::new(RefCell::new(BatteryMonitor::new(
        slope, intercept,
    ))));

    // Console UART to the host computer
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (console_tx, console_rx) = uart.split();

    info!("Console UART initialized");

    // Display head link (transmit only)
    let display_tx = UartTx::new_blocking(p.UART1, p.PIN_4, UartConfig::default());
    let display = DISPLAY.init(Mutex::new(RefCell::new(UartDisplay::new(display_tx))));

    // Battery sense, shutdown button, power latch, low-battery LED
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let sense = AdcChannel::new_pin(p.PIN_28, Pull::None);
    let button = Input::new(p.PIN_11, Pull::Up);
    let latch = Output::new(p.PIN_10, Level::High); // keep our own supply on
    let _low_battery_led = Output::new(p.PIN_13, Level::Low);

    info!("ADC and power pins initialized");

    // Spawn tasks
    spawner
        .spawn(tasks::stepper_task(motors, MotorChannel::A))
        .unwrap();
    spawner
        .spawn(tasks::stepper_task(motors, MotorChannel::B))
        .unwrap();
    spawner
        .spawn(tasks::battery_task(
            battery, display, adc, sense, button, latch,
        ))
        .unwrap();
    spawner
        .spawn(tasks::console_task(
            console_rx,
            console_tx,
            motors,
            battery,
            display,
            calibration,
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
