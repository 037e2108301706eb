//! Shared state between tasks
//!
//! Subsystem state crossing task boundaries sits behind blocking mutexes,
//! locked only for short synchronous sections: the stepper tasks advance
//! their own ramp, the console task applies commands, the battery task runs
//! its sampling tick. Completion of timer-context work reaches the console
//! loop only through the job bitset.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use trundle_core::jobs::JobFlags;
use trundle_core::motion::MotorController;
use trundle_core::power::BatteryMonitor;

use crate::display::UartDisplay;
use crate::pins::MotorPins;

pub type SharedMotors = Mutex<CriticalSectionRawMutex, RefCell<MotorController<MotorPins>>>;
pub type SharedBattery = Mutex<CriticalSectionRawMutex, RefCell<BatteryMonitor>>;
pub type SharedDisplay = Mutex<CriticalSectionRawMutex, RefCell<UartDisplay>>;

/// Pending jobs raised from timer contexts, polled by the console loop
pub static JOB_FLAGS: JobFlags = JobFlags::new();
