//! Embassy tasks
//!
//! One task per stepper channel (the self-rescheduling pulse timers), one
//! fixed-rate battery sampling task, and the console task that plays the
//! role of the cooperative main loop.

pub mod battery;
pub mod console;
pub mod stepper;

pub use battery::battery_task;
pub use console::console_task;
pub use stepper::stepper_task;
