//! Battery supervision and shutdown sequencing

pub mod battery;

pub use battery::{BatteryMonitor, BatteryStatus};
