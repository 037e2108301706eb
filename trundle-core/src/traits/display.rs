//! Status display sink
//!
//! The robot carries a small display head driven by a separate board.
//! Rendering is not this firmware's problem; components only push status
//! through this trait and the firmware forwards it over the display link.

use crate::motion::MotorChannel;

/// Sink for status text and state pushed toward the display head.
///
/// Implementations must not block for long: the battery supervisor calls
/// into this from its 10 ms sampling tick.
pub trait DisplaySink {
    /// Show a transient message line
    fn print_message(&mut self, text: &str);

    /// Show a title line
    fn print_title(&mut self, text: &str);

    /// Clear the display
    fn clear(&mut self);

    /// Reflect a channel's enable state
    fn set_motor_enabled(&mut self, channel: MotorChannel, enabled: bool);

    /// Reflect a channel's power mode
    fn set_motor_power(&mut self, channel: MotorChannel, on: bool);

    /// Reflect a channel's commanded speed
    fn set_motor_rpm(&mut self, channel: MotorChannel, rpm: u32);

    /// Show the remaining shutdown countdown ticks
    fn set_shutdown_timer(&mut self, remaining: u16);
}
