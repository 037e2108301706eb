//! Output pin seams for motor channels and the power latch

/// Hardware outputs owned by one stepper channel.
///
/// Levels are logical; polarity inversions belong to the implementation.
pub trait ChannelPins {
    /// Drive the direction output (true = forward)
    fn set_direction(&mut self, forward: bool);

    /// Drive the driver-enable output
    fn set_enabled(&mut self, enabled: bool);

    /// Drive the power-mode output
    fn set_power(&mut self, on: bool);

    /// Emit one step pulse (rising edge plus the driver's minimum high time)
    fn pulse_step(&mut self);
}

/// The power latch keeping the system supply on.
///
/// Releasing it is a terminal action: the processor loses power and nothing
/// runs afterward.
pub trait PowerLatch {
    fn cut_power(&mut self);
}
