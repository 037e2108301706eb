//! Hardware abstraction traits
//!
//! These traits define the seams between the core logic and the board:
//! the firmware crate implements them on real peripherals, tests implement
//! them on recording doubles.

pub mod display;
pub mod pins;

pub use display::DisplaySink;
pub use pins::{ChannelPins, PowerLatch};
