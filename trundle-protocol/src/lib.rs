//! Console command protocol
//!
//! The host computer talks to the robot over a plain ASCII line protocol:
//! lines end in CR or LF, the first character picks a command category
//! (case-insensitive), a second character picks the operation, and any
//! integer fields follow as space- or sign-delimited decimals. An omitted
//! field parses to a sentinel and means "leave the current value alone".
//!
//! ```text
//! MR500 2000      run motors (A: 500 RPM, B: rejected, out of range)
//! CR10            set and persist ramp rate 10
//! BS              report "12.34,OK"
//! ```
//!
//! There is no framing beyond the line terminator and no checksum; every
//! line gets a textual response and the decoder resets unconditionally, so
//! malformed input can never wedge it.

#![no_std]
#![deny(unsafe_code)]

pub mod decoder;
pub mod fmt;
pub mod line;
pub mod parse;

pub use decoder::CommandDecoder;
pub use line::LineBuffer;
pub use parse::{Cursor, VALID_LIMIT};
