//! Command dispatch
//!
//! One handler per command category. Every handler reads a sub-selector
//! character, pulls its integer fields through the shared parse cursor,
//! validates each field independently, and reports through the common
//! epilogue: an `OK` prompt, a value it already wrote, or an echo of the
//! unrecognized input. Responses always end in CRLF and the line buffer is
//! reset unconditionally, so no input sequence can wedge the decoder.

use core::fmt::{self, Write};
use core::str;

use trundle_core::config::{CalKey, CalibrationStore, PersistentCalibration};
use trundle_core::motion::{MotorChannel, MotorController, RPM_MAX};
use trundle_core::power::BatteryMonitor;
use trundle_core::traits::{ChannelPins, DisplaySink};

use crate::fmt::write_fixed;
use crate::line::LineBuffer;
use crate::parse::{Cursor, VALID_LIMIT};

/// Reported software version, in hundredths
pub const SOFTWARE_VERSION: u16 = 96;

const INFO: &str = "Trundle Motor Driver";
const PROMPT_OK: &str = "OK";
const EOL: &str = "\r\n";

/// Handler outcome, driving the shared response epilogue
enum Reply {
    /// Command applied, answer with the OK prompt
    Prompt,
    /// Handler already wrote its response text
    Silent,
    /// Sub-selector not recognized, echo the raw line
    Unrecognized,
}

/// Line assembly plus dispatch.
pub struct CommandDecoder {
    line: LineBuffer,
}

impl CommandDecoder {
    pub fn new() -> Self {
        Self {
            line: LineBuffer::new(),
        }
    }

    /// Feed one byte from the serial port; true when a line is complete
    /// and [`dispatch`](Self::dispatch) should run.
    pub fn feed(&mut self, byte: u8) -> bool {
        self.line.feed(byte)
    }

    /// Decode and execute the completed line.
    ///
    /// Mutation targets and the response sink are passed in by the caller;
    /// the decoder holds no references of its own.
    pub fn dispatch<P, S, D, W>(
        &self,
        motors: &mut MotorController<P>,
        battery: &mut BatteryMonitor,
        calibration: &mut PersistentCalibration<S>,
        display: &mut D,
        out: &mut W,
    ) -> fmt::Result
    where
        P: ChannelPins,
        S: CalibrationStore,
        D: DisplaySink,
        W: Write,
    {
        let line = self.line.line();
        let mut cur = Cursor::new(line);
        cur.skip_spaces();

        let Some(category) = cur.next() else {
            return out.write_str(EOL);
        };

        match category.to_ascii_lowercase() {
            b'b' => battery_command(cur, line, battery, display, out),
            b'c' => config_command(cur, line, motors, battery, calibration, out),
            b'd' => display_command(cur, line, display, out),
            b'g' => get_command(cur, line, battery, out),
            b'm' => motor_command(cur, line, motors, display, out),
            b'i' => show_info(out),
            // top-level ping; note 'x' means "begin shutdown" inside the
            // battery category but is a plain ping here
            b'p' | b'x' => {
                out.write_str(PROMPT_OK)?;
                out.write_str(EOL)
            }
            _ => {
                out.write_str("Not recognized: ")?;
                write_raw(out, line)?;
                out.write_str(EOL)
            }
        }
    }
}

impl Default for CommandDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared epilogue for the categories that terminate uniformly
fn finish<W: Write>(out: &mut W, reply: Reply, unknown: &str, line: &[u8]) -> fmt::Result {
    match reply {
        Reply::Prompt => out.write_str(PROMPT_OK)?,
        Reply::Silent => {}
        Reply::Unrecognized => {
            out.write_str(unknown)?;
            write_raw(out, line)?;
        }
    }
    out.write_str(EOL)
}

fn write_raw<W: Write>(out: &mut W, line: &[u8]) -> fmt::Result {
    for &byte in line {
        out.write_char(byte as char)?;
    }
    Ok(())
}

fn show_info<W: Write>(out: &mut W) -> fmt::Result {
    out.write_str(INFO)?;
    out.write_str("\r\nSoftware Version:")?;
    write_fixed(out, SOFTWARE_VERSION as u32, 2)?;
    out.write_str(EOL)
}

fn get_command<W: Write>(
    mut cur: Cursor<'_>,
    line: &[u8],
    battery: &BatteryMonitor,
    out: &mut W,
) -> fmt::Result {
    let reply = match cur.next().map(|b| b.to_ascii_lowercase()) {
        Some(b'i') => {
            show_info(out)?;
            Reply::Silent
        }
        Some(b'm') => {
            write!(out, "{}", RPM_MAX)?;
            Reply::Silent
        }
        Some(b'r') => {
            write!(out, "{}", battery.raw_voltage())?;
            Reply::Silent
        }
        Some(b's') => {
            out.write_str(battery.status().code())?;
            Reply::Silent
        }
        Some(b'u') => {
            write_fixed(out, battery.voltage() as u32, 2)?;
            Reply::Silent
        }
        Some(b'v') => {
            write_fixed(out, SOFTWARE_VERSION as u32, 2)?;
            Reply::Silent
        }
        _ => Reply::Unrecognized,
    };
    finish(out, reply, "Get command not recognized: ", line)
}

fn config_command<P, S, W>(
    mut cur: Cursor<'_>,
    line: &[u8],
    motors: &mut MotorController<P>,
    battery: &mut BatteryMonitor,
    calibration: &mut PersistentCalibration<S>,
    out: &mut W,
) -> fmt::Result
where
    P: ChannelPins,
    S: CalibrationStore,
    W: Write,
{
    let reply = match cur.next().map(|b| b.to_ascii_lowercase()) {
        Some(b'r') => {
            let value = cur.get_int();
            let key = CalKey::RampRate;
            if in_range(value, key) {
                motors.set_ramp_rate(value as u8);
                calibration.save(key, value as u16);
                Reply::Prompt
            } else {
                out.write_str("Ramp out of range (valid range: 1 ... 50)")?;
                Reply::Silent
            }
        }
        Some(b'g') => {
            write!(out, "Motor ramp:        {}\r\n", motors.ramp_rate())?;
            write!(out, "Bat ADC intercept: {}\r\n", battery.intercept())?;
            write!(out, "Bat ADC slope    : {}", battery.slope())?;
            Reply::Silent
        }
        Some(b'i') => {
            let value = cur.get_int();
            let key = CalKey::BatIntercept;
            if in_range(value, key) {
                battery.set_intercept(value as u16);
                calibration.save(key, value as u16);
                Reply::Prompt
            } else {
                write!(
                    out,
                    "Bat intercept out of range! (valid range {} ... {})",
                    key.min(),
                    key.max()
                )?;
                Reply::Silent
            }
        }
        Some(b's') => {
            let value = cur.get_int();
            let key = CalKey::BatSlope;
            if in_range(value, key) {
                battery.set_slope(value as u16);
                calibration.save(key, value as u16);
                Reply::Prompt
            } else {
                write!(
                    out,
                    "Bat slope out of range! (valid range {} ... {})",
                    key.min(),
                    key.max()
                )?;
                Reply::Silent
            }
        }
        _ => Reply::Unrecognized,
    };
    finish(out, reply, "Config command not recognized: ", line)
}

fn in_range(value: i32, key: CalKey) -> bool {
    (key.min() as i32..=key.max() as i32).contains(&value)
}

fn display_command<D, W>(mut cur: Cursor<'_>, line: &[u8], display: &mut D, out: &mut W) -> fmt::Result
where
    D: DisplaySink,
    W: Write,
{
    let reply = match cur.next().map(|b| b.to_ascii_lowercase()) {
        Some(b'c') => {
            display.clear();
            Reply::Prompt
        }
        Some(b't') => {
            display.print_title(str::from_utf8(cur.rest()).unwrap_or(""));
            Reply::Prompt
        }
        Some(b'm') => {
            display.print_message(str::from_utf8(cur.rest()).unwrap_or(""));
            Reply::Prompt
        }
        _ => Reply::Unrecognized,
    };
    finish(out, reply, "Config command not recognized: ", line)
}

fn battery_command<D, W>(
    mut cur: Cursor<'_>,
    line: &[u8],
    battery: &mut BatteryMonitor,
    display: &mut D,
    out: &mut W,
) -> fmt::Result
where
    D: DisplaySink,
    W: Write,
{
    let reply = match cur.next().map(|b| b.to_ascii_lowercase()) {
        Some(b'v') => {
            write_fixed(out, battery.voltage() as u32, 2)?;
            Reply::Silent
        }
        Some(b's') => {
            write_fixed(out, battery.voltage() as u32, 2)?;
            out.write_char(',')?;
            out.write_str(battery.status().code())?;
            Reply::Silent
        }
        Some(b'r') => {
            write!(out, "{}", battery.raw_voltage())?;
            Reply::Silent
        }
        Some(b'x') => {
            display.print_message("Shutting down");
            battery.start_shutdown(display);
            Reply::Prompt
        }
        _ => Reply::Unrecognized,
    };
    finish(out, reply, "Battery command not recognized: ", line)
}

fn motor_command<P, D, W>(
    mut cur: Cursor<'_>,
    line: &[u8],
    motors: &mut MotorController<P>,
    display: &mut D,
    out: &mut W,
) -> fmt::Result
where
    P: ChannelPins,
    D: DisplaySink,
    W: Write,
{
    let reply = match cur.next().map(|b| b.to_ascii_lowercase()) {
        Some(b'd') => {
            let (a, b) = (cur.get_int(), cur.get_int());
            if a < VALID_LIMIT {
                motors.channel_mut(MotorChannel::A).set_direction(a > 0);
            }
            if b < VALID_LIMIT {
                motors.channel_mut(MotorChannel::B).set_direction(b > 0);
            }
            Reply::Prompt
        }
        Some(b'e') => {
            let (a, b) = (cur.get_int(), cur.get_int());
            if a < VALID_LIMIT {
                motors.channel_mut(MotorChannel::A).set_enabled(a > 0);
                display.set_motor_enabled(MotorChannel::A, motors.channel(MotorChannel::A).enabled());
            }
            if b < VALID_LIMIT {
                motors.channel_mut(MotorChannel::B).set_enabled(b > 0);
                display.set_motor_enabled(MotorChannel::B, motors.channel(MotorChannel::B).enabled());
            }
            Reply::Prompt
        }
        Some(b'p') => {
            let (a, b) = (cur.get_int(), cur.get_int());
            if a < VALID_LIMIT {
                motors.channel_mut(MotorChannel::A).set_power(a > 0);
                display.set_motor_power(MotorChannel::A, motors.channel(MotorChannel::A).power());
            }
            if b < VALID_LIMIT {
                motors.channel_mut(MotorChannel::B).set_power(b > 0);
                display.set_motor_power(MotorChannel::B, motors.channel(MotorChannel::B).power());
            }
            Reply::Prompt
        }
        Some(b'r') => {
            let (a, b) = (cur.get_int(), cur.get_int());
            let mut reply = Reply::Prompt;
            // only the upper bound is checked; see the range note on set_rpm
            if a < VALID_LIMIT {
                if a <= RPM_MAX as i32 {
                    run_channel(motors, display, MotorChannel::A, a);
                } else {
                    write!(out, "Motor RPM A out of range! (max {})\r\n", RPM_MAX)?;
                    reply = Reply::Silent;
                }
            }
            if b < VALID_LIMIT {
                if b <= RPM_MAX as i32 {
                    run_channel(motors, display, MotorChannel::B, b);
                } else {
                    write!(out, "Motor RPM B out of range! (max {})\r\n", RPM_MAX)?;
                    reply = Reply::Silent;
                }
            }
            reply
        }
        _ => Reply::Unrecognized,
    };

    // this category's error texts carry their own line endings
    match reply {
        Reply::Prompt => {
            out.write_str(PROMPT_OK)?;
            out.write_str(EOL)
        }
        Reply::Silent => Ok(()),
        Reply::Unrecognized => {
            out.write_str("Config command not recognized: ")?;
            write_raw(out, line)?;
            out.write_str(EOL)
        }
    }
}

fn run_channel<P, D>(
    motors: &mut MotorController<P>,
    display: &mut D,
    channel: MotorChannel,
    rpm: i32,
) where
    P: ChannelPins,
    D: DisplaySink,
{
    motors.set_rpm(channel, rpm as u32);
    display.set_motor_rpm(channel, motors.rpm(channel));
    display.set_motor_enabled(channel, motors.channel(channel).enabled());
    display.set_motor_power(channel, motors.channel(channel).power());
}
