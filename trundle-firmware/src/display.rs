//! Display head link
//!
//! The display is a separate board hanging off its own UART and does all
//! rendering itself; this side only forwards status as short text lines,
//! one per `DisplaySink` call. Lines are bounded and writes are fire and
//! forget; a wedged display must never stall motor control.

use core::fmt::Write as _;

use embassy_rp::uart::{Blocking, UartTx};
use heapless::String;

use trundle_core::motion::MotorChannel;
use trundle_core::traits::DisplaySink;

/// Longest forwarded line, including the tag
const LINE_BUDGET: usize = 64;

pub struct UartDisplay {
    tx: UartTx<'static, Blocking>,
}

impl UartDisplay {
    pub fn new(tx: UartTx<'static, Blocking>) -> Self {
        Self { tx }
    }

    fn send_line(&mut self, line: &str) {
        let _ = self.tx.blocking_write(line.as_bytes());
        let _ = self.tx.blocking_write(b"\n");
    }

    fn send_text(&mut self, tag: &str, text: &str) {
        let mut line: String<LINE_BUDGET> = String::new();
        let _ = line.push_str(tag);
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        self.send_line(&line);
    }
}

fn channel_tag(channel: MotorChannel) -> char {
    match channel {
        MotorChannel::A => 'A',
        MotorChannel::B => 'B',
    }
}

impl DisplaySink for UartDisplay {
    fn print_message(&mut self, text: &str) {
        self.send_text("MSG ", text);
    }

    fn print_title(&mut self, text: &str) {
        self.send_text("TTL ", text);
    }

    fn clear(&mut self) {
        self.send_line("CLR");
    }

    fn set_motor_enabled(&mut self, channel: MotorChannel, enabled: bool) {
        let mut line: String<16> = String::new();
        let _ = write!(line, "EN {} {}", channel_tag(channel), enabled as u8);
        self.send_line(&line);
    }

    fn set_motor_power(&mut self, channel: MotorChannel, on: bool) {
        let mut line: String<16> = String::new();
        let _ = write!(line, "PW {} {}", channel_tag(channel), on as u8);
        self.send_line(&line);
    }

    fn set_motor_rpm(&mut self, channel: MotorChannel, rpm: u32) {
        let mut line: String<16> = String::new();
        let _ = write!(line, "RPM {} {}", channel_tag(channel), rpm);
        self.send_line(&line);
    }

    fn set_shutdown_timer(&mut self, remaining: u16) {
        let mut line: String<16> = String::new();
        let _ = write!(line, "SDT {}", remaining);
        self.send_line(&line);
    }
}
