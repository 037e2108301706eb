//! Console line assembly
//!
//! Bytes arrive one at a time from the serial port. CR or LF completes the
//! line, backspace erases, and everything past capacity lands in a scratch
//! slot that never becomes part of the line: long garbage loses data but
//! cannot overflow or stall the decoder.

/// Buffer size; one slot is scratch, so lines hold up to 99 characters
const BUF_SIZE: usize = 100;

/// Usable line capacity in characters
pub const LINE_CAPACITY: usize = BUF_SIZE - 1;

/// Fixed-capacity line buffer with explicit truncation.
pub struct LineBuffer {
    buf: [u8; BUF_SIZE],
    cursor: usize,
    line_len: usize,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; BUF_SIZE],
            cursor: 0,
            line_len: 0,
        }
    }

    /// Feed one received byte.
    ///
    /// Returns true when the byte completed a line; the finished line stays
    /// readable through [`line`](Self::line) until the next byte arrives,
    /// and the cursor resets for the next line.
    pub fn feed(&mut self, byte: u8) -> bool {
        match byte {
            b'\r' | b'\n' => {
                self.line_len = self.cursor;
                self.cursor = 0;
                true
            }
            0x08 => {
                // backspace erases the previous character
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            _ => {
                self.buf[self.cursor] = byte;
                if self.cursor < BUF_SIZE - 1 {
                    self.cursor += 1;
                }
                false
            }
        }
    }

    /// The most recently completed line
    pub fn line(&self) -> &[u8] {
        &self.buf[..self.line_len]
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
