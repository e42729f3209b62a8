//! Line decoder for the text consoles.
//!
//! Accumulates incoming bytes and yields complete lines.  A single
//! `Transport::read` may deliver part of a line, or several lines at once.
//!
//! - `\r`, `\n` and `\r\n` all terminate a line (CRLF yields one line).
//! - Backspace / DEL erase the previous character.
//! - Other control bytes and non-ASCII bytes are dropped.
//! - Characters past [`MAX_LINE_LEN`] are discarded; the truncated line is
//!   still delivered at the terminator.

use log::warn;

pub const MAX_LINE_LEN: usize = 128;

const BS: u8 = 0x08;
const DEL: u8 = 0x7f;

/// Streaming line decoder.
pub struct LineDecoder {
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
    /// A line was handed out; clear before accepting more bytes.
    delivered: bool,
    last_was_cr: bool,
    overflowed: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub const fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            delivered: false,
            last_was_cr: false,
            overflowed: false,
        }
    }

    /// Feed one byte.
    ///
    /// Returns `Some(line)` at a terminator.  The returned slice is valid
    /// until the next call to `push`.
    pub fn push(&mut self, byte: u8) -> Option<&str> {
        if self.delivered {
            self.buf.clear();
            self.delivered = false;
        }
        let after_cr = core::mem::replace(&mut self.last_was_cr, byte == b'\r');

        match byte {
            b'\n' if after_cr => None,
            b'\r' | b'\n' => {
                self.delivered = true;
                self.overflowed = false;
                // Only printable ASCII is ever stored.
                Some(core::str::from_utf8(&self.buf).unwrap_or(""))
            }
            BS | DEL => {
                self.buf.pop();
                None
            }
            0x20..=0x7e => {
                if self.buf.push(byte).is_err() && !self.overflowed {
                    self.overflowed = true;
                    warn!("console: line longer than {MAX_LINE_LEN} bytes, truncating");
                }
                None
            }
            _ => None,
        }
    }

    /// Bytes of the partial line collected so far.
    pub fn pending(&self) -> usize {
        if self.delivered { 0 } else { self.buf.len() }
    }

    /// Drop any partial line (e.g. after a reconnect).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.delivered = false;
        self.last_was_cr = false;
        self.overflowed = false;
    }
}
