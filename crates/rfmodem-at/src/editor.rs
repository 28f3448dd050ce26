//! Line editor for command mode.
//!
//! Turns raw serial bytes into one upper-cased command line, echoing
//! accepted input back to the operator:
//!
//! - `\r` finishes the line and echoes `\n`
//! - backspace (`0x08`) and delete (`0x7F`) erase the last character and
//!   echo `\b \b`
//! - printable characters are upper-cased, appended and echoed
//! - anything else is dropped silently
//!
//! Any non-control byte arriving when the buffer is already full abandons
//! the line: the buffer is emptied and the caller is told to leave command
//! mode. Nothing is echoed for the aborting byte.

use std::fmt::Write;

use crate::buffer::CommandBuffer;

const CR: u8 = b'\r';
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// What a byte did to the line being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    /// Keep feeding bytes.
    Pending,
    /// The line is complete.
    LineReady,
    /// The buffer overflowed; the line was discarded.
    Overflow,
}

/// Accumulates one command line.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    buffer: CommandBuffer,
}

impl LineEditor {
    /// Create an editor holding at most `capacity` characters per line.
    pub fn new(capacity: usize) -> Self {
        LineEditor {
            buffer: CommandBuffer::new(capacity),
        }
    }

    /// Feed one byte, writing any echo to `echo`.
    pub fn on_byte(&mut self, byte: u8, echo: &mut dyn Write) -> EditEvent {
        match byte {
            CR => {
                let _ = echo.write_char('\n');
                EditEvent::LineReady
            }
            BACKSPACE | DELETE => {
                if self.buffer.pop().is_some() {
                    let _ = echo.write_str("\x08 \x08");
                }
                EditEvent::Pending
            }
            b if b.is_ascii_control() => EditEvent::Pending,
            b if is_printable(b) || self.buffer.is_full() => {
                let upper = b.to_ascii_uppercase();
                match self.buffer.try_push(upper) {
                    Ok(()) => {
                        let _ = echo.write_char(char::from(upper));
                        EditEvent::Pending
                    }
                    Err(full) => {
                        log::warn!("{}, abandoning command mode", full);
                        self.buffer.clear();
                        EditEvent::Overflow
                    }
                }
            }
            _ => EditEvent::Pending,
        }
    }

    /// The line edited so far.
    pub fn line(&self) -> &str {
        self.buffer.as_str()
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &CommandBuffer {
        &self.buffer
    }

    /// Replace the line without echo.
    pub fn set_line(&mut self, line: &str) {
        self.buffer.set(line);
    }

    /// Discard the line.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}
