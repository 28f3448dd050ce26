//! Bounded command buffer.

use bytes::BytesMut;

use crate::error::BufferFull;

/// Default command capacity in bytes.
pub const DEFAULT_COMMAND_CAPACITY: usize = 16;

/// A fixed-capacity buffer holding one command line.
///
/// The buffer never grows past the capacity it was created with; a push
/// into a full buffer is refused with [`BufferFull`] and leaves the
/// contents untouched. Contents are printable ASCII, so [`as_str`] never
/// loses data.
///
/// [`as_str`]: CommandBuffer::as_str
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl CommandBuffer {
    /// Create an empty buffer that holds at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        CommandBuffer {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one byte.
    pub fn try_push(&mut self, byte: u8) -> Result<(), BufferFull> {
        if self.is_full() {
            return Err(BufferFull {
                capacity: self.capacity,
            });
        }
        self.buf.extend_from_slice(&[byte]);
        Ok(())
    }

    /// Remove the last byte, returning it.
    pub fn pop(&mut self) -> Option<u8> {
        let last = *self.buf.last()?;
        self.buf.truncate(self.buf.len() - 1);
        Some(last)
    }

    /// Replace the contents, truncating to capacity.
    pub fn set(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let len = bytes.len().min(self.capacity);
        self.buf.clear();
        self.buf.extend_from_slice(&bytes[..len]);
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// The buffered line.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf).unwrap_or("")
    }

    /// The buffered bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// True when another push would be refused.
    pub fn is_full(&self) -> bool {
        self.buf.len() >= self.capacity
    }

    /// Maximum number of bytes the buffer holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_CAPACITY)
    }
}
