//! Error types for the AT command front end.

use thiserror::Error;

/// Reasons a command line is answered with `ERROR`.
///
/// These never reach the caller of [`crate::AtModem`]; the dispatcher
/// renders every variant as the literal `ERROR` reply. They exist so the
/// grammar and handlers can be tested for *why* a line was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AtError {
    /// Malformed command, missing argument or non-digit where a digit
    /// was expected.
    #[error("syntax error")]
    Syntax,

    /// Register, pin or channel index outside the valid range.
    #[error("index {index} out of range (max {max})")]
    OutOfRange {
        /// Requested index.
        index: u32,
        /// Number of valid indices.
        max: u32,
    },

    /// Attempt to write a read-only register.
    #[error("register {0} is read-only")]
    ReadOnly(u32),

    /// Command family not available on this board.
    #[error("not supported on this board")]
    Unsupported,

    /// A collaborator refused the operation (invalid value, wrong pin
    /// direction, calibration already locked...).
    #[error("rejected by {0}")]
    Rejected(&'static str),
}

/// Returned by [`crate::CommandBuffer::try_push`] when the buffer is full.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("command buffer full: capacity {capacity} bytes")]
pub struct BufferFull {
    /// Capacity of the buffer that refused the byte.
    pub capacity: usize,
}

/// Result type alias for command handlers.
pub type AtResult<T> = Result<T, AtError>;
