//! AT command-mode front end for radio modems.
//!
//! A modem normally forwards every serial byte over the air. This crate
//! implements the out-of-band control path used to configure it:
//!
//! - **Escape**: one second of silence, `+++`, one more second of silence
//!   switches the modem to command mode and answers as if `AT` had been typed
//! - **Line editing**: characters are upper-cased and echoed; backspace and
//!   delete erase; carriage return finishes the line
//! - **Commands**: `AT...` lines run locally, `RT...` lines are relayed to
//!   another node, anything else is ignored
//! - **Replies**: every reply line is framed as `[<node-id>] <text>`
//!
//! # Protocol Overview
//!
//! ```text
//! (1 s idle) +++ (1 s idle)      ->  [0] OK
//! ATS1?\r                        ->  ATS1?
//!                                    [0] 57
//! ATS0=5\r                       ->  ATS0=5
//!                                    [0] ERROR
//! RTATI,3\r                      ->  RTATI,3        (relayed, no local reply)
//! ATO\r                          ->  ATO            (back to data mode)
//! ```
//!
//! Everything the commands act on (registers, calibration, pins, the
//! radio relay, diagnostics, watchdog and reset) is reached through the
//! collaborator traits in [`board`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rfmodem_at::{AtModem, ModemConfig, ByteRoute};
//!
//! let mut modem = AtModem::new(ModemConfig::default());
//! let mut out = String::new();
//!
//! // From the serial receive path:
//! if modem.on_byte(b, &mut out) == ByteRoute::Data {
//!     radio.send(b);
//! }
//! // From the 100 Hz timer:
//! modem.on_tick(&mut board);
//! // From the main loop:
//! modem.poll(&mut board, &mut out);
//! ```

pub mod board;
mod buffer;
mod command;
mod config;
mod dispatch;
mod editor;
mod error;
mod escape;
mod modem;
mod reply;
mod testmode;

#[cfg(test)]
mod testing;

pub use board::{
    Board, BoardControl, CalibrationStore, Destination, Diagnostics, ParamStore, PinDirection,
    PinIo, Relay, BROADCAST_ADDRESS,
};
pub use buffer::*;
pub use command::*;
pub use config::*;
pub use dispatch::*;
pub use editor::*;
pub use error::*;
pub use escape::*;
pub use modem::*;
pub use reply::*;
pub use testmode::*;
