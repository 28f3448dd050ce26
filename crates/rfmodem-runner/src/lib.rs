//! Host simulation of a single radio modem node.
//!
//! Wires the AT command front end from `rfmodem-at` to in-memory
//! collaborators (parameter registers, calibration area, user pins, relay
//! queue, link diagnostics, board control) and exposes the node's serial
//! port as a TCP socket.

pub mod board;
pub mod calibration;
pub mod config;
pub mod diagnostics;
pub mod params;
pub mod pins;
pub mod relay;
pub mod session;
pub mod uart_server;

pub use board::{halt_reason, unwind_halt, HaltHandler, HaltReason, SimBoard, SimControl};
pub use config::{NodeConfig, RunnerError, RunnerResult};
pub use session::{NodeSession, SessionOutput, TICK_HZ};
pub use uart_server::UartServer;
