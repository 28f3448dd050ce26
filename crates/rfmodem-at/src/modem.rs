//! The command-mode front end of one modem.
//!
//! [`AtModem`] ties the escape detector, the line editor and the
//! dispatcher together. It is driven from three places:
//!
//! - [`AtModem::on_byte`] for every byte received on the serial port
//! - [`AtModem::on_tick`] from the fixed-rate timer
//! - [`AtModem::poll`] from the main loop, which runs a finished line
//!
//! All three must be called from one task; the modem holds no locks.

use std::fmt::Write;

use bytes::BytesMut;
use rfmodem_metrics::metric_defs;

use crate::board::Board;
use crate::config::ModemConfig;
use crate::dispatch::{Dispatcher, Effect};
use crate::editor::{EditEvent, LineEditor};
use crate::escape::{EscapeDetector, EscapeState};
use crate::testmode::TestMode;

/// Where an inbound byte ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRoute {
    /// Not in command mode; the byte belongs to the radio data stream.
    Data,
    /// Consumed by command mode.
    Command,
}

/// Command-mode state machine for one modem.
#[derive(Debug, Clone)]
pub struct AtModem {
    config: ModemConfig,
    escape: EscapeDetector,
    editor: LineEditor,
    command_mode: bool,
    ready: bool,
    test_mode: TestMode,
}

impl AtModem {
    /// Create a modem in data mode.
    pub fn new(config: ModemConfig) -> Self {
        AtModem {
            escape: EscapeDetector::new(config.escape_guard_ticks),
            editor: LineEditor::new(config.command_capacity),
            command_mode: false,
            ready: false,
            test_mode: TestMode::default(),
            config,
        }
    }

    /// Offer one received byte, writing any echo to `echo`.
    pub fn on_byte(&mut self, byte: u8, echo: &mut dyn Write) -> ByteRoute {
        self.escape.on_byte(byte);

        if !self.command_mode {
            return ByteRoute::Data;
        }
        if self.ready {
            log::trace!("line pending dispatch, dropping {:#04x}", byte);
            return ByteRoute::Command;
        }

        match self.editor.on_byte(byte, echo) {
            EditEvent::Pending => {}
            EditEvent::LineReady => self.ready = true,
            EditEvent::Overflow => {
                metrics::counter!(metric_defs::AT_OVERFLOWS.name).increment(1);
                self.command_mode = false;
                log::info!("command mode abandoned");
            }
        }
        ByteRoute::Command
    }

    /// Offer a run of received bytes, returning the ones that belong to
    /// the data stream.
    pub fn feed(&mut self, bytes: &[u8], echo: &mut dyn Write) -> BytesMut {
        let mut data = BytesMut::new();
        for &b in bytes {
            if self.on_byte(b, echo) == ByteRoute::Data {
                data.extend_from_slice(&[b]);
            }
        }
        data
    }

    /// Advance time by one tick.
    pub fn on_tick<B: Board + ?Sized>(&mut self, board: &mut B) {
        if self.escape.on_tick() {
            self.enter_command_mode(board);
        }
    }

    /// Run the pending line, if any. Returns `true` if a line was run.
    pub fn poll<B: Board + ?Sized>(&mut self, board: &mut B, out: &mut dyn Write) -> bool {
        if !self.ready {
            return false;
        }

        let effect = Dispatcher::new(
            &mut *board,
            self.config.features,
            &mut self.test_mode,
            &mut *out,
        )
        .dispatch(self.editor.line());

        self.ready = false;
        self.editor.clear();

        if effect == Effect::LeaveCommandMode {
            self.leave_command_mode(board);
        }
        true
    }

    fn enter_command_mode<B: Board + ?Sized>(&mut self, board: &mut B) {
        log::info!(
            "[{}] escape sequence, entering command mode",
            board.identity().node_id
        );
        metrics::counter!(metric_defs::AT_ESCAPES.name).increment(1);

        self.command_mode = true;
        // Answer the escape as if the operator had typed `AT`.
        self.editor.set_line("AT");
        self.ready = true;

        if self.config.features.watchdog {
            board.control().set_watchdog(false);
        }
    }

    fn leave_command_mode<B: Board + ?Sized>(&mut self, board: &mut B) {
        self.escape.restart_window();
        self.command_mode = false;
        if self.config.features.watchdog {
            board.control().set_watchdog(true);
        }
        log::info!("[{}] back to data mode", board.identity().node_id);
    }

    /// True while command mode is active.
    pub fn is_command_mode(&self) -> bool {
        self.command_mode
    }

    /// True while a finished line waits for [`poll`](Self::poll).
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The line being edited or waiting to run.
    pub fn line(&self) -> &str {
        self.editor.line()
    }

    /// Active diagnostic test modes.
    pub fn test_mode(&self) -> TestMode {
        self.test_mode
    }

    /// Escape detector position.
    pub fn escape_state(&self) -> EscapeState {
        self.escape.state()
    }

    /// The configuration this modem was built with.
    pub fn config(&self) -> &ModemConfig {
        &self.config
    }
}

impl Default for AtModem {
    fn default() -> Self {
        Self::new(ModemConfig::default())
    }
}
