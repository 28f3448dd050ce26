//! One node's serial session: the command front end, its board, and the
//! periodic test-mode reports.

use std::panic::{self, AssertUnwindSafe};

use bytes::BytesMut;
use rfmodem_at::{AtModem, Board, ByteRoute, Diagnostics, TestMode};
use rfmodem_metrics::metric_defs;

use crate::board::{halt_reason, HaltReason, SimBoard};
use crate::relay::RelayedCommand;
use crate::config::{NodeConfig, RunnerResult};

/// Tick rate of the modem timer.
pub const TICK_HZ: u32 = 100;

/// Bytes and text produced by one event.
#[derive(Debug, Default)]
pub struct SessionOutput {
    /// Text to send back on the serial line (echo, replies, reports).
    pub reply: String,
    /// Bytes for the radio data stream.
    pub data: BytesMut,
    /// `RT` commands to send over the radio, oldest first.
    pub relayed: Vec<RelayedCommand>,
    /// Set when a command stopped the board. `reply` still holds
    /// everything written before the stop.
    pub halt: Option<HaltReason>,
}

impl SessionOutput {
    pub fn is_empty(&self) -> bool {
        self.reply.is_empty()
            && self.data.is_empty()
            && self.relayed.is_empty()
            && self.halt.is_none()
    }
}

/// Owns everything one node needs between events.
#[derive(Debug)]
pub struct NodeSession {
    modem: AtModem,
    board: SimBoard,
    ticks: u32,
}

impl NodeSession {
    pub fn new(modem: AtModem, board: SimBoard) -> Self {
        NodeSession {
            modem,
            board,
            ticks: 0,
        }
    }

    /// Build a session from a node configuration.
    pub fn from_config(config: &NodeConfig) -> RunnerResult<Self> {
        Ok(Self::new(
            AtModem::new(config.modem.clone()),
            SimBoard::from_config(config)?,
        ))
    }

    /// Handle bytes received on the serial line.
    ///
    /// Each byte is processed to completion, and a finished line is run
    /// before the next byte is looked at. Bytes after a command that halts
    /// the board are not processed.
    pub fn on_serial(&mut self, bytes: &[u8]) -> SessionOutput {
        let mut out = SessionOutput::default();
        let (modem, board) = (&mut self.modem, &mut self.board);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            for &b in bytes {
                if modem.on_byte(b, &mut out.reply) == ByteRoute::Data {
                    out.data.extend_from_slice(&[b]);
                }
                modem.poll(board, &mut out.reply);
            }
        }));
        if let Err(payload) = result {
            out.halt = Some(halt_reason(payload));
        }
        out.relayed = self.board.relay.drain();

        if !out.data.is_empty() {
            metrics::counter!(metric_defs::SERIAL_PASSTHROUGH_BYTES.name)
                .increment(out.data.len() as u64);
            tracing::trace!("passthrough {} bytes", out.data.len());
        }
        out
    }

    /// Advance the modem timer by one tick.
    pub fn on_tick(&mut self) -> SessionOutput {
        let mut out = SessionOutput::default();
        let (modem, board) = (&mut self.modem, &mut self.board);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            modem.on_tick(board);
            modem.poll(board, &mut out.reply);
        }));
        if let Err(payload) = result {
            out.halt = Some(halt_reason(payload));
            return out;
        }

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % TICK_HZ == 0 {
            self.report_test_modes(&mut out.reply);
        }
        out
    }

    fn report_test_modes(&self, out: &mut String) {
        let modes = self.modem.test_mode();
        let node_id = self.board.identity().node_id;
        if modes.contains(TestMode::RSSI) {
            self.board.diagnostics.report_signal(node_id, out);
        }
        if modes.contains(TestMode::TDM) {
            self.board.diagnostics.report_timing(node_id, out);
        }
    }

    pub fn modem(&self) -> &AtModem {
        &self.modem
    }

    pub fn board(&self) -> &SimBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut SimBoard {
        &mut self.board
    }
}
