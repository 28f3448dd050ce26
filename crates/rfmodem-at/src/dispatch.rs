//! Command dispatcher.
//!
//! Runs one parsed line against the board and writes exactly one reply
//! (`OK`, `ERROR`, or data lines), except for relayed commands, `ATO`,
//! successful `AT&T` changes, and the two non-returning commands, which
//! reply nothing.

use std::fmt::Write;

use rfmodem_metrics::metric_defs;

use crate::board::{Board, Destination, PinDirection};
use crate::command::{parse_line, AtCommand, InfoQuery, Line, PinOp, TestModeChange};
use crate::config::BoardFeatures;
use crate::error::{AtError, AtResult};
use crate::reply::Responder;
use crate::testmode::TestMode;

/// What the modem must do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Stay in command mode.
    Stay,
    /// Return to data mode.
    LeaveCommandMode,
}

/// Handles one line for one board.
pub struct Dispatcher<'a, B: Board + ?Sized> {
    board: &'a mut B,
    reply: Responder<'a>,
    features: BoardFeatures,
    test_mode: &'a mut TestMode,
}

impl<'a, B: Board + ?Sized> Dispatcher<'a, B> {
    /// Prepare to handle a line, replying on `out`.
    pub fn new(
        board: &'a mut B,
        features: BoardFeatures,
        test_mode: &'a mut TestMode,
        out: &'a mut dyn Write,
    ) -> Self {
        let node_id = board.identity().node_id;
        Dispatcher {
            board,
            reply: Responder::new(out, node_id),
            features,
            test_mode,
        }
    }

    /// Parse and run `line`.
    pub fn dispatch(mut self, line: &str) -> Effect {
        log::debug!("[{}] dispatch {:?}", self.reply.node_id(), line);

        match parse_line(line) {
            Line::Ignored => Effect::Stay,
            Line::Remote {
                destination,
                command,
            } => {
                match destination {
                    Ok(dest) => {
                        let target = match dest {
                            Destination::Broadcast => "broadcast",
                            Destination::Node(_) => "node",
                        };
                        metrics::counter!(metric_defs::AT_RELAYED.name, "target" => target)
                            .increment(1);
                        self.board.relay().forward(dest, command);
                    }
                    Err(e) => log::warn!("dropping remote command {:?}: {}", command, e),
                }
                Effect::Stay
            }
            Line::At(Err(e)) => {
                self.fail(e);
                Effect::Stay
            }
            Line::At(Ok(cmd)) => {
                metrics::counter!(metric_defs::AT_COMMANDS.name, "family" => cmd.family())
                    .increment(1);
                match self.execute(cmd) {
                    Ok(effect) => effect,
                    Err(e) => {
                        self.fail(e);
                        Effect::Stay
                    }
                }
            }
        }
    }

    fn fail(&mut self, e: AtError) {
        log::debug!("[{}] ERROR: {}", self.reply.node_id(), e);
        metrics::counter!(metric_defs::AT_ERRORS.name).increment(1);
        self.reply.error();
    }

    fn execute(&mut self, cmd: AtCommand) -> AtResult<Effect> {
        match cmd {
            AtCommand::Attention => self.reply.ok(),
            AtCommand::FactoryReset => {
                self.board.params().reset_defaults();
                self.reply.ok();
            }
            AtCommand::Save => {
                self.board.params().save();
                self.reply.ok();
            }
            AtCommand::ForceUpdate => {
                log::warn!("forcing flash fault for firmware update");
                self.board.control().force_flash_fault()
            }
            AtCommand::TestMode(change) => self.change_test_mode(change),
            AtCommand::PowerLevel(_)
            | AtCommand::CalibrationRead(_)
            | AtCommand::CalibrationWrite { .. }
            | AtCommand::CalibrationLock => self.extended(cmd)?,
            AtCommand::Info(query) => self.info(query),
            AtCommand::PinList => self.pin_list(),
            AtCommand::Pin { pin, op } => self.pin(pin, op)?,
            AtCommand::ParamRead(index) => {
                self.check_register(index)?;
                let value = self.board.params().get(index);
                self.reply.line(format_args!("{}", value));
            }
            AtCommand::ParamWrite { index, value } => {
                self.check_register(index)?;
                if index == 0 {
                    return Err(AtError::ReadOnly(index));
                }
                if !self.board.params().set(index, value) {
                    return Err(AtError::Rejected("parameter store"));
                }
                self.reply.ok();
            }
            AtCommand::Online => return Ok(Effect::LeaveCommandMode),
            AtCommand::Reset => {
                log::info!("[{}] reset requested", self.reply.node_id());
                self.board.control().reset()
            }
        }
        Ok(Effect::Stay)
    }

    fn change_test_mode(&mut self, change: TestModeChange) {
        match change {
            TestModeChange::ClearAll => *self.test_mode = TestMode::empty(),
            TestModeChange::Toggle(flag) => self.test_mode.toggle(flag),
        }
        log::debug!("test modes now {}", self.test_mode);
    }

    /// Board-specific `AT+` commands.
    fn extended(&mut self, cmd: AtCommand) -> AtResult<()> {
        if !self.features.extended_commands {
            return Err(AtError::Unsupported);
        }

        match cmd {
            AtCommand::PowerLevel(value) => {
                let control = self.board.control();
                control.set_power_level(low_byte(value));
                control.set_diversity(false);
                self.reply.ok();
            }
            AtCommand::CalibrationRead(channel) => {
                let store = self.board.calibration().ok_or(AtError::Unsupported)?;
                let value = store.get(channel);
                self.reply.line(format_args!("{}", value));
            }
            AtCommand::CalibrationWrite { channel, value } => {
                let store = self.board.calibration().ok_or(AtError::Unsupported)?;
                if !store.set(channel, low_byte(value)) {
                    return Err(AtError::Rejected("calibration store"));
                }
                self.reply.ok();
            }
            AtCommand::CalibrationLock => {
                let store = self.board.calibration().ok_or(AtError::Unsupported)?;
                if !store.lock() {
                    return Err(AtError::Rejected("calibration store"));
                }
                self.reply.ok();
            }
            _ => return Err(AtError::Syntax),
        }
        Ok(())
    }

    fn info(&mut self, query: InfoQuery) {
        let node_id = self.reply.node_id();
        let identity = self.board.identity();
        match query {
            InfoQuery::Banner => self.reply.line(format_args!("{}", identity.banner)),
            InfoQuery::Version => self.reply.line(format_args!("{}", identity.version)),
            InfoQuery::BoardId => self.reply.line(format_args!("{}", identity.board_id)),
            InfoQuery::Frequency => {
                self.reply.line(format_args!("{}", identity.board_frequency));
            }
            InfoQuery::Bootloader => {
                self.reply.line(format_args!("{}", identity.bootloader_version));
            }
            InfoQuery::Parameters => {
                let params = self.board.params();
                for index in 0..params.count() {
                    params.print(node_id, index, self.reply.raw());
                }
            }
            InfoQuery::Timing => self
                .board
                .diagnostics()
                .report_timing(node_id, self.reply.raw()),
            InfoQuery::Signal => self
                .board
                .diagnostics()
                .report_signal(node_id, self.reply.raw()),
            InfoQuery::Sync => {
                // Node 0 is the timing base for the whole network.
                if node_id == 0 {
                    self.reply.line(format_args!("Sync: Base"));
                } else {
                    let state = self.board.diagnostics().sync_state();
                    self.reply.line(format_args!("Sync: {}", state));
                }
            }
        }
    }

    fn pin_list(&mut self) {
        let pins = self.board.pins();
        for pin in 0..pins.count() {
            let direction = match pins.direction(pin) {
                PinDirection::Output => "Output ",
                PinDirection::Input => "Input  ",
            };
            self.reply.line(format_args!(
                "Pin:{} {}Val: {}",
                pin,
                direction,
                pins.value(pin)
            ));
        }
    }

    fn pin(&mut self, pin: u8, op: PinOp) -> AtResult<()> {
        let pins = self.board.pins();
        if pin >= pins.count() {
            return Err(AtError::OutOfRange {
                index: u32::from(pin),
                max: u32::from(pins.count()),
            });
        }

        match op {
            PinOp::Output => pins.set_direction(pin, PinDirection::Output),
            PinOp::Input => pins.set_direction(pin, PinDirection::Input),
            PinOp::Read => {
                if pins.direction(pin) != PinDirection::Input {
                    return Err(AtError::Rejected("pin direction"));
                }
                self.reply.line(format_args!("val:{}", pins.value(pin)));
                return Ok(());
            }
            PinOp::Write(value) => {
                if !pins.set_value(pin, value) {
                    return Err(AtError::Rejected("pin"));
                }
            }
        }
        self.reply.ok();
        Ok(())
    }

    fn check_register(&mut self, index: u32) -> AtResult<()> {
        let max = self.board.params().count();
        if index >= max {
            return Err(AtError::OutOfRange { index, max });
        }
        Ok(())
    }
}

fn low_byte(value: u32) -> u8 {
    (value & 0xFF) as u8
}
