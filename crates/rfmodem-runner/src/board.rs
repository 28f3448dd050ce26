//! The simulated board a node's command front end drives.

use std::any::Any;

use rfmodem_at::{
    Board, BoardControl, CalibrationStore, Diagnostics, Identity, ParamStore, PinIo, Relay,
};

use crate::calibration::SimCalibration;
use crate::config::{NodeConfig, RunnerError, RunnerResult};
use crate::diagnostics::SimDiagnostics;
use crate::params::{ParamTable, NODEID};
use crate::pins::SimPins;
use crate::relay::RelayQueue;

/// Why the board stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// `ATZ`
    Reset,
    /// `AT&UPDATE`
    FlashFault,
}

/// Called when the board stops for good.
pub type HaltHandler = fn(HaltReason) -> !;

/// Unwind out of the running command with the reason as payload, so the
/// session can hand it to the event loop. See [`halt_reason`].
pub fn unwind_halt(reason: HaltReason) -> ! {
    tracing::debug!("board halting: {:?}", reason);
    std::panic::resume_unwind(Box::new(reason))
}

/// Recover the reason from an unwind started by [`unwind_halt`]. Any other
/// panic keeps unwinding.
pub fn halt_reason(payload: Box<dyn Any + Send>) -> HaltReason {
    match payload.downcast::<HaltReason>() {
        Ok(reason) => *reason,
        Err(other) => std::panic::resume_unwind(other),
    }
}

/// Raw hardware state.
#[derive(Debug, Clone)]
pub struct SimControl {
    watchdog: bool,
    power_level: u8,
    diversity: bool,
    halt: HaltHandler,
}

impl SimControl {
    pub fn new(watchdog: bool) -> Self {
        SimControl {
            watchdog,
            power_level: 0,
            diversity: true,
            halt: unwind_halt,
        }
    }

    pub fn watchdog_enabled(&self) -> bool {
        self.watchdog
    }

    pub fn power_level(&self) -> u8 {
        self.power_level
    }

    pub fn diversity(&self) -> bool {
        self.diversity
    }
}

impl BoardControl for SimControl {
    fn set_watchdog(&mut self, enabled: bool) {
        tracing::debug!("watchdog {}", if enabled { "on" } else { "off" });
        self.watchdog = enabled;
    }

    fn set_power_level(&mut self, pwm: u8) {
        tracing::debug!("power level pwm {}", pwm);
        self.power_level = pwm;
    }

    fn set_diversity(&mut self, enabled: bool) {
        self.diversity = enabled;
    }

    fn reset(&mut self) -> ! {
        (self.halt)(HaltReason::Reset)
    }

    fn force_flash_fault(&mut self) -> ! {
        (self.halt)(HaltReason::FlashFault)
    }
}

/// Every collaborator of one simulated node.
#[derive(Debug, Clone)]
pub struct SimBoard {
    identity: Identity,
    pub params: ParamTable,
    pub calibration: Option<SimCalibration>,
    pub pins: SimPins,
    pub relay: RelayQueue,
    pub diagnostics: SimDiagnostics,
    pub control: SimControl,
}

impl SimBoard {
    /// Build a board from a node configuration.
    pub fn from_config(config: &NodeConfig) -> RunnerResult<Self> {
        let mut params = ParamTable::for_node(config.identity.node_id)?;
        params.apply_overrides(&config.parameters)?;
        let node_id = params.get(NODEID);
        if node_id != u32::from(config.identity.node_id) {
            return Err(RunnerError::Config(format!(
                "NODEID parameter {} differs from identity.node_id {}",
                node_id, config.identity.node_id
            )));
        }

        let calibration = config
            .calibration
            .enabled
            .then(|| SimCalibration::new(config.calibration.channels));

        Ok(SimBoard {
            identity: config.identity.clone(),
            params,
            calibration,
            pins: SimPins::new(&config.pins),
            relay: RelayQueue::new(),
            diagnostics: SimDiagnostics::new(config.diagnostics.clone()),
            control: SimControl::new(config.modem.features.watchdog),
        })
    }

    /// Replace what happens on reset and flash fault.
    pub fn with_halt_handler(mut self, halt: HaltHandler) -> Self {
        self.control.halt = halt;
        self
    }
}

impl Board for SimBoard {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn params(&mut self) -> &mut dyn ParamStore {
        &mut self.params
    }

    fn calibration(&mut self) -> Option<&mut dyn CalibrationStore> {
        self.calibration
            .as_mut()
            .map(|c| c as &mut dyn CalibrationStore)
    }

    fn pins(&mut self) -> &mut dyn PinIo {
        &mut self.pins
    }

    fn relay(&mut self) -> &mut dyn Relay {
        &mut self.relay
    }

    fn diagnostics(&self) -> &dyn Diagnostics {
        &self.diagnostics
    }

    fn control(&mut self) -> &mut dyn BoardControl {
        &mut self.control
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panic_halt(reason: HaltReason) -> ! {
        panic!("halted: {:?}", reason)
    }

    #[test]
    fn test_from_config() {
        let config = NodeConfig::from_yaml(
            "identity:\n  node_id: 4\ncalibration:\n  enabled: true\n  channels: 3\nparameters:\n  NETID: 9\n",
        )
        .unwrap();
        let mut board = SimBoard::from_config(&config).unwrap();
        assert_eq!(board.identity().node_id, 4);
        assert_eq!(board.params().get(3), 9);
        assert!(board.calibration().is_some());
        assert!(!board.control.watchdog_enabled());
    }

    #[test]
    fn test_bad_override_fails() {
        let config = NodeConfig::from_yaml("parameters:\n  TXPOWER: 99\n").unwrap();
        assert!(SimBoard::from_config(&config).is_err());
    }

    #[test]
    fn test_unwind_halt_carries_reason() {
        let mut board = SimBoard::from_config(&NodeConfig::default()).unwrap();
        let payload =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| board.control().reset()))
                .unwrap_err();
        assert_eq!(halt_reason(payload), HaltReason::Reset);
    }

    #[test]
    fn test_node_id_seeds_register() {
        let config = NodeConfig::from_yaml("identity:\n  node_id: 3\n").unwrap();
        let mut board = SimBoard::from_config(&config).unwrap();
        assert_eq!(board.params().get(NODEID), 3);

        let config =
            NodeConfig::from_yaml("identity:\n  node_id: 3\nparameters:\n  NODEID: 5\n").unwrap();
        assert!(matches!(
            SimBoard::from_config(&config),
            Err(RunnerError::Config(_))
        ));
    }

    #[test]
    #[should_panic(expected = "halted: Reset")]
    fn test_reset_uses_halt_handler() {
        let mut board = SimBoard::from_config(&NodeConfig::default())
            .unwrap()
            .with_halt_handler(panic_halt);
        board.control().reset();
    }
}
