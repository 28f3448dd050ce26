//! In-memory board used by unit tests.

use std::fmt::Write;

use crate::board::{
    Board, BoardControl, CalibrationStore, Destination, Diagnostics, ParamStore, PinDirection,
    PinIo, Relay,
};
use crate::config::Identity;

pub(crate) const PARAM_DEFAULTS: [u32; 4] = [26, 57, 64, 25];

#[derive(Debug, Default)]
pub(crate) struct MockParams {
    pub values: Vec<u32>,
    pub saves: usize,
}

impl ParamStore for MockParams {
    fn count(&self) -> u32 {
        self.values.len() as u32
    }

    fn get(&self, index: u32) -> u32 {
        self.values[index as usize]
    }

    fn set(&mut self, index: u32, value: u32) -> bool {
        // Register 3 only accepts values below 500.
        if index == 3 && value >= 500 {
            return false;
        }
        self.values[index as usize] = value;
        true
    }

    fn print(&self, node_id: u16, index: u32, out: &mut dyn Write) {
        let _ = writeln!(out, "[{}] S{}:REG{}={}", node_id, index, index, self.get(index));
    }

    fn save(&mut self) {
        self.saves += 1;
    }

    fn reset_defaults(&mut self) {
        self.values = PARAM_DEFAULTS.to_vec();
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockCalibration {
    pub values: [u8; 4],
    pub locked: bool,
}

impl CalibrationStore for MockCalibration {
    fn get(&self, channel: u32) -> u8 {
        self.values.get(channel as usize).copied().unwrap_or(0xFF)
    }

    fn set(&mut self, channel: u32, value: u8) -> bool {
        if self.locked {
            return false;
        }
        match self.values.get_mut(channel as usize) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn lock(&mut self) -> bool {
        self.locked = true;
        true
    }
}

#[derive(Debug)]
pub(crate) struct MockPins {
    pub directions: [PinDirection; 2],
    pub levels: [u16; 2],
}

impl Default for MockPins {
    fn default() -> Self {
        MockPins {
            directions: [PinDirection::Output, PinDirection::Input],
            levels: [0, 512],
        }
    }
}

impl PinIo for MockPins {
    fn count(&self) -> u8 {
        2
    }

    fn direction(&self, pin: u8) -> PinDirection {
        self.directions[pin as usize]
    }

    fn set_direction(&mut self, pin: u8, direction: PinDirection) {
        self.directions[pin as usize] = direction;
    }

    fn value(&self, pin: u8) -> u16 {
        self.levels[pin as usize]
    }

    fn set_value(&mut self, pin: u8, value: u8) -> bool {
        if self.directions[pin as usize] != PinDirection::Output || value > 1 {
            return false;
        }
        self.levels[pin as usize] = u16::from(value);
        true
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockRelay {
    pub sent: Vec<(Destination, String)>,
}

impl Relay for MockRelay {
    fn forward(&mut self, destination: Destination, command: &str) {
        self.sent.push((destination, command.to_string()));
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockDiagnostics {
    pub sync: u8,
}

impl Diagnostics for MockDiagnostics {
    fn report_timing(&self, node_id: u16, out: &mut dyn Write) {
        let _ = writeln!(out, "[{}] timing", node_id);
    }

    fn report_signal(&self, node_id: u16, out: &mut dyn Write) {
        let _ = writeln!(out, "[{}] signal", node_id);
    }

    fn sync_state(&self) -> u8 {
        self.sync
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockControl {
    pub watchdog: Option<bool>,
    pub power_level: Option<u8>,
    pub diversity: Option<bool>,
}

impl BoardControl for MockControl {
    fn set_watchdog(&mut self, enabled: bool) {
        self.watchdog = Some(enabled);
    }

    fn set_power_level(&mut self, pwm: u8) {
        self.power_level = Some(pwm);
    }

    fn set_diversity(&mut self, enabled: bool) {
        self.diversity = Some(enabled);
    }

    fn reset(&mut self) -> ! {
        panic!("board reset");
    }

    fn force_flash_fault(&mut self) -> ! {
        panic!("flash fault");
    }
}

#[derive(Debug)]
pub(crate) struct MockBoard {
    pub identity: Identity,
    pub params: MockParams,
    pub calibration: Option<MockCalibration>,
    pub pins: MockPins,
    pub relay: MockRelay,
    pub diagnostics: MockDiagnostics,
    pub control: MockControl,
}

impl MockBoard {
    pub fn new(node_id: u16) -> Self {
        MockBoard {
            identity: Identity {
                node_id,
                ..Identity::default()
            },
            params: MockParams {
                values: PARAM_DEFAULTS.to_vec(),
                saves: 0,
            },
            calibration: None,
            pins: MockPins::default(),
            relay: MockRelay::default(),
            diagnostics: MockDiagnostics::default(),
            control: MockControl::default(),
        }
    }

    pub fn with_calibration(mut self) -> Self {
        self.calibration = Some(MockCalibration::default());
        self
    }
}

impl Board for MockBoard {
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
