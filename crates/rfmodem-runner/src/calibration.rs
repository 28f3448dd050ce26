//! Simulated calibration area.

use rfmodem_at::CalibrationStore;

/// Value of a channel that has never been written (erased flash).
pub const UNWRITTEN: u8 = 0xFF;

/// Per-channel calibration bytes. Once locked, nothing can be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCalibration {
    values: Vec<u8>,
    locked: bool,
}

impl SimCalibration {
    pub fn new(channels: u32) -> Self {
        SimCalibration {
            values: vec![UNWRITTEN; channels as usize],
            locked: false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl CalibrationStore for SimCalibration {
    fn get(&self, channel: u32) -> u8 {
        self.values
            .get(channel as usize)
            .copied()
            .unwrap_or(UNWRITTEN)
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
        if self.values.iter().any(|&v| v == UNWRITTEN) {
            tracing::warn!("calibration lock refused, area incomplete");
            return false;
        }
        self.locked = true;
        true
    }
}
