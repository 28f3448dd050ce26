//! Simulated user pins.

use rfmodem_at::{PinDirection, PinIo};

use crate::config::PinConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pin {
    direction: PinDirection,
    /// Driven level for outputs.
    level: u16,
    /// ADC reading for inputs.
    analog: u16,
}

/// A bank of user pins. Pins start as outputs driven low.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimPins {
    pins: Vec<Pin>,
}

impl SimPins {
    pub fn new(config: &PinConfig) -> Self {
        let pins = (0..usize::from(config.count))
            .map(|i| Pin {
                direction: PinDirection::Output,
                level: 0,
                analog: config.inputs.get(i).copied().unwrap_or(0),
            })
            .collect();
        SimPins { pins }
    }

    /// Change the simulated reading of an input.
    #[cfg(test)]
    pub fn set_analog(&mut self, pin: u8, reading: u16) {
        if let Some(p) = self.pins.get_mut(usize::from(pin)) {
            p.analog = reading;
        }
    }
}

impl PinIo for SimPins {
    fn count(&self) -> u8 {
        self.pins.len() as u8
    }

    fn direction(&self, pin: u8) -> PinDirection {
        self.pins
            .get(usize::from(pin))
            .map(|p| p.direction)
            .unwrap_or(PinDirection::Input)
    }

    fn set_direction(&mut self, pin: u8, direction: PinDirection) {
        if let Some(p) = self.pins.get_mut(usize::from(pin)) {
            p.direction = direction;
            if direction == PinDirection::Output {
                p.level = 0;
            }
        }
    }

    fn value(&self, pin: u8) -> u16 {
        match self.pins.get(usize::from(pin)) {
            Some(p) if p.direction == PinDirection::Output => p.level,
            Some(p) => p.analog,
            None => 0,
        }
    }

    fn set_value(&mut self, pin: u8, value: u8) -> bool {
        match self.pins.get_mut(usize::from(pin)) {
            Some(p) if p.direction == PinDirection::Output && value <= 1 => {
                p.level = u16::from(value);
                true
            }
            _ => false,
        }
    }
}
