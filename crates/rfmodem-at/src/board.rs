//! Collaborators the dispatcher talks to.
//!
//! Everything outside the command front end (parameter storage,
//! calibration storage, user pins, the radio relay, link diagnostics and
//! raw board control) is reached through the narrow traits in this
//! module. A [`Board`] bundles them for one modem.

use std::fmt::Write;

use crate::config::Identity;

/// Address meaning "every node".
pub const BROADCAST_ADDRESS: u16 = 0xFFFF;

/// Direction of a user pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    /// Pin reads an external signal.
    Input,
    /// Pin drives a level.
    Output,
}

/// Where a relayed command goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Every node on the network.
    Broadcast,
    /// A single node.
    Node(u16),
}

impl Destination {
    /// The on-air address.
    pub fn address(&self) -> u16 {
        match self {
            Destination::Broadcast => BROADCAST_ADDRESS,
            Destination::Node(id) => *id,
        }
    }
}

impl From<u16> for Destination {
    fn from(address: u16) -> Self {
        if address == BROADCAST_ADDRESS {
            Destination::Broadcast
        } else {
            Destination::Node(address)
        }
    }
}

/// Numbered configuration registers (`ATSn`).
pub trait ParamStore {
    /// Number of registers; valid indices are `0..count()`.
    fn count(&self) -> u32;
    /// Current value of a register.
    fn get(&self, index: u32) -> u32;
    /// Store a value; `false` if the value is invalid for the register.
    fn set(&mut self, index: u32, value: u32) -> bool;
    /// Write one line describing a register.
    fn print(&self, node_id: u16, index: u32, out: &mut dyn Write);
    /// Persist the live values.
    fn save(&mut self);
    /// Restore every register to its default.
    fn reset_defaults(&mut self);
}

/// Per-channel calibration values.
pub trait CalibrationStore {
    /// Stored value for a channel.
    fn get(&self, channel: u32) -> u8;
    /// Store a value; `false` if the channel is invalid or the area is locked.
    fn set(&mut self, channel: u32, value: u8) -> bool;
    /// Lock the calibration area; `false` if not every channel is written.
    fn lock(&mut self) -> bool;
}

/// User-controllable pins.
pub trait PinIo {
    /// Number of pins; valid indices are `0..count()`.
    fn count(&self) -> u8;
    /// Current direction.
    fn direction(&self, pin: u8) -> PinDirection;
    /// Change direction.
    fn set_direction(&mut self, pin: u8, direction: PinDirection);
    /// Current level (or analog reading for inputs).
    fn value(&self, pin: u8) -> u16;
    /// Drive an output; `false` if the pin is not an output or the value is invalid.
    fn set_value(&mut self, pin: u8, value: u8) -> bool;
}

/// Forwards command lines to other nodes.
pub trait Relay {
    /// Send `command` to `destination`.
    fn forward(&mut self, destination: Destination, command: &str);
}

/// Link diagnostics.
pub trait Diagnostics {
    /// Write the link timing report.
    fn report_timing(&self, node_id: u16, out: &mut dyn Write);
    /// Write the signal strength report.
    fn report_signal(&self, node_id: u16, out: &mut dyn Write);
    /// This node's synchronisation state.
    fn sync_state(&self) -> u8;
}

/// Raw hardware operations.
pub trait BoardControl {
    /// Enable or disable the watchdog.
    fn set_watchdog(&mut self, enabled: bool);
    /// Set the transmit power-level PWM duty.
    fn set_power_level(&mut self, pwm: u8);
    /// Enable or disable antenna diversity.
    fn set_diversity(&mut self, enabled: bool);
    /// Reset the board. Never returns.
    fn reset(&mut self) -> !;
    /// Fault on a flash read so the bootloader enters update mode. Never returns.
    fn force_flash_fault(&mut self) -> !;
}

/// Everything one modem is wired to.
pub trait Board {
    /// Read-only identity.
    fn identity(&self) -> &Identity;
    /// Configuration registers.
    fn params(&mut self) -> &mut dyn ParamStore;
    /// Calibration storage, on boards that have it.
    fn calibration(&mut self) -> Option<&mut dyn CalibrationStore> {
        None
    }
    /// User pins.
    fn pins(&mut self) -> &mut dyn PinIo;
    /// Inter-node relay.
    fn relay(&mut self) -> &mut dyn Relay;
    /// Link diagnostics.
    fn diagnostics(&self) -> &dyn Diagnostics;
    /// Raw board control.
    fn control(&mut self) -> &mut dyn BoardControl;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_address() {
        assert_eq!(Destination::Broadcast.address(), 0xFFFF);
        assert_eq!(Destination::Node(5).address(), 5);
        assert_eq!(Destination::from(0xFFFF), Destination::Broadcast);
        assert_eq!(Destination::from(7), Destination::Node(7));
    }
}
