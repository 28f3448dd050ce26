//! Static configuration of the command front end.

use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_COMMAND_CAPACITY;
use crate::escape::DEFAULT_GUARD_TICKS;

/// Board-variant predicates resolved at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardFeatures {
    /// The board supports the `AT+` family (power level, calibration).
    pub extended_commands: bool,
    /// The board runs a watchdog that must be paused in command mode.
    pub watchdog: bool,
}

/// Tunables for [`crate::AtModem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    /// Maximum command length in characters.
    pub command_capacity: usize,
    /// Ticks in the escape guard window.
    pub escape_guard_ticks: u16,
    /// Board-variant predicates.
    pub features: BoardFeatures,
}

impl Default for ModemConfig {
    fn default() -> Self {
        ModemConfig {
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            escape_guard_ticks: DEFAULT_GUARD_TICKS,
            features: BoardFeatures::default(),
        }
    }
}

/// Read-only facts about this modem, reported by `ATI`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    /// This node's address; prefixes every reply.
    pub node_id: u16,
    /// Banner string (`ATI`, `ATI0`).
    pub banner: String,
    /// Firmware version string (`ATI1`).
    pub version: String,
    /// Numeric board identifier (`ATI2`).
    pub board_id: u8,
    /// Configured board frequency code (`ATI3`).
    pub board_frequency: u8,
    /// Bootloader version (`ATI4`).
    pub bootloader_version: u8,
}

impl Default for Identity {
    fn default() -> Self {
        Identity {
            node_id: 0,
            banner: "RFModem Multipoint".to_string(),
            version: "1.0".to_string(),
            board_id: 0x4E,
            board_frequency: 0x09,
            bootloader_version: 0,
        }
    }
}
