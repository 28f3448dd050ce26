//! Node configuration file.
//!
//! A node is described by a YAML file:
//!
//! ```yaml
//! identity:
//!   node_id: 2
//!   banner: "RFModem Multipoint"
//! modem:
//!   escape_guard_ticks: 100
//!   features:
//!     extended_commands: true
//!     watchdog: true
//! parameters:
//!   NETID: 42
//!   TXPOWER: 14
//! pins:
//!   count: 6
//! calibration:
//!   enabled: true
//!   channels: 16
//! diagnostics:
//!   local_rssi: 180
//! uart:
//!   port: 9000
//! ```
//!
//! Every section is optional.

use std::collections::BTreeMap;
use std::path::Path;

use rfmodem_at::{Identity, ModemConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or running a node.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Parameter {name} does not accept {value}")]
    InvalidParameter { name: String, value: u32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// User pin bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    /// Number of user pins (at most 10, one digit per pin).
    pub count: u8,
    /// Simulated analog readings for pins configured as inputs.
    pub inputs: Vec<u16>,
}

impl Default for PinConfig {
    fn default() -> Self {
        PinConfig {
            count: 6,
            inputs: Vec::new(),
        }
    }
}

/// Calibration area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Whether the board has a calibration area at all.
    pub enabled: bool,
    /// Number of calibration channels.
    pub channels: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            enabled: false,
            channels: 16,
        }
    }
}

/// Values reported by the diagnostic queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub local_rssi: u8,
    pub remote_rssi: u8,
    pub local_noise: u8,
    pub remote_noise: u8,
    pub received_packets: u16,
    pub sync_state: u8,
    pub silence_period: u16,
    pub tx_window_width: u16,
    pub max_data_packet_length: u16,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        DiagnosticsConfig {
            local_rssi: 180,
            remote_rssi: 175,
            local_noise: 40,
            remote_noise: 42,
            received_packets: 0,
            sync_state: 0,
            silence_period: 65,
            tx_window_width: 5632,
            max_data_packet_length: 252,
        }
    }
}

/// TCP endpoint standing in for the serial port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UartConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for UartConfig {
    fn default() -> Self {
        UartConfig {
            bind: "127.0.0.1".to_string(),
            port: 9000,
        }
    }
}

/// Everything needed to run one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub identity: Identity,
    pub modem: ModemConfig,
    /// Start-up register values keyed by register name.
    pub parameters: BTreeMap<String, u32>,
    pub pins: PinConfig,
    pub calibration: CalibrationConfig,
    pub diagnostics: DiagnosticsConfig,
    pub uart: UartConfig,
}

impl NodeConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> RunnerResult<Self> {
        let config: NodeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file.
    pub fn load(path: impl AsRef<Path>) -> RunnerResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Reject settings the front end cannot work with.
    pub fn validate(&self) -> RunnerResult<()> {
        if self.modem.command_capacity < 2 {
            return Err(RunnerError::Config(
                "command_capacity must hold at least \"AT\"".to_string(),
            ));
        }
        if self.modem.escape_guard_ticks == 0 {
            return Err(RunnerError::Config(
                "escape_guard_ticks must be positive".to_string(),
            ));
        }
        if self.pins.count > 10 {
            return Err(RunnerError::Config(format!(
                "pins.count is {}, at most 10 pins are addressable",
                self.pins.count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = NodeConfig::from_yaml("{}").unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.uart.port, 9000);
        assert_eq!(config.modem.command_capacity, 16);
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
identity:
  node_id: 2
modem:
  features:
    extended_commands: true
parameters:
  NETID: 42
pins:
  count: 4
  inputs: [0, 0, 900]
calibration:
  enabled: true
uart:
  port: 9100
"#;
        let config = NodeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.identity.node_id, 2);
        assert!(config.modem.features.extended_commands);
        assert!(!config.modem.features.watchdog);
        assert_eq!(config.parameters.get("NETID"), Some(&42));
        assert_eq!(config.pins.count, 4);
        assert_eq!(config.pins.inputs, vec![0, 0, 900]);
        assert!(config.calibration.enabled);
        assert_eq!(config.calibration.channels, 16);
        assert_eq!(config.uart.port, 9100);
        assert_eq!(config.uart.bind, "127.0.0.1");
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            NodeConfig::from_yaml("pins:\n  count: 11\n"),
            Err(RunnerError::Config(_))
        ));
        assert!(matches!(
            NodeConfig::from_yaml("modem:\n  escape_guard_ticks: 0\n"),
            Err(RunnerError::Config(_))
        ));
        assert!(matches!(
            NodeConfig::from_yaml("identity: [1, 2]"),
            Err(RunnerError::Yaml(_))
        ));
    }
}
