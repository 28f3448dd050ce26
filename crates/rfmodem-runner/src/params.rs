//! Simulated parameter registers.
//!
//! The register set of a multipoint radio: index, name, default and the
//! inclusive range of accepted values. Register 0 holds the storage
//! format version and can only be read.

use std::collections::BTreeMap;
use std::fmt::Write;

use rfmodem_at::ParamStore;

use crate::config::{RunnerError, RunnerResult};

/// Static description of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    /// Name shown by `ATI5`.
    pub name: &'static str,
    /// Value after a factory reset.
    pub default: u32,
    /// Smallest accepted value.
    pub min: u32,
    /// Largest accepted value.
    pub max: u32,
}

impl ParamInfo {
    const fn new(name: &'static str, default: u32, min: u32, max: u32) -> Self {
        ParamInfo {
            name,
            default,
            min,
            max,
        }
    }

    /// True if `value` may be stored.
    pub fn accepts(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Storage format version reported by register 0.
pub const PARAM_FORMAT: u32 = 27;

/// Register holding the node's own address.
pub const NODEID: u32 = 15;

/// Every register, by index.
pub const PARAMS: [ParamInfo; 19] = [
    ParamInfo::new("FORMAT", PARAM_FORMAT, PARAM_FORMAT, PARAM_FORMAT),
    ParamInfo::new("SERIAL_SPEED", 57, 1, 230),
    ParamInfo::new("AIR_SPEED", 64, 2, 250),
    ParamInfo::new("NETID", 25, 0, 499),
    ParamInfo::new("TXPOWER", 20, 0, 30),
    ParamInfo::new("ECC", 0, 0, 1),
    ParamInfo::new("MAVLINK", 1, 0, 2),
    ParamInfo::new("OPPRESEND", 0, 0, 1),
    ParamInfo::new("MIN_FREQ", 915_000, 902_000, 928_000),
    ParamInfo::new("MAX_FREQ", 928_000, 902_000, 928_000),
    ParamInfo::new("NUM_CHANNELS", 50, 1, 50),
    ParamInfo::new("DUTY_CYCLE", 100, 10, 100),
    ParamInfo::new("LBT_RSSI", 0, 0, 220),
    ParamInfo::new("MANCHESTER", 0, 0, 1),
    ParamInfo::new("RTSCTS", 0, 0, 1),
    ParamInfo::new("NODEID", 2, 0, 0xFFFE),
    ParamInfo::new("NODEDESTINATION", 0xFFFF, 0, 0xFFFF),
    ParamInfo::new("SYNCANY", 0, 0, 1),
    ParamInfo::new("NODECOUNT", 3, 2, 30),
];

/// In-memory register file with a separate "saved" copy standing in for
/// flash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTable {
    defaults: Vec<u32>,
    values: Vec<u32>,
    saved: Vec<u32>,
}

impl ParamTable {
    /// A table holding every default.
    pub fn new() -> Self {
        let defaults: Vec<u32> = PARAMS.iter().map(|p| p.default).collect();
        ParamTable {
            values: defaults.clone(),
            saved: defaults.clone(),
            defaults,
        }
    }

    /// A table whose `NODEID` register, factory value included, is the
    /// node's address.
    pub fn for_node(node_id: u16) -> RunnerResult<Self> {
        let mut table = Self::new();
        let value = u32::from(node_id);
        if !PARAMS[NODEID as usize].accepts(value) {
            return Err(RunnerError::InvalidParameter {
                name: PARAMS[NODEID as usize].name.to_string(),
                value,
            });
        }
        for slot in [&mut table.defaults, &mut table.values, &mut table.saved] {
            slot[NODEID as usize] = value;
        }
        Ok(table)
    }

    /// Register index for a name.
    pub fn index_of(name: &str) -> Option<u32> {
        PARAMS
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
            .map(|i| i as u32)
    }

    /// Description of a register.
    pub fn info(index: u32) -> Option<&'static ParamInfo> {
        PARAMS.get(index as usize)
    }

    /// Apply start-up overrides keyed by register name. The overrides
    /// become the saved values too.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, u32>) -> RunnerResult<()> {
        for (name, &value) in overrides {
            let index =
                Self::index_of(name).ok_or_else(|| RunnerError::UnknownParameter(name.clone()))?;
            if !self.set(index, value) {
                return Err(RunnerError::InvalidParameter {
                    name: name.clone(),
                    value,
                });
            }
        }
        self.saved = self.values.clone();
        Ok(())
    }

    /// Values as of the last save.
    pub fn saved(&self) -> &[u32] {
        &self.saved
    }
}

impl Default for ParamTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore for ParamTable {
    fn count(&self) -> u32 {
        PARAMS.len() as u32
    }

    fn get(&self, index: u32) -> u32 {
        self.values.get(index as usize).copied().unwrap_or(0)
    }

    fn set(&mut self, index: u32, value: u32) -> bool {
        // FORMAT is never writable, whatever its range says.
        if index == 0 {
            return false;
        }
        match (Self::info(index), self.values.get_mut(index as usize)) {
            (Some(info), Some(slot)) if info.accepts(value) => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    fn print(&self, node_id: u16, index: u32, out: &mut dyn Write) {
        if let Some(info) = Self::info(index) {
            let _ = writeln!(
                out,
                "[{}] S{}:{}={}",
                node_id,
                index,
                info.name,
                self.get(index)
            );
        }
    }

    fn save(&mut self) {
        tracing::debug!("saving {} parameters", self.values.len());
        self.saved = self.values.clone();
    }

    fn reset_defaults(&mut self) {
        self.values.clone_from(&self.defaults);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let table = ParamTable::new();
        assert_eq!(table.count(), 19);
        assert_eq!(table.get(0), PARAM_FORMAT);
        assert_eq!(table.get(1), 57);
        assert_eq!(table.get(16), 0xFFFF);
        assert_eq!(table.get(99), 0);
    }

    #[test]
    fn test_set_checks_range() {
        let mut table = ParamTable::new();
        assert!(table.set(4, 30));
        assert!(!table.set(4, 31));
        assert_eq!(table.get(4), 30);
        assert!(!table.set(0, PARAM_FORMAT));
        assert!(!table.set(19, 1));
    }

    #[test]
    fn test_save_and_reset() {
        let mut table = ParamTable::new();
        table.set(3, 100);
        assert_eq!(table.saved()[3], 25);
        table.save();
        assert_eq!(table.saved()[3], 100);

        table.reset_defaults();
        assert_eq!(table.get(3), 25);
        assert_eq!(table.saved()[3], 100);
    }

    #[test]
    fn test_print_format() {
        let table = ParamTable::new();
        let mut out = String::new();
        table.print(4, 2, &mut out);
        table.print(4, 99, &mut out);
        assert_eq!(out, "[4] S2:AIR_SPEED=64\n");
    }

    #[test]
    fn test_node_id_register_follows_identity() {
        let mut table = ParamTable::for_node(3).unwrap();
        assert_eq!(table.get(NODEID), 3);
        assert_eq!(table.saved()[NODEID as usize], 3);

        table.set(NODEID, 9);
        table.reset_defaults();
        assert_eq!(table.get(NODEID), 3);

        assert!(matches!(
            ParamTable::for_node(0xFFFF),
            Err(RunnerError::InvalidParameter { value: 0xFFFF, .. })
        ));
    }

    #[test]
    fn test_overrides_by_name() {
        let mut table = ParamTable::new();
        let mut overrides = BTreeMap::new();
        overrides.insert("netid".to_string(), 42);
        overrides.insert("TXPOWER".to_string(), 11);
        table.apply_overrides(&overrides).unwrap();
        assert_eq!(table.get(3), 42);
        assert_eq!(table.saved()[4], 11);

        overrides.insert("BOGUS".to_string(), 1);
        assert!(matches!(
            table.apply_overrides(&overrides),
            Err(RunnerError::UnknownParameter(_))
        ));
    }
}
