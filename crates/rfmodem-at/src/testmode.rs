//! Diagnostic test-mode flags (`AT&T`).

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Independently toggleable diagnostic flags.
    ///
    /// Held in memory only; every restart begins with all flags clear.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TestMode: u8 {
        /// Periodic signal-strength reports (`AT&T=RSSI`).
        const RSSI = 1 << 0;
        /// Periodic timing/TDM debug reports (`AT&T=TDM`).
        const TDM = 1 << 1;
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
