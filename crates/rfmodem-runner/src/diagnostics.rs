//! Simulated link diagnostics.

use std::fmt::Write;

use rfmodem_at::Diagnostics;

use crate::config::DiagnosticsConfig;

/// Reports canned link statistics from the node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDiagnostics {
    config: DiagnosticsConfig,
}

impl SimDiagnostics {
    pub fn new(config: DiagnosticsConfig) -> Self {
        SimDiagnostics { config }
    }

    /// Record received packets.
    #[cfg(test)]
    pub fn count_received(&mut self, packets: u16) {
        self.config.received_packets = self.config.received_packets.wrapping_add(packets);
    }
}

impl Diagnostics for SimDiagnostics {
    fn report_timing(&self, node_id: u16, out: &mut dyn Write) {
        let c = &self.config;
        let _ = writeln!(out, "[{}] silence_period: {}", node_id, c.silence_period);
        let _ = writeln!(out, "[{}] tx_window_width: {}", node_id, c.tx_window_width);
        let _ = writeln!(
            out,
            "[{}] max_data_packet_length: {}",
            node_id, c.max_data_packet_length
        );
    }

    fn report_signal(&self, node_id: u16, out: &mut dyn Write) {
        let c = &self.config;
        let _ = writeln!(
            out,
            "[{}] L/R RSSI: {}/{}  L/R noise: {}/{} pkts: {}",
            node_id, c.local_rssi, c.remote_rssi, c.local_noise, c.remote_noise, c.received_packets
        );
    }

    fn sync_state(&self) -> u8 {
        self.config.sync_state
    }
}
