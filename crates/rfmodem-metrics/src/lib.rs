//! Metric declarations for the radio modem command front end.
//!
//! Every metric the modem emits is declared once here as a [`Metric`]
//! constant so that names, units and label keys stay in one place. The
//! `metrics` crate is re-exported; emitting into it without a recorder
//! installed is a no-op.
//!
//! # Example
//!
//! ```rust
//! use rfmodem_metrics::{metric_defs, describe_metrics};
//!
//! describe_metrics();
//! metrics::counter!(metric_defs::AT_ESCAPES.name).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, Unit};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "rfmodem.at.commands").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for the modem.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Command Mode
    // ========================================================================

    /// Escape sequences that put the modem into command mode.
    pub const AT_ESCAPES: Metric = Metric::counter("rfmodem.at.escapes")
        .with_description("Escape sequences detected")
        .with_unit(Unit::Count);

    /// Command lines dispatched, by command family.
    ///
    /// Labels: family
    pub const AT_COMMANDS: Metric = Metric::counter("rfmodem.at.commands")
        .with_description("Command lines dispatched")
        .with_unit(Unit::Count)
        .with_labels(&["family"]);

    /// ERROR replies sent to the operator.
    pub const AT_ERRORS: Metric = Metric::counter("rfmodem.at.errors")
        .with_description("ERROR replies sent")
        .with_unit(Unit::Count);

    /// Command mode abandoned because the command buffer overflowed.
    pub const AT_OVERFLOWS: Metric = Metric::counter("rfmodem.at.overflows")
        .with_description("Command buffer overflow aborts")
        .with_unit(Unit::Count);

    /// Command lines forwarded to another node.
    ///
    /// Labels: target
    pub const AT_RELAYED: Metric = Metric::counter("rfmodem.at.relayed")
        .with_description("Remote commands forwarded")
        .with_unit(Unit::Count)
        .with_labels(&["target"]);

    // ========================================================================
    // Serial Channel
    // ========================================================================

    /// Bytes passed through to the data path while not in command mode.
    pub const SERIAL_PASSTHROUGH_BYTES: Metric = Metric::counter("rfmodem.serial.passthrough_bytes")
        .with_description("Bytes routed to the data path")
        .with_unit(Unit::Bytes);

    /// Whether a client is attached to the serial bridge.
    pub const SERIAL_CLIENT_CONNECTED: Metric = Metric::gauge("rfmodem.serial.client_connected")
        .with_description("1 while a serial client is connected");

    /// Every metric declared above.
    pub const ALL: &[&Metric] = &[
        &AT_ESCAPES,
        &AT_COMMANDS,
        &AT_ERRORS,
        &AT_OVERFLOWS,
        &AT_RELAYED,
        &SERIAL_PASSTHROUGH_BYTES,
        &SERIAL_CLIENT_CONNECTED,
    ];
}

/// Registers descriptions for every metric in [`metric_defs::ALL`].
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_unique() {
        let mut names: Vec<&str> = metric_defs::ALL.iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
    }

    #[test]
    fn test_command_metric_has_family_label() {
        assert_eq!(metric_defs::AT_COMMANDS.kind, MetricKind::Counter);
        assert_eq!(metric_defs::AT_COMMANDS.labels, &["family"]);
    }

    #[test]
    fn test_describe_without_recorder() {
        // No recorder installed: must not panic.
        describe_metrics();
    }
}
