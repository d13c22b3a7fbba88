//! Metrics for the rain gauge controller.
//!
//! Every metric the controller records is declared here as a const
//! [`Metric`], so names, units and label keys live in one place. Recording
//! goes through the `metrics` facade: without an installed recorder every
//! call is a no-op.
//!
//! # Example
//!
//! ```rust
//! use raingauge_metrics::{metric_defs, SensorLabels};
//!
//! let labels = SensorLabels::new("0013A20040A096A1", "/dev/ttyUSB0");
//! metric_defs::TIPS.increment(&labels);
//! metric_defs::SUPPLY_VOLTAGE.set(2995.0, &labels);
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
    /// The metric name (e.g., "raingauge.frames.received").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
}

impl Metric {
    /// Declares a counter.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
        }
    }

    /// Declares a gauge.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
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

    /// Registers this metric's description with the metrics recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => describe_counter!(self.name, unit, self.description),
            (MetricKind::Counter, None) => describe_counter!(self.name, self.description),
            (MetricKind::Gauge, Some(unit)) => describe_gauge!(self.name, unit, self.description),
            (MetricKind::Gauge, None) => describe_gauge!(self.name, self.description),
        }
    }

    /// Adds one to a counter.
    pub fn increment(&self, labels: &SensorLabels) {
        debug_assert_eq!(self.kind, MetricKind::Counter, "{} is not a counter", self.name);
        metrics::counter!(self.name, &labels.to_labels()).increment(1);
    }

    /// Sets a gauge to the given value.
    pub fn set(&self, value: f64, labels: &SensorLabels) {
        debug_assert_eq!(self.kind, MetricKind::Gauge, "{} is not a gauge", self.name);
        metrics::gauge!(self.name, &labels.to_labels()).set(value);
    }
}

/// All metric definitions for the controller.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Frames that passed checksum verification.
    pub const FRAMES_RECEIVED: Metric = Metric::counter("raingauge.frames.received")
        .with_description("API frames received with a valid checksum")
        .with_unit(Unit::Count);

    /// Bytes discarded while looking for a frame delimiter.
    pub const FRAMES_MALFORMED: Metric = Metric::counter("raingauge.frames.malformed")
        .with_description("Bytes discarded while resynchronising on the frame delimiter")
        .with_unit(Unit::Count);

    /// Frames dropped for a bad checksum.
    pub const FRAMES_BAD_CHECKSUM: Metric = Metric::counter("raingauge.frames.bad_checksum")
        .with_description("API frames dropped because the checksum did not verify")
        .with_unit(Unit::Count);

    /// Remote AT command frames written to the modem.
    pub const FRAMES_SENT: Metric = Metric::counter("raingauge.frames.sent")
        .with_description("Remote AT command frames written to the modem")
        .with_unit(Unit::Count);

    /// Rain gauge tips detected.
    pub const TIPS: Metric = Metric::counter("raingauge.tips")
        .with_description("Rain gauge bucket tips detected")
        .with_unit(Unit::Count);

    /// Most recent supply voltage of the remote radio, in millivolts.
    pub const SUPPLY_VOLTAGE: Metric = Metric::gauge("raingauge.supply_voltage_mv")
        .with_description("Remote radio supply voltage in millivolts");

    /// Returns a slice of all defined metrics.
    pub const ALL: &[&Metric] = &[
        &FRAMES_RECEIVED,
        &FRAMES_MALFORMED,
        &FRAMES_BAD_CHECKSUM,
        &FRAMES_SENT,
        &TIPS,
        &SUPPLY_VOLTAGE,
    ];
}

/// Labels identifying which sensor and link a metric belongs to.
#[derive(Debug, Clone, Default)]
pub struct SensorLabels {
    /// 64-bit address of the remote radio, as hex.
    pub sensor: String,
    /// Local transport the modem is attached to.
    pub port: String,
}

impl SensorLabels {
    /// Creates labels for a sensor reached through the given port.
    pub fn new(sensor: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            sensor: sensor.into(),
            port: port.into(),
        }
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![("sensor", self.sensor.clone()), ("port", self.port.clone())]
    }
}

/// Describes all metrics used by the controller.
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

/// Installs a Prometheus recorder with an HTTP scrape endpoint.
#[cfg(feature = "prometheus")]
pub fn install_prometheus(
    addr: std::net::SocketAddr,
) -> Result<(), metrics_exporter_prometheus::BuildError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sensor_labels() {
        let labels = SensorLabels::new("0013A20040A096A1", "/dev/ttyUSB0");
        let label_vec = labels.to_labels();

        assert_eq!(label_vec.len(), 2);
        assert!(label_vec.contains(&("sensor", "0013A20040A096A1".to_string())));
        assert!(label_vec.contains(&("port", "/dev/ttyUSB0".to_string())));
    }

    #[test]
    fn test_metric_names_unique_and_prefixed() {
        let mut seen = HashSet::new();
        for metric in metric_defs::ALL {
            assert!(metric.name.starts_with("raingauge."), "{}", metric.name);
            assert!(!metric.description.is_empty(), "{} has no description", metric.name);
            assert!(seen.insert(metric.name), "duplicate metric {}", metric.name);
        }
    }

    #[test]
    fn test_metric_kinds() {
        assert_eq!(metric_defs::TIPS.kind, MetricKind::Counter);
        assert_eq!(metric_defs::SUPPLY_VOLTAGE.kind, MetricKind::Gauge);
        assert_eq!(MetricKind::Gauge.to_string(), "gauge");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let labels = SensorLabels::default();
        describe_metrics();
        metric_defs::FRAMES_SENT.increment(&labels);
        metric_defs::SUPPLY_VOLTAGE.set(3000.0, &labels);
    }
}
