//! Hardware sensors: temperature, fan and voltage readings, plus alarm state
//! and configured thresholds on firmware that reports them.

use forti_core::TargetMetadata;
use serde::Deserialize;

use crate::categorical::bool_value;
use crate::emit::{Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

static TEMPERATURE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_sensor_temperature_celsius",
    "Sensor temperature in degree celsius",
    &["name"],
);
static FAN: MetricIdentity = MetricIdentity::gauge(
    "fortigate_sensor_fan_rpm",
    "Sensor fan rotation speed in RPM",
    &["name"],
);
static VOLTAGE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_sensor_voltage_volts",
    "Sensor voltage in volts",
    &["name"],
);
static ALARM: MetricIdentity =
    MetricIdentity::gauge("fortigate_sensor_alarm_status", "Sensor alarm status", &["name"]);
static THRESHOLDS: MetricIdentity = MetricIdentity::gauge(
    "fortigate_sensor_thresholds",
    "Sensor thresholds",
    &["name", "threshold"],
);

/// Threshold fields in emission order, with their `threshold` label value.
static THRESHOLD_FIELDS: &[(&str, fn(&Thresholds) -> f64)] = &[
    ("LowerNonRec", |t| t.lower_non_recoverable),
    ("LowerCrit", |t| t.lower_critical),
    ("LowerNonCrit", |t| t.lower_non_critical),
    ("UpperNonCrit", |t| t.upper_non_critical),
    ("UpperCrit", |t| t.upper_critical),
    ("UpperNonRec", |t| t.upper_non_recoverable),
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SensorInfo {
    results: Vec<Sensor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Sensor {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    value: f64,
    alarm: bool,
    thresholds: Thresholds,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thresholds {
    lower_non_recoverable: f64,
    lower_critical: f64,
    lower_non_critical: f64,
    upper_non_critical: f64,
    upper_critical: f64,
    upper_non_recoverable: f64,
}

/// Family for a sensor `type`. Anything else is reported without a reading.
fn reading_family(kind: &str) -> Option<&'static MetricIdentity> {
    match kind {
        "temperature" => Some(&TEMPERATURE),
        "fan" => Some(&FAN),
        "voltage" => Some(&VOLTAGE),
        _ => None,
    }
}

pub(super) fn probe(fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::SensorInfo, meta) else {
        return Ok(Vec::new());
    };
    let with_thresholds = resolve(Capability::SensorThresholds, meta).is_supported();
    let info: SensorInfo = fetch::get(fetcher, endpoint.path, endpoint.query)?;

    let mut out = Emitter::new();
    for sensor in &info.results {
        let name = sensor.name.as_str();
        if with_thresholds {
            out.emit(&ALARM, bool_value(sensor.alarm), &[name])?;
            for &(threshold, field) in THRESHOLD_FIELDS {
                let value = field(&sensor.thresholds);
                if value != 0.0 {
                    out.emit(&THRESHOLDS, value, &[name, threshold])?;
                }
            }
        }
        if let Some(family) = reading_family(&sensor.kind) {
            out.emit(family, sensor.value, &[name])?;
        }
    }
    Ok(out.finish())
}
