//! Managed FortiSwitch health: summary ratings, temperature sensors and CPU
//! usage per switch.

use std::collections::BTreeMap;

use forti_core::TargetMetadata;
use serde::Deserialize;

use crate::categorical::RATING;
use crate::emit::{label_number, Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

const SUMMARY_LABELS: &[&str] = &["value", "rating", "fortiswitch", "vdom"];
const CPU_LABELS: &[&str] = &["unit", "fortiswitch", "vdom"];

static SUMMARY_CPU: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_summary_cpu",
    "Boolean indicator if CPU health is good",
    SUMMARY_LABELS,
);
static SUMMARY_MEMORY: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_summary_memory",
    "Boolean indicator if Memory health is good",
    SUMMARY_LABELS,
);
static SUMMARY_UPTIME: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_summary_uptime",
    "Boolean indicator if Uptime is good",
    SUMMARY_LABELS,
);
static SUMMARY_TEMPERATURE: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_summary_temperature",
    "Boolean indicator if Temperature health is good",
    SUMMARY_LABELS,
);
static TEMPERATURE: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_temperature",
    "Temperature per switch sensor",
    &["unit", "module", "fortiswitch", "vdom"],
);
static CPU_USER: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_performance_stats_cpu_user",
    "Fortiswitch CPU user usage",
    CPU_LABELS,
);
static CPU_NICE: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_performance_stats_cpu_nice",
    "Fortiswitch CPU nice usage",
    CPU_LABELS,
);
static CPU_SYSTEM: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_performance_stats_cpu_system",
    "Fortiswitch CPU system usage",
    CPU_LABELS,
);
static CPU_IDLE: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_health_performance_stats_cpu_idle",
    "Fortiswitch CPU idle",
    CPU_LABELS,
);

/// Health response: switch serial → health record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HealthResponse {
    results: BTreeMap<String, SwitchHealth>,
    vdom: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SwitchHealth {
    #[serde(rename = "performance-status")]
    performance: PerformanceStatus,
    temperature: Vec<TemperatureSensor>,
    summary: Summary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Summary {
    cpu: Rating,
    memory: Rating,
    uptime: Rating,
    temperature: Rating,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Rating {
    value: f64,
    rating: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Reading {
    value: f64,
    unit: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PerformanceStatus {
    cpu: CpuReadings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CpuReadings {
    user: Reading,
    system: Reading,
    nice: Reading,
    idle: Reading,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TemperatureSensor {
    module: String,
    status: Reading,
}

pub(super) fn probe(fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::SwitchHealth, meta) else {
        return Ok(Vec::new());
    };
    let response: HealthResponse = fetch::get(fetcher, endpoint.path, endpoint.query)?;
    let vdom = response.vdom.as_str();

    let mut out = Emitter::new();
    for (serial, health) in &response.results {
        let summary = &health.summary;
        for (family, rating) in [
            (&SUMMARY_CPU, &summary.cpu),
            (&SUMMARY_MEMORY, &summary.memory),
            (&SUMMARY_UPTIME, &summary.uptime),
            (&SUMMARY_TEMPERATURE, &summary.temperature),
        ] {
            out.emit(
                family,
                RATING.map(&rating.rating),
                &[&label_number(rating.value), &rating.rating, serial, vdom],
            )?;
        }

        for sensor in &health.temperature {
            out.emit(
                &TEMPERATURE,
                sensor.status.value,
                &[&sensor.status.unit, &sensor.module, serial, vdom],
            )?;
        }

        let cpu = &health.performance.cpu;
        // The API reports one unit for all CPU readings; take it from `system`.
        let unit = cpu.system.unit.as_str();
        for (family, reading) in [
            (&CPU_USER, &cpu.user),
            (&CPU_NICE, &cpu.nice),
            (&CPU_SYSTEM, &cpu.system),
            (&CPU_IDLE, &cpu.idle),
        ] {
            out.emit(family, reading.value, &[unit, serial, vdom])?;
        }
    }
    Ok(out.finish())
}
