//! CPU and memory utilisation per VDOM.
//!
//! Each VDOM reports a list of CPU/memory records. Record `n` is labelled
//! `cpu_n` and `mem_n`; its cores are labelled `cpu_n_core_m`.

use forti_core::TargetMetadata;
use serde::Deserialize;

use crate::emit::{Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

const LABELS: &[&str] = &["label", "vdom"];

static CORES_USER: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_cores_user",
    "Percentage of CPU utilization that occurred at the user level.",
    LABELS,
);
static CORES_SYSTEM: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_cores_system",
    "Percentage of CPU utilization that occurred while executing at the system level.",
    LABELS,
);
static CORES_NICE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_cores_nice",
    "Percentage of CPU utilization that occurred while executing at the user level with nice priority.",
    LABELS,
);
static CORES_IDLE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_cores_idle",
    "Percentage of time that the CPU was idle and the system did not have an outstanding disk I/O request.",
    LABELS,
);
static CORES_IOWAIT: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_cores_iowait",
    "Percentage of time that the CPU was idle during which the system had an outstanding disk I/O request.",
    LABELS,
);
static CPU_USER: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_user",
    "Percentage of CPU utilization that occurred at the user level.",
    LABELS,
);
static CPU_SYSTEM: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_system",
    "Percentage of CPU utilization that occurred while executing at the system level.",
    LABELS,
);
static CPU_NICE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_nice",
    "Percentage of CPU utilization that occurred while executing at the user level with nice priority.",
    LABELS,
);
static CPU_IDLE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_idle",
    "Percentage of time that the CPU or CPUs were idle and the system did not have an outstanding disk I/O request.",
    LABELS,
);
static CPU_IOWAIT: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_cpu_iowait",
    "Percentage of time that the CPU or CPUs were idle during which the system had an outstanding disk I/O request.",
    LABELS,
);
static MEM_TOTAL: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_mem_total",
    "All the installed memory in RAM, in bytes.",
    LABELS,
);
static MEM_USED: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_mem_used",
    "Memory are being used, in bytes.",
    LABELS,
);
static MEM_FREE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_mem_free",
    "All the memory in RAM that is not being used for anything (even caches), in bytes.",
    LABELS,
);
static MEM_FREEABLE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_performance_status_mem_freeable",
    "Freeable buffers/caches memory, in bytes.",
    LABELS,
);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VdomPerformance {
    results: Vec<Performance>,
    vdom: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Performance {
    cpu: Cpu,
    mem: Memory,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CpuTimes {
    user: f64,
    system: f64,
    nice: f64,
    idle: f64,
    iowait: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Cpu {
    cores: Vec<CpuTimes>,
    #[serde(flatten)]
    total: CpuTimes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Memory {
    total: f64,
    used: f64,
    free: f64,
    freeable: f64,
}

fn emit_times(
    out: &mut Emitter,
    families: [&'static MetricIdentity; 5],
    times: &CpuTimes,
    labels: &[&str],
) -> ProbeResult<()> {
    let [user, system, nice, idle, iowait] = families;
    out.emit(user, times.user, labels)?;
    out.emit(system, times.system, labels)?;
    out.emit(nice, times.nice, labels)?;
    out.emit(idle, times.idle, labels)?;
    out.emit(iowait, times.iowait, labels)
}

pub(super) fn probe(fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::PerformanceStatus, meta) else {
        return Ok(Vec::new());
    };
    let vdoms: Vec<VdomPerformance> = fetch::get(fetcher, endpoint.path, endpoint.query)?;

    let mut out = Emitter::new();
    for vdom in &vdoms {
        for (n, record) in vdom.results.iter().enumerate() {
            let cpu = format!("cpu_{n}");
            for (m, core) in record.cpu.cores.iter().enumerate() {
                let core_label = format!("{cpu}_core_{m}");
                emit_times(
                    &mut out,
                    [&CORES_USER, &CORES_SYSTEM, &CORES_NICE, &CORES_IDLE, &CORES_IOWAIT],
                    core,
                    &[&core_label, &vdom.vdom],
                )?;
            }
            emit_times(
                &mut out,
                [&CPU_USER, &CPU_SYSTEM, &CPU_NICE, &CPU_IDLE, &CPU_IOWAIT],
                &record.cpu.total,
                &[&cpu, &vdom.vdom],
            )?;

            let mem = format!("mem_{n}");
            let labels = [mem.as_str(), &vdom.vdom];
            out.emit(&MEM_TOTAL, record.mem.total, &labels)?;
            out.emit(&MEM_USED, record.mem.used, &labels)?;
            out.emit(&MEM_FREE, record.mem.free, &labels)?;
            out.emit(&MEM_FREEABLE, record.mem.freeable, &labels)?;
        }
    }
    Ok(out.finish())
}
