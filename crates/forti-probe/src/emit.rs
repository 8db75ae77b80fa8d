//! Sample emission: metric family descriptors and the immutable samples
//! built from them.
//!
//! Families are declared as `static` [`MetricIdentity`] tables and passed
//! explicitly to the [`Emitter`]. Label values are stored in the family's
//! declared label order; numeric label values always go through
//! [`label_number`] so the same label renders identically everywhere.

use std::fmt;

use crate::error::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Name, help text, ordered label names and kind of one metric family.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricIdentity {
    pub name: &'static str,
    pub help: &'static str,
    pub label_names: &'static [&'static str],
    pub kind: MetricKind,
}

impl MetricIdentity {
    pub const fn gauge(
        name: &'static str,
        help: &'static str,
        label_names: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            label_names,
            kind: MetricKind::Gauge,
        }
    }

    pub const fn counter(
        name: &'static str,
        help: &'static str,
        label_names: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            label_names,
            kind: MetricKind::Counter,
        }
    }
}

/// One labeled value of a metric family. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    family: &'static MetricIdentity,
    label_values: Vec<String>,
    value: f64,
}

impl MetricSample {
    /// Build a sample; `labels` must match the family's label names one to one.
    pub fn new(family: &'static MetricIdentity, value: f64, labels: &[&str]) -> ProbeResult<Self> {
        if labels.len() != family.label_names.len() {
            return Err(ProbeError::LabelArity {
                family: family.name,
                expected: family.label_names.len(),
                got: labels.len(),
            });
        }
        Ok(Self {
            family,
            label_values: labels.iter().map(|l| (*l).to_string()).collect(),
            value,
        })
    }

    pub fn family(&self) -> &'static MetricIdentity {
        self.family
    }

    pub fn name(&self) -> &'static str {
        self.family.name
    }

    pub fn kind(&self) -> MetricKind {
        self.family.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// `(label name, label value)` pairs in declared order.
    pub fn labels(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.family
            .label_names
            .iter()
            .copied()
            .zip(self.label_values.iter().map(String::as_str))
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// Renders the sample as one exposition line: `name{a="x"} value`.
impl fmt::Display for MetricSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family.name)?;
        if !self.label_values.is_empty() {
            f.write_str("{")?;
            for (i, (name, value)) in self.labels().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{name}=\"{}\"", escape_label_value(value))?;
            }
            f.write_str("}")?;
        }
        write!(f, " {}", format_value(self.value))
    }
}

/// Collects the samples of one probe invocation.
#[derive(Debug, Default)]
pub struct Emitter {
    samples: Vec<MetricSample>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(
        &mut self,
        family: &'static MetricIdentity,
        value: f64,
        labels: &[&str],
    ) -> ProbeResult<()> {
        self.samples.push(MetricSample::new(family, value, labels)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn finish(self) -> Vec<MetricSample> {
        self.samples
    }
}

/// Stringify a number used as a label value: fixed-point, zero decimals.
pub fn label_number(value: f64) -> String {
    format!("{value:.0}")
}

pub fn label_bool(flag: bool) -> String {
    flag.to_string()
}

/// Format a sample value the way the exposition format expects.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

pub fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
