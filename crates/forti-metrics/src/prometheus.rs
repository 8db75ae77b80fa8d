//! Prometheus text exposition format.
//!
//! Renders probe samples for scraping by a Prometheus server or compatible
//! agent. Families appear in the order they were first emitted; each gets
//! one `# HELP` and one `# TYPE` header.

use std::collections::HashMap;

use forti_probe::emit::escape_help;
use forti_probe::{MetricIdentity, MetricSample};

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render samples into Prometheus text format, grouped by family.
pub fn render_prometheus(samples: &[MetricSample]) -> String {
    let mut families: Vec<(&'static MetricIdentity, Vec<&MetricSample>)> = Vec::new();
    let mut index: HashMap<&'static str, usize> = HashMap::new();
    for sample in samples {
        let family = sample.family();
        let slot = *index.entry(family.name).or_insert_with(|| {
            families.push((family, Vec::new()));
            families.len() - 1
        });
        families[slot].1.push(sample);
    }

    let mut out = String::new();
    for (family, members) in families {
        out.push_str(&format!("# HELP {} {}\n", family.name, escape_help(family.help)));
        out.push_str(&format!("# TYPE {} {}\n", family.name, family.kind.as_str()));
        for sample in members {
            out.push_str(&format!("{sample}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    static STATUS: MetricIdentity = MetricIdentity::gauge(
        "fortiswitch_port_status",
        "Whether the switch port is up or not",
        &["interface"],
    );
    static RX: MetricIdentity = MetricIdentity::counter(
        "fortiswitch_port_receive_bytes_total",
        "Number of bytes received on the interface",
        &["interface"],
    );
    static MULTILINE: MetricIdentity =
        MetricIdentity::gauge("test_multiline", "first line\nsecond \\ line", &[]);

    fn sample(family: &'static MetricIdentity, value: f64, labels: &[&str]) -> MetricSample {
        MetricSample::new(family, value, labels).unwrap()
    }

    #[test]
    fn render_empty() {
        assert_eq!(render_prometheus(&[]), "");
    }

    #[test]
    fn interleaved_families_are_grouped_in_first_seen_order() {
        let samples = vec![
            sample(&STATUS, 1.0, &["port1"]),
            sample(&RX, 1500.0, &["port1"]),
            sample(&STATUS, 0.0, &["port2"]),
            sample(&RX, 0.0, &["port2"]),
        ];
        let output = render_prometheus(&samples);
        assert_eq!(
            output,
            "# HELP fortiswitch_port_status Whether the switch port is up or not\n\
             # TYPE fortiswitch_port_status gauge\n\
             fortiswitch_port_status{interface=\"port1\"} 1\n\
             fortiswitch_port_status{interface=\"port2\"} 0\n\
             # HELP fortiswitch_port_receive_bytes_total Number of bytes received on the interface\n\
             # TYPE fortiswitch_port_receive_bytes_total counter\n\
             fortiswitch_port_receive_bytes_total{interface=\"port1\"} 1500\n\
             fortiswitch_port_receive_bytes_total{interface=\"port2\"} 0\n"
        );
    }

    #[test]
    fn help_text_is_escaped() {
        let output = render_prometheus(&[sample(&MULTILINE, 1.0, &[])]);
        assert!(output.starts_with("# HELP test_multiline first line\\nsecond \\\\ line\n"));
    }

    #[test]
    fn every_family_has_one_header_pair() {
        let samples = vec![
            sample(&STATUS, 1.0, &["a"]),
            sample(&STATUS, 1.0, &["b"]),
            sample(&STATUS, 1.0, &["c"]),
        ];
        let output = render_prometheus(&samples);
        assert_eq!(output.matches("# HELP").count(), 1);
        assert_eq!(output.matches("# TYPE").count(), 1);
        for line in output.lines().filter(|l| !l.starts_with('#')) {
            assert!(line.starts_with("fortiswitch_port_status{"), "{line}");
        }
    }
}
