//! Exporter encodings over normalized readings.
//!
//! Pure functions from `&[Reading]` to text; the collector knows
//! nothing about them. A reading field that is absent produces no
//! sample in either encoding -- an exporter must never invent zeros.

use chrono::{DateTime, Utc};

use relayctl_core::Reading;

// ── Prometheus text exposition ───────────────────────────────────────

struct Metric {
    name: &'static str,
    help: &'static str,
    kind: &'static str,
    value: fn(&Reading) -> Option<f64>,
}

const METRICS: [Metric; 4] = [
    Metric {
        name: "relayctl_power_watts",
        help: "Instantaneous active power reported per component.",
        kind: "gauge",
        value: |r| r.power_w,
    },
    Metric {
        name: "relayctl_voltage_volts",
        help: "Voltage reported per component.",
        kind: "gauge",
        value: |r| r.voltage_v,
    },
    Metric {
        name: "relayctl_current_amperes",
        help: "Current reported per component.",
        kind: "gauge",
        value: |r| r.current_a,
    },
    Metric {
        name: "relayctl_energy_watt_hours_total",
        help: "Cumulative active energy reported per component.",
        kind: "counter",
        value: |r| r.energy_wh,
    },
];

/// Encode readings in the Prometheus text exposition format.
///
/// Metrics with no samples are omitted entirely, HELP/TYPE headers
/// included.
pub fn prometheus_lines(readings: &[Reading]) -> String {
    let mut out = String::new();
    for metric in &METRICS {
        let mut wrote_header = false;
        for reading in readings {
            let Some(value) = (metric.value)(reading) else {
                continue;
            };
            if !wrote_header {
                out.push_str(&format!("# HELP {} {}\n", metric.name, metric.help));
                out.push_str(&format!("# TYPE {} {}\n", metric.name, metric.kind));
                wrote_header = true;
            }
            out.push_str(&format!(
                "{}{{device=\"{}\",component=\"{}\",id=\"{}\"}} {value}\n",
                metric.name,
                escape_label(&reading.device),
                reading.component,
                reading.id,
            ));
        }
    }
    out
}

/// Escape a Prometheus label value: backslash, double quote, newline.
fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

// ── InfluxDB line protocol ───────────────────────────────────────────

/// Encode readings in the InfluxDB line protocol, one point per
/// reading, all stamped with the pass timestamp.
pub fn influx_lines(readings: &[Reading], timestamp: DateTime<Utc>) -> String {
    let ns = timestamp.timestamp_nanos_opt().unwrap_or_default();
    let mut out = String::new();
    for reading in readings {
        let fields: Vec<String> = [
            ("power_w", reading.power_w),
            ("voltage_v", reading.voltage_v),
            ("current_a", reading.current_a),
            ("energy_wh", reading.energy_wh),
        ]
        .iter()
        .filter_map(|(name, value)| value.map(|v| format!("{name}={v}")))
        .collect();

        if fields.is_empty() {
            continue;
        }

        out.push_str(&format!(
            "relayctl,device={},component={},id={} {} {ns}\n",
            escape_tag(&reading.device),
            reading.component,
            reading.id,
            fields.join(","),
        ));
    }
    out
}

/// Escape an Influx tag value: comma, space, equals.
fn escape_tag(value: &str) -> String {
    value
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use relayctl_core::ComponentType;

    fn full_reading() -> Reading {
        Reading {
            power_w: Some(12.5),
            voltage_v: Some(230.0),
            current_a: None,
            energy_wh: Some(340.0),
            ..Reading::new("plug-a", ComponentType::Switch, 100)
        }
    }

    #[test]
    fn prometheus_emits_only_present_fields() {
        let out = prometheus_lines(&[full_reading()]);

        assert!(out.contains(
            "relayctl_power_watts{device=\"plug-a\",component=\"switch\",id=\"100\"} 12.5\n"
        ));
        assert!(out.contains("# TYPE relayctl_power_watts gauge\n"));
        assert!(out.contains("relayctl_voltage_volts{device=\"plug-a\",component=\"switch\",id=\"100\"} 230\n"));
        assert!(out.contains("# TYPE relayctl_energy_watt_hours_total counter\n"));
        // Current was absent: no sample, no header.
        assert!(!out.contains("relayctl_current_amperes"));
    }

    #[test]
    fn prometheus_empty_input_is_empty_output() {
        assert_eq!(prometheus_lines(&[]), "");
    }

    #[test]
    fn prometheus_escapes_label_values() {
        let mut reading = full_reading();
        reading.device = "plug \"a\"".into();
        let out = prometheus_lines(&[reading]);
        assert!(out.contains("device=\"plug \\\"a\\\"\""));
    }

    #[test]
    fn influx_points_carry_pass_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let out = influx_lines(&[full_reading()], ts);

        assert_eq!(
            out,
            format!(
                "relayctl,device=plug-a,component=switch,id=100 \
                 power_w=12.5,voltage_v=230,energy_wh=340 {}\n",
                ts.timestamp_nanos_opt().unwrap()
            )
        );
    }

    #[test]
    fn influx_escapes_tag_values() {
        let mut reading = full_reading();
        reading.device = "living room, east".into();
        let out = influx_lines(&[reading], Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(out.starts_with("relayctl,device=living\\ room\\,\\ east,"));
    }

    #[test]
    fn influx_skips_reading_with_no_fields() {
        let empty = Reading::new("quiet", ComponentType::Input, 0);
        let out = influx_lines(&[empty], Utc::now());
        assert_eq!(out, "");
    }
}
