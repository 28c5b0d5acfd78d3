//! InfluxDB line protocol encoding.
//!
//! ```text
//! measurement field1=1i,field2=2i timestamp_ns
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use build_core::MetricSnapshot;

/// Accumulates points and joins them into a single write body.
#[derive(Debug, Default)]
pub struct LineProtocolWriter {
    lines: Vec<String>,
}

impl LineProtocolWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one point with integer fields.
    ///
    /// Points without fields are skipped, the server rejects them. A missing
    /// timestamp lets the server assign its own receive time.
    pub fn write_point(
        &mut self,
        measurement: &str,
        fields: &[(&str, u64)],
        timestamp_ns: Option<i64>,
    ) {
        if fields.is_empty() {
            return;
        }

        let mut line = escape_measurement(measurement);
        line.push(' ');
        for (i, (key, value)) in fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&value.to_string());
            line.push('i');
        }
        if let Some(ts) = timestamp_ns {
            line.push(' ');
            line.push_str(&ts.to_string());
        }

        self.lines.push(line);
    }

    /// Append a snapshot under its measurement name.
    pub fn write_snapshot(&mut self, snapshot: &MetricSnapshot) {
        self.write_point(
            snapshot.measurement(),
            &snapshot.fields(),
            snapshot.taken_at.timestamp_nanos_opt(),
        );
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Take every buffered line as a newline-separated body.
    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.lines).join("\n")
    }
}

/// Encode a batch of snapshots as one write body.
pub fn encode_snapshots(snapshots: &[MetricSnapshot]) -> String {
    let mut writer = LineProtocolWriter::new();
    for snapshot in snapshots {
        writer.write_snapshot(snapshot);
    }
    writer.finish()
}

/// Commas and spaces are escaped in measurement names.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Commas, equals signs and spaces are escaped in keys.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
