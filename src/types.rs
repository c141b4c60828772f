use ::time::{format_description::well_known, OffsetDateTime};
use serde::{Deserialize, Serialize};

/// Outcome of probing one port.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub port: u16,
    pub open: bool,
}

impl ProbeResult {
    pub fn state(&self) -> &'static str {
        if self.open {
            "open"
        } else {
            "closed"
        }
    }
}

impl std::fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.port, self.state())
    }
}

/// Summary of the last completed scan, as emitted by `--json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub host: String,
    pub address: String,
    pub start_port: u16,
    pub end_port: u16,
    pub scanned: u64,
    pub open_ports: Vec<u16>,
    pub elapsed_ms: u64,
    pub started_at: String,
}

/// RFC 3339 UTC timestamp.
pub fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_formats_as_rfc3339() {
        assert_eq!(rfc3339(OffsetDateTime::UNIX_EPOCH), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn result_displays_port_and_state() {
        assert_eq!(ProbeResult { port: 8001, open: true }.to_string(), "8001: open");
        assert_eq!(ProbeResult { port: 8000, open: false }.state(), "closed");
    }

    #[test]
    fn report_serializes_open_ports_in_order() {
        let report = ScanReport {
            host: "localhost".into(),
            address: "127.0.0.1".into(),
            start_port: 8000,
            end_port: 8002,
            scanned: 3,
            open_ports: vec![8001],
            elapsed_ms: 12,
            started_at: "1970-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["open_ports"], serde_json::json!([8001]));
        assert_eq!(json["scanned"], 3);
    }
}
