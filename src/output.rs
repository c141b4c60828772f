//! Terminal presentation for the CLI. The scan engine never calls into here.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use std::io::Write;

use crate::hostinfo::HostInfo;
use crate::spec::ScanSpec;
use crate::types::{ProbeResult, ScanReport};

/// Turn colors off when asked to or when the terminal can't render them.
pub fn init_colors(disabled: bool) {
    let dumb_term = std::env::var("TERM").is_ok_and(|t| t == "dumb");
    if disabled || dumb_term {
        colored::control::set_override(false);
    }
}

pub fn prompt(question: &str) -> ColoredString {
    question.blue().bold()
}

pub fn banner(info: &HostInfo) -> String {
    format!(
        "{}",
        format!(
            "OS: {} | Hostname: {} | Machine: {}",
            info.os, info.hostname, info.machine
        )
        .magenta()
        .bold()
    )
}

pub fn scanning_line(spec: &ScanSpec) -> String {
    let line = format!(
        "Scanning {} ports {}-{}...",
        spec.host, spec.start_port, spec.end_port
    );
    format!("{}", line.magenta().bold())
}

/// Verbose per-port line, e.g. `8001: open`.
pub fn port_line(result: ProbeResult) -> String {
    let state = if result.open {
        result.state().green().bold()
    } else {
        result.state().red().bold()
    };
    format!("{}: {state}", result.port)
}

/// Closing block: either the open ports one per line or an explicit "none" line.
pub fn summary(open_ports: &[u16]) -> String {
    let mut out = format!("\n{}\n", "Scan complete.".magenta().bold());
    if open_ports.is_empty() {
        out.push_str(&format!("{}\n", "No open ports found.".yellow().bold()));
        return out;
    }
    out.push_str(&format!("{}\n", "Open ports:".magenta().bold()));
    for port in open_ports {
        out.push_str(&format!("{}\n", port.to_string().magenta()));
    }
    out
}

pub fn error_line(err: &dyn std::fmt::Display) -> String {
    format!("{}", format!("Error: {err}").red().bold())
}

/// Pretty JSON for `--json`.
pub fn write_report_json<W: Write>(mut w: W, report: &ScanReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, report)?;
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_says_so() {
        let s = summary(&[]);
        assert!(s.contains("Scan complete."));
        assert!(s.contains("No open ports found."));
        assert!(!s.contains("Open ports:"));
    }

    #[test]
    fn summary_lists_ports_in_given_order() {
        let s = summary(&[22, 80, 443]);
        assert!(s.contains("Open ports:"));
        let p22 = s.find("22").unwrap();
        let p80 = s.find("80").unwrap();
        let p443 = s.find("443").unwrap();
        assert!(p22 < p80 && p80 < p443);
    }

    #[test]
    fn port_line_names_state() {
        let open = ProbeResult { port: 8001, open: true };
        assert!(port_line(open).starts_with("8001: "));
        assert!(port_line(open).contains("open"));
        assert!(port_line(ProbeResult { port: 8000, open: false }).contains("closed"));
    }

    #[test]
    fn disabled_colors_render_plain_text() {
        init_colors(true);
        assert_eq!(port_line(ProbeResult { port: 22, open: true }), "22: open");
    }

    #[test]
    fn json_report_is_parseable() {
        let report = ScanReport {
            host: "127.0.0.1".into(),
            address: "127.0.0.1".into(),
            start_port: 1,
            end_port: 2,
            scanned: 2,
            open_ports: vec![],
            elapsed_ms: 0,
            started_at: "1970-01-01T00:00:00Z".into(),
        };
        let mut buf = Vec::new();
        write_report_json(&mut buf, &report).unwrap();
        let back: ScanReport = serde_json::from_slice(&buf).unwrap();
        assert_eq!(back, report);
    }
}
