//! Report generation for delivery analysis.
//!
//! Text output goes to stdout; JSON and CSV files are written for downstream plotting.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use super::types::*;

pub const TIMELINE_CSV: &str = "pdr_timeline.csv";
pub const TIMELINE_JSON: &str = "pdr_timeline.json";

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "undefined".to_string(),
    }
}

fn fixed(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

/// Advisory block printed after a log has been parsed
pub fn render_warnings(warnings: &[ExtractionWarning]) -> String {
    let mut lines: Vec<String> = Vec::new();

    let resets: Vec<String> = warnings
        .iter()
        .filter_map(|w| match w {
            ExtractionWarning::NodeReset { node, resets } => Some(format!("{}: {}", node, resets)),
            _ => None,
        })
        .collect();
    if !resets.is_empty() {
        lines.push("----- WARNING -----".to_string());
        lines.push("Nodes reset during the simulation".to_string());
        lines.push(format!("{{{}}}", resets.join(", ")));
        lines.push(String::new());
    }

    let silent: Vec<NodeId> = warnings
        .iter()
        .filter_map(|w| match w {
            ExtractionWarning::NoDataSent { node } => Some(*node),
            _ => None,
        })
        .collect();
    if !silent.is_empty() {
        lines.push("----- Data Collection WARNING -----".to_string());
        for node in silent {
            lines.push(format!("Warning: node {} did not send any data.", node));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Human-readable PDR, latency and duty cycle sections
pub fn render_report(report: &AnalysisReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("***** PDR *****".to_string());
    for node in &report.nodes {
        lines.push(format!(
            "Node: {} PDR: {} SENT: {} LOST: {}",
            node.node,
            pct(node.pdr_pct),
            node.sent_count,
            node.lost_count
        ));
    }
    let net = &report.network;
    lines.push(format!(
        "Overall PDR: {} ({} LOST / {} SENT)",
        pct(net.overall_pdr_pct),
        net.overall_lost,
        net.overall_sent
    ));

    if !report.testbed {
        lines.push(String::new());
        lines.push("***** Latency *****".to_string());
        match net.latency_ms {
            Some(l) => lines.push(format!(
                "Average: {:.2} ms Stdev: {} ms Min: {:.2} ms Max: {:.2} ms",
                l.mean,
                fixed(l.stdev),
                l.min,
                l.max
            )),
            None => lines.push("No packet was received, latency undefined".to_string()),
        }
    }

    if let Some(ref dc) = report.duty_cycle {
        lines.push(String::new());
        lines.push("***** Duty Cycle *****".to_string());
        for record in &dc.records {
            lines.push(format!(
                "Node: {} Duty cycle: {:.2}%",
                record.node_id, record.duty_cycle_pct
            ));
        }
        match dc.summary {
            Some(s) => lines.push(format!(
                "Overall Duty Cycle: {:.2}% Stdev: {}% Min: {:.2}% Max: {:.2}%",
                s.mean,
                fixed(s.stdev),
                s.min,
                s.max
            )),
            None => lines.push("No duty cycle reports found".to_string()),
        }
    }

    lines.join("\n")
}

/// One line per time series point
pub fn render_timeline(samples: &[PdrSample]) -> String {
    samples
        .iter()
        .map(|s| format!("Minute {}: PDR={:.2}%, Lost={}, Sent={}", s.minutes, s.pdr, s.lost, s.sent))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate JSON report
pub fn generate_json_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Write the PDR series as CSV and JSON into `dir`
pub fn write_timeline(samples: &[PdrSample], dir: &Path) -> Result<()> {
    let csv_path = dir.join(TIMELINE_CSV);
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;
    if samples.is_empty() {
        writer.write_record(["minutes", "pdr", "lost", "sent"])?;
    }
    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;

    let json_path = dir.join(TIMELINE_JSON);
    let json = serde_json::to_string_pretty(samples).context("Failed to serialize PDR timeline")?;
    fs::write(&json_path, json)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    log::info!("PDR timeline written to {} and {}", csv_path.display(), json_path.display());
    Ok(())
}
