//! Radio duty cycle from the simulator's energy report.
//!
//! Each report line reads `Sky_<node> ON <time> us <int>.<frac> %`. Repeated reports for
//! the same node all count.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::stats::summarize;
use super::types::*;
use crate::error::{AnalysisError, AnalysisResult};

/// Energy report file expected next to the event tables
pub const DUTY_CYCLE_LOG: &str = "test_dc.log";

static DUTY_CYCLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Sky_(?P<node_id>\d+) ON \d+ us (?P<int_part>\d+)\.(?P<frac_part>\d+) %")
        .expect("Invalid duty cycle regex")
});

/// Parse one energy report line
pub fn parse_duty_cycle_line(line: &str) -> Option<DutyCycleRecord> {
    let caps = DUTY_CYCLE_LINE.captures(line)?;
    let node_id: NodeId = caps["node_id"].parse().ok()?;
    let int_part: u64 = caps["int_part"].parse().ok()?;
    let frac_part: u64 = caps["frac_part"].parse().ok()?;

    Some(DutyCycleRecord {
        node_id,
        duty_cycle_pct: int_part as f64 + frac_part as f64 / 100.0,
    })
}

pub fn parse_duty_cycle(text: &str) -> Vec<DutyCycleRecord> {
    text.lines().filter_map(parse_duty_cycle_line).collect()
}

pub fn compute_duty_cycle(records: Vec<DutyCycleRecord>) -> DutyCycleStat {
    let values: Vec<f64> = records.iter().map(|r| r.duty_cycle_pct).collect();
    DutyCycleStat {
        summary: summarize(&values),
        records,
    }
}

/// Read `test_dc.log` from `dir` and summarize it
pub fn duty_cycle_from_dir(dir: &Path) -> AnalysisResult<DutyCycleStat> {
    let path = dir.join(DUTY_CYCLE_LOG);
    if !path.is_file() {
        return Err(AnalysisError::InputNotFound { path });
    }
    let text = fs::read_to_string(&path)?;
    let stat = compute_duty_cycle(parse_duty_cycle(&text));
    log::debug!("Read {} duty cycle reports from {}", stat.records.len(), path.display());
    Ok(stat)
}
