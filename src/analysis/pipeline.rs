//! End-to-end runs: log or tables in, [`AnalysisReport`] out.

use std::path::Path;

use super::delivery::compute_delivery;
use super::dialect::Dialect;
use super::duty_cycle::duty_cycle_from_dir;
use super::log_parser::parse_log;
use super::reconcile::reconcile_store;
use super::store::EventStore;
use super::types::*;
use crate::error::{AnalysisError, AnalysisResult};

/// Reconcile a store and compute delivery statistics
pub fn analyze_store(store: &EventStore, dialect: Dialect) -> AnalysisReport {
    let joined = reconcile_store(store);
    let (nodes, network) = compute_delivery(&joined, dialect);
    AnalysisReport {
        testbed: dialect.is_testbed(),
        nodes,
        network,
        duty_cycle: None,
    }
}

/// Extract, reconcile and compute over raw log text
pub fn analyze_log_text(text: &str, dialect: Dialect) -> AnalysisResult<AnalysisReport> {
    let parsed = parse_log(text, dialect)?;
    Ok(analyze_store(&parsed.events, dialect))
}

/// Analyze a directory holding `sent.csv` and `recv.csv`.
///
/// Simulation runs also pick up `test_dc.log`; a missing energy report only warns.
pub fn analyze_dir(dir: &Path, dialect: Dialect) -> AnalysisResult<AnalysisReport> {
    let store = EventStore::read_tables(dir)?;
    let mut report = analyze_store(&store, dialect);

    if !dialect.is_testbed() {
        match duty_cycle_from_dir(dir) {
            Ok(stat) => report.duty_cycle = Some(stat),
            Err(AnalysisError::InputNotFound { path }) => {
                log::warn!("No duty cycle report at {}, skipping", path.display());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}
