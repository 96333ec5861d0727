//! PDR over growing time windows.
//!
//! For each minute mark the capture is cut down to the lines logged within that many
//! minutes of its first timestamp, and the full pipeline runs again on the cut. Marks are
//! independent; a mark that fails or yields no delivery figure is left out of the series.

use std::fs;
use std::path::Path;

use chrono::NaiveTime;

use super::dialect::Dialect;
use super::pipeline::analyze_log_text;
use super::types::PdrSample;

const CLOCK_FORMAT: &str = "%H:%M:%S%.f";

/// Parse a line's time of day under the dialect's clock grammar.
///
/// Simulation clocks may omit the hour (`M:S.f`); testbed clocks use a `,` before the
/// fraction.
pub fn parse_clock(raw: &str, dialect: Dialect) -> Option<NaiveTime> {
    match dialect {
        Dialect::Testbed => {
            if !raw.contains(',') || raw.contains('.') {
                return None;
            }
            NaiveTime::parse_from_str(&raw.replace(',', "."), CLOCK_FORMAT).ok()
        }
        Dialect::Simulation => NaiveTime::parse_from_str(raw, CLOCK_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&format!("00:{raw}"), CLOCK_FORMAT))
            .ok(),
    }
}

/// Keep the lines whose elapsed time since the first timestamped line lies in
/// `[0, max_seconds]`. Lines without a readable clock are dropped.
pub fn truncate_log(text: &str, dialect: Dialect, max_seconds: f64) -> String {
    let clock = &dialect.grammar().clock;
    let mut start: Option<NaiveTime> = None;
    let mut unreadable = 0usize;
    let mut out = String::new();

    for line in text.lines() {
        let Some(caps) = clock.captures(line) else {
            continue;
        };
        let Some(time) = parse_clock(&caps["time"], dialect) else {
            log::debug!("Time data '{}' does not match the {} clock", &caps["time"], dialect);
            unreadable += 1;
            continue;
        };

        let origin = *start.get_or_insert(time);
        let elapsed = time.signed_duration_since(origin);
        let elapsed_sec = elapsed.num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6;
        if (0.0..=max_seconds).contains(&elapsed_sec) {
            out.push_str(line);
            out.push('\n');
        }
    }

    if unreadable > 0 {
        log::warn!("Skipped {} lines with unreadable timestamps", unreadable);
    }

    out
}

/// Run the pipeline once per minute mark, sequentially.
///
/// Sample PDRs are rounded to two decimals. With `keep_dir`, each cut is also written there as `log_<M>min.log`.
pub fn run_timeline(text: &str, dialect: Dialect, marks: &[u64], keep_dir: Option<&Path>) -> Vec<PdrSample> {
    let mut samples = Vec::with_capacity(marks.len());

    for &minutes in marks {
        log::info!("Processing up to {} minutes", minutes);
        let cut = truncate_log(text, dialect, minutes as f64 * 60.0);

        if let Some(dir) = keep_dir {
            let path = dir.join(format!("log_{}min.log", minutes));
            if let Err(e) = fs::write(&path, &cut) {
                log::warn!("Failed to write {}: {}", path.display(), e);
            }
        }

        let report = match analyze_log_text(&cut, dialect) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Analysis failed for minute {}: {}", minutes, e);
                continue;
            }
        };

        match report.network.overall_pdr_pct {
            Some(pdr) => samples.push(PdrSample {
                minutes,
                pdr: (pdr * 100.0).round() / 100.0,
                lost: report.network.overall_lost,
                sent: report.network.overall_sent,
            }),
            None => log::warn!("Could not compute PDR for minute {}", minutes),
        }
    }

    samples
}
