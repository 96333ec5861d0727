//! Extracted events and their on-disk tables (`sent.csv`, `recv.csv`).

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::*;
use crate::error::{AnalysisError, AnalysisResult};

pub const SENT_TABLE: &str = "sent.csv";
pub const RECV_TABLE: &str = "recv.csv";

const SENT_COLUMNS: [&str; 4] = ["sts", "src", "dest", "seqn"];
const RECV_COLUMNS: [&str; 5] = ["rts", "src", "dest", "seqn", "hops"];

/// Send and receive events in log order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStore {
    pub sent: Vec<SendEvent>,
    pub received: Vec<ReceiveEvent>,
}

/// Keep the first event for every (src, dest, seqn) key, preserving order.
pub fn dedup_by_key<T: Keyed + Clone>(events: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(events.len());
    events
        .iter()
        .filter(|e| seen.insert(e.key()))
        .cloned()
        .collect()
}

impl EventStore {
    pub fn new(sent: Vec<SendEvent>, received: Vec<ReceiveEvent>) -> Self {
        Self { sent, received }
    }

    /// Write `sent.csv` and `recv.csv` into `dir`
    pub fn write_tables(&self, dir: &Path) -> AnalysisResult<()> {
        write_table(&dir.join(SENT_TABLE), &self.sent, &SENT_COLUMNS)?;
        write_table(&dir.join(RECV_TABLE), &self.received, &RECV_COLUMNS)?;
        log::info!(
            "Wrote {} sent and {} received rows to {}",
            self.sent.len(),
            self.received.len(),
            dir.display()
        );
        Ok(())
    }

    /// Load the tables written by [`EventStore::write_tables`]
    pub fn read_tables(dir: &Path) -> AnalysisResult<Self> {
        if !dir.is_dir() {
            return Err(AnalysisError::InputNotFound {
                path: dir.to_path_buf(),
            });
        }
        Ok(Self {
            sent: read_table(&dir.join(SENT_TABLE))?,
            received: read_table(&dir.join(RECV_TABLE))?,
        })
    }
}

fn write_table<T: Serialize>(path: &Path, rows: &[T], columns: &[&str]) -> AnalysisResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        // serialize() only emits the header alongside the first row
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path) -> AnalysisResult<Vec<T>> {
    if !path.is_file() {
        return Err(AnalysisError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}
