//! Event extraction from node console logs.
//!
//! Extraction runs in two phases over the same text. Phase one collects every identity
//! announcement into a [`NodeMap`]; phase two resolves the addresses printed by send and
//! receive lines against that finished map. An identity line may therefore appear after
//! the first event that refers to it.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use regex::Captures;

use super::dialect::{timestamp_to_micros, Dialect};
use super::store::EventStore;
use super::types::*;
use crate::error::{AnalysisError, AnalysisResult};

/// Address to node identity table built by phase one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMap {
    nodes: BTreeMap<Address, NodeIdentity>,
}

impl NodeMap {
    /// Record one identity announcement. A repeated address bumps its boot count and
    /// takes the most recently announced logical id.
    fn announce(&mut self, address: Address, logical_id: NodeId) -> &NodeIdentity {
        let entry = self.nodes.entry(address).or_insert(NodeIdentity {
            address,
            logical_id,
            boot_count: 0,
        });
        entry.logical_id = logical_id;
        entry.boot_count += 1;
        entry
    }

    pub fn resolve(&self, address: Address) -> Option<NodeId> {
        self.nodes.get(&address).map(|n| n.logical_id)
    }

    pub fn get(&self, address: Address) -> Option<&NodeIdentity> {
        self.nodes.get(&address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeIdentity> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Output of both extraction phases
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub nodes: NodeMap,
    pub events: EventStore,
}

impl ParsedLog {
    /// Resets first (one per node), then nodes that never sent.
    pub fn warnings(&self) -> Vec<ExtractionWarning> {
        let mut warnings: Vec<ExtractionWarning> = self
            .nodes
            .iter()
            .filter(|n| n.boot_count > 1)
            .map(|n| ExtractionWarning::NodeReset {
                node: n.logical_id,
                resets: n.resets(),
            })
            .collect();

        let senders: BTreeSet<NodeId> = self.events.sent.iter().map(|e| e.src).collect();
        warnings.extend(
            self.nodes
                .iter()
                .filter(|n| !senders.contains(&n.logical_id))
                .map(|n| ExtractionWarning::NoDataSent { node: n.logical_id }),
        );

        warnings
    }
}

fn capture_num<T: std::str::FromStr>(caps: &Captures, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

/// Build a 16-bit address from the two printed hex bytes
fn capture_address(caps: &Captures) -> Option<Address> {
    let hi = u8::from_str_radix(caps.name("addr_hi")?.as_str(), 16).ok()?;
    let lo = u8::from_str_radix(caps.name("addr_lo")?.as_str(), 16).ok()?;
    Some(u16::from_be_bytes([hi, lo]))
}

/// Phase one: every identity announcement in the log
pub fn scan_identities(text: &str, dialect: Dialect) -> NodeMap {
    let grammar = dialect.grammar();
    let mut nodes = NodeMap::default();

    for line in text.lines() {
        let Some(caps) = grammar.identity.captures(line.trim_end()) else {
            continue;
        };
        let (Some(node_id), Some(address)) = (capture_num::<NodeId>(&caps, "self_id"), capture_address(&caps))
        else {
            continue;
        };

        let identity = nodes.announce(address, node_id);
        if identity.boot_count > 1 {
            log::debug!(
                "Node {} announced {:04x} again (boot {})",
                node_id,
                address,
                identity.boot_count
            );
        }
    }

    nodes
}

/// Phase two: send and receive events, addresses resolved through `nodes`
pub fn extract_events(text: &str, dialect: Dialect, nodes: &NodeMap) -> AnalysisResult<EventStore> {
    let grammar = dialect.grammar();
    let mut store = EventStore::default();
    let mut skipped = 0usize;

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end();
        let line_no = index + 1;

        let resolve = |address: Address| {
            nodes
                .resolve(address)
                .ok_or(AnalysisError::UnresolvedAddress { address, line: line_no })
        };

        if let Some(caps) = grammar.receive.captures(line) {
            let fields = (
                timestamp_to_micros(&caps["time"]),
                capture_num::<NodeId>(&caps, "self_id"),
                capture_address(&caps),
                capture_num::<u32>(&caps, "seqn"),
                capture_num::<u32>(&caps, "hops"),
            );
            let (Some(timestamp_us), Some(dest), Some(address), Some(seqn), Some(hops)) = fields else {
                skipped += 1;
                continue;
            };

            store.received.push(ReceiveEvent {
                timestamp_us,
                src: resolve(address)?,
                dest,
                seqn,
                hops,
            });
            continue;
        }

        if let Some(caps) = grammar.send.captures(line) {
            let fields = (
                timestamp_to_micros(&caps["time"]),
                capture_num::<NodeId>(&caps, "self_id"),
                capture_address(&caps),
                capture_num::<u32>(&caps, "seqn"),
            );
            let (Some(timestamp_us), Some(src), Some(address), Some(seqn)) = fields else {
                skipped += 1;
                continue;
            };

            store.sent.push(SendEvent {
                timestamp_us,
                src,
                dest: resolve(address)?,
                seqn,
            });
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {} event lines with unreadable fields", skipped);
    }

    Ok(store)
}

/// Run both phases over a whole capture
pub fn parse_log(text: &str, dialect: Dialect) -> AnalysisResult<ParsedLog> {
    let nodes = scan_identities(text, dialect);
    let events = extract_events(text, dialect, &nodes)?;

    log::info!(
        "Parsed {} nodes, {} sent, {} received ({} log)",
        nodes.len(),
        events.sent.len(),
        events.received.len(),
        dialect
    );

    Ok(ParsedLog { nodes, events })
}

/// Read and parse a log file
pub fn parse_log_file(path: &Path, dialect: Dialect) -> AnalysisResult<ParsedLog> {
    if !path.is_file() {
        return Err(AnalysisError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    parse_log(&read_log_text(path)?, dialect)
}

/// Read a capture, replacing bytes that are not valid UTF-8.
///
/// Serial consoles emit line noise; the damaged lines then match no grammar and are skipped.
pub fn read_log_text(path: &Path) -> AnalysisResult<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Emit extraction advisories through the logger
pub fn log_warnings(warnings: &[ExtractionWarning]) {
    for warning in warnings {
        log::warn!("{}", warning);
    }
}
