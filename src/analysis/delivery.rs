//! Packet delivery ratio and latency over reconciled packets.

use std::collections::BTreeMap;

use super::dialect::Dialect;
use super::stats::{percentage, summarize};
use super::types::*;

/// Per-source and network-wide delivery statistics.
///
/// Nodes come out sorted by id. Latency is left out for testbed captures, whose
/// timestamps come from unsynchronized device clocks.
pub fn compute_delivery(joined: &[JoinedRecord], dialect: Dialect) -> (Vec<NodeStat>, NetworkStat) {
    let mut by_src: BTreeMap<NodeId, Vec<&JoinedRecord>> = BTreeMap::new();
    for record in joined {
        by_src.entry(record.src).or_default().push(record);
    }

    let nodes = by_src
        .into_iter()
        .map(|(node, records)| node_stat(node, &records))
        .collect();

    let received = joined.iter().filter(|r| r.is_received()).count();
    let latency_ms = if dialect.is_testbed() {
        None
    } else {
        summarize(&latencies_ms(joined))
    };

    let network = NetworkStat {
        overall_pdr_pct: percentage(received, joined.len()),
        overall_lost: joined.len() - received,
        overall_sent: joined.len(),
        latency_ms,
    };

    (nodes, network)
}

fn node_stat(node: NodeId, records: &[&JoinedRecord]) -> NodeStat {
    let sent_count = records.len();
    let received = records.iter().filter(|r| r.is_received()).count();
    NodeStat {
        node,
        pdr_pct: percentage(received, sent_count),
        sent_count,
        lost_count: sent_count - received,
    }
}

/// Latency of every received packet, in milliseconds
pub fn latencies_ms(joined: &[JoinedRecord]) -> Vec<f64> {
    joined.iter().filter_map(JoinedRecord::latency_ms).collect()
}
