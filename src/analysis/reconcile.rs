//! Matching of sent packets against received packets.

use std::collections::HashMap;

use super::store::{dedup_by_key, EventStore};
use super::types::*;

/// Left-join sent events to received events on (src, dest, seqn).
///
/// Both lists are deduplicated first. The highest sent sequence number may belong to a
/// round still in flight when the capture stopped, so events above `max - 1` are dropped
/// from both sides. Self-addressed sends are dropped as well. Every remaining send yields
/// exactly one record, in log order.
pub fn reconcile(sent: &[SendEvent], received: &[ReceiveEvent]) -> Vec<JoinedRecord> {
    let sent = dedup_by_key(sent);
    let received = dedup_by_key(received);

    let Some(last_valid_seqn) = sent.iter().map(|e| e.seqn).max().and_then(|m| m.checked_sub(1)) else {
        log::debug!("No sent packet below the last sequence number, nothing to reconcile");
        return Vec::new();
    };

    let arrivals: HashMap<PacketKey, &ReceiveEvent> = received
        .iter()
        .filter(|e| e.seqn <= last_valid_seqn)
        .map(|e| (e.key(), e))
        .collect();

    let joined: Vec<JoinedRecord> = sent
        .iter()
        .filter(|e| e.seqn <= last_valid_seqn && e.src != e.dest)
        .map(|e| {
            let arrival = arrivals.get(&e.key());
            JoinedRecord {
                src: e.src,
                dest: e.dest,
                seqn: e.seqn,
                sent_ts: e.timestamp_us,
                recv_ts: arrival.map(|r| r.timestamp_us),
                hops: arrival.map(|r| r.hops),
            }
        })
        .collect();

    log::debug!(
        "Reconciled {} sent packets (last valid seqn {}), {} received",
        joined.len(),
        last_valid_seqn,
        joined.iter().filter(|r| r.is_received()).count()
    );

    joined
}

/// [`reconcile`] over a whole store
pub fn reconcile_store(store: &EventStore) -> Vec<JoinedRecord> {
    reconcile(&store.sent, &store.received)
}
