//! Core data types for packet delivery analysis.

use serde::{Deserialize, Serialize};

/// Log timestamp in microseconds
pub type SimTime = f64;

/// Logical node id as printed by the node itself (`ID:<n>` / `INFO:<facility>.<n>:`)
pub type NodeId = u32;

/// Link-layer address built from the two printed address bytes
pub type Address = u16;

/// Matching key shared by send and receive events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketKey {
    pub src: NodeId,
    pub dest: NodeId,
    pub seqn: u32,
}

/// Anything that can be deduplicated and joined on a [`PacketKey`]
pub trait Keyed {
    fn key(&self) -> PacketKey;
}

/// A node announcing its address at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub address: Address,
    pub logical_id: NodeId,
    /// Number of times the address was announced; above 1 means the node reset
    pub boot_count: u32,
}

impl NodeIdentity {
    pub fn resets(&self) -> u32 {
        self.boot_count.saturating_sub(1)
    }
}

/// Row of `sent.csv`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SendEvent {
    #[serde(rename = "sts")]
    pub timestamp_us: SimTime,
    pub src: NodeId,
    pub dest: NodeId,
    pub seqn: u32,
}

impl Keyed for SendEvent {
    fn key(&self) -> PacketKey {
        PacketKey {
            src: self.src,
            dest: self.dest,
            seqn: self.seqn,
        }
    }
}

/// Row of `recv.csv`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceiveEvent {
    #[serde(rename = "rts")]
    pub timestamp_us: SimTime,
    pub src: NodeId,
    pub dest: NodeId,
    pub seqn: u32,
    pub hops: u32,
}

impl Keyed for ReceiveEvent {
    fn key(&self) -> PacketKey {
        PacketKey {
            src: self.src,
            dest: self.dest,
            seqn: self.seqn,
        }
    }
}

/// A sent packet and, if it arrived, its reception
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub src: NodeId,
    pub dest: NodeId,
    pub seqn: u32,
    pub sent_ts: SimTime,
    pub recv_ts: Option<SimTime>,
    pub hops: Option<u32>,
}

impl JoinedRecord {
    pub fn is_received(&self) -> bool {
        self.recv_ts.is_some()
    }

    /// End-to-end latency in milliseconds, for received packets only
    pub fn latency_ms(&self) -> Option<f64> {
        self.recv_ts.map(|rts| (rts - self.sent_ts) / 1e3)
    }
}

/// One `Sky_<n> ON ... %` line of the energy log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DutyCycleRecord {
    pub node_id: NodeId,
    pub duty_cycle_pct: f64,
}

/// Mean / sample stdev / min / max of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1); undefined below two samples
    pub stdev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Delivery statistics for a single source node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStat {
    pub node: NodeId,
    /// `None` when the node has no qualifying sent records
    pub pdr_pct: Option<f64>,
    pub sent_count: usize,
    pub lost_count: usize,
}

impl NodeStat {
    pub fn received_count(&self) -> usize {
        self.sent_count - self.lost_count
    }
}

/// Network-wide delivery and latency statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkStat {
    pub overall_pdr_pct: Option<f64>,
    pub overall_lost: usize,
    pub overall_sent: usize,
    /// Latency in milliseconds over received packets; absent in testbed mode
    pub latency_ms: Option<SummaryStats>,
}

impl NetworkStat {
    pub fn overall_received(&self) -> usize {
        self.overall_sent - self.overall_lost
    }
}

/// Duty cycle percentages across all energy log lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyCycleStat {
    pub records: Vec<DutyCycleRecord>,
    pub summary: Option<SummaryStats>,
}

/// Non-fatal findings from extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionWarning {
    /// The node announced its address more than once
    NodeReset { node: NodeId, resets: u32 },
    /// The node booted but no send event from it was parsed
    NoDataSent { node: NodeId },
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionWarning::NodeReset { node, resets } => {
                write!(f, "node {} reset during the simulation ({} resets)", node, resets)
            }
            ExtractionWarning::NoDataSent { node } => {
                write!(f, "node {} did not send any data", node)
            }
        }
    }
}

/// One point of the PDR time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdrSample {
    pub minutes: u64,
    pub pdr: f64,
    pub lost: usize,
    pub sent: usize,
}

/// Everything the analysis step produces for one capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub testbed: bool,
    pub nodes: Vec<NodeStat>,
    pub network: NetworkStat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty_cycle: Option<DutyCycleStat>,
}
