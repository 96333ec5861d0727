//! Packet delivery analysis for routing protocol test runs.
//!
//! Raw console logs are turned into send/receive events, reconciled on
//! (src, dest, seqn), and reduced to delivery ratio, latency and duty cycle figures.

pub mod types;
pub mod dialect;
pub mod log_parser;
pub mod store;
pub mod reconcile;
pub mod stats;
pub mod delivery;
pub mod duty_cycle;
pub mod pipeline;
pub mod time_window;
pub mod report;

pub use types::*;
pub use dialect::Dialect;
pub use log_parser::{parse_log, parse_log_file, NodeMap, ParsedLog};
pub use store::EventStore;
pub use reconcile::reconcile;
pub use delivery::compute_delivery;
pub use duty_cycle::duty_cycle_from_dir;
pub use pipeline::{analyze_dir, analyze_log_text, analyze_store};
pub use time_window::{run_timeline, truncate_log};
pub use report::{generate_json_report, render_report, write_timeline};
