//! # rplog - Delivery analysis for WSN routing protocol logs
//!
//! Turns the console output of a sensor network run, either from the Cooja simulator or
//! from a physical testbed, into packet delivery ratio, latency and duty cycle figures.
//!
//! ## Pipeline
//!
//! - `analysis::log_parser`: two-phase extraction. Identity lines first, then send and
//!   receive events with addresses resolved to node ids.
//! - `analysis::store`: the extracted events and their `sent.csv` / `recv.csv` tables.
//! - `analysis::reconcile`: deduplication and left join on (src, dest, seqn).
//! - `analysis::delivery`, `analysis::duty_cycle`: per-node and network statistics.
//! - `analysis::time_window`: the whole chain rerun over growing time cutoffs.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use rplog::analysis::{self, Dialect};
//!
//! let parsed = analysis::parse_log_file(Path::new("loglistener.log"), Dialect::Simulation)?;
//! let report = analysis::analyze_store(&parsed.events, Dialect::Simulation);
//! println!("{}", analysis::render_report(&report));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`error::AnalysisError`]; file and CLI layers wrap them
//! with `color_eyre` context. Lines that match no grammar are skipped, not reported.

pub mod analysis;
pub mod config;
pub mod error;
