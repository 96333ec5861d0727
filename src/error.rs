//! Error types for log extraction and statistics.

use std::path::PathBuf;

/// Errors raised while turning a capture into statistics.
///
/// Lines that match no grammar are not errors; the extractor skips them.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No such file ({})", .path.display())]
    InputNotFound { path: PathBuf },

    /// An event referenced an address that no identity line announced.
    #[error("Unresolved address 0x{address:04x} on line {line}")]
    UnresolvedAddress { address: u16, line: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
