//! Error taxonomy of the profiler.
//!
//! Only two kinds of failure are ever absorbed into a faulted report entry (a backend rejecting a
//! specific candidate, and a verification mismatch) and those never surface as an `Err`. Everything
//! in this enum terminates the run.

use thiserror::Error;

/// Errors that abort a profiling run.
#[derive(Debug, Error)]
pub enum ProfError {
    /// Bad command-line input, raised before any device work starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Allocation, transfer or timer failure on the execution target.
    #[error("device error: {0}")]
    Device(String),

    /// The compute backend returned a status that is neither success nor a per-candidate soft
    /// fault.
    #[error("backend fatal error: {0}")]
    Backend(String),

    /// Report output could not be written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
