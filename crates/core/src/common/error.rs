//! Library error types.
//!
//! Only initialization is fatal: a core whose benchmark trace cannot be
//! opened (or whose event-log files cannot be created) aborts construction.
//! Everything the engine hits at runtime (full queues, unknown message ids,
//! malformed trace lines) is backpressure or a logged warning, never an
//! error value.

use std::fmt;
use std::io;

/// Errors surfaced while constructing a simulation.
#[derive(Debug)]
pub enum SimError {
    /// The benchmark trace file could not be opened.
    TraceOpen {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// An event-log output file could not be created.
    TraceLogCreate {
        /// Path that failed to open for writing.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The configuration describes no cores.
    NoCores,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::TraceOpen { path, source } => {
                write!(f, "cannot open benchmark trace '{}': {}", path, source)
            }
            SimError::TraceLogCreate { path, source } => {
                write!(f, "cannot create event log '{}': {}", path, source)
            }
            SimError::NoCores => write!(f, "configuration describes no cores"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::TraceOpen { source, .. } | SimError::TraceLogCreate { source, .. } => {
                Some(source)
            }
            SimError::NoCores => None,
        }
    }
}
