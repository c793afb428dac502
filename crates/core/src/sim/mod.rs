//! Simulation harness.
//!
//! Owns the pieces outside any single core: the discrete-event scheduler,
//! the per-core channels and memory models, and the event-log writers.

/// Discrete-event scheduler.
pub mod scheduler;
/// Multi-core simulation harness.
pub mod simulator;
/// Human-readable cycle-level event logs.
pub mod tracelog;

pub use scheduler::Scheduler;
pub use simulator::Simulator;
pub use tracelog::TraceLog;
