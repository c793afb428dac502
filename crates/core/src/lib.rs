//! Trace-driven multi-core memory-system simulation library.
//!
//! This crate implements the per-core out-of-order issue/commit engine of a
//! trace-driven multi-core simulator with the following:
//! 1. **Engine:** Reorder buffer, load/store queue with store-to-load
//!    forwarding, core driver, and benchmark trace reader.
//! 2. **Memory:** Bounded request/response channels and a fixed-latency
//!    memory model standing in for the cache hierarchy.
//! 3. **Simulation:** Discrete-event scheduler, multi-core harness,
//!    configuration, and statistics collection.

/// Common types (message model, bounded FIFO, errors).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Per-core engine (reorder buffer, load/store queue, driver, trace reader).
pub mod engine;
/// Memory-side collaborators (cache channel, fixed-latency memory model).
pub mod mem;
/// Simulation harness (scheduler, multi-core simulator, event logs).
pub mod sim;
/// Per-core statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Per-core driver; reads the trace and drives the ROB/LSQ pipeline.
pub use crate::engine::driver::CoreDriver;
/// Multi-core simulation harness; construct with `Simulator::new`.
pub use crate::sim::simulator::Simulator;
