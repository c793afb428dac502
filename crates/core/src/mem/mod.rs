//! Memory-side collaborators.
//!
//! The core sees the cache subsystem only as a pair of bounded FIFOs; the
//! actual cache semantics are opaque. This module provides:
//! 1. **Channel:** The transmit/receive FIFO pair between core and cache.
//! 2. **Latency model:** A fixed-latency responder standing in for the
//!    cache/DRAM hierarchy.

/// Core-to-cache channel (transmit and receive FIFOs).
pub mod channel;
/// Fixed-latency memory model.
pub mod latency;

pub use channel::CacheChannel;
pub use latency::FixedLatencyMemory;
