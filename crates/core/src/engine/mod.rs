//! Per-core out-of-order issue/commit engine.
//!
//! Three components, composed leaf-first:
//! 1. **ROB:** Fixed-capacity in-order queue enforcing in-program-order
//!    retirement of in-flight instructions.
//! 2. **LSQ:** Fixed-capacity queue of memory operations with store-to-load
//!    forwarding; mediates all cache traffic.
//! 3. **Driver:** Reads the benchmark trace, allocates entries, tracks
//!    in-flight requests, and detects termination.
//!
//! The ROB and LSQ never reference each other. Each returns the message ids
//! the other must be told about, and the driver routes the notifications.

/// Core driver: trace consumption, dispatch, completion, termination.
pub mod driver;
/// Load/store queue with store-to-load forwarding.
pub mod lsq;
/// Reorder buffer.
pub mod rob;
/// Benchmark trace reader.
pub mod trace;

pub use driver::CoreDriver;
pub use lsq::{Lsq, LsqAllocation};
pub use rob::Rob;
pub use trace::{TraceGroup, TraceReader};
