//! Core-to-cache communication channel.
//!
//! A pair of bounded FIFOs: requests travel core to cache on `tx`, responses
//! travel cache to core on `rx`. The core checks `tx.is_full()` before
//! pushing and pops `rx` only when non-empty; the cache side does the
//! mirror image.

use crate::common::fifo::BoundedFifo;
use crate::common::msg::{ReqMsg, RespMsg};

/// Request/response FIFO pair between one core and its cache port.
#[derive(Debug)]
pub struct CacheChannel {
    /// Core to cache: request messages.
    pub tx: BoundedFifo<ReqMsg>,
    /// Cache to core: response messages.
    pub rx: BoundedFifo<RespMsg>,
}

impl CacheChannel {
    /// Creates a channel whose FIFOs each hold at most `depth` messages.
    pub fn new(depth: usize) -> Self {
        Self {
            tx: BoundedFifo::new(depth),
            rx: BoundedFifo::new(depth),
        }
    }
}
