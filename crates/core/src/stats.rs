//! Per-core statistics collection and reporting.
//!
//! This module tracks performance counters for one core. It provides:
//! 1. **Throughput:** Cycles, requests created, cache requests, responses.
//! 2. **Retirement mix:** Retired instruction counts by kind.
//! 3. **Stalls:** Allocation backpressure by cause (ROB full, LSQ full,
//!    out-of-order window full).
//! 4. **Forwarding:** Loads satisfied from in-flight stores.

/// Statistics for a single core.
#[derive(Debug, Clone, Default)]
pub struct CoreStats {
    /// Total core cycles elapsed.
    pub cycles: u64,
    /// Requests created by the driver (compute and memory).
    pub requests: u64,
    /// Memory requests that were (or will be) issued to the cache.
    pub cache_requests: u64,
    /// Responses consumed from the receive FIFO.
    pub responses: u64,

    /// Compute instructions retired.
    pub retired_compute: u64,
    /// Loads retired.
    pub retired_loads: u64,
    /// Stores retired.
    pub retired_stores: u64,

    /// Loads satisfied by store-to-load forwarding at allocation.
    pub load_forwards: u64,

    /// Cycles a dispatch stalled because the reorder buffer was full.
    pub stall_rob_full: u64,
    /// Cycles a dispatch stalled because the load/store queue was full.
    pub stall_lsq_full: u64,
    /// Cycles a dispatch stalled because the in-flight window was full.
    pub stall_window_full: u64,
}

impl CoreStats {
    /// Total instructions retired.
    pub fn retired(&self) -> u64 {
        self.retired_compute + self.retired_loads + self.retired_stores
    }

    /// Prints a summary block for this core to stdout.
    pub fn print(&self, core_id: u16) {
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let ipc = self.retired() as f64 / cyc as f64;
        println!("----------------------------------------------------------");
        println!("CORE {core_id}");
        println!("  cycles                 {}", self.cycles);
        println!("  insts_retired          {}", self.retired());
        println!("  ipc                    {:.4}", ipc);
        println!("  requests               {}", self.requests);
        println!("  requests.cache         {}", self.cache_requests);
        println!("  responses              {}", self.responses);
        println!(
            "  retired.compute        {}  retired.load  {}  retired.store  {}",
            self.retired_compute, self.retired_loads, self.retired_stores
        );
        println!("  load_forwards          {}", self.load_forwards);
        println!(
            "  stalls.rob             {}  stalls.lsq    {}  stalls.window  {}",
            self.stall_rob_full, self.stall_lsq_full, self.stall_window_full
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retired_sums_kinds() {
        let stats = CoreStats {
            retired_compute: 5,
            retired_loads: 2,
            retired_stores: 1,
            ..Default::default()
        };
        assert_eq!(stats.retired(), 8);
    }
}
