//! Core driver: trace consumption, dispatch, completion, termination.
//!
//! One driver per simulated core. Each cycle it runs four phases:
//! 1. **Retire:** Advance the ROB; retired stores are reported to the LSQ.
//! 2. **Memory:** Advance the LSQ (consume responses, remove completed
//!    entries, send the oldest unsent operation).
//! 3. **Dispatch:** Read the trace and allocate at most one new request.
//!    Compute instructions drain one per cycle before their memory op; a
//!    memory op enters the ROB and LSQ atomically under the in-flight
//!    window.
//! 4. **Complete:** Account consumed responses and apply the LSQ's ready
//!    notifications to the ROB.
//!
//! The driver owns the ROB and LSQ outright; the only interface to the rest
//! of the system is the cache channel passed into [`CoreDriver::step`] and
//! the `done` flag polled by the harness.

use log::{debug, info, trace};

use crate::common::error::SimError;
use crate::common::msg::{MsgId, ReqMsg, ReqType, RespMsg};
use crate::config::{Config, CoreConfig};
use crate::engine::lsq::{Lsq, LsqAllocation};
use crate::engine::rob::Rob;
use crate::engine::trace::TraceReader;
use crate::mem::channel::CacheChannel;
use crate::sim::tracelog::TraceLog;
use crate::stats::CoreStats;

/// A trace-line memory operation waiting for its dispatch cycle.
#[derive(Clone, Copy, Debug)]
struct PendingOp {
    addr: u64,
    op: ReqType,
}

/// Per-core out-of-order issue/commit driver.
pub struct CoreDriver {
    core_id: u16,
    dt_ns: f64,
    clk_skew_ns: f64,

    rob: Rob,
    lsq: Lsq,
    trace: TraceReader,
    tracelog: Option<TraceLog>,

    /// Current core cycle.
    cycle: u64,
    /// Next request id to mint; allocation order equals id order.
    next_msg_id: u64,
    /// Compute instructions still to dispatch from the current trace line.
    pending_compute: u32,
    /// Memory op from the current trace line, not yet dispatched.
    pending_mem: Option<PendingOp>,
    /// Memory requests dispatched whose responses are still outstanding.
    in_flight: u32,
    /// Maximum concurrent outstanding memory requests.
    ooo_window: u32,
    /// Memory requests that were (or will be) issued to the cache.
    cache_requests: u64,
    /// Responses consumed.
    responses: u64,
    /// Simulation-complete flag polled by the harness.
    done: bool,

    stats: CoreStats,
}

impl CoreDriver {
    /// Creates a driver, opening the core's benchmark trace and event logs.
    pub fn new(config: &Config, core: &CoreConfig) -> Result<Self, SimError> {
        let trace = TraceReader::open(&core.bm_file)?;
        Self::with_trace(config, core, trace)
    }

    /// Creates a driver over an already-open trace reader.
    pub fn with_trace(
        config: &Config,
        core: &CoreConfig,
        trace: TraceReader,
    ) -> Result<Self, SimError> {
        Ok(Self {
            core_id: core.core_id,
            dt_ns: core.dt_ns,
            clk_skew_ns: core.clk_skew_ns,
            rob: Rob::new(config.rob.capacity, config.rob.commit_width),
            lsq: Lsq::new(config.lsq.capacity),
            trace,
            tracelog: TraceLog::create(core)?,
            cycle: 0,
            next_msg_id: 0,
            pending_compute: 0,
            pending_mem: None,
            in_flight: 0,
            ooo_window: core.ooo_stages,
            cache_requests: 0,
            responses: 0,
            done: false,
            stats: CoreStats::default(),
        })
    }

    /// Runs one core cycle. Returns false once the core is done and no
    /// further steps should be scheduled.
    pub fn step(&mut self, chan: &mut CacheChannel) -> bool {
        if self.done {
            return false;
        }
        trace!(
            "[core {}] cycle {} rob={} lsq={} in_flight={}",
            self.core_id,
            self.cycle,
            self.rob.len(),
            self.lsq.len(),
            self.in_flight
        );

        // 1) In-order retirement; the LSQ hears about committed stores.
        let retired = self.rob.retire();
        for req in &retired {
            self.count_retired(req);
            if let Some(log) = self.tracelog.as_mut() {
                log.record_retire(self.cycle, req);
            }
            if req.req_type == ReqType::Write {
                self.lsq.commit(req.msg_id);
            }
        }

        // 2) Memory queue: responses in, completed entries out, oldest
        //    unsent op to the cache.
        let report = self.lsq.step(chan);
        if let (Some(log), Some(sent)) = (self.tracelog.as_mut(), report.sent.as_ref()) {
            log.record_tx(self.cycle, sent);
        }

        // 3) Dispatch new work from the trace.
        self.process_tx();

        // 4) Responses and cross-queue notifications.
        self.process_rx(&report.consumed);

        // 5) Termination: trace drained, pipeline empty, every cache
        //    request answered.
        if self.trace.is_exhausted()
            && self.pending_compute == 0
            && self.pending_mem.is_none()
            && self.responses >= self.cache_requests
            && self.rob.is_empty()
            && self.lsq.is_empty()
        {
            self.done = true;
            self.stats.cycles = self.cycle;
            if let Some(log) = self.tracelog.as_mut() {
                log.finish(self.cycle);
            }
            info!(
                "[core {}] simulation end at cycle {} ({} requests, {} responses)",
                self.core_id, self.cycle, self.stats.requests, self.responses
            );
            return false;
        }

        self.cycle += 1;
        self.stats.cycles = self.cycle;
        true
    }

    /// Dispatch phase: at most one allocation per cycle.
    fn process_tx(&mut self) {
        // Compute instructions dispatch first and drain one per cycle; the
        // trace is not consulted again until they are gone.
        if self.pending_compute > 0 {
            if self.rob.can_accept() {
                let req = self.make_request(ReqType::Compute, 0);
                let accepted = self.rob.allocate(req, self.cycle);
                debug_assert!(accepted);
                self.pending_compute -= 1;
                self.stats.requests += 1;
            } else {
                self.stats.stall_rob_full += 1;
            }
            return;
        }

        if self.pending_mem.is_none() {
            if !self.trace.is_exhausted()
                && let Some(group) = self.trace.next_group()
            {
                debug!(
                    "[core {}] group: {} compute, {} addr={:#x}",
                    self.core_id, group.compute_count, group.op, group.addr
                );
                self.pending_compute = group.compute_count;
                self.pending_mem = Some(PendingOp {
                    addr: group.addr,
                    op: group.op,
                });
            }
            return;
        }

        let Some(pending) = self.pending_mem else {
            return;
        };
        if self.in_flight >= self.ooo_window {
            self.stats.stall_window_full += 1;
            return;
        }
        if !self.rob.can_accept() {
            self.stats.stall_rob_full += 1;
            return;
        }
        if !self.lsq.can_accept() {
            self.stats.stall_lsq_full += 1;
            return;
        }

        let req = self.make_request(pending.op, pending.addr);
        if !self.rob.allocate(req, self.cycle) {
            return;
        }
        match self.lsq.allocate(req, self.cycle) {
            Some(LsqAllocation::Queued) => {
                self.in_flight += 1;
                self.cache_requests += 1;
                self.stats.cache_requests += 1;
            }
            Some(LsqAllocation::Forwarded) => {
                self.stats.load_forwards += 1;
            }
            None => {
                // Paired allocation failed; undo the ROB side. The entry
                // just appended must be the one retracted.
                let undone = self.rob.remove_last_entry();
                debug_assert_eq!(undone, Some(req.msg_id));
                return;
            }
        }
        self.pending_mem = None;
        self.stats.requests += 1;
    }

    /// Completion phase: account responses and deliver ready notifications.
    fn process_rx(&mut self, consumed: &[RespMsg]) {
        for resp in consumed {
            debug_assert!(self.in_flight > 0);
            self.in_flight = self.in_flight.saturating_sub(1);
            self.responses += 1;
            self.stats.responses += 1;
            if let Some(log) = self.tracelog.as_mut() {
                log.record_rx(self.cycle, resp);
            }
        }
        for msg_id in self.lsq.take_pending_commits() {
            self.rob.commit(msg_id);
        }
    }

    /// Mints a request with the next per-core id, stamped with the current
    /// cycle.
    fn make_request(&mut self, req_type: ReqType, addr: u64) -> ReqMsg {
        let msg_id = MsgId(self.next_msg_id);
        self.next_msg_id += 1;
        ReqMsg {
            msg_id,
            core_id: self.core_id,
            req_type,
            addr,
            cycle: self.cycle,
        }
    }

    fn count_retired(&mut self, req: &ReqMsg) {
        match req.req_type {
            ReqType::Compute => self.stats.retired_compute += 1,
            ReqType::Read => self.stats.retired_loads += 1,
            ReqType::Write => self.stats.retired_stores += 1,
            ReqType::Replace => {}
        }
    }

    /// The core's identifier.
    pub fn core_id(&self) -> u16 {
        self.core_id
    }

    /// Per-cycle clock advance in nanoseconds.
    pub fn dt_ns(&self) -> f64 {
        self.dt_ns
    }

    /// Initial delay before the first step, in nanoseconds.
    pub fn clk_skew_ns(&self) -> f64 {
        self.clk_skew_ns
    }

    /// Current core cycle.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// True once the trace is drained and the pipeline is empty.
    pub fn done(&self) -> bool {
        self.done
    }

    /// Outstanding memory requests.
    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Statistics collected so far.
    pub fn stats(&self) -> &CoreStats {
        &self.stats
    }

    /// The reorder buffer (inspection only).
    pub fn rob(&self) -> &Rob {
        &self.rob
    }

    /// The load/store queue (inspection only).
    pub fn lsq(&self) -> &Lsq {
        &self.lsq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn driver_for(trace: &str, f: impl FnOnce(&mut Config, &mut CoreConfig)) -> CoreDriver {
        let mut config = Config::default();
        let mut core = CoreConfig::new(0, "unused.trc");
        f(&mut config, &mut core);
        let reader = TraceReader::from_reader(Cursor::new(trace.to_string()));
        CoreDriver::with_trace(&config, &core, reader).unwrap()
    }

    /// Step driver and memory together until the driver reports done.
    fn run_to_done(driver: &mut CoreDriver, chan: &mut CacheChannel, latency: u64, max: u64) {
        let mut mem = crate::mem::latency::FixedLatencyMemory::new(latency, 1);
        for _ in 0..max {
            let running = driver.step(chan);
            mem.step(chan);
            if !running {
                return;
            }
        }
        panic!("driver did not finish within {max} cycles");
    }

    #[test]
    fn test_empty_trace_terminates_immediately() {
        let mut driver = driver_for("", |_, _| {});
        let mut chan = CacheChannel::new(4);
        // The first step reads EOF and terminates.
        assert!(!driver.step(&mut chan));
        assert!(driver.done());
        assert_eq!(driver.stats().requests, 0);
        assert!(chan.tx.is_empty());
    }

    #[test]
    fn test_malformed_only_trace_terminates_without_traffic() {
        let mut driver = driver_for("7\n", |_, _| {});
        let mut chan = CacheChannel::new(4);
        run_to_done(&mut driver, &mut chan, 1, 4);
        assert!(driver.done());
        assert_eq!(driver.stats().requests, 0);
        assert!(chan.tx.is_empty());
    }

    #[test]
    fn test_compute_then_load_counts() {
        let mut driver = driver_for("5 0 R\n", |_, core| core.ooo_stages = 1);
        let mut chan = CacheChannel::new(4);
        run_to_done(&mut driver, &mut chan, 2, 100);

        let stats = driver.stats();
        assert_eq!(stats.requests, 6);
        assert_eq!(stats.responses, 1);
        assert_eq!(stats.retired_compute, 5);
        assert_eq!(stats.retired_loads, 1);
        assert_eq!(driver.in_flight(), 0);
    }

    #[test]
    fn test_computes_drain_one_per_cycle_before_memory() {
        let mut driver = driver_for("3 0x40 R\n", |_, _| {});
        let mut chan = CacheChannel::new(4);

        driver.step(&mut chan); // reads the line
        assert_eq!(driver.stats().requests, 0);
        driver.step(&mut chan);
        assert_eq!(driver.stats().requests, 1);
        driver.step(&mut chan);
        assert_eq!(driver.stats().requests, 2);
        driver.step(&mut chan);
        assert_eq!(driver.stats().requests, 3);
        // Only now does the memory op dispatch.
        driver.step(&mut chan);
        assert_eq!(driver.stats().requests, 4);
        assert_eq!(driver.stats().cache_requests, 1);
    }

    #[test]
    fn test_msg_ids_follow_program_order() {
        let mut driver = driver_for("2 0x40 W\n1 0x80 R\n", |_, _| {});
        let mut chan = CacheChannel::new(8);
        run_to_done(&mut driver, &mut chan, 1, 100);

        // Computes of a group dispatch before its memory op, so ids equal
        // program order; retirement order was checked via the ROB.
        assert_eq!(driver.stats().requests, 5);
        assert_eq!(driver.stats().retired_compute, 3);
        assert_eq!(driver.stats().retired_stores, 1);
        assert_eq!(driver.stats().retired_loads, 1);
    }

    #[test]
    fn test_in_flight_never_exceeds_window() {
        let trace = "0 0x100 R\n0 0x200 R\n0 0x300 R\n0 0x400 R\n0 0x500 R\n";
        let mut driver = driver_for(trace, |_, core| core.ooo_stages = 2);
        let mut chan = CacheChannel::new(8);
        let mut mem = crate::mem::latency::FixedLatencyMemory::new(5, 1);

        for _ in 0..200 {
            let running = driver.step(&mut chan);
            assert!(driver.in_flight() <= 2);
            assert!(driver.lsq().waiting_entries() <= 2);
            mem.step(&mut chan);
            if !running {
                break;
            }
        }
        assert!(driver.done());
        assert_eq!(driver.stats().responses, 5);
    }

    #[test]
    fn test_forwarded_load_produces_no_cache_request() {
        let mut driver = driver_for("0 0x100 W\n0 0x100 R\n", |_, _| {});
        let mut chan = CacheChannel::new(8);
        let mut mem = crate::mem::latency::FixedLatencyMemory::new(3, 1);

        for _ in 0..100 {
            let running = driver.step(&mut chan);
            mem.step(&mut chan);
            if !running {
                break;
            }
        }
        assert!(driver.done());
        assert_eq!(mem.writes_accepted, 1);
        assert_eq!(mem.reads_accepted, 0);
        assert_eq!(driver.stats().load_forwards, 1);
        assert_eq!(driver.stats().responses, 1);
    }

    #[test]
    fn test_termination_waits_for_store_ack() {
        let mut driver = driver_for("0 0x100 W\n", |_, _| {});
        let mut chan = CacheChannel::new(4);
        let mut mem = crate::mem::latency::FixedLatencyMemory::new(10, 1);

        let mut cycles = 0;
        loop {
            let running = driver.step(&mut chan);
            mem.step(&mut chan);
            cycles += 1;
            if !running {
                break;
            }
            assert!(cycles < 100, "store never acknowledged");
        }
        // The store's ROB entry retires early, but the core stays alive
        // until the write is acknowledged.
        assert!(cycles > 10);
        assert_eq!(driver.stats().responses, 1);
        assert!(driver.lsq().is_empty());
    }
}
