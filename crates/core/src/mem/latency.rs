//! Fixed-latency memory model.
//!
//! Stands in for the cache/DRAM hierarchy behind a core's channel: every
//! request is answered after a fixed number of cycles, in arrival order.
//! Hit/miss behavior, coherence, and DRAM timing are out of scope; the
//! engine only requires that each READ/WRITE eventually produces a response
//! carrying the original message id.

use std::collections::VecDeque;

use log::{trace, warn};

use crate::common::msg::{ReqType, RespMsg};
use crate::config::MemConfig;
use crate::mem::channel::CacheChannel;

/// Memory model answering each request after a fixed latency.
pub struct FixedLatencyMemory {
    /// Cycles between accepting a request and its response being available.
    latency: u64,
    /// Requests drained from the transmit FIFO per cycle.
    accepts_per_cycle: usize,
    /// Local cycle counter, advanced once per step.
    cycle: u64,
    /// Accepted requests awaiting their response cycle, in arrival order.
    pending: VecDeque<(u64, RespMsg)>,
    /// Read requests accepted so far.
    pub reads_accepted: u64,
    /// Write requests accepted so far.
    pub writes_accepted: u64,
}

impl FixedLatencyMemory {
    /// Creates a memory model with the given response latency and per-cycle
    /// acceptance count.
    pub fn new(latency: u64, accepts_per_cycle: usize) -> Self {
        Self {
            latency,
            accepts_per_cycle,
            cycle: 0,
            pending: VecDeque::new(),
            reads_accepted: 0,
            writes_accepted: 0,
        }
    }

    /// Creates a memory model from configuration.
    pub fn from_config(config: &MemConfig) -> Self {
        Self::new(config.latency_cycles, config.accepts_per_cycle)
    }

    /// Runs one memory cycle: deliver matured responses, then accept new
    /// requests from the transmit FIFO.
    pub fn step(&mut self, chan: &mut CacheChannel) {
        // Responses mature in arrival order; stop at the first unready one
        // or when the receive FIFO backs up.
        while let Some((due, _)) = self.pending.front() {
            if *due > self.cycle || chan.rx.is_full() {
                break;
            }
            let (_, resp) = self.pending.pop_front().unwrap();
            trace!("[mem] respond {} addr={:#x}", resp.msg_id, resp.addr);
            chan.rx.push(resp);
        }

        for _ in 0..self.accepts_per_cycle {
            let Some(req) = chan.tx.pop() else {
                break;
            };
            match req.req_type {
                ReqType::Read => self.reads_accepted += 1,
                ReqType::Write => self.writes_accepted += 1,
                other => warn!("[mem] unexpected {} request {} on channel", other, req.msg_id),
            }
            let resp = RespMsg {
                msg_id: req.msg_id,
                addr: req.addr,
                req_cycle: req.cycle,
                cycle: self.cycle + self.latency,
            };
            trace!("[mem] accept {} addr={:#x}", req.msg_id, req.addr);
            self.pending.push_back((self.cycle + self.latency, resp));
        }

        self.cycle += 1;
    }

    /// Returns true if no accepted request is still awaiting its response.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}
