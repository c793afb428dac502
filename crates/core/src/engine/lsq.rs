//! Load/Store Queue (LSQ) with store-to-load forwarding.
//!
//! The LSQ holds in-flight memory operations in allocation order and
//! mediates all cache traffic. It provides:
//! 1. **Allocation:** Admits READ/WRITE requests; stores are ready
//!    immediately, loads run the forwarding check.
//! 2. **Forwarding:** Satisfies a load from the youngest older in-flight
//!    store to the same address, without touching the cache.
//! 3. **Cache traffic:** Sends the oldest unsent operation per cycle on the
//!    transmit FIFO and consumes responses from the receive FIFO.
//! 4. **Removal:** Drains loads once ready and stores once the cache has
//!    acknowledged the write.
//!
//! The LSQ never calls into the ROB. Ids that become ready here accumulate
//! in a pending-commit list the driver drains and applies to the ROB.

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::common::msg::{MsgId, ReqMsg, ReqType, RespMsg};
use crate::mem::channel::CacheChannel;

/// A single entry in the load/store queue.
#[derive(Clone, Debug)]
pub struct LsqEntry {
    /// The memory request (READ or WRITE only).
    pub request: ReqMsg,
    /// Loads: data obtained (cache or forwarding). Stores: set at
    /// allocation; stores never stall the front-end.
    pub ready: bool,
    /// Set once the operation has been handed to the cache and not yet
    /// answered.
    pub waiting_for_cache: bool,
    /// Stores only: the cache confirmed the write.
    pub cache_ack: bool,
    /// Cycle the entry was allocated.
    pub alloc_cycle: u64,
}

/// Outcome of a successful LSQ allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LsqAllocation {
    /// Entry appended; the operation will be sent to the cache.
    Queued,
    /// Load satisfied by store-to-load forwarding at allocation; no cache
    /// request will ever be issued for it.
    Forwarded,
}

/// Result of advancing the LSQ by one cycle.
#[derive(Debug, Default)]
pub struct LsqStepReport {
    /// Responses consumed from the receive FIFO this cycle.
    pub consumed: Vec<RespMsg>,
    /// Request handed to the transmit FIFO this cycle, if any.
    pub sent: Option<ReqMsg>,
}

/// Load/store queue — in-order queue of memory operations.
pub struct Lsq {
    /// Entries in allocation order (front = oldest).
    entries: VecDeque<LsqEntry>,
    /// Maximum number of entries.
    capacity: usize,
    /// Ids that became ready and still need a ROB commit notification.
    pending_commits: Vec<MsgId>,
}

impl Lsq {
    /// Creates a new LSQ with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            pending_commits: Vec::new(),
        }
    }

    /// Returns the LSQ capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of queued entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if a new entry can be allocated.
    #[inline]
    pub fn can_accept(&self) -> bool {
        self.entries.len() < self.capacity
    }

    /// Number of entries currently waiting on a cache response.
    pub fn waiting_entries(&self) -> usize {
        self.entries.iter().filter(|e| e.waiting_for_cache).count()
    }

    /// Iterates over entries from oldest to youngest.
    pub fn iter(&self) -> impl Iterator<Item = &LsqEntry> {
        self.entries.iter()
    }

    /// Allocates an entry for a memory request.
    ///
    /// Returns `None` (making no change) if the queue is full. A WRITE is
    /// ready at allocation and queued for the ROB commit notification. A
    /// READ runs the forwarding check; on a hit it is ready immediately and
    /// will never be sent to the cache.
    pub fn allocate(&mut self, request: ReqMsg, cycle: u64) -> Option<LsqAllocation> {
        debug_assert!(request.req_type.is_memory());
        if !self.can_accept() {
            return None;
        }

        let is_store = request.req_type == ReqType::Write;
        self.entries.push_back(LsqEntry {
            request,
            ready: is_store,
            waiting_for_cache: false,
            cache_ack: false,
            alloc_cycle: cycle,
        });
        trace!(
            "[lsq] alloc {} {} addr={:#x}",
            request.req_type, request.msg_id, request.addr
        );

        if is_store {
            self.pending_commits.push(request.msg_id);
            return Some(LsqAllocation::Queued);
        }

        if self.ld_fwd(request.addr) {
            Some(LsqAllocation::Forwarded)
        } else {
            Some(LsqAllocation::Queued)
        }
    }

    /// Store-to-load forwarding check for `addr`.
    ///
    /// Searches from youngest to oldest for a store to the same address.
    /// If one exists, every load to that address younger than the store is
    /// marked ready (and queued for ROB notification). Returns whether a
    /// matching store was found. Address comparison is exact; trace
    /// addresses are cache-line granularity.
    pub fn ld_fwd(&mut self, addr: u64) -> bool {
        let store_idx = self
            .entries
            .iter()
            .rposition(|e| e.request.req_type == ReqType::Write && e.request.addr == addr);
        let Some(store_idx) = store_idx else {
            return false;
        };

        let store_id = self.entries[store_idx].request.msg_id;
        for entry in self.entries.iter_mut().skip(store_idx + 1) {
            if entry.request.req_type == ReqType::Read
                && entry.request.addr == addr
                && !entry.ready
            {
                entry.ready = true;
                self.pending_commits.push(entry.request.msg_id);
                trace!(
                    "[lsq] forward {} -> {} addr={:#x}",
                    store_id, entry.request.msg_id, addr
                );
            }
        }
        true
    }

    /// Marks the entry with the given id as ready.
    ///
    /// Used for the store-architecturally-committed signal from the ROB (and
    /// as the symmetric hook for loads). Does not remove the entry; a store
    /// leaves the queue only once the cache acknowledges it. A store that
    /// was acknowledged and drained before the ROB retired it is normal, so
    /// a missing id is logged at debug level only.
    pub fn commit(&mut self, msg_id: MsgId) {
        match self.entries.iter_mut().find(|e| e.request.msg_id == msg_id) {
            Some(entry) => {
                if !entry.ready {
                    entry.ready = true;
                }
                trace!("[lsq] commit {}", msg_id);
            }
            None => debug!("[lsq] commit for absent {}", msg_id),
        }
    }

    /// Hands the oldest unsent operation to the cache, if any.
    ///
    /// At most one request per invocation, preserving allocation order on
    /// the transmit FIFO. Entries already handed to the cache are skipped;
    /// loads satisfied by forwarding are never sent. Returns the request
    /// pushed, or `None`.
    pub fn push_to_cache(&mut self, chan: &mut CacheChannel) -> Option<ReqMsg> {
        if chan.tx.is_full() {
            return None;
        }

        for entry in self.entries.iter_mut() {
            if entry.waiting_for_cache {
                continue;
            }
            match entry.request.req_type {
                // Forwarded loads have their data; nothing to fetch.
                ReqType::Read if entry.ready => continue,
                ReqType::Write if entry.cache_ack => continue,
                _ => {}
            }
            let pushed = chan.tx.push(entry.request);
            debug_assert!(pushed);
            entry.waiting_for_cache = true;
            trace!(
                "[lsq] tx {} {} addr={:#x}",
                entry.request.req_type, entry.request.msg_id, entry.request.addr
            );
            return Some(entry.request);
        }
        None
    }

    /// Consumes one response from the receive FIFO, if present.
    ///
    /// A READ response marks the load ready (queued for ROB notification)
    /// and re-runs the forwarding check for its address; a WRITE response
    /// records the cache acknowledgment. Returns the consumed response.
    pub fn rx_from_cache(&mut self, chan: &mut CacheChannel) -> Option<RespMsg> {
        let resp = chan.rx.pop()?;

        let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.request.msg_id == resp.msg_id)
        else {
            warn!("[lsq] response for unknown {}", resp.msg_id);
            return Some(resp);
        };

        let is_load = {
            let entry = &mut self.entries[idx];
            entry.waiting_for_cache = false;
            if entry.request.req_type == ReqType::Read {
                entry.ready = true;
                true
            } else {
                entry.cache_ack = true;
                false
            }
        };

        if is_load {
            self.pending_commits.push(resp.msg_id);
            trace!("[lsq] rx load {} addr={:#x}", resp.msg_id, resp.addr);
            // Same-address loads sitting behind an in-flight store become
            // ready as well.
            self.ld_fwd(resp.addr);
        } else {
            trace!("[lsq] rx store ack {} addr={:#x}", resp.msg_id, resp.addr);
        }
        Some(resp)
    }

    /// Removes completed entries, scanning from the head.
    ///
    /// A READ leaves once ready; a WRITE leaves once acknowledged. Removal
    /// never reorders entries of the same type, but a ready load may drain
    /// past an older still-unacked store: program-order commit is the ROB's
    /// concern, the LSQ tracks only memory-system liveness.
    pub fn retire(&mut self) {
        let mut blocked_read = false;
        let mut blocked_write = false;
        self.entries.retain(|entry| {
            let removable = match entry.request.req_type {
                ReqType::Read => !blocked_read && entry.ready,
                ReqType::Write => !blocked_write && entry.cache_ack,
                _ => false,
            };
            if removable {
                trace!(
                    "[lsq] remove {} {} addr={:#x}",
                    entry.request.req_type, entry.request.msg_id, entry.request.addr
                );
                false
            } else {
                match entry.request.req_type {
                    ReqType::Read => blocked_read = true,
                    ReqType::Write => blocked_write = true,
                    _ => {}
                }
                true
            }
        });
    }

    /// Retracts the most recently allocated entry.
    ///
    /// Used solely to roll back a failed paired allocation. Returns the id
    /// of the removed entry, or `None` if the queue is empty.
    pub fn remove_last_entry(&mut self) -> Option<MsgId> {
        self.entries.pop_back().map(|e| e.request.msg_id)
    }

    /// Advances the LSQ by one cycle: consume responses, remove completed
    /// entries, then send the oldest unsent operation.
    pub fn step(&mut self, chan: &mut CacheChannel) -> LsqStepReport {
        let mut report = LsqStepReport::default();
        while let Some(resp) = self.rx_from_cache(chan) {
            report.consumed.push(resp);
        }
        self.retire();
        report.sent = self.push_to_cache(chan);
        report
    }

    /// Drains the accumulated ready notifications for the ROB.
    pub fn take_pending_commits(&mut self) -> Vec<MsgId> {
        std::mem::take(&mut self.pending_commits)
    }
}
