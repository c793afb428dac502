//! Reorder Buffer (ROB) for in-order commit.
//!
//! The ROB is a circular buffer that tracks in-flight instructions from
//! dispatch through retirement. It provides:
//! 1. **Allocation:** Appends an entry for every dispatched instruction.
//! 2. **Completion:** Marks entries ready when their results arrive.
//! 3. **In-order Retirement:** Retires up to the commit width of ready
//!    entries from the head each cycle, stopping at the first non-ready one.
//! 4. **Rollback:** Retracts the most recent entry when a paired load/store
//!    queue allocation fails.

use log::{trace, warn};

use crate::common::msg::{MsgId, ReqMsg, ReqType};

/// A single entry in the reorder buffer.
#[derive(Clone, Debug, Default)]
pub struct RobEntry {
    /// The dispatched request.
    pub request: ReqMsg,
    /// True once the instruction has completed execution.
    pub ready: bool,
    /// Cycle the entry was allocated.
    pub alloc_cycle: u64,
    /// Whether this slot is occupied.
    valid: bool,
}

/// Reorder buffer — circular queue enforcing in-program-order retirement.
pub struct Rob {
    /// Fixed-size entry array.
    entries: Vec<RobEntry>,
    /// Index of the oldest entry (the commit point).
    head: usize,
    /// Index where the next entry will be allocated.
    tail: usize,
    /// Number of valid entries.
    count: usize,
    /// Maximum retirements per cycle.
    commit_width: usize,
}

impl Rob {
    /// Creates a new ROB with the given capacity and commit width.
    pub fn new(capacity: usize, commit_width: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, RobEntry::default);
        Self {
            entries,
            head: 0,
            tail: 0,
            count: 0,
            commit_width,
        }
    }

    /// Returns the ROB capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the ROB is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the ROB is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Returns true if a new entry can be allocated.
    #[inline]
    pub fn can_accept(&self) -> bool {
        !self.is_full()
    }

    /// Allocates an entry for a dispatched request.
    ///
    /// Compute requests are ready at allocation; memory requests become
    /// ready via [`Rob::commit`]. Returns false (making no change) if the
    /// ROB is full.
    pub fn allocate(&mut self, request: ReqMsg, cycle: u64) -> bool {
        if self.is_full() {
            return false;
        }

        let ready = request.req_type == ReqType::Compute;
        self.entries[self.tail] = RobEntry {
            request,
            ready,
            alloc_cycle: cycle,
            valid: true,
        };
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;

        trace!(
            "[rob] alloc {} {} ready={}",
            request.req_type, request.msg_id, ready
        );
        true
    }

    /// Marks the entry with the given id as ready.
    ///
    /// Idempotent; an unknown id is a no-op logged at warn level. Returns
    /// whether a matching entry was found.
    pub fn commit(&mut self, msg_id: MsgId) -> bool {
        if let Some(entry) = self.find_entry_mut(msg_id) {
            if !entry.ready {
                entry.ready = true;
                trace!("[rob] commit {}", msg_id);
            }
            true
        } else {
            warn!("[rob] commit for unknown {}", msg_id);
            false
        }
    }

    /// Retires ready entries from the head, in program order.
    ///
    /// Pops at most the commit width of entries, stopping at the first
    /// non-ready head. Returns the retired requests; the caller notifies
    /// the load/store queue about retired stores.
    pub fn retire(&mut self) -> Vec<ReqMsg> {
        let cap = self.entries.len();
        let mut retired = Vec::new();
        for _ in 0..self.commit_width {
            if self.count == 0 || !self.entries[self.head].ready {
                break;
            }
            self.entries[self.head].valid = false;
            let request = self.entries[self.head].request;
            trace!("[rob] retire {} {}", request.req_type, request.msg_id);
            retired.push(request);
            self.head = (self.head + 1) % cap;
            self.count -= 1;
        }
        retired
    }

    /// Retracts the most recently allocated entry.
    ///
    /// Used solely to roll back a failed paired allocation. Returns the id
    /// of the removed entry, or `None` if the ROB is empty.
    pub fn remove_last_entry(&mut self) -> Option<MsgId> {
        if self.count == 0 {
            return None;
        }
        let prev_tail = if self.tail == 0 {
            self.entries.len() - 1
        } else {
            self.tail - 1
        };
        self.entries[prev_tail].valid = false;
        self.tail = prev_tail;
        self.count -= 1;
        Some(self.entries[prev_tail].request.msg_id)
    }

    /// Returns a reference to the head entry, if any.
    pub fn peek_head(&self) -> Option<&RobEntry> {
        if self.count == 0 {
            None
        } else {
            Some(&self.entries[self.head])
        }
    }

    /// Iterate over valid entries from head (oldest) to tail.
    pub fn for_each(&self, mut f: impl FnMut(&RobEntry)) {
        let mut idx = self.head;
        for _ in 0..self.count {
            if self.entries[idx].valid {
                f(&self.entries[idx]);
            }
            idx = (idx + 1) % self.entries.len();
        }
    }

    /// Finds a mutable reference to the entry with the given id.
    fn find_entry_mut(&mut self, msg_id: MsgId) -> Option<&mut RobEntry> {
        let cap = self.entries.len();
        let mut idx = self.head;
        for _ in 0..self.count {
            if self.entries[idx].valid && self.entries[idx].request.msg_id == msg_id {
                return Some(&mut self.entries[idx]);
            }
            idx = (idx + 1) % cap;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: u64, req_type: ReqType) -> ReqMsg {
        ReqMsg {
            msg_id: MsgId(id),
            core_id: 0,
            req_type,
            addr: 0x100,
            cycle: 0,
        }
    }

    #[test]
    fn test_allocate_and_retire() {
        let mut rob = Rob::new(4, 4);
        assert!(rob.is_empty());
        assert!(rob.can_accept());

        assert!(rob.allocate(req(1, ReqType::Read), 0));
        assert_eq!(rob.len(), 1);

        // Head not ready: nothing retires.
        assert!(rob.retire().is_empty());

        assert!(rob.commit(MsgId(1)));
        let retired = rob.retire();
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].msg_id, MsgId(1));
        assert!(rob.is_empty());
    }

    #[test]
    fn test_compute_ready_at_allocation() {
        let mut rob = Rob::new(4, 4);
        assert!(rob.allocate(req(1, ReqType::Compute), 0));
        let retired = rob.retire();
        assert_eq!(retired.len(), 1);
    }

    #[test]
    fn test_full_rob_rejects_allocation() {
        let mut rob = Rob::new(2, 4);
        assert!(rob.allocate(req(1, ReqType::Read), 0));
        assert!(rob.allocate(req(2, ReqType::Read), 0));
        assert!(rob.is_full());
        assert!(!rob.can_accept());
        assert!(!rob.allocate(req(3, ReqType::Read), 0));
        assert_eq!(rob.len(), 2);
    }

    #[test]
    fn test_in_order_retirement_under_out_of_order_completion() {
        let mut rob = Rob::new(4, 4);
        rob.allocate(req(1, ReqType::Read), 0);
        rob.allocate(req(2, ReqType::Read), 0);

        // Complete the younger entry first.
        rob.commit(MsgId(2));
        assert!(rob.retire().is_empty());

        rob.commit(MsgId(1));
        let retired = rob.retire();
        assert_eq!(retired.len(), 2);
        assert_eq!(retired[0].msg_id, MsgId(1));
        assert_eq!(retired[1].msg_id, MsgId(2));
    }

    #[test]
    fn test_retirement_bounded_by_commit_width() {
        let mut rob = Rob::new(8, 2);
        for i in 1..=6 {
            rob.allocate(req(i, ReqType::Compute), 0);
        }
        assert_eq!(rob.retire().len(), 2);
        assert_eq!(rob.retire().len(), 2);
        assert_eq!(rob.retire().len(), 2);
        assert!(rob.is_empty());
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut rob = Rob::new(4, 4);
        rob.allocate(req(1, ReqType::Write), 0);
        assert!(rob.commit(MsgId(1)));
        assert!(rob.commit(MsgId(1)));
        assert_eq!(rob.retire().len(), 1);
    }

    #[test]
    fn test_commit_unknown_id_is_noop() {
        let mut rob = Rob::new(4, 4);
        rob.allocate(req(1, ReqType::Read), 0);
        assert!(!rob.commit(MsgId(99)));
        assert_eq!(rob.len(), 1);
        assert!(rob.retire().is_empty());
    }

    #[test]
    fn test_remove_last_entry_rolls_back() {
        let mut rob = Rob::new(4, 4);
        rob.allocate(req(1, ReqType::Read), 0);
        rob.allocate(req(2, ReqType::Write), 0);
        assert_eq!(rob.remove_last_entry(), Some(MsgId(2)));
        assert_eq!(rob.len(), 1);
        // The retracted id is gone: committing it warns and changes nothing.
        assert!(!rob.commit(MsgId(2)));
        assert_eq!(rob.peek_head().unwrap().request.msg_id, MsgId(1));
    }

    #[test]
    fn test_remove_last_entry_on_empty() {
        let mut rob = Rob::new(4, 4);
        assert_eq!(rob.remove_last_entry(), None);
    }

    #[test]
    fn test_circular_wraparound() {
        let mut rob = Rob::new(2, 1);
        for i in 1..=10 {
            assert!(rob.allocate(req(i, ReqType::Read), i));
            rob.commit(MsgId(i));
            let retired = rob.retire();
            assert_eq!(retired.len(), 1);
            assert_eq!(retired[0].msg_id, MsgId(i));
        }
    }

    #[test]
    fn test_msg_ids_increase_head_to_tail() {
        let mut rob = Rob::new(8, 4);
        for i in 1..=5 {
            rob.allocate(req(i, ReqType::Read), 0);
        }
        let mut prev = 0;
        rob.for_each(|entry| {
            assert!(entry.request.msg_id.0 > prev);
            prev = entry.request.msg_id.0;
        });
    }
}
