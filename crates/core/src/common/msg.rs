//! Request/response message model.
//!
//! These are the units of work flowing through the engine and across the
//! core/cache channel. Requests are immutable after creation; responses are
//! matched back to in-flight requests by [`MsgId`].

use std::fmt;

/// Unique request identifier, assigned monotonically per core.
///
/// Uniqueness across the whole system is `(core_id, msg_id)`; within one
/// core, allocation order equals `MsgId` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MsgId(pub u64);

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operation carried by a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReqType {
    /// Load operation.
    Read,
    /// Store operation.
    Write,
    /// Cache line replacement. Reserved on the wire; the core never emits it.
    Replace,
    /// Compute instruction. Never appears on the cache channel.
    #[default]
    Compute,
}

impl ReqType {
    /// Returns true for operations admitted into the load/store queue.
    #[inline]
    pub fn is_memory(self) -> bool {
        matches!(self, ReqType::Read | ReqType::Write)
    }
}

impl fmt::Display for ReqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReqType::Read => "READ",
            ReqType::Write => "WRITE",
            ReqType::Replace => "REPLACE",
            ReqType::Compute => "COMPUTE",
        };
        f.write_str(s)
    }
}

/// Request message sent from a core toward the cache subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ReqMsg {
    /// Unique message identifier.
    pub msg_id: MsgId,
    /// Originating core.
    pub core_id: u16,
    /// Operation type.
    pub req_type: ReqType,
    /// Memory address; zero for compute requests.
    pub addr: u64,
    /// Core cycle at which the driver created the request.
    pub cycle: u64,
}

/// Response message returned by the cache subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RespMsg {
    /// Identifier of the original request.
    pub msg_id: MsgId,
    /// Memory address of the original request.
    pub addr: u64,
    /// Cycle the request was issued.
    pub req_cycle: u64,
    /// Cycle the response was produced.
    pub cycle: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_id_ordering_follows_allocation() {
        let ids: Vec<MsgId> = (0..4).map(MsgId).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_req_type_memory_classification() {
        assert!(ReqType::Read.is_memory());
        assert!(ReqType::Write.is_memory());
        assert!(!ReqType::Compute.is_memory());
        assert!(!ReqType::Replace.is_memory());
    }
}
