//! Human-readable cycle-level event logs.
//!
//! When a core's `log_enable` option is set, retirement events are appended
//! to `cpu_trace_file` and channel-level traffic to `ctrl_trace_file`.
//! Write failures after creation are ignored; logs are diagnostics, not
//! simulation state.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::common::error::SimError;
use crate::common::msg::{ReqMsg, RespMsg};
use crate::config::CoreConfig;

/// Buffered writers for a core's event logs.
pub struct TraceLog {
    cpu: Option<BufWriter<File>>,
    ctrl: Option<BufWriter<File>>,
}

impl TraceLog {
    /// Creates the log writers for a core.
    ///
    /// Returns `None` when logging is disabled or no output path is
    /// configured; file-creation failures are fatal.
    pub fn create(config: &CoreConfig) -> Result<Option<Self>, SimError> {
        if !config.log_enable {
            return Ok(None);
        }
        let cpu = config
            .cpu_trace_file
            .as_deref()
            .map(Self::open_writer)
            .transpose()?;
        let ctrl = config
            .ctrl_trace_file
            .as_deref()
            .map(Self::open_writer)
            .transpose()?;
        if cpu.is_none() && ctrl.is_none() {
            return Ok(None);
        }
        Ok(Some(Self { cpu, ctrl }))
    }

    fn open_writer(path: &str) -> Result<BufWriter<File>, SimError> {
        let file = File::create(path).map_err(|source| SimError::TraceLogCreate {
            path: path.to_string(),
            source,
        })?;
        Ok(BufWriter::new(file))
    }

    /// Records an instruction retirement.
    pub fn record_retire(&mut self, cycle: u64, req: &ReqMsg) {
        if let Some(w) = self.cpu.as_mut() {
            writeln!(
                w,
                "{cycle} RETIRE {} {} addr={:#x} issued={}",
                req.req_type, req.msg_id, req.addr, req.cycle
            )
            .ok();
        }
    }

    /// Records a request handed to the cache.
    pub fn record_tx(&mut self, cycle: u64, req: &ReqMsg) {
        if let Some(w) = self.ctrl.as_mut() {
            writeln!(
                w,
                "{cycle} TX {} {} addr={:#x}",
                req.req_type, req.msg_id, req.addr
            )
            .ok();
        }
    }

    /// Records a response consumed from the cache.
    pub fn record_rx(&mut self, cycle: u64, resp: &RespMsg) {
        if let Some(w) = self.ctrl.as_mut() {
            writeln!(
                w,
                "{cycle} RX {} addr={:#x} issued={} answered={}",
                resp.msg_id, resp.addr, resp.req_cycle, resp.cycle
            )
            .ok();
        }
    }

    /// Writes the end-of-simulation marker and flushes both logs.
    pub fn finish(&mut self, cycle: u64) {
        for w in [self.cpu.as_mut(), self.ctrl.as_mut()].into_iter().flatten() {
            writeln!(w, "{cycle} END").ok();
            w.flush().ok();
        }
    }
}
