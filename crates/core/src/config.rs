//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (queue capacities, commit
//!    width, memory latency, clocking).
//! 2. **Structures:** Hierarchical config for the engine, the memory model,
//!    the harness, and the per-core settings.
//!
//! Configuration is supplied as JSON (deserialized with serde) or built in
//! code starting from `Config::default()`.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline configuration when not explicitly
/// overridden in a JSON configuration file.
mod defaults {
    /// Reorder buffer capacity (entries).
    pub const ROB_CAPACITY: usize = 32;

    /// Maximum instructions retired from the ROB head per cycle.
    pub const COMMIT_WIDTH: usize = 4;

    /// Load/store queue capacity (entries).
    ///
    /// An alternate configuration uses 8; both are runtime constants.
    pub const LSQ_CAPACITY: usize = 16;

    /// Maximum concurrent outstanding memory requests per core.
    pub const OOO_STAGES: u32 = 16;

    /// Depth of the transmit and receive FIFOs between a core and its cache.
    pub const FIFO_DEPTH: usize = 16;

    /// Per-cycle clock advance in nanoseconds.
    pub const DT_NS: f64 = 1.0;

    /// Initial delay before a core's first step, in nanoseconds.
    pub const CLK_SKEW_NS: f64 = 0.0;

    /// Memory model response latency in cycles.
    pub const MEM_LATENCY: u64 = 20;

    /// Requests the memory model drains from the transmit FIFO per cycle.
    pub const MEM_ACCEPTS_PER_CYCLE: usize = 1;

    /// Watchdog cycle limit per core (0 = unlimited).
    pub const MAX_CYCLES: u64 = 0;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Deserializing from JSON:
///
/// ```
/// use mcsim_core::config::Config;
///
/// let json = r#"{
///     "rob": { "capacity": 64, "commit_width": 2 },
///     "lsq": { "capacity": 8 },
///     "mem": { "latency_cycles": 50 },
///     "cores": [
///         { "core_id": 0, "bm_file": "trace0.txt", "ooo_stages": 4 }
///     ]
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.rob.capacity, 64);
/// assert_eq!(config.lsq.capacity, 8);
/// assert_eq!(config.cores[0].ooo_stages, 4);
/// assert_eq!(config.cores[0].dt_ns, 1.0);
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Reorder buffer parameters.
    #[serde(default)]
    pub rob: RobConfig,
    /// Load/store queue parameters.
    #[serde(default)]
    pub lsq: LsqConfig,
    /// Memory model parameters.
    #[serde(default)]
    pub mem: MemConfig,
    /// Harness parameters.
    #[serde(default)]
    pub sim: SimConfig,
    /// One entry per simulated core.
    #[serde(default)]
    pub cores: Vec<CoreConfig>,
}

/// Reorder buffer parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RobConfig {
    /// Maximum in-flight instructions.
    #[serde(default = "RobConfig::default_capacity")]
    pub capacity: usize,

    /// Maximum retirements per cycle.
    #[serde(default = "RobConfig::default_commit_width")]
    pub commit_width: usize,
}

impl RobConfig {
    /// Returns the default reorder buffer capacity.
    fn default_capacity() -> usize {
        defaults::ROB_CAPACITY
    }

    /// Returns the default commit width.
    fn default_commit_width() -> usize {
        defaults::COMMIT_WIDTH
    }
}

impl Default for RobConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::ROB_CAPACITY,
            commit_width: defaults::COMMIT_WIDTH,
        }
    }
}

/// Load/store queue parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LsqConfig {
    /// Maximum queued memory operations.
    #[serde(default = "LsqConfig::default_capacity")]
    pub capacity: usize,
}

impl LsqConfig {
    /// Returns the default load/store queue capacity.
    fn default_capacity() -> usize {
        defaults::LSQ_CAPACITY
    }
}

impl Default for LsqConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::LSQ_CAPACITY,
        }
    }
}

/// Memory model parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MemConfig {
    /// Cycles between accepting a request and producing its response.
    #[serde(default = "MemConfig::default_latency")]
    pub latency_cycles: u64,

    /// Requests drained from the transmit FIFO per cycle.
    #[serde(default = "MemConfig::default_accepts")]
    pub accepts_per_cycle: usize,
}

impl MemConfig {
    /// Returns the default memory response latency in cycles.
    fn default_latency() -> u64 {
        defaults::MEM_LATENCY
    }

    /// Returns the default number of requests accepted per cycle.
    fn default_accepts() -> usize {
        defaults::MEM_ACCEPTS_PER_CYCLE
    }
}

impl Default for MemConfig {
    fn default() -> Self {
        Self {
            latency_cycles: defaults::MEM_LATENCY,
            accepts_per_cycle: defaults::MEM_ACCEPTS_PER_CYCLE,
        }
    }
}

/// Harness parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SimConfig {
    /// Depth of the per-core transmit/receive FIFOs.
    #[serde(default = "SimConfig::default_fifo_depth")]
    pub fifo_depth: usize,

    /// Watchdog: stop scheduling a core past this cycle count (0 = unlimited).
    #[serde(default = "SimConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl SimConfig {
    /// Returns the default channel FIFO depth.
    fn default_fifo_depth() -> usize {
        defaults::FIFO_DEPTH
    }

    /// Returns the default watchdog cycle limit.
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fifo_depth: defaults::FIFO_DEPTH,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Per-core settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Unique core identifier.
    pub core_id: u16,

    /// Benchmark trace file path.
    pub bm_file: String,

    /// Output path for the per-cycle CPU event log.
    #[serde(default)]
    pub cpu_trace_file: Option<String>,

    /// Output path for the channel-level event log.
    #[serde(default)]
    pub ctrl_trace_file: Option<String>,

    /// Per-cycle clock advance in nanoseconds.
    #[serde(default = "CoreConfig::default_dt_ns")]
    pub dt_ns: f64,

    /// Initial delay before the first step, in nanoseconds.
    #[serde(default = "CoreConfig::default_clk_skew_ns")]
    pub clk_skew_ns: f64,

    /// Enables writing human-readable cycle-level event logs.
    #[serde(default)]
    pub log_enable: bool,

    /// Maximum concurrent outstanding memory requests.
    #[serde(default = "CoreConfig::default_ooo_stages")]
    pub ooo_stages: u32,
}

impl CoreConfig {
    /// Creates a core configuration with default clocking and window.
    pub fn new(core_id: u16, bm_file: impl Into<String>) -> Self {
        Self {
            core_id,
            bm_file: bm_file.into(),
            cpu_trace_file: None,
            ctrl_trace_file: None,
            dt_ns: defaults::DT_NS,
            clk_skew_ns: defaults::CLK_SKEW_NS,
            log_enable: false,
            ooo_stages: defaults::OOO_STAGES,
        }
    }

    /// Returns the default per-cycle clock advance.
    fn default_dt_ns() -> f64 {
        defaults::DT_NS
    }

    /// Returns the default clock skew.
    fn default_clk_skew_ns() -> f64 {
        defaults::CLK_SKEW_NS
    }

    /// Returns the default out-of-order window.
    fn default_ooo_stages() -> u32 {
        defaults::OOO_STAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rob.capacity, 32);
        assert_eq!(config.rob.commit_width, 4);
        assert_eq!(config.lsq.capacity, 16);
        assert_eq!(config.sim.fifo_depth, 16);
        assert_eq!(config.sim.max_cycles, 0);
        assert!(config.cores.is_empty());
    }

    #[test]
    fn test_core_config_new() {
        let core = CoreConfig::new(3, "bench.trc");
        assert_eq!(core.core_id, 3);
        assert_eq!(core.bm_file, "bench.trc");
        assert_eq!(core.dt_ns, 1.0);
        assert!(!core.log_enable);
    }
}
