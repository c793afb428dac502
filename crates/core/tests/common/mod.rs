use std::io::Cursor;

use mcsim_core::config::{Config, CoreConfig};
use mcsim_core::engine::driver::CoreDriver;
use mcsim_core::engine::trace::TraceReader;
use mcsim_core::mem::channel::CacheChannel;
use mcsim_core::mem::latency::FixedLatencyMemory;

/// Single-core test rig: driver, channel, and memory model stepped together.
pub struct TestContext {
    pub driver: CoreDriver,
    pub chan: CacheChannel,
    pub mem: FixedLatencyMemory,
}

impl TestContext {
    /// Builds a rig over an in-memory trace, with config overrides applied
    /// before construction.
    pub fn new(trace: &str, configure: impl FnOnce(&mut Config, &mut CoreConfig)) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut config = Config::default();
        let mut core = CoreConfig::new(0, "unused.trc");
        configure(&mut config, &mut core);

        let reader = TraceReader::from_reader(Cursor::new(trace.to_string()));
        let driver = CoreDriver::with_trace(&config, &core, reader).expect("driver");
        let chan = CacheChannel::new(config.sim.fifo_depth);
        let mem = FixedLatencyMemory::from_config(&config.mem);

        Self { driver, chan, mem }
    }

    /// Runs one cycle of the core and its memory side. Returns whether the
    /// core still wants to be scheduled.
    pub fn step(&mut self) -> bool {
        let running = self.driver.step(&mut self.chan);
        self.mem.step(&mut self.chan);
        running
    }

    /// Steps until the driver reports done; panics past `max` cycles.
    /// Returns the number of cycles stepped.
    pub fn run_to_done(&mut self, max: u64) -> u64 {
        for cycle in 0..max {
            if !self.step() {
                return cycle;
            }
        }
        panic!("core did not finish within {max} cycles");
    }
}
