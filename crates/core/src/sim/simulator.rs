//! Multi-core simulation harness.
//!
//! Builds one driver, channel, and memory model per configured core, then
//! runs the discrete-event loop: each event steps one core and its memory
//! side, and reschedules the core one clock period later until its driver
//! reports done. Cores share nothing; they interleave only through event
//! timestamps, honoring per-core clock period and skew.

use log::warn;

use crate::common::error::SimError;
use crate::config::Config;
use crate::engine::driver::CoreDriver;
use crate::mem::channel::CacheChannel;
use crate::mem::latency::FixedLatencyMemory;
use crate::sim::scheduler::{Scheduler, ns_to_ps};

/// Multi-core simulator: drivers, channels, memory models, event queue.
pub struct Simulator {
    drivers: Vec<CoreDriver>,
    channels: Vec<CacheChannel>,
    memories: Vec<FixedLatencyMemory>,
    scheduler: Scheduler,
    /// Watchdog cycle limit per core (0 = unlimited).
    max_cycles: u64,
}

impl Simulator {
    /// Builds a simulator from configuration, opening every core's trace.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        if config.cores.is_empty() {
            return Err(SimError::NoCores);
        }

        let mut drivers = Vec::with_capacity(config.cores.len());
        let mut channels = Vec::with_capacity(config.cores.len());
        let mut memories = Vec::with_capacity(config.cores.len());
        let mut scheduler = Scheduler::new();

        for (idx, core) in config.cores.iter().enumerate() {
            drivers.push(CoreDriver::new(config, core)?);
            channels.push(CacheChannel::new(config.sim.fifo_depth));
            memories.push(FixedLatencyMemory::from_config(&config.mem));
            scheduler.schedule(ns_to_ps(core.clk_skew_ns), idx);
        }

        Ok(Self {
            drivers,
            channels,
            memories,
            scheduler,
            max_cycles: config.sim.max_cycles,
        })
    }

    /// Runs the event loop until every core is done (or hits the watchdog).
    pub fn run(&mut self) {
        while let Some((now_ps, idx)) = self.scheduler.next() {
            let driver = &mut self.drivers[idx];
            let chan = &mut self.channels[idx];

            let running = driver.step(chan);
            self.memories[idx].step(chan);

            if !running {
                continue;
            }
            if self.max_cycles > 0 && driver.cycle() >= self.max_cycles {
                warn!(
                    "[core {}] watchdog: stopped at cycle {} before completion",
                    driver.core_id(),
                    driver.cycle()
                );
                continue;
            }
            self.scheduler.schedule_after(now_ps, driver.dt_ns(), idx);
        }
    }

    /// Returns true once every core's driver has raised its done flag.
    pub fn all_done(&self) -> bool {
        self.drivers.iter().all(|d| d.done())
    }

    /// The per-core drivers, for inspection and reporting.
    pub fn drivers(&self) -> &[CoreDriver] {
        &self.drivers
    }

    /// Prints the end-of-simulation summary for every core.
    pub fn print_summary(&self) {
        println!("\n==========================================================");
        println!("SIMULATION SUMMARY");
        println!("==========================================================");
        for driver in &self.drivers {
            driver.stats().print(driver.core_id());
        }
        println!("----------------------------------------------------------");
    }
}
