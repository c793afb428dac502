//! Trace-driven multi-core memory-system simulator CLI.
//!
//! This binary provides a single entry point for running simulations. It
//! performs:
//! 1. **Config run:** Load a JSON configuration describing every core.
//! 2. **Quick run:** Build a default configuration from one trace file per
//!    core passed on the command line.
//! 3. **Reporting:** Run to completion and print the per-core summary.

use clap::{Parser, Subcommand};
use std::{fs, process};

use mcsim_core::Simulator;
use mcsim_core::config::{Config, CoreConfig};

#[derive(Parser, Debug)]
#[command(
    name = "mcsim",
    author,
    version,
    about = "Trace-driven multi-core memory-system simulator",
    long_about = "Run benchmark traces through per-core out-of-order issue/commit \
engines over a simulated memory hierarchy.\n\nExamples:\n  \
mcsim run -t traces/core0.trc -t traces/core1.trc\n  \
mcsim run -c config.json --max-cycles 1000000"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a simulation from a config file or ad-hoc trace files.
    Run {
        /// JSON configuration file describing the cores.
        #[arg(short, long)]
        config: Option<String>,

        /// Benchmark trace file; repeat once per core (core ids assigned
        /// in order).
        #[arg(short, long)]
        trace: Vec<String>,

        /// Enable per-core cycle-level event logs (<trace>.cpu.log and
        /// <trace>.ctrl.log next to each trace file).
        #[arg(long)]
        log: bool,

        /// Watchdog: stop any core past this cycle count (0 = unlimited).
        #[arg(long)]
        max_cycles: Option<u64>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            config,
            trace,
            log,
            max_cycles,
        }) => cmd_run(config, trace, log, max_cycles),
        None => {
            eprintln!("mcsim — pass a subcommand");
            eprintln!();
            eprintln!("  mcsim run -t <trace> [-t <trace> ...]   Ad-hoc run");
            eprintln!("  mcsim run -c <config.json>              Configured run");
            eprintln!();
            eprintln!("  mcsim --help  for full options");
            process::exit(1);
        }
    }
}

/// Builds the configuration, runs the simulation, and prints the summary.
fn cmd_run(config_path: Option<String>, traces: Vec<String>, log: bool, max_cycles: Option<u64>) {
    let mut config = match config_path {
        Some(path) => load_config(&path),
        None => Config::default(),
    };

    let base_id = config.cores.len() as u16;
    for (idx, trace) in traces.iter().enumerate() {
        let core_id = base_id + idx as u16;
        let mut core = CoreConfig::new(core_id, trace.clone());
        if log {
            core.log_enable = true;
            core.cpu_trace_file = Some(format!("{trace}.cpu.log"));
            core.ctrl_trace_file = Some(format!("{trace}.ctrl.log"));
        }
        config.cores.push(core);
    }
    if let Some(limit) = max_cycles {
        config.sim.max_cycles = limit;
    }

    if config.cores.is_empty() {
        eprintln!("Error: no cores configured; pass --trace or a config file with cores");
        process::exit(1);
    }

    println!("Configuration: {} core(s)", config.cores.len());
    println!(
        "  ROB: {} entries, commit width {}  LSQ: {} entries  mem latency: {} cycles",
        config.rob.capacity, config.rob.commit_width, config.lsq.capacity, config.mem.latency_cycles
    );
    for core in &config.cores {
        println!(
            "  core {}: trace={} window={} dt={}ns",
            core.core_id, core.bm_file, core.ooo_stages, core.dt_ns
        );
    }

    let mut sim = Simulator::new(&config).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    });

    sim.run();

    if !sim.all_done() {
        eprintln!("\n[!] Watchdog expired before all cores finished");
        sim.print_summary();
        process::exit(2);
    }

    sim.print_summary();
}

/// Reads and parses a JSON configuration file; exits on failure.
fn load_config(path: &str) -> Config {
    let contents = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config {path}: {e}");
        process::exit(1);
    });
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("Error parsing config {path}: {e}");
        process::exit(1);
    })
}
