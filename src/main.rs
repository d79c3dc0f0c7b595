//! DRAM Subsystem Simulator CLI.
//!
//! The main executable for the simulator. It handles command-line argument
//! parsing, subsystem construction, initiator binding, and the simulation
//! event loop.
//!
//! # Usage
//!
//! The simulator takes an optional base configuration file and an optional
//! resource directory; both default so `dram-sim` runs the bundled DDR4
//! example out of the box. Memory specification JSON files and trace files
//! are resolved relative to the resource directory.

use clap::Parser;
use std::path::Path;
use std::process;
use std::time::Instant;

extern crate dram_sim;

use dram_sim::config::{InitiatorConfig, SimConfig};
use dram_sim::sim::Simulator;

/// Command-line arguments for the DRAM subsystem simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "DRAM Subsystem Timing Simulator")]
struct Args {
    /// Base configuration file.
    #[arg(short, long, default_value = "configs/ddr4-example.toml")]
    config: String,

    /// Resource directory holding memspecs and traces.
    #[arg(short, long, default_value = "configs")]
    resources: String,
}

/// Main entry point for the DRAM subsystem simulator.
///
/// # Behavior
///
/// 1. **Configuration**: Parses command-line arguments and loads the TOML
///    configuration file.
/// 2. **Initialization**: Constructs the memory subsystem (specification,
///    checker, per-rank schedulers) and the configured traffic initiators.
/// 3. **Simulation Loop**: Runs the discrete-event loop until every
///    initiator signals completion or a fatal protocol violation occurs.
/// 4. **Teardown**: Prints simulation statistics and wall-clock elapsed
///    time.
fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match SimConfig::from_path(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            process::exit(1);
        }
    };

    println!("Global Configuration");
    println!("--------------------");
    println!("Simulation:");
    println!("  Name:               {}", config.simulation.name);
    println!("  Memspec:            {}", config.memspec.file);
    println!("Controller:");
    println!("  Refresh Policy:     {:?}", config.controller.refresh_policy);
    println!("  Refresh Management: {}", config.controller.refresh_management);
    println!(
        "  Flexibility:        postpone {} / pull-in {}",
        config.controller.max_postponed, config.controller.max_pulledin
    );
    println!(
        "  Power Down:         {:?}",
        config.controller.power_down_policy
    );
    println!("Initiators:");
    for initiator in &config.initiators {
        match initiator {
            InitiatorConfig::Generator(g) => {
                println!(
                    "  Generator:          {} ({} requests, {:?})",
                    g.name, g.num_requests, g.pattern
                );
            }
            InitiatorConfig::Player(p) => {
                println!("  Player:             {} ({} MHz)", p.name, p.clk_mhz);
            }
            InitiatorConfig::Hammer(h) => {
                println!(
                    "  Hammer:             {} ({} requests, +{} rows)",
                    h.name, h.num_requests, h.row_increment
                );
            }
        }
    }
    println!("--------------------");

    let mut sim = match Simulator::new(&config, Path::new(&args.resources)) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            process::exit(1);
        }
    };

    println!(
        "[*] Running {} requests against {}",
        sim.total_requests(),
        config.memspec.file
    );

    let start = Instant::now();
    if let Err(e) = sim.run() {
        eprintln!("\n[!] FATAL: {}", e);
        sim.stats().print();
        process::exit(1);
    }

    sim.stats().print();
    println!(
        "\n[*] Simulation took {:.4} seconds.",
        start.elapsed().as_secs_f64()
    );
}
