//! # Telestep Drive
//!
//! Receiver node binary. Opens the radio receive pipe, performs RT
//! setup, and enters the fixed-cadence drive loop until interrupted.
//!
//! The binary currently assembles the simulation backends (in-memory
//! link, software step generators, recorded enable pin); hardware
//! backends plug in through the same capability traits without
//! touching the loop. With no transmitter feeding the in-memory link
//! the node idles quiescent, which makes it a convenient soak rig for
//! the timing and shutdown paths.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use telestep_common::command::Axis;
use telestep_common::config::{ConfigError, ConfigLoader, DriveConfig, LogLevel};
use telestep_drive::axis::AxisDriver;
use telestep_drive::cycle::{rt_setup, CycleRunner};
use telestep_drive::drivers::{memlink::MemoryLink, pin::RecordedPin, softstep::SoftStep};
use telestep_drive::interlock::InterlockController;
use telestep_drive::link::LinkReceiver;

/// Telestep Drive — wireless three-axis stepper receiver
#[derive(Parser, Debug)]
#[command(name = "telestep_drive")]
#[command(version)]
#[command(about = "Fail-safe drive loop for a wireless three-axis stepper node")]
struct Args {
    /// Path to the drive configuration TOML. Built-in defaults apply
    /// when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// CPU core to pin the drive loop to (default: 1).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (default: 80).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            process::exit(2);
        }
    };
    setup_tracing(&args, config.log_level);

    info!("Telestep Drive v{} starting...", env!("CARGO_PKG_VERSION"));
    match &args.config {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("no --config given, using built-in defaults"),
    }

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Telestep Drive shutdown complete");
}

fn run(args: &Args, config: &DriveConfig) -> Result<(), Box<dyn std::error::Error>> {
    let address = config.pipe_address()?;
    let interval = Duration::from_millis(config.cycle.interval_ms);
    info!(
        %address,
        interval_ms = config.cycle.interval_ms,
        velocity_bound = config.motion.velocity_bound,
        acceleration_limit = config.motion.acceleration_limit,
        "Config OK"
    );

    // RT setup (mlockall, affinity, scheduler).
    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        cpu_core = args.cpu_core,
        priority = args.rt_priority,
        "RT setup complete"
    );

    // Assemble the node from the simulation backends.
    let receiver = LinkReceiver::open(MemoryLink::new(), &address)?;
    let interlock = InterlockController::new(RecordedPin::new());
    let axes = [Axis::X, Axis::Y, Axis::Z].map(|axis| {
        AxisDriver::new(
            axis,
            SoftStep::with_tick(interval),
            config.motion.velocity_bound,
            config.motion.acceleration_limit,
        )
    });
    let mut runner = CycleRunner::new(receiver, interlock, axes, interval);

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    runner.run(&running);

    let stats = runner.stats();
    let link = runner.receiver().stats();
    info!(
        cycles = stats.cycles,
        active = stats.active,
        quiescent = stats.quiescent,
        overruns = stats.overruns,
        avg_cycle_us = stats.avg_cycle_ns() / 1_000,
        datagrams = link.datagrams,
        malformed = link.malformed,
        "Final cycle statistics"
    );

    Ok(())
}

/// Load and validate the drive configuration, or fall back to the
/// built-in defaults when no path is given.
fn load_config(path: Option<&Path>) -> Result<DriveConfig, ConfigError> {
    let config = match path {
        Some(path) => DriveConfig::load(path)?,
        None => DriveConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Setup tracing subscriber from CLI arguments and the configured
/// log level. `--verbose` overrides the configuration.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level: Level = if args.verbose {
        Level::DEBUG
    } else {
        level.into()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
