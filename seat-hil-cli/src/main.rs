//! Seat Comfort Module HIL Bench CLI
//!
//! Command-line front end for the seat-hil-bench library. It adds:
//! - TOML configuration with command-line overrides
//! - Logging setup
//! - Text/JSON/HTML report generation
//! - A process exit status reflecting the overall result

use anyhow::{Context, Result};
use clap::Parser;
use seat_hil_bench::{virtual_bus, Bench, SimulatedSeatModule};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// Seat HIL Bench - boot-up and fault reaction tests over CAN
#[derive(Parser, Debug)]
#[command(name = "seat-hil-cli")]
#[command(about = "Run the seat comfort module HIL test suite", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory to write the report into (default: stdout)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Simulated boot delay in milliseconds
    #[arg(long, value_name = "MS")]
    boot_delay_ms: Option<u64>,

    /// Simulated fault reaction latency in milliseconds
    #[arg(long, value_name = "MS")]
    fault_latency_ms: Option<u64>,

    /// Simulated module never sends SystemReady
    #[arg(long)]
    no_ready: bool,

    /// Simulated module never sends ErrorFrame
    #[arg(long)]
    no_error_frames: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Seat HIL Bench CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using bench library v{}", seat_hil_bench::VERSION);

    let config = resolve_config(&args)?;
    log::debug!("Effective configuration: {:?}", config);

    log::info!("Initializing test environment...");
    log::info!(
        "- CAN bus ready ({} channel {}, {} bit/s)",
        config.bus.interface,
        config.bus.channel,
        config.bus.bitrate
    );

    let (bus_tx, bus) = virtual_bus();
    let module = SimulatedSeatModule::new(bus_tx, config.simulation.clone())
        .with_channel(config.bus.channel);
    log::info!("- Simulated seat module attached");

    let mut bench = Bench::new(bus, module, &config.bench).context("Failed to start bench")?;
    log::info!("Starting test execution sequence...");

    let summary = bench.run_suite();
    bench.shutdown();
    summary.log_report();

    match &config.output.output_dir {
        Some(dir) => {
            let path = report::write_report(&summary, config.output.format, dir)?;
            if !args.quiet {
                println!("Report written to {}", path.display());
            }
        }
        None => {
            if !args.quiet {
                println!("{}", report::render(&summary, config.output.format)?);
            }
        }
    }

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load the config file (if any) and apply command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(dir) = &args.output_dir {
        config.output.output_dir = Some(dir.clone());
    }
    if let Some(delay) = args.boot_delay_ms {
        config.simulation.boot_delay_ms = delay;
    }
    if let Some(latency) = args.fault_latency_ms {
        config.simulation.fault_latency_ms = latency;
    }
    if args.no_ready {
        config.simulation.emit_ready = false;
    }
    if args.no_error_frames {
        config.simulation.emit_error_frames = false;
    }

    config.validate()?;
    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
