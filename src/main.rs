//! DRAM Timing Simulator CLI.
//!
//! The main executable for the simulator. It handles command-line argument
//! parsing, configuration loading and the access loop.
//!
//! # Usage
//!
//! The simulator can run in two modes:
//! 1. **Handoff Mode** (default): Waits for an instruction-set simulator to
//!    write accesses into the memory file and answers each with the total
//!    latency in the signal file.
//! 2. **Replay Mode**: Replays a complete trace file (`--trace`) and writes
//!    one latency per line.

use clap::Parser;
use log::{error, info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

extern crate dram_simulator;

use dram_simulator::common::{ConfigError, SimError};
use dram_simulator::config::{self, GeometryOverrides};
use dram_simulator::memory::{AddressCodec, DeviceGeometry};
use dram_simulator::sim::handoff::{
    MemoryFileSource, SignalFileSink, DEFAULT_MEMORY_FILE, DEFAULT_POLL_INTERVAL,
    DEFAULT_SIGNAL_FILE,
};
use dram_simulator::sim::interrupt;
use dram_simulator::sim::replay::{ReplaySource, WriterSink};
use dram_simulator::sim::{Interrupt, Simulator};
use dram_simulator::stats::StatsReport;

const EXIT_CONFIG: i32 = 1;
const EXIT_DECODE: i32 = 2;
const EXIT_RUNTIME: i32 = 3;

/// Command-line arguments for the DRAM timing simulator.
///
/// Geometry options replace the corresponding values of the configuration
/// document before it is validated.
#[derive(Parser, Debug)]
#[command(author, version, about = "DRAM Row Buffer Timing Simulator")]
struct Args {
    #[arg(short, long, default_value = "specs.yml")]
    config: PathBuf,

    #[arg(long, default_value = DEFAULT_MEMORY_FILE)]
    memory_file: PathBuf,

    #[arg(long, default_value = DEFAULT_SIGNAL_FILE)]
    signal_file: PathBuf,

    /// Polling interval in microseconds.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_micros() as u64)]
    poll_us: u64,

    /// Replay a trace file instead of waiting for a producer.
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Where replay mode writes latencies (stdout if omitted).
    #[arg(long)]
    latency_out: Option<PathBuf>,

    #[arg(short, long, default_value = "results.txt")]
    results: PathBuf,

    /// Also print the statistics as JSON.
    #[arg(long)]
    json: bool,

    /// Total DRAM capacity in GB.
    #[arg(long)]
    capacity: Option<i64>,

    /// Number of chips.
    #[arg(long)]
    chips: Option<i64>,

    /// Chip capacity in MB.
    #[arg(long)]
    chip_capacity: Option<i64>,

    #[arg(long)]
    rows: Option<i64>,

    #[arg(long)]
    columns: Option<i64>,

    #[arg(long)]
    banks: Option<i64>,
}

impl Args {
    fn overrides(&self) -> GeometryOverrides {
        GeometryOverrides {
            capacity: self.capacity,
            chips: self.chips,
            chip_capacity: self.chip_capacity,
            rows: self.rows,
            columns: self.columns,
            banks: self.banks,
        }
    }
}

fn load_geometry(args: &Args) -> Result<DeviceGeometry, ConfigError> {
    let mut raw = config::load_config(&args.config)?;
    let overrides = args.overrides();
    if !overrides.is_empty() {
        info!("applying command-line geometry overrides");
        overrides.apply(&mut raw);
    }
    let geometry = DeviceGeometry::from_config(&raw)?;
    info!(
        "{}: {} GB from {} x {} MB chips, {} address bits",
        args.config.display(),
        geometry.total_capacity_gb(),
        geometry.chip_count(),
        geometry.chip_capacity_mb(),
        geometry.address_bits()
    );
    Ok(geometry)
}

fn print_banner(geometry: &DeviceGeometry) {
    let codec = AddressCodec::new(geometry);
    let widths = codec.widths();
    let timing = geometry.timing();

    println!("DRAM Configuration");
    println!("--------------------");
    println!("Device:");
    println!("  Capacity:           {} GB", geometry.total_capacity_gb());
    println!("  Clock Multiplier:   {}", geometry.clock_multiplier());
    println!("  Reset Policy:       {:?}", geometry.reset_policy());
    println!("  Initial Wait:       {}", geometry.initial_wait());
    println!("Chips:");
    println!("  Number:             {}", geometry.chip_count());
    println!("  Capacity:           {} MB", geometry.chip_capacity_mb());
    println!("  Rows:               {}", geometry.rows());
    println!("  Banks:              {}", geometry.banks());
    println!("  Columns:            {}", geometry.columns());
    println!("Address:");
    println!("  Width:              {} bits", codec.address_bits());
    println!(
        "  Fields:             row {} | chip {} | bank {} | column {}",
        widths.row, widths.chip, widths.bank, widths.column
    );
    println!("Timings (cycles):");
    println!(
        "  RP {} | RCD {} | CL {} | WR {}",
        timing.rp, timing.rcd, timing.cl, timing.wr
    );
    println!("--------------------");

    if widths.total() > codec.address_bits() {
        warn!(
            "address fields need {} bits but addresses only have {}; every access will fail to decode",
            widths.total(),
            codec.address_bits()
        );
    }
}

fn run(args: &Args, sim: &mut Simulator, interrupt: Interrupt) -> Result<StatsReport, SimError> {
    if let Some(trace_path) = &args.trace {
        println!("[*] Replay Mode");
        println!("    Trace: {}", trace_path.display());
        let mut source = ReplaySource::open(trace_path, interrupt)?;
        let out: Box<dyn Write> = match &args.latency_out {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(io::stdout().lock()),
        };
        let mut sink = WriterSink::new(out);
        let report = sim.run(&mut source, &mut sink)?;
        sink.into_inner().flush()?;
        Ok(report)
    } else {
        println!("[*] Handoff Mode");
        println!("    Memory File: {}", args.memory_file.display());
        println!("    Signal File: {}", args.signal_file.display());
        let poll = Duration::from_micros(args.poll_us);
        let mut source = MemoryFileSource::new(args.memory_file.clone(), poll, interrupt.clone())
            .gated_by(args.signal_file.clone());
        let mut sink = SignalFileSink::new(args.signal_file.clone(), poll, interrupt);
        sim.run(&mut source, &mut sink)
    }
}

fn emit_report(report: &StatsReport, results: &Path, json: bool) {
    if report.is_empty() {
        warn!("no accesses recorded, statistics report holds counters only");
    }
    if report.counters.is_saturated() {
        warn!("a time sum saturated at u64::MAX, its average is a lower bound");
    }
    report.print();

    if let Err(e) = report.save(results) {
        error!("could not write statistics to {}: {}", results.display(), e);
    } else {
        info!("statistics written to {}", results.display());
    }

    if json {
        match report.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => error!("could not serialize statistics: {}", e),
        }
    }
}

/// Main entry point for the DRAM timing simulator.
///
/// # Behavior
///
/// 1. **Configuration**: Parses command-line arguments, loads the configuration
///    document and validates the device geometry. Any failure exits before the
///    access loop starts.
/// 2. **Simulation Loop**: Services accesses until a `HALT` record, the end of
///    a replayed trace, or SIGINT/SIGTERM.
/// 3. **Teardown**: Prints and saves the statistics. A decode failure still
///    reports the statistics gathered so far, then exits with its own code.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let geometry = match load_geometry(&args) {
        Ok(geometry) => geometry,
        Err(e) => {
            error!("configuration error: {}", e);
            process::exit(EXIT_CONFIG);
        }
    };
    print_banner(&geometry);

    let interrupt = interrupt::install_handler();
    let mut sim = Simulator::new(geometry);

    let code = match run(&args, &mut sim, interrupt) {
        Ok(report) => {
            emit_report(&report, &args.results, args.json);
            0
        }
        Err(e) => {
            let code = match e {
                SimError::Decode(_) => EXIT_DECODE,
                SimError::Config(_) => EXIT_CONFIG,
                _ => EXIT_RUNTIME,
            };
            error!("simulation aborted: {}", e);
            emit_report(&sim.report(), &args.results, args.json);
            code
        }
    };

    io::stdout().flush().ok();
    process::exit(code);
}
