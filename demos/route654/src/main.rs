//! route654 — bus route 654 boarding simulation.
//!
//! Replays a day of scheduled trips between two terminals.  Each trip record
//! also stands for one passenger arriving at the trip's start terminal at its
//! scheduled time; buses board waiting passengers FIFO up to capacity and
//! leave.  Prints the headline statistics, a waiting-time histogram and a
//! per-bus utilization chart, and writes `boardings.csv` /
//! `bus_utilization.csv`.
//!
//! ```text
//! route654 --trips demos/route654/data/trips.csv --capacity 40
//! route654 --buses 12 --trips-per-bus 10 --sweep 10,20,40,60
//! RUST_LOG=bl_sim=debug route654
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bl_core::{SimConfig, SimRng, SimTime};
use bl_output::{CsvWriter, HistogramBin, SimOutputObserver, Summary, wait_histogram};
use bl_schedule::{SyntheticSpec, TripDataset, generate_trips, load_trips_csv};
use bl_sim::{BusUtilization, SimBuilder, capacity_sweep};

// ── Constants ─────────────────────────────────────────────────────────────────

const FIRST_BUS_ID: u64   = 654_001;
const BAR_WIDTH:    usize = 40;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "route654", about = "Simulate passenger boarding on a bus route")]
struct Args {
    /// Trip CSV (deviceid,date,start_time,start_terminal,end_terminal,duration_in_mins).
    /// A synthetic day is generated when omitted.
    #[arg(long)]
    trips: Option<PathBuf>,

    /// JSON file with a `SimConfig`; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bus capacity.
    #[arg(long)]
    capacity: Option<u32>,

    /// Stop the run at this many minutes instead of the derived horizon.
    #[arg(long)]
    until: Option<f64>,

    /// Override the generator seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Buses in the synthetic dataset.
    #[arg(long, default_value_t = 8)]
    buses: u32,

    /// Trips per bus in the synthetic dataset.
    #[arg(long, default_value_t = 12)]
    trips_per_bus: u32,

    /// Histogram bins.
    #[arg(long, default_value_t = 50)]
    bins: usize,

    /// Directory for CSV output.
    #[arg(long, default_value = "output/route654")]
    output: PathBuf,

    /// Skip writing output files.
    #[arg(long)]
    no_output: bool,

    /// Also run once per listed capacity and compare.
    #[arg(long, value_delimiter = ',')]
    sweep: Vec<u32>,
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(c) = args.capacity {
        config.bus_capacity = c;
    }
    if let Some(u) = args.until {
        config.until = Some(SimTime(u));
    }
    if let Some(s) = args.seed {
        config.seed = s;
    }
    config.validate()?;
    Ok(config)
}

fn load_dataset(args: &Args, config: &SimConfig) -> Result<TripDataset> {
    if let Some(path) = &args.trips {
        return load_trips_csv(path).with_context(|| format!("loading {}", path.display()));
    }
    let spec = SyntheticSpec {
        buses:         args.buses,
        terminals:     2,
        trips_per_bus: args.trips_per_bus,
        duration_mins: (60.0, 95.0),
        layover_mins:  (5.0, 25.0),
        start: chrono::NaiveDate::from_ymd_opt(2021, 10, 4)
            .and_then(|d| d.and_hms_opt(5, 30, 0))
            .context("synthetic start date")?,
        first_bus_id: FIRST_BUS_ID,
    };
    let records = generate_trips(&spec, &mut SimRng::new(config.seed));
    Ok(TripDataset::new(records)?)
}

// ── Charts ────────────────────────────────────────────────────────────────────

fn bar(count: u64, max: u64) -> String {
    let len = if max == 0 { 0 } else { (count * BAR_WIDTH as u64).div_ceil(max) as usize };
    "#".repeat(len)
}

fn print_histogram(bins: &[HistogramBin]) {
    println!("Waiting time distribution (minutes)");
    let max = bins.iter().map(|b| b.count as u64).max().unwrap_or(0);
    for b in bins.iter().filter(|b| b.count > 0) {
        println!(
            "  {:>7.1} - {:>7.1} | {:>5} {}",
            b.lower,
            b.upper,
            b.count,
            bar(b.count as u64, max)
        );
    }
}

fn print_utilization(utilization: &BusUtilization) {
    println!("Passengers per bus");
    let max = utilization.values().copied().max().unwrap_or(0);
    for (bus, &n) in utilization {
        println!("  {:>10} | {:>5} {}", bus.0, n, bar(n, max));
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let dataset = load_dataset(&args, &config)?;

    println!("=== route654 — bus boarding simulation ===");
    println!(
        "Trips: {}  |  Buses: {}  |  Terminals: {}  |  Capacity: {}",
        dataset.len(),
        dataset.bus_count(),
        dataset.terminals().len(),
        config.bus_capacity
    );
    if let Some(start) = dataset.start_time() {
        println!("First departure: {start}");
    }
    println!();

    // 1. Build.
    let builder = SimBuilder::new(config.clone(), &dataset);
    let horizon = builder.horizon();
    let mut sim = builder.build()?;
    info!(horizon = horizon.0, "simulation built");

    // 2. Run with output attached.
    let t0 = Instant::now();
    let stats = if args.no_output {
        sim.run_to_horizon(&mut bl_sim::NoopObserver)?
    } else {
        std::fs::create_dir_all(&args.output)
            .with_context(|| format!("creating {}", args.output.display()))?;
        let mut obs = SimOutputObserver::new(CsvWriter::new(Path::new(&args.output))?);
        let stats = sim.run_to_horizon(&mut obs)?;
        obs.finish(sim.metrics())?;
        stats
    };
    let elapsed = t0.elapsed();

    // 3. Report.
    println!(
        "Simulation complete in {:.3} s: {} events, stopped at {} ({} events pending)",
        elapsed.as_secs_f64(),
        stats.events,
        stats.final_time,
        stats.pending
    );
    println!();
    println!("{}", Summary::from_metrics(sim.metrics()));
    println!();
    print_histogram(&wait_histogram(sim.metrics().waiting_times(), args.bins));
    println!();
    print_utilization(sim.metrics().bus_utilization());

    if !args.no_output {
        println!();
        println!("Wrote boardings.csv and bus_utilization.csv to {}", args.output.display());
    }

    // 4. Optional capacity comparison.
    if !args.sweep.is_empty() {
        println!();
        println!("{:<10} {:>10} {:>14} {:>14}", "Capacity", "Served", "Mean wait", "Mean util");
        println!("{}", "-".repeat(51));
        for (capacity, metrics) in capacity_sweep(&dataset, &config, &args.sweep)? {
            let s = Summary::from_metrics(&metrics);
            println!(
                "{:<10} {:>10} {:>14.2} {:>14.2}",
                capacity, s.passengers_served, s.mean_wait, s.mean_utilization
            );
        }
    }

    Ok(())
}
