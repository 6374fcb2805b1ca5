use std::fs;
use std::time::Instant;

use clap::Parser;
use log::warn;

use raloha_sim::{AlohaSimulation, SimulationConfig};

#[derive(Parser, Debug)]
#[clap(about = "Reservation-ALOHA protocol simulation", long_about = None)]
struct Args {
    /// JSON file with simulation parameters (defaults are used if omitted)
    #[clap(short, long)]
    config: Option<String>,

    /// Random seed override
    #[clap(short, long)]
    seed: Option<u64>,

    /// Number of stations override
    #[clap(long)]
    stations: Option<usize>,

    /// Target run length (packets processed) override
    #[clap(short, long)]
    run_length: Option<u64>,

    /// Output file for run statistics (JSON)
    #[clap(short, long)]
    output: Option<String>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config: SimulationConfig = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).expect("Failed to read config file");
            serde_json::from_str(&raw).expect("Failed to parse config file")
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(stations) = args.stations {
        config.station_count = stations;
    }
    if let Some(run_length) = args.run_length {
        config.run_length = run_length;
    }

    let mut sim = AlohaSimulation::new(config);
    let t = Instant::now();
    if !sim.run() {
        warn!("simulation ran out of events before reaching the target run length");
    }
    let stats = sim.stats();
    stats.print_summary();
    println!(
        "Processed {} events in {:.2?} ({:.0} events/sec)",
        sim.event_count(),
        t.elapsed(),
        sim.event_count() as f64 / t.elapsed().as_secs_f64()
    );

    if let Some(path) = args.output {
        fs::write(&path, serde_json::to_string_pretty(&stats).unwrap())
            .expect("Failed to write output file");
    }
}
