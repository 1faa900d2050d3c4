use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use transfer_patterns::driver::{BatchConfig, run_batch};
use transfer_patterns::network::{StopId, load_network};
use transfer_patterns::search::SearchConfig;

/// Precompute transfer patterns from every stop of a transit network.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Preprocessed network file (routes, footpaths, transfer edges).
    network: PathBuf,

    /// Directory receiving one pattern file per source stop.
    #[arg(short, long, default_value = "patterns")]
    output: PathBuf,

    /// Maximum vehicle-to-vehicle transfers per journey.
    #[arg(long, default_value_t = 3)]
    max_transfers: usize,

    /// Also seed departures reachable by one footpath from the source.
    #[arg(long)]
    walk_from_source: bool,

    /// Log every reconstructed itinerary.
    #[arg(long)]
    trace_itineraries: bool,

    /// Worker threads; zero means one per core.
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Restrict the batch to these source stops (repeatable).
    #[arg(long = "source")]
    sources: Vec<u32>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let network = match load_network(&args.network) {
        Ok(network) => network,
        Err(err) => {
            eprintln!("failed to load network: {err}");
            return ExitCode::FAILURE;
        }
    };

    let search = SearchConfig {
        max_transfers: args.max_transfers,
        walk_from_source: args.walk_from_source,
        trace_itineraries: args.trace_itineraries,
    };
    let batch = BatchConfig {
        output_dir: args.output,
        threads: args.threads,
        sources: if args.sources.is_empty() {
            None
        } else {
            Some(args.sources.into_iter().map(StopId).collect())
        },
    };

    let report = match run_batch(&network, search, &batch) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("batch failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{} sources done in {:.1?}, {} failed",
        report.completed,
        report.elapsed,
        report.failed.len()
    );
    if report.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        for failure in &report.failed {
            eprintln!("stop {}: {}", failure.source, failure.reason);
        }
        ExitCode::FAILURE
    }
}
