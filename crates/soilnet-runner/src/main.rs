//! SoilNet command-line runner.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use soilnet_link::{AckField, FieldSet, QueryField, ACK_FRAME_LEN, QUERY_FRAME_LEN};
use soilnet_runner::{init_logging, RunnerResult, Simulation, SimulationConfig, SimulationSummary};
use tracing::error;

/// SoilNet irrigation link simulator
#[derive(Parser, Debug)]
#[command(name = "soilnet", author, version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a Master and a Node over a simulated radio
    Simulate(SimulateArgs),

    /// Print the byte layout of both frame types
    Layout,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Simulation configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run, overriding the configuration
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Radio loss seed, overriding the configuration
    #[arg(short, long)]
    seed: Option<u64>,

    /// Per-byte loss probability, overriding the configuration
    #[arg(long)]
    loss: Option<f64>,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    soilnet_metrics::describe_metrics();

    let result = match cli.command {
        Commands::Simulate(args) => run_simulate(args),
        Commands::Layout => {
            print_layout();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_simulate(args: SimulateArgs) -> RunnerResult<()> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(loss) = args.loss {
        config.link.byte_loss_probability = loss;
    }

    let mut simulation = Simulation::new(config)?;
    let summary = simulation.run();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&summary),
    }
    Ok(())
}

fn print_summary(summary: &SimulationSummary) {
    println!("Ticks:              {} (seed {})", summary.ticks, summary.seed);
    println!(
        "Queries:            {} sent, {} received, {} misaligned",
        summary.queries_sent, summary.queries_received, summary.misaligned_queries
    );
    println!(
        "Acknowledgments:    {} sent, {} received, {} misaligned",
        summary.replies_sent, summary.telemetry_received, summary.misaligned_acks
    );
    println!(
        "Radio bytes:        downlink {} delivered / {} lost, uplink {} delivered / {} lost",
        summary.radio.downlink.delivered,
        summary.radio.downlink.dropped,
        summary.radio.uplink.delivered,
        summary.radio.uplink.dropped
    );
    if summary.round_trip.count > 0 {
        println!(
            "Round trip (ticks): min {} / mean {:.1} / max {}",
            summary.round_trip.min_ticks,
            summary.round_trip.mean_ticks(),
            summary.round_trip.max_ticks
        );
    }
    if let Some(telemetry) = &summary.last_telemetry {
        let r = &telemetry.readings;
        println!(
            "Last telemetry:     moisture {}%, {} C, humidity {}%, water {}, battery {:.1} V{}",
            r.moisture,
            r.temperature,
            r.humidity,
            r.water_level,
            telemetry.battery_volts(),
            if telemetry.battery_low() { " (low)" } else { "" }
        );
    }
}

fn print_layout() {
    println!("Query frame (Master -> Node), {} bytes", QUERY_FRAME_LEN);
    println!("  [0] sentinel 0x{:02X}", QueryField::SENTINEL);
    for &field in QueryField::ALL {
        println!("  [{}] {}", field.offset(), field.name());
    }
    println!();
    println!("Ack frame (Node -> Master), {} bytes", ACK_FRAME_LEN);
    println!("  [0] sentinel 0x{:02X}", AckField::SENTINEL);
    for &field in AckField::ALL {
        println!("  [{}] {}", field.offset(), field.name());
    }
}
