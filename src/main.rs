//! Sortie - Entry Point
//!
//! Builds one mission, generates a single flight and prints the flight
//! summary handed to the briefing generator as JSON.

use std::path::PathBuf;

use clap::Parser;
use sortie::core::config::GeneratorConfig;
use sortie::core::error::Result;
use sortie::data::GameData;
use sortie::flight::{FlightState, GroundState};
use sortie::mission::{FlightRequest, Mission};
use sortie::plan::TaskKind;

/// Generate one flight and print its summary
#[derive(Parser, Debug)]
#[command(name = "sortie")]
#[command(about = "Generate a flight and print its briefing summary as JSON")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Unit id from the data set
    #[arg(long, default_value = "jg51")]
    unit: String,

    /// Task: free, patrol, cover or sweep
    #[arg(long, default_value = "patrol")]
    task: TaskKind,

    /// Initial state: start, taxi, runway, or an air fraction in 0..=1
    #[arg(long, default_value = "start", value_parser = parse_state)]
    state: FlightState,

    /// Number of planes (unit default when omitted)
    #[arg(long)]
    planes: Option<usize>,

    /// Generate a virtual flight
    #[arg(long = "virtual")]
    virtual_flight: bool,

    /// Player flight
    #[arg(long)]
    player: bool,

    /// Generator config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Static data set (TOML), bundled sample when omitted
    #[arg(long)]
    data: Option<PathBuf>,

    /// Emit debug location icons for AI flights
    #[arg(long)]
    debug: bool,
}

fn parse_state(value: &str) -> std::result::Result<FlightState, String> {
    match value.to_lowercase().as_str() {
        "start" => Ok(FlightState::Ground(GroundState::Start)),
        "taxi" => Ok(FlightState::Ground(GroundState::Taxi)),
        "runway" => Ok(FlightState::Ground(GroundState::Runway)),
        other => other
            .parse::<f64>()
            .ok()
            .filter(|f| (0.0..=1.0).contains(f))
            .map(FlightState::Air)
            .ok_or_else(|| format!("invalid state: {other}")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sortie=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    let data = match &args.data {
        Some(path) => GameData::load_from_toml(path)?,
        None => GameData::sample()?,
    };

    tracing::info!(seed, unit = %args.unit, task = %args.task, "Sortie starting...");

    let mut mission = Mission::new(config, data, seed)?;
    mission.debug = args.debug;

    let mut request = FlightRequest::new(args.unit, args.task).with_state(args.state);
    if let Some(planes) = args.planes {
        request = request.with_planes(planes);
    }
    if args.player {
        request = request.with_player();
    }
    if args.virtual_flight {
        request = request.with_virtual();
    }

    let id = mission.make_flight(request)?;
    if let Some(summary) = mission.summary(id) {
        println!("{}", summary.to_json()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("Runway"), Ok(FlightState::Ground(GroundState::Runway)));
        assert_eq!(parse_state("0.25"), Ok(FlightState::Air(0.25)));
        assert!(parse_state("1.5").is_err());
        assert!(parse_state("parked").is_err());
    }
}
