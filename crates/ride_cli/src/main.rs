use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ride_core::config::LatencyConfig;
use ride_core::{Coordinate, Location, RideClass, RideRequest, RideServices, ServiceConfig};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ride",
    about = "Quote, book and track simulated rides",
    long_about = "Drives the ride-hailing domain services from the command line.\n\
                  Every command prints its result as JSON on stdout; logs go to stderr."
)]
struct Cli {
    /// Seed every simulated service for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Sleep for realistic backend latency on every call
    #[arg(long, global = true)]
    simulate_latency: bool,
    /// JSON service configuration (defaults to RIDE_* environment variables)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Trip {
    /// Origin as `lat,lng`
    #[arg(long, allow_hyphen_values = true)]
    from: Coordinate,
    /// Destination as `lat,lng`
    #[arg(long, allow_hyphen_values = true)]
    to: Coordinate,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a route estimate
    Route(Trip),
    /// ETA in minutes, without a path
    Eta(Trip),
    /// Estimate the fare for one ride class
    Fare {
        #[command(flatten)]
        trip: Trip,
        #[arg(long, default_value = "standard")]
        class: RideClass,
    },
    /// Price one route under every ride class
    Compare(Trip),
    /// List simulated drivers near a point
    Drivers {
        #[arg(long, allow_hyphen_values = true)]
        at: Coordinate,
        #[arg(long)]
        class: Option<RideClass>,
    },
    /// Look up one driver by id
    Driver { id: String },
    /// Request a ride and get an assigned driver
    Request {
        #[command(flatten)]
        trip: Trip,
        #[arg(long, default_value = "standard")]
        class: RideClass,
        /// Free-text note for the driver (validated before booking)
        #[arg(long)]
        notes: Option<String>,
        /// Attach a fare quote to the request
        #[arg(long)]
        quote: bool,
    },
    /// Current status of a ride
    Status { ride_id: String },
    /// Cancel a ride
    Cancel { ride_id: String },
    /// Rider note tools
    #[command(subcommand)]
    Notes(NotesCommand),
    /// Location lookup
    #[command(subcommand)]
    Locate(LocateCommand),
}

#[derive(Subcommand)]
enum NotesCommand {
    Analyze { text: String },
    Validate { text: String },
    Suggest,
}

#[derive(Subcommand)]
enum LocateCommand {
    Resolve { address: String },
    Current,
    Suggest { input: String },
    Recent,
}

// ── Entry point ────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    debug!(seed = ?config.seed, "services configured");
    let services = RideServices::from_config(config);
    run(cli.command, &services).await
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ServiceConfig::from_json_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ServiceConfig::from_env().context("reading RIDE_* environment")?,
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.simulate_latency {
        config = config.with_latency(LatencyConfig::simulated());
    }
    Ok(config)
}

async fn run(command: Commands, services: &RideServices) -> Result<()> {
    match command {
        Commands::Route(trip) => {
            let (from, to) = trip.locations();
            print_json(&services.routes.compute_route(&from, &to).await?)
        }
        Commands::Eta(trip) => {
            let (from, to) = trip.locations();
            let minutes = services.routes.eta_minutes(&from, &to).await?;
            print_json(&serde_json::json!({ "eta_minutes": minutes }))
        }
        Commands::Fare { trip, class } => {
            let (from, to) = trip.locations();
            print_json(&services.fares.estimate_fare(&from, &to, class, None).await?)
        }
        Commands::Compare(trip) => {
            let (from, to) = trip.locations();
            print_json(&services.fares.compare_fares(&from, &to).await?)
        }
        Commands::Drivers { at, class } => {
            print_json(&services.drivers.find_nearby(&Location::at(at), class).await?)
        }
        Commands::Driver { id } => print_json(&services.drivers.lookup(&id).await?),
        Commands::Request {
            trip,
            class,
            notes,
            quote,
        } => {
            let (from, to) = trip.locations();
            let mut request = RideRequest::new(from, to, class);
            if let Some(notes) = notes {
                let validation = services.notes.validate(&notes);
                if let Some(reason) = validation.reason {
                    anyhow::bail!("{reason}");
                }
                request = request.with_notes(notes);
            }
            if quote {
                let route = services
                    .routes
                    .compute_route(&request.pickup, &request.dropoff)
                    .await?;
                let fare = services
                    .fares
                    .estimate_fare(&request.pickup, &request.dropoff, class, Some(&route))
                    .await?;
                request = request.with_route(route).with_fare(fare);
            }
            print_json(&services.rides.request_ride(&request).await?)
        }
        Commands::Status { ride_id } => print_json(&services.rides.get_status(&ride_id).await?),
        Commands::Cancel { ride_id } => print_json(&services.rides.cancel_ride(&ride_id).await?),
        Commands::Notes(NotesCommand::Analyze { text }) => {
            print_json(&services.notes.analyze(&text))
        }
        Commands::Notes(NotesCommand::Validate { text }) => {
            print_json(&services.notes.validate(&text))
        }
        Commands::Notes(NotesCommand::Suggest) => print_json(&services.notes.suggestions()),
        Commands::Locate(LocateCommand::Resolve { address }) => {
            print_json(&services.geocoder.resolve_address(&address).await?)
        }
        Commands::Locate(LocateCommand::Current) => {
            print_json(&services.geocoder.current_location().await?)
        }
        Commands::Locate(LocateCommand::Suggest { input }) => {
            print_json(&services.geocoder.suggestions(&input).await?)
        }
        Commands::Locate(LocateCommand::Recent) => {
            print_json(&services.geocoder.recent_locations().await?)
        }
    }
}

impl Trip {
    fn locations(&self) -> (Location, Location) {
        (Location::at(self.from), Location::at(self.to))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_longitudes_and_classes() {
        let cli = Cli::try_parse_from([
            "ride", "--seed", "7", "fare", "--from", "40.7128,-74.0060", "--to",
            "-33.86,151.2", "--class", "xl",
        ])
        .expect("parse");
        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Commands::Fare { trip, class } => {
                assert_eq!(class, RideClass::BlessedXL);
                assert_eq!(trip.to.lat, -33.86);
            }
            _ => panic!("expected fare"),
        }
    }

    #[test]
    fn seed_flag_overrides_config() {
        let cli = Cli::try_parse_from(["ride", "--seed", "3", "notes", "suggest"]).expect("parse");
        let config = load_config(&cli).expect("config");
        assert_eq!(config.seed, Some(3));
    }
}
