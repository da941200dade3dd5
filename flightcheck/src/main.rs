use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use eu261::compensation::{compensation_for_distance, estimate_compensation_from_delay_only};
use eu261::jurisdiction::eu_carrier_name;
use eu261::{EligibleFlightQuery, EuJurisdiction};
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod input;
mod observability;

use config::Config;

#[derive(Parser)]
#[command(name = "flightcheck", about = "EU261 compensation eligibility for flight data")]
struct Cli {
    /// YAML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Annotate every flight with its eligibility and compensation.
    Classify { input: PathBuf },
    /// Eligible flights within the lookback window, longest delay first.
    Eligible {
        input: PathBuf,
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long)]
        airline: Option<String>,
        /// 0 means unlimited.
        #[arg(long)]
        max: Option<usize>,
    },
    /// Look one flight up by number and check its eligibility.
    Check {
        input: PathBuf,
        #[arg(long)]
        flight: String,
        /// Scheduled departure date, YYYY-MM-DD.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Counts of disrupted and eligible flights.
    Summary { input: PathBuf },
    /// Major EU airports from the reference data.
    Airports {
        #[arg(long, default_value_t = 30)]
        limit: usize,
    },
    /// Compensation amount for a distance, or a delay-only estimate.
    Compensation(CompensationArgs),
    /// Whether an airport or carrier code falls under EU261.
    Lookup {
        #[arg(long)]
        airport: Option<String>,
        #[arg(long)]
        carrier: Option<String>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct CompensationArgs {
    #[arg(long)]
    distance_km: Option<u32>,
    #[arg(long)]
    delay_minutes: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Input(#[from] input::InputError),
    #[error(transparent)]
    Observability(#[from] observability::ObservabilityError),
    #[error("could not write output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn run(command: CliCommand, config: &Config) -> Result<(), CliError> {
    let (jurisdiction, classifier) = eu261::build(&config.eu261);

    match command {
        CliCommand::Classify { input } => {
            let flights = input::load_flights(&input)?;
            print_json(&classifier.annotate_all(&flights))
        }
        CliCommand::Eligible {
            input,
            hours,
            airline,
            max,
        } => {
            let defaults = &config.eu261.eligible_flights;
            let query = EligibleFlightQuery {
                lookback_hours: hours.unwrap_or(defaults.lookback_hours),
                airline_filter: airline.or_else(|| defaults.airline_filter.clone()),
                max_results: max.unwrap_or(defaults.max_results),
            };
            let flights = input::load_flights(&input)?;
            print_json(&classifier.eligible_flights(&flights, &query, Utc::now()))
        }
        CliCommand::Check {
            input,
            flight,
            date,
        } => {
            let flights = input::load_flights(&input)?;
            print_json(&classifier.check_flight(&flights, &flight, date))
        }
        CliCommand::Summary { input } => {
            let flights = input::load_flights(&input)?;
            print_json(&classifier.summarize(&flights))
        }
        CliCommand::Airports { limit } => print_json(&jurisdiction.major_eu_airports(limit)),
        CliCommand::Compensation(CompensationArgs {
            distance_km: Some(distance_km),
            ..
        }) => print_json(&json!({
            "distance_km": distance_km,
            "compensation_amount_eur": compensation_for_distance(distance_km),
        })),
        CliCommand::Compensation(CompensationArgs { delay_minutes, .. }) => {
            let delay_minutes = delay_minutes.unwrap_or_default();
            print_json(&json!({
                "delay_minutes": delay_minutes,
                "compensation_amount_eur": estimate_compensation_from_delay_only(delay_minutes),
                "estimate": "delay_only",
            }))
        }
        CliCommand::Lookup { airport, carrier } => {
            let mut result = serde_json::Map::new();
            if let Some(code) = airport {
                result.insert("airport_in_eu".into(), jurisdiction.is_airport_in_eu(&code).into());
                result.insert("airport".into(), code.into());
            }
            if let Some(code) = carrier {
                result.insert("eu_carrier".into(), jurisdiction.is_eu_carrier(&code).into());
                result.insert("carrier_name".into(), eu_carrier_name(&code).into());
                result.insert("carrier".into(), code.into());
            }
            print_json(&result)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let _sentry_guard = match observability::init_logging(&config.common.logging) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(metrics) = &config.common.metrics {
        if let Err(err) = observability::init_metrics(metrics) {
            tracing::error!(error = %err, "could not set up metrics");
            return ExitCode::FAILURE;
        }
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "flightcheck failed");
            ExitCode::FAILURE
        }
    }
}
