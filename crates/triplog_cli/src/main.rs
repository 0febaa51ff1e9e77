//! Command-line entry point for the trip store.
//!
//! # Responsibility
//! - Open the store from `TRIPLOG_*` configuration.
//! - Route add/edit through the entry form so the same validation applies.

use clap::{Parser, Subcommand};
use log::warn;
use std::process::ExitCode;
use triplog_core::{
    init_logging_from_config, parse_cost_input, CoreConfig, OfflineTripsRepository, Trip,
    TripDraftPatch, TripEntryForm, TripId, TripStore, TripsRepository,
};

#[derive(Parser, Debug)]
#[command(name = "triplog")]
#[command(about = "Track trips in a local SQLite store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every trip in insertion order
    List,
    /// Add a new trip
    Add {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        #[arg(long = "class")]
        fare_class: String,
        #[arg(long, default_value = "0")]
        cost: String,
    },
    /// Change fields of an existing trip
    Edit {
        id: TripId,
        #[arg(long)]
        origin: Option<String>,
        #[arg(long)]
        destination: Option<String>,
        #[arg(long = "class")]
        fare_class: Option<String>,
        #[arg(long)]
        cost: Option<String>,
    },
    /// Delete a trip by id
    Delete { id: TripId },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("triplog_core version={}", triplog_core::core_version());
        return ExitCode::SUCCESS;
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config).map_err(|err| err.to_string())?;
    if config.db_path.is_none() {
        warn!("event=cli_start module=cli status=warn reason=in_memory_db");
        eprintln!("note: TRIPLOG_DB_PATH is unset; using a temporary in-memory database");
    }

    let store = TripStore::open(&config).map_err(|err| err.to_string())?;
    let repo = OfflineTripsRepository::new(store.clone());
    let result = execute(command, repo).await;
    store.close().await.map_err(|err| err.to_string())?;
    result
}

async fn execute(command: Commands, repo: OfflineTripsRepository) -> Result<(), String> {
    match command {
        Commands::List => {
            let trips = repo.store().list().await.map_err(|err| err.to_string())?;
            if trips.is_empty() {
                println!("no trips");
            }
            for trip in trips {
                print_trip(&trip);
            }
            Ok(())
        }
        Commands::Add {
            origin,
            destination,
            fare_class,
            cost,
        } => {
            check_cost_input(&cost)?;
            let mut form = TripEntryForm::new(repo);
            let state = form.update_draft(
                TripDraftPatch::default()
                    .origin(origin)
                    .destination(destination)
                    .fare_class(fare_class)
                    .cost(cost),
            );
            if !state.is_valid {
                return Err("origin, destination and class must not be blank".to_string());
            }
            let id = form
                .save()
                .await
                .map_err(|err| err.to_string())?
                .ok_or("trip was not saved")?;
            println!("added trip {id}");
            Ok(())
        }
        Commands::Edit {
            id,
            origin,
            destination,
            fare_class,
            cost,
        } => {
            if let Some(cost) = cost.as_deref() {
                check_cost_input(cost)?;
            }
            let existing = repo
                .store()
                .find(id)
                .await
                .map_err(|err| err.to_string())?
                .ok_or_else(|| format!("no trip with id {id}"))?;
            let mut form = TripEntryForm::for_trip(repo, &existing);
            form.update_draft(TripDraftPatch {
                id: None,
                origin,
                destination,
                fare_class,
                cost,
            });
            match form.save_changes().await.map_err(|err| err.to_string())? {
                Some(_) => {
                    print_trip(&form.state().draft.to_trip());
                    Ok(())
                }
                None => Err("origin, destination and class must not be blank".to_string()),
            }
        }
        Commands::Delete { id } => {
            let removed = repo
                .delete_trip_by_id(id)
                .await
                .map_err(|err| err.to_string())?;
            if removed == 0 {
                println!("no trip with id {id}");
            } else {
                println!("deleted trip {id}");
            }
            Ok(())
        }
    }
}

/// The form keeps the previous cost on bad text; a one-shot command rejects it.
fn check_cost_input(raw: &str) -> Result<(), String> {
    match parse_cost_input(raw) {
        Some(_) => Ok(()),
        None => Err(format!(
            "cost must be a non-negative whole number, got `{raw}`"
        )),
    }
}

fn print_trip(trip: &Trip) {
    println!(
        "{:>4}  {} -> {}  [{}]  {}",
        trip.id,
        trip.origin,
        trip.destination,
        trip.fare_class,
        trip.formatted_cost()
    );
}

#[cfg(test)]
mod tests {
    use super::{check_cost_input, Cli, Commands};
    use clap::Parser;

    #[test]
    fn cost_input_must_be_whole_number() {
        assert!(check_cost_input("500").is_ok());
        assert!(check_cost_input("0").is_ok());

        let err = check_cost_input("abc").unwrap_err();
        assert!(err.contains("`abc`"));
        assert!(check_cost_input("-5").is_err());
        assert!(check_cost_input("").is_err());
    }

    #[test]
    fn add_parses_class_flag_and_default_cost() {
        let cli = Cli::try_parse_from([
            "triplog",
            "add",
            "--origin",
            "Guatemala",
            "--destination",
            "Pimocha",
            "--class",
            "Premium",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Add {
                fare_class, cost, ..
            }) => {
                assert_eq!(fare_class, "Premium");
                assert_eq!(cost, "0");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
