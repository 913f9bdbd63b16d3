//! One-shot migration of all user data from the legacy service into a fresh
//! local schema. Destructive: drops and recreates every table after operator
//! confirmation. Run it from the project root:
//!
//! ```text
//! cargo run --bin rosterd-migrate
//! ```

use rosterd::config::Config;
use rosterd::db::Storage;
use rosterd::error::RosterError;
use rosterd::service::migration::{MigrationOutcome, MigrationRunner, StdinConfirmation};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let storage = match Storage::connect(&config.database()).await {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut runner = match MigrationRunner::new(config, storage, Box::new(StdinConfirmation)) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("failed to initialize migration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runner.run().await {
        Ok(MigrationOutcome::Completed) => {
            println!("Database initialized!");
            ExitCode::SUCCESS
        }
        Ok(MigrationOutcome::Declined) => {
            println!("Exiting without making changes.");
            ExitCode::SUCCESS
        }
        Err(RosterError::RemoteCall(failure)) => {
            eprintln!("{failure}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("An error occurred: {e}");
            ExitCode::FAILURE
        }
    }
}
