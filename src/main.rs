//! # Staffboard API Main Entry Point

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use staffboard::{config::ConfigLoader, db::init_pool, seeds, server::run_server, telemetry};

#[derive(Parser)]
#[command(name = "staffboard", version, about = "Staffboard API service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run pending migrations and start the HTTP server (default)
    Serve,
    /// Run pending migrations and exit
    Migrate,
    /// Insert demo data and exit
    Seed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;

    telemetry::init_tracing(&config)?;
    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            Migrator::up(&db, None).await?;
            tracing::info!("Migrations applied");
        }
        Command::Seed => {
            Migrator::up(&db, None).await?;
            seeds::seed_demo_data(&db).await?;
            tracing::info!("Demo data seeded");
        }
        Command::Serve => {
            Migrator::up(&db, None).await?;
            if config.seed_demo_data {
                seeds::seed_demo_data(&db).await?;
            }
            run_server(config, db).await?;
        }
    }

    Ok(())
}
