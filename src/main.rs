mod api;
mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;

use clap::Parser;
use cli::{Cli, Commands, ListArgs};
use config::Config;
use datasources::VisualCrossingClient;
use db::{Database, PitchFilter};
use error::Result;
use logic::{PitchService, TurfHealthEngine};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Serve);

    if let Commands::Init = command {
        let (_, path) = Config::setup_interactive()?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli.config, needs_weather(&command))?;
    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;

    match command {
        Commands::Serve => api::serve(&config, db).await,
        Commands::Check => check(&config, &db).await,
        command => {
            let client = VisualCrossingClient::new(config.weather.clone())?;
            let service = PitchService::new(db, TurfHealthEngine::new(client));
            run_pitch_command(&service, command).await
        }
    }
}

fn needs_weather(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Serve | Commands::Check | Commands::Analyze { .. } | Commands::Sweep
    )
}

/// Commands that never query the weather provider run without a config file.
fn load_config(path: &Option<std::path::PathBuf>, required: bool) -> Result<Config> {
    if required || Config::exists(path.as_ref()) {
        Config::load(path.clone())
    } else {
        Ok(Config::default())
    }
}

async fn check(config: &Config, db: &Database) -> Result<()> {
    println!("Database: {}", db.path().display());

    if !config.weather.has_api_key() {
        println!("Visual Crossing: NOT CONFIGURED (weather.api_key)");
        return Ok(());
    }

    let client = VisualCrossingClient::new(config.weather.clone())?;
    match client.test_connection().await {
        Ok(true) => println!("Visual Crossing: OK"),
        Ok(false) => println!("Visual Crossing: REJECTED (check the API key)"),
        Err(e) => println!("Visual Crossing: OFFLINE ({})", e),
    }
    Ok(())
}

async fn run_pitch_command(
    service: &PitchService<VisualCrossingClient>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::List(ListArgs {
            maintenance,
            replacement,
        }) => {
            let filter = if maintenance {
                PitchFilter::MaintenanceScheduled
            } else if replacement {
                PitchFilter::NeedsTurfReplacement
            } else {
                PitchFilter::All
            };
            print_json(&service.list(filter)?)
        }
        Commands::Analyze { id } => {
            let (pitch, evaluation) = service.analyze(&id).await?;
            print_json(&serde_json::json!({ "pitch": pitch, "evaluation": evaluation }))
        }
        Commands::Maintenance { id } => print_json(&service.do_maintenance(&id)?),
        Commands::ChangeTurf { id } => print_json(&service.change_turf(&id)?),
        Commands::Sweep => print_json(&service.sweep().await?),
        Commands::Serve | Commands::Init | Commands::Check => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
