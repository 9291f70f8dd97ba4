use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pitchcare", version, about = "Sports pitch turf-health tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API (default)
    Serve,
    /// Re-run interactive setup
    Init,
    /// Validate config and test the weather provider
    Check,
    /// List stored pitches
    List(ListArgs),
    /// Assess rain damage for one pitch
    Analyze { id: String },
    /// Record a completed maintenance round
    Maintenance { id: String },
    /// Record a turf replacement
    ChangeTurf { id: String },
    /// Evaluate every pitch
    Sweep,
}

#[derive(Args)]
#[group(multiple = false)]
pub struct ListArgs {
    /// Only pitches with maintenance scheduled
    #[arg(long)]
    pub maintenance: bool,

    /// Only pitches flagged for turf replacement
    #[arg(long)]
    pub replacement: bool,
}
