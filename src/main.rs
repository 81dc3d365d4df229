use addon_sync::commands::*;
use addon_sync::core::{config::Settings, error::Result, print_error};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "addon-sync")]
#[command(about = "Keeps the add-on metadata cache in step with the add-on list")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Directory containing the add-on list (overrides the stored setting)
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass
    Sync,
    /// Reconcile now, then again whenever the add-on list changes
    Watch,
    /// Show cached add-ons grouped by parent
    Status,
    /// Delete the cache file so the next pass rebuilds it
    Reset,
    /// Show settings, or store the base directory
    Config {
        /// Persist this directory as the default base directory
        #[arg(long, value_name = "DIR")]
        set_base_dir: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag; RUST_LOG still wins when set
    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load_or_default()?.with_base_dir(cli.base_dir);

    match cli.command {
        Commands::Sync => execute_sync(&settings),
        Commands::Watch => execute_watch(&settings),
        Commands::Status => execute_status(&settings),
        Commands::Reset => execute_reset(&settings),
        Commands::Config { set_base_dir } => execute_config(&settings, set_base_dir),
    }
}
