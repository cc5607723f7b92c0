use clap::Parser;
use iptv_manager::logging::{self, LogHandle};
use iptv_manager::manager::{EXIT_FAILURE, EXIT_SUCCESS};
use iptv_manager::{ConfigStore, IptvManager};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Download and maintain IPTV playlists.
#[derive(Parser)]
#[command(name = "iptv-manager", version, disable_version_flag = true)]
#[command(about = "Download and maintain IPTV playlists", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Show the current playlist files without downloading
    #[arg(short, long)]
    status: bool,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

/// Main entry point for the application.
///
/// # Steps
/// 1. Loads and validates the configuration
/// 2. Creates the directory layout, starts logging and replays what
///    happened while the configuration was loaded
/// 3. Either prints the status report or runs one download pass
///
/// Exits with 0 when every source succeeded and 1 otherwise.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let store = match ConfigStore::load(&cli.config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Initialization failed: {}", e);
            return ExitCode::from(EXIT_FAILURE as u8);
        }
    };

    let _log = match start_logging(&store) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Initialization failed: {}", e);
            return ExitCode::from(EXIT_FAILURE as u8);
        }
    };
    store.log_load_events();

    let manager = match IptvManager::new(store) {
        Ok(manager) => manager,
        Err(e) => {
            error!("Initialization failed: {}", e);
            return ExitCode::from(EXIT_FAILURE as u8);
        }
    };

    if cli.status {
        println!("{}", manager.status());
        return ExitCode::from(EXIT_SUCCESS as u8);
    }

    let code = manager.run().await;
    info!(code, "Run finished");
    ExitCode::from(code as u8)
}

/// Creates the directory layout and installs logging into its log directory.
fn start_logging(store: &ConfigStore) -> iptv_manager::error::Result<LogHandle> {
    let config = store.config();
    config.directories.create_all()?;
    logging::init_logging(&config.logging, &config.directories.log_path())
}
