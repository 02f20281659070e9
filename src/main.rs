mod api;
mod articles;
mod cli;
mod collection;
mod config;
mod db;
mod error;
mod music;
mod podcasts;
mod query;
mod server;
mod stats;
mod utils;

use cli::Cli;
use config::{Config, CONFIG};
use db::Database;
use directories::ProjectDirs;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use log::{debug, error};

fn main() {
    let Some(project_dirs) = ProjectDirs::from("", "", "somana") else {
        eprintln!("Could not determine the application data directory");
        std::process::exit(1);
    };

    let config = Config::load_config(&project_dirs);
    let log_spec = config.logging.log_spec();
    let db_path = config.database.resolve_path(project_dirs.data_local_dir());
    let _ = CONFIG.set(config);

    // Keep the handle alive so the file writer flushes on exit
    let _logger = match setup_logging(&project_dirs, &log_spec) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

    Database::configure(db_path);

    if let Err(err) = Cli::handle_command_line() {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn setup_logging(
    project_dirs: &ProjectDirs,
    log_spec: &str,
) -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    let log_dir = project_dirs.data_local_dir().join("logs");

    Logger::try_with_str(log_spec)?
        .log_to_file(FileSpec::default().directory(log_dir).basename("somana"))
        .rotate(
            Criterion::Size(10 * 1024 * 1024),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(5),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .start()
}
