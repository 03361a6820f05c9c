use clap::Parser;
use declarest::cli::{run_cli, Cli};
use declarest::logging::{init_logging_with_config, LogConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = LogConfig::from_env();
    config.log_level = cli.log_level.clone();
    config.async_logging = false;
    if let Err(e) = init_logging_with_config(&config) {
        eprintln!("Warning: {e:#}");
    }

    match run_cli(&cli, &mut std::io::stdout().lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
