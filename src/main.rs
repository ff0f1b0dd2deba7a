// file: src/main.rs
// version: 1.0.0
// guid: b5d1f7a0-2c68-4e9b-8f34-a6e0c3d9b271

//! pkg-uploader - Main entry point

use clap::Parser;
use pkg_uploader::{
    cli::{
        args::{Cli, Commands},
        commands::*,
    },
    logging::logger,
};
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::init_logger(cli.verbose, cli.quiet, cli.log_json) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let config_path = cli.config.clone();
    let command_future = async {
        let config_path = config_path.as_deref();
        match cli.command {
            Commands::Upload(args) => upload_command(config_path, args).await,
            Commands::Plan { args, json } => plan_command(config_path, args, json).await,
            Commands::Check(args) => check_command(config_path, args).await,
        }
    };

    let code = tokio::select! {
        result = command_future => match result {
            Ok(code) => code,
            Err(e) => {
                error!("{}", e);
                e.exit_code()
            }
        },
        _ = signal::ctrl_c() => {
            warn!("Interrupted, stopping upload");
            130 // Standard exit code for Ctrl+C
        }
    };

    ExitCode::from(exit_byte(code))
}

/// Clamp an exit code into the range the OS accepts
fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
