mod cache;
mod cli;
mod cmd;
mod config;
mod definition;
mod error;
mod library;
mod normalize;
mod precompute;
mod server;
mod session;
mod status;

use std::process::ExitCode;

use clap::Parser;

use self::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.quiet {
        status::disable();
    }

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.run(),
        Commands::Play(cmd) => cmd.run(),
        Commands::Inspect(cmd) => cmd.run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,

        Err(e) => {
            eprintln!("printnet: {e:#}");

            ExitCode::FAILURE
        }
    }
}
