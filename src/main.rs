mod commands;

use bkcfg::{logger, sysexits};
use clap::Parser;
use commands::{Cli, Commands};
use std::process;

/// Entry point for the bkcfg CLI application.
/// Parses command-line arguments and dispatches to the appropriate command handler.
fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(&cli.log_level) {
        eprintln!("bkcfg: failed to initialize logging: {e}");
        process::exit(sysexits::EX_SOFTWARE);
    }

    let result = match cli.commands.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => {
            commands::run(cli.config, cli.config_yaml, cli.base_dir, dry_run)
        }
        Commands::Check { print } => commands::check(cli.config, cli.config_yaml, print),
    };

    if let Err(e) = result {
        eprintln!("bkcfg: {e}");
        let code = e
            .downcast_ref::<bkcfg::Error>()
            .map_or(sysexits::EX_SOFTWARE, bkcfg::Error::exit_code);
        process::exit(code);
    }
}
