use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pwvault::cli::commands;
use pwvault::cli::{output, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("PWVAULT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("pwvault=debug")
        } else {
            EnvFilter::new("pwvault=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match &cli.command {
        None | Some(Commands::Open) => commands::open::execute(&cli),
        Some(Commands::Init) => commands::init::execute(&cli),
        Some(Commands::Migrate { legacy_file, force }) => {
            commands::migrate::execute(&cli, legacy_file, *force)
        }
        Some(Commands::RotateKey) => commands::rotate::execute(&cli),
        Some(Commands::Audit { last, since }) => {
            commands::audit_cmd::execute(&cli, *last, since.as_deref())
        }
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
