mod cli;
mod dates;
mod error;
mod exporter;
mod fmt;
mod importer;
mod models;
mod reconciler;
mod settings;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands, SettingsCommands};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            expenses,
            vat,
            output,
            expenses_header,
            vat_header,
            sheet,
            quiet,
        } => cli::run::run(cli::run::RunArgs {
            expenses,
            vat,
            output,
            expenses_header,
            vat_header,
            sheet,
            quiet,
        }),
        Commands::Preview {
            file,
            kind,
            header,
            rows,
            sheet,
        } => cli::preview::run(&file, kind, header, rows, sheet),
        Commands::Settings { command } => match command {
            SettingsCommands::Show => cli::config::show(),
            SettingsCommands::Set { key, value } => cli::config::set(&key, &value),
            SettingsCommands::Reset => cli::config::reset(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
