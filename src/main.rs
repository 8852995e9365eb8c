//! Drive Media CLI
//!
//! Serves a cloud-drive folder tree as a movie and TV library.

use clap::Parser;
use drive_media::cli::{
    args::{Cli, Commands},
    commands::{
        convert,
        parse::{self, ParseKind},
        scan, serve,
    },
};
use drive_media::models::config::{load_config, Config};
use drive_media::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = load_config();

    // Run the appropriate command
    match cli.command {
        Commands::Serve { bind } => {
            if !cli.skip_preflight {
                run_preflight_checks(&config).await?;
            }
            serve::serve(&config, bind.as_deref()).await?;
        }

        Commands::Scan { output } => {
            if !cli.skip_preflight {
                run_preflight_checks(&config).await?;
            }
            scan::scan(&config, output.as_deref()).await?;
        }

        Commands::Parse { names, folder, season } => {
            let kind = if folder {
                ParseKind::ShowFolder
            } else if season {
                ParseKind::SeasonFolder
            } else {
                ParseKind::File
            };
            parse::parse_names(&names, kind)?;
        }

        Commands::Convert { input, output } => {
            convert::convert(&input, output.as_deref())?;
        }

        Commands::Check => {
            run_preflight_checks(&config).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("drive_media=debug,tower_http=debug")
    } else {
        EnvFilter::new("drive_media=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(config: &Config) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config).await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
