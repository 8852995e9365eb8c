//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drive Media - Browse and stream a cloud-drive movie and TV library
#[derive(Parser, Debug)]
#[command(name = "drive-media")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind to (overrides config)
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Scan the drive library once and print or save the result
    Scan {
        /// Output path for library.json (prints a summary otherwise)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Parse media file or folder names
    Parse {
        /// Names to parse
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,

        /// Treat names as show folder names
        #[arg(long, conflicts_with = "season")]
        folder: bool,

        /// Treat names as season folder names
        #[arg(long)]
        season: bool,
    },

    /// Convert a subtitle file to WebVTT
    Convert {
        /// Path to the subtitle file
        #[arg(value_name = "SUBTITLE")]
        input: PathBuf,

        /// Output path (defaults to the input with a .vtt extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Run preflight checks only
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand() {
        let cli = Cli::parse_from(["drive-media", "parse", "--folder", "Show (2005)"]);
        match cli.command {
            Commands::Parse { names, folder, season } => {
                assert_eq!(names, vec!["Show (2005)".to_string()]);
                assert!(folder);
                assert!(!season);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["drive-media", "serve", "--verbose", "--skip-preflight"]);
        assert!(cli.verbose);
        assert!(cli.skip_preflight);
        assert!(matches!(cli.command, Commands::Serve { bind: None }));
    }
}
