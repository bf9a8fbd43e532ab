//! EVAS - Entry Point
//!
//! Binary entry point of the artifact server. Lives in the `evas` facade so
//! every provider crate is linked and its module registrations are visible.

// Force-link evas-providers so its linkme registrations are included
extern crate evas_providers;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use evas_infrastructure::config::ConfigLoader;
use evas_infrastructure::error_ext::ErrorTree;
use evas_server::{RunOptions, load_config, run};

/// Command line interface for EVAS
#[derive(Parser, Debug)]
#[command(name = "evas")]
#[command(about = "Entity Value Aggregate Server - artifact lifecycle runtime")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Artifact root directory, overriding `server.root`
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            config_path: self.config.clone(),
            root: self.root.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.run_options();

    if cli.print_config {
        let rendered = load_config(&options).and_then(|config| ConfigLoader::to_toml(&config));
        return match rendered {
            Ok(toml) => {
                println!("{toml}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("{}", ErrorTree(&error));
                ExitCode::FAILURE
            }
        };
    }

    run(options).await
}
