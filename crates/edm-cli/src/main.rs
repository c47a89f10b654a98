//! # edm-cli
//!
//! `edm` loads schema documents, builds a registry over them, and either
//! checks every element for definition errors or prints one resolved element.

mod check;
mod config;
mod show;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::CliConfig;
use edm_core::Edm;
use edm_csdl::SchemaLoader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit status for unusable input: bad config, unreadable documents
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "edm")]
#[command(about = "Check and inspect EDM schema documents")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory searched for referenced schemas; may be repeated
    #[arg(short = 'I', long = "include", global = true)]
    include: Vec<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every element and report definition errors
    Check {
        /// Schema documents to load
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the kind and resolved shape of one element
    Show {
        /// Schema documents to load
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Qualified name of the element, e.g. Org.Sales.Customer
        #[arg(short, long)]
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Check { files } => build_edm(&cli, files).map(|edm| check::run(&edm)),
        Commands::Show { files, name } => {
            build_edm(&cli, files).and_then(|edm| show::run(&edm, name))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the documents and their references into a fresh registry
///
/// Search paths come from `-I`, then the config file, then the directories of
/// the given documents.
fn build_edm(cli: &Cli, files: &[PathBuf]) -> anyhow::Result<Edm> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    let mut search_paths = cli.include.clone();
    search_paths.extend(config.search_paths.iter().cloned());
    for file in files {
        if let Some(dir) = file.parent() {
            let dir = if dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                dir.to_path_buf()
            };
            if !search_paths.contains(&dir) {
                search_paths.push(dir);
            }
        }
    }

    info!("Loading {} schema documents", files.len());
    let provider = SchemaLoader::new(search_paths)
        .load_provider(files)
        .context("loading schema documents")?;
    info!("Loaded {} schemas", provider.len());
    Ok(Edm::with_config(Arc::new(provider), config.edm_config()))
}
