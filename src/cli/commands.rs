use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::path::RouteVerdict;
use crate::registry::keys::{generate_key, key_space};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for cprouter
///
/// Inspection helpers for paths, continuation keys and configuration.
#[derive(Parser, Debug)]
#[command(name = "cprouter")]
#[command(about = "Control-point router utilities", long_about = None, version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how a request path is tokenized and whether it would be routed
    Tokenize {
        /// Request path, e.g. /shop/cart?item=4
        path: String,

        /// Resume marker to recognise (default: from config/environment)
        #[arg(long)]
        marker: Option<String>,
    },
    /// Print sample continuation keys
    Keys {
        /// Key width in characters
        #[arg(short, long, default_value_t = 3)]
        width: usize,

        /// Number of keys to print
        #[arg(short, long, default_value_t = 5)]
        count: usize,
    },
    /// Print the effective runtime configuration as JSON
    Config {
        /// YAML config file; environment variables are applied on top
        #[arg(short, long, env = "CPR_CONFIG")]
        file: Option<PathBuf>,
    },
}

fn load_config(file: Option<&PathBuf>) -> Result<RuntimeConfig> {
    let base = match file {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    base.apply_env().context("applying environment overrides")
}

/// Execute a parsed command, writing results to `out`.
///
/// # Errors
///
/// Configuration load failures, invalid arguments, or write errors.
pub fn execute(command: &Commands, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Tokenize { path, marker } => {
            let marker = match marker {
                Some(marker) => marker.clone(),
                None => load_config(None)?.resume_marker,
            };
            let raw_path = path.split('?').next().unwrap_or("/");
            let verdict = RouteVerdict::for_path(raw_path);
            let resumes = match verdict.segments.as_slice() {
                [first, key, ..] if *first == marker => Some(key.clone()),
                _ => None,
            };
            let report = json!({
                "path": raw_path,
                "segments": verdict.segments,
                "routable": verdict.routable,
                "continuation_key": resumes,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Commands::Keys { width, count } => {
            anyhow::ensure!(*width > 0, "--width must be at least 1");
            writeln!(out, "# {} possible keys of width {width}", key_space(*width))?;
            for _ in 0..*count {
                writeln!(out, "{}", generate_key(*width))?;
            }
        }
        Commands::Config { file } => {
            let config = load_config(file.as_ref())?;
            writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
        }
    }
    Ok(())
}

/// Parse the process arguments and run the selected command.
///
/// # Errors
///
/// See [`execute`].
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &mut out)
}
