//! Stockroom Command-Line Tool
//!
//! Prints the catalog schema and checks data directories against it.

mod commands;
mod error;
mod formatter;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use formatter::OutputFormat;

/// Stockroom Command-Line Tool
#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(version, about = "Stockroom catalog schema tools")]
pub struct Args {
    /// Storage configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", value_enum, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print entities, fields and relations
    Schema {
        /// Only print this entity
        #[arg(short, long)]
        entity: Option<String>,
    },
    /// Open a data directory, verify its schema and count rows
    Check {
        /// Data directory (overrides the config file path)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stockroom=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let formatter = formatter::create_formatter(args.format);

    let output = match args.command {
        Command::Schema { entity } => commands::schema(formatter.as_ref(), entity.as_deref())?,
        Command::Check { data } => {
            let mut config = commands::load_config(args.config.as_deref())?;
            if let Some(data) = data {
                config.path = data;
            }
            commands::check(formatter.as_ref(), config)?
        }
    };

    println!("{}", output);
    Ok(())
}
