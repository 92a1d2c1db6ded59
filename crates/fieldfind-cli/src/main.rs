//! fieldfind command-line front end
//!
//! Loads a TOML class model into the in-memory registry and runs member
//! lookups against it.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::{classes, query};

#[derive(Parser)]
#[command(name = "fieldfind")]
#[command(about = "Declarative member lookup over class models", long_about = None)]
#[command(version)]
struct Cli {
    /// Show timing and remedy diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve members of a class
    Query(query::QueryArgs),

    /// List the classes of a model and their declared fields
    Classes {
        /// Class model file
        model: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fieldfind=debug,fieldfind_cli=debug"
    } else {
        "fieldfind=warn,fieldfind_cli=warn"
    };
    let filter =
        EnvFilter::try_from_env("FIELDFIND_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let choice = output::resolve_color_choice(cli.color.as_deref());

    match cli.command {
        Commands::Query(args) => {
            if !query::execute(&args, choice)? {
                std::process::exit(1);
            }
        }

        Commands::Classes { model, json } => {
            classes::execute(&model, json, choice)?;
        }
    }

    Ok(())
}
