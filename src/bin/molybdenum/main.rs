//! molybdenum CLI tool
//!
//! Command-line interface for checking and editing reaction-network models stored as JSON.
//!
//! ## Commands
//!
//! - `check <model>`: Load a model and list invariant violations
//! - `graph <model>`: Print the graph payload an editor would display
//! - `sync <model> <graph>`: Reconcile the model with an edited graph payload
//! - `patch <model> <form>`: Apply form edits
//! - `sim <model> <form>`: Replace the simulation settings
//!
//! By default the updated model is printed to stdout. Use `--write` to write it back to the
//! model file instead.

use clap::{Parser, Subcommand};
use molybdenum_core::{
    config::EngineConfig,
    model::{GraphPayload, ReactionModel},
    patch::form_from_json,
};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "molybdenum")]
#[command(author, version, about = "A tool for reconciling reaction-network models", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a model and report any invariant violations
    Check {
        /// Path to the model JSON file
        model: PathBuf,
    },

    /// Print the graph payload regenerated from a model
    Graph {
        /// Path to the model JSON file
        model: PathBuf,
    },

    /// Reconcile a model with an edited graph payload
    Sync {
        /// Path to the model JSON file
        model: PathBuf,

        /// Path to the graph payload JSON file
        graph: PathBuf,

        /// Write the updated model back to the model file (default: print it)
        #[arg(short, long)]
        write: bool,

        /// Engine configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Apply form edits (`[["spec1_amt", ["12."]], ...]`) to a model
    Patch {
        /// Path to the model JSON file
        model: PathBuf,

        /// Path to the form edits JSON file
        form: PathBuf,

        /// Write the updated model back to the model file (default: print it)
        #[arg(short, long)]
        write: bool,

        /// Engine configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replace a model's simulation settings from form edits
    Sim {
        /// Path to the model JSON file
        model: PathBuf,

        /// Path to the form edits JSON file
        form: PathBuf,

        /// Write the updated model back to the model file (default: print it)
        #[arg(short, long)]
        write: bool,
    },
}

fn load_model(path: &Path) -> Result<ReactionModel, Box<dyn std::error::Error>> {
    tracing::debug!("Loading model from {:?}", path);
    Ok(ReactionModel::from_json(&read_to_string(path)?)?)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    })
}

fn emit_model(
    model: &ReactionModel,
    path: &Path,
    write_back: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if write_back {
        write(path, model.as_json())?;
        tracing::info!("Wrote {} to {:?}", model, path);
    } else {
        println!("{}", serde_json::to_string_pretty(&model.as_mapping())?);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { model } => {
            let loaded = load_model(&model)?;
            let violations = loaded.check_invariants();
            if violations.is_empty() {
                println!("{loaded}: ok");
            } else {
                for violation in violations.iter() {
                    eprintln!("  - {violation}");
                }
                eprintln!("{loaded}: {} invariant violation(s)", violations.len());
                std::process::exit(1);
            }
        }

        Commands::Graph { model } => {
            let loaded = load_model(&model)?;
            println!("{}", serde_json::to_string_pretty(&loaded.to_graph()?)?);
        }

        Commands::Sync {
            model,
            graph,
            write,
            config,
        } => {
            let mut loaded = load_model(&model)?;
            let config = load_config(config.as_deref())?;
            let payload = GraphPayload::from_json(&read_to_string(&graph)?)?;
            let report = loaded.sync_from_graph(&payload, &config)?;
            for event in report.events.iter() {
                tracing::debug!("{}", event);
            }
            for diagnostic in report.diagnostics.iter() {
                eprintln!("warning: {diagnostic}");
            }
            emit_model(&loaded, &model, write)?;
        }

        Commands::Patch {
            model,
            form,
            write,
            config,
        } => {
            let mut loaded = load_model(&model)?;
            let config = load_config(config.as_deref())?;
            let edits = form_from_json(&read_to_string(&form)?)?;
            let report = loaded.apply_patch_with_report(&edits, &config)?;
            for event in report.events.iter() {
                tracing::debug!("{}", event);
            }
            for key in report.skipped.iter() {
                eprintln!("skipped: {key} (no such entity)");
            }
            for error in report.rejected.iter() {
                eprintln!("rejected: {error}");
            }
            emit_model(&loaded, &model, write)?;
            if let Some(error) = report.rejected.into_iter().next() {
                return Err(error.into());
            }
        }

        Commands::Sim { model, form, write } => {
            let mut loaded = load_model(&model)?;
            let edits = form_from_json(&read_to_string(&form)?)?;
            loaded.set_sim_config(&edits)?;
            emit_model(&loaded, &model, write)?;
        }
    }

    Ok(())
}
