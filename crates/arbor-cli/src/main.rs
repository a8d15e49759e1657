//! Arbor CLI - behavior tree authoring and execution.
//!
//! - `arbor new` - write an empty tree
//! - `arbor validate` - check a tree document
//! - `arbor inspect` - print the tree shape and blackboard
//! - `arbor run` - tick a tree and print root statuses
//! - `arbor add` / `arbor key` - small structural edits

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use arbor_cli::{commands, ArborConfig};
use arbor_core::{NodeId, ValueType, Vec2};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Behavior tree authoring and execution", version)]
struct Cli {
    /// Config file (defaults to .arbor/config.yaml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a tree holding only its root node
    New {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load a tree and check its structure
    Validate { path: PathBuf },

    /// Print the tree shape and blackboard
    Inspect { path: PathBuf },

    /// Tick a tree and print the root status per tick
    Run {
        path: PathBuf,

        /// Number of ticks (overrides run.ticks)
        #[arg(long)]
        ticks: Option<u64>,

        /// Print start/stop/abort events after the run
        #[arg(long)]
        trace: bool,
    },

    /// Add a node of a built-in type
    Add {
        path: PathBuf,

        /// Node type tag (Sequence, Wait, Log...)
        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Link the new node under this node
        #[arg(long)]
        parent: Option<NodeId>,

        #[arg(long, default_value_t = 0.0)]
        x: f32,

        #[arg(long, default_value_t = 0.0)]
        y: f32,
    },

    /// Add a blackboard key
    Key {
        path: PathBuf,

        name: String,

        /// bool, int, float, string, vec2 or vec3
        #[arg(value_name = "TYPE")]
        value_type: ValueType,

        /// Initial value as JSON (e.g. 1.5, "hi", [1, 2])
        #[arg(long)]
        value: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ArborConfig::load(path)?,
        None => ArborConfig::load_from_project(&std::env::current_dir()?)?,
    };

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.log_filter)
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let output = match cli.command {
        Commands::New { path, force } => commands::new_tree(&path, force)?,
        Commands::Validate { path } => commands::validate(&path)?,
        Commands::Inspect { path } => commands::inspect(&path)?,
        Commands::Run { path, ticks, trace } => commands::run(&path, &config.run, ticks, trace)?,
        Commands::Add {
            path,
            type_name,
            parent,
            x,
            y,
        } => {
            let id = commands::add_node(&path, &type_name, parent, Vec2::new(x, y), &config.editor)?;
            format!("added {type_name} {id}")
        }
        Commands::Key {
            path,
            name,
            value_type,
            value,
        } => {
            let id = commands::add_key(&path, &name, value_type, value.as_deref())?;
            format!("added key {name} {id}")
        }
    };
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
