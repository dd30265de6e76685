// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # micro-rt
//!
//! Command-line interface for the arena interpreter.
//!
//! ## Usage
//! ```bash
//! # Print tensors, operators and buffer lifetimes
//! micro-rt inspect --model ./graph.json
//!
//! # Allocate into a recording arena and report usage per category
//! micro-rt plan --model ./graph.json --arena-size 16K --placement linear
//!
//! # Fill every input with 21, invoke three times, print outputs and timings
//! micro-rt run --model ./graph.json --arena-size 16K --input 21 --iterations 3
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "micro-rt",
    about = "Arena-planned interpreter for small operator graphs",
    version,
    author
)]
struct Cli {
    /// Path to a TOML runtime configuration. CLI arguments override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a graph's tensors, operators and buffer lifetimes.
    Inspect {
        /// Path to the JSON graph manifest.
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Allocate a graph and report arena usage by category.
    Plan {
        /// Path to the JSON graph manifest.
        #[arg(short, long)]
        model: PathBuf,

        /// Arena size (e.g. "16K", "1M").
        #[arg(short, long)]
        arena_size: Option<String>,

        /// Placement strategy: greedy-first-fit, linear.
        #[arg(short, long)]
        placement: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Invoke a graph with the mock kernels.
    Run {
        /// Path to the JSON graph manifest.
        #[arg(short, long)]
        model: PathBuf,

        /// Arena size (e.g. "16K", "1M").
        #[arg(short, long)]
        arena_size: Option<String>,

        /// Placement strategy: greedy-first-fit, linear.
        #[arg(short, long)]
        placement: Option<String>,

        /// Value for each graph input, in order. The last value repeats.
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        input: Vec<f64>,

        /// Number of invocations.
        #[arg(long, default_value_t = 1)]
        iterations: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { model } => commands::inspect::execute(model),
        Commands::Plan {
            model,
            arena_size,
            placement,
            json,
        } => {
            let config = commands::load_config(cli.config.as_deref(), arena_size, placement)?;
            commands::plan::execute(model, config, json)
        }
        Commands::Run {
            model,
            arena_size,
            placement,
            input,
            iterations,
        } => {
            let config = commands::load_config(cli.config.as_deref(), arena_size, placement)?;
            commands::run::execute(model, config, input, iterations)
        }
    }
}
