//! Command-line driver: load a problem, build its dependency graph, and
//! optionally print summaries or emit a DOT rendering.
//!
//! Usage:
//!   opgraph problem.json
//!   opgraph problem.json --dot               (writes problem.dot)
//!   opgraph problem.json --dot=out.dot --summary --order

use anyhow::{Context, Result};
use clap::Parser;
use opgraph_core::display::write_dot_file;
use opgraph_core::{load_problem, Graph};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "opgraph", about = "Inspect the op/tensor dependency graph of a problem file")]
struct Cli {
    /// Problem description (JSON)
    input: PathBuf,

    /// Emit graph as DOT. Uses <input>.dot when no path is given.
    #[arg(long, value_name = "PATH", num_args = 0..=1, value_parser = non_empty_path)]
    dot: Option<Option<PathBuf>>,

    /// Print producer/consumers/boundary flags for every tensor
    #[arg(long)]
    summary: bool,

    /// Print a topological order of the ops
    #[arg(long)]
    order: bool,
}

impl Cli {
    fn dot_path(&self) -> Option<PathBuf> {
        match &self.dot {
            None => None,
            Some(Some(path)) => Some(path.clone()),
            Some(None) => Some(derive_dot_path(&self.input)),
        }
    }
}

fn non_empty_path(raw: &str) -> Result<PathBuf, String> {
    if raw.is_empty() {
        return Err("expected a non-empty path".to_string());
    }
    Ok(PathBuf::from(raw))
}

/// Swaps the input's extension for `.dot`, or appends it when there is none.
fn derive_dot_path(input: &Path) -> PathBuf {
    input.with_extension("dot")
}

/// Runs the driver, writing the report to `out`.
fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let problem = load_problem(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    let graph = Graph::new(&problem)
        .with_context(|| format!("building dependency graph for {}", cli.input.display()))?;

    writeln!(out, "Graph summary: {} ops, {} tensors.", graph.num_ops(), graph.num_tensors())?;

    if cli.summary {
        for neighborhood in graph.describe_all_tensors()? {
            writeln!(out, "  {neighborhood}")?;
        }
    }

    if cli.order {
        let order = graph.topological_order()?;
        let ops: Vec<String> = order.iter().map(|op| op.0.to_string()).collect();
        writeln!(out, "Topological order: [{}]", ops.join(", "))?;
    }

    match cli.dot_path() {
        Some(path) => {
            write_dot_file(&graph, &path)?;
            writeln!(out, "DOT file written to: {}", path.display())?;
        }
        None => writeln!(out, "DOT output disabled. Pass --dot to emit graph output.")?,
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli, &mut io::stdout().lock())
}
