//! blockflow command-line host.
//!
//! Provides the `blockflow` binary. `run` loads a graph snapshot, attaches
//! text files and decoded images to source nodes, evaluates the graph,
//! prints the console transcript and optionally writes processed images.
//! `check` loads a snapshot and reports structural problems without running.

mod payload;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blockflow_core::{FlowGraph, GraphSnapshot, NodeId};
use blockflow_eval::{EvaluatorConfig, Workspace};

use payload::{parse_assignment, Assignment};

/// Block-based flow program runner.
#[derive(Parser)]
#[command(name = "blockflow", about = "Run block-based flow graphs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Evaluate a graph and print its console output.
    Run {
        /// Path to the graph snapshot (JSON).
        #[arg(short, long)]
        graph: PathBuf,

        /// Attach a text file to a file-source node: KEY=PATH.
        #[arg(long = "text", value_parser = parse_assignment)]
        texts: Vec<Assignment>,

        /// Attach an image to an image-source node: KEY=PATH.
        #[arg(long = "image", value_parser = parse_assignment)]
        images: Vec<Assignment>,

        /// Write every processed image as <key>.png into this directory.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print a per-node evaluation trace to stderr.
        #[arg(long)]
        trace: bool,

        /// Maximum resolution depth.
        #[arg(long, default_value_t = EvaluatorConfig::default().max_depth)]
        max_depth: usize,
    },
    /// Load a graph and report cycles and ignored edges without running it.
    Check {
        /// Path to the graph snapshot (JSON).
        #[arg(short, long)]
        graph: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run {
            graph,
            texts,
            images,
            out_dir,
            trace,
            max_depth,
        } => {
            let config = EvaluatorConfig {
                record_trace: trace,
                max_depth,
            };
            run_graph(&graph, &texts, &images, out_dir.as_deref(), config)
        }
        Commands::Check { graph } => check_graph(&graph),
    };
    process::exit(exit_code);
}

/// Reads and validates a snapshot file.
fn load_graph(path: &Path) -> Result<FlowGraph, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;
    let snapshot = GraphSnapshot::from_json(&json)
        .map_err(|e| format!("failed to load '{}': {}", path.display(), e))?;
    FlowGraph::from_snapshot(&snapshot)
        .map_err(|e| format!("invalid graph in '{}': {}", path.display(), e))
}

/// Execute the run subcommand.
///
/// Returns exit code: 0 = success, 1 = structural errors during the run,
/// 3 = I/O or snapshot error.
fn run_graph(
    graph_path: &Path,
    texts: &[Assignment],
    images: &[Assignment],
    out_dir: Option<&Path>,
    config: EvaluatorConfig,
) -> i32 {
    let mut graph = match load_graph(graph_path) {
        Ok(g) => g,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };

    for assignment in texts {
        if let Err(e) = payload::attach_text(&mut graph, assignment) {
            eprintln!("Error: {}", e);
            return 3;
        }
    }
    for assignment in images {
        if let Err(e) = payload::attach_image(&mut graph, assignment) {
            eprintln!("Error: {}", e);
            return 3;
        }
    }

    let mut workspace = Workspace::with_config(graph, config);
    let report = workspace.run();

    for line in &report.transcript {
        println!("{}", line);
    }
    if let Some(trace) = &report.trace {
        for entry in trace {
            eprintln!("trace: {}", entry);
        }
    }

    if let Some(dir) = out_dir {
        match payload::save_outputs(workspace.graph(), dir) {
            Ok(written) => tracing::info!(count = written.len(), "wrote processed images"),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 3;
            }
        }
    }

    if report.is_clean() {
        0
    } else {
        eprintln!("Run finished with {} error(s):", report.errors.len());
        for err in &report.errors {
            eprintln!("  - {}", describe_nodes(workspace.graph(), err));
        }
        1
    }
}

/// Execute the check subcommand.
///
/// Edges that a run would ignore are listed as notes and do not affect the
/// exit code. Returns exit code: 0 = no problems, 1 = cycles found, 3 = I/O or
/// snapshot error.
fn check_graph(graph_path: &Path) -> i32 {
    let graph = match load_graph(graph_path) {
        Ok(g) => g,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };

    for view in graph.unread_edges() {
        eprintln!(
            "note: edge {} -> {} ({}) is never read",
            key_of(&graph, view.source),
            key_of(&graph, view.target),
            view.edge.target_port
        );
    }

    let cycles = graph.cycles();
    if cycles.is_empty() {
        println!(
            "ok: {} node(s), {} edge(s), {} source(s)",
            graph.node_count(),
            graph.edge_count(),
            graph.sources().len()
        );
        return 0;
    }

    eprintln!("Found {} cycle(s):", cycles.len());
    for cycle in &cycles {
        eprintln!("  - {}", keys(&graph, cycle).join(" -> "));
    }
    1
}

/// Renders an evaluation error with node keys instead of raw ids.
fn describe_nodes(graph: &FlowGraph, err: &blockflow_eval::EvalError) -> String {
    format!("{} ({})", err, keys(graph, err.nodes()).join(", "))
}

fn keys(graph: &FlowGraph, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| key_of(graph, id)).collect()
}

fn key_of(graph: &FlowGraph, id: NodeId) -> String {
    graph
        .node(id)
        .map(|n| n.key.clone())
        .unwrap_or_else(|| id.to_string())
}
