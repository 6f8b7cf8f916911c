//! The command surface the host drives: run, clear output, clear results,
//! clear graph.
//!
//! A [`Workspace`] owns the graph and the console transcript. Running
//! replaces the transcript with the new run's lines and writes every node's
//! result back onto the graph.

use blockflow_core::FlowGraph;

use crate::evaluator::{Evaluator, EvaluatorConfig, RunReport};

#[derive(Debug, Default)]
pub struct Workspace {
    graph: FlowGraph,
    config: EvaluatorConfig,
    transcript: Vec<String>,
}

impl Workspace {
    pub fn new(graph: FlowGraph) -> Self {
        Self::with_config(graph, EvaluatorConfig::default())
    }

    pub fn with_config(graph: FlowGraph, config: EvaluatorConfig) -> Self {
        Workspace {
            graph,
            config,
            transcript: Vec::new(),
        }
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// Mutable access for edits between runs.
    pub fn graph_mut(&mut self) -> &mut FlowGraph {
        &mut self.graph
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Console lines of the last run (empty after [`clear_output`](Self::clear_output)).
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Evaluates the graph from scratch and stores the results on it.
    pub fn run(&mut self) -> RunReport {
        self.graph.clear_results();
        let report = Evaluator::new(&self.graph, self.config.clone()).run();
        report.write_back(&mut self.graph);
        self.transcript = report.transcript.clone();
        report
    }

    /// Drops the console transcript only.
    pub fn clear_output(&mut self) {
        self.transcript.clear();
    }

    /// Resets every node's run state; the transcript stays.
    pub fn clear_results(&mut self) {
        self.graph.clear_results();
    }

    /// Drops nodes, edges and the transcript.
    pub fn clear_graph(&mut self) {
        self.graph.clear();
        self.transcript.clear();
    }
}
