//! Evaluator state: visit markers, memo cache, resolution stack and the
//! top-level walk.
//!
//! Each node moves through `Unvisited -> InProgress -> (Done | Failed)` at
//! most once per run. `Done` nodes answer from the memo cache without
//! re-emitting console lines; `Failed` nodes read as missing. Meeting an
//! `InProgress` node means the graph loops back on itself.
//!
//! The evaluator only borrows the graph. Results are collected in a
//! [`RunReport`] and written back through a [`NodeSink`] afterwards.

use std::collections::{HashMap, HashSet};

use blockflow_core::{FlowGraph, InputPort, NodeId, OutputPort, Value};

use super::error::EvalError;
use super::trace::TraceEntry;

/// Configuration for the evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Whether to record a [`TraceEntry`] per finished node.
    pub record_trace: bool,
    /// Maximum depth of the resolution stack. Default: 512.
    ///
    /// Nodes on the stack when the limit trips are marked failed for the
    /// rest of the run, even if the walk reaches them again from a shallower
    /// start.
    pub max_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            record_trace: false,
            max_depth: 512,
        }
    }
}

/// Per-run visit marker. Unvisited nodes have no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    InProgress,
    Done,
    Failed,
}

/// What one finished node produced.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutcome {
    pub node: NodeId,
    pub key: String,
    pub value: Option<Value>,
    /// Console lines emitted by the node, in emission order.
    pub lines: Vec<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Console lines of all nodes, in node completion order.
    pub transcript: Vec<String>,
    pub errors: Vec<EvalError>,
    /// Finished nodes in completion order. Failed nodes are absent.
    pub outcomes: Vec<NodeOutcome>,
    /// Present when tracing was enabled.
    pub trace: Option<Vec<TraceEntry>>,
}

impl RunReport {
    /// Returns `true` if the run hit no structural errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn outcome(&self, node: NodeId) -> Option<&NodeOutcome> {
        self.outcomes.iter().find(|o| o.node == node)
    }

    /// Numeric value produced by `node`, if any.
    pub fn number(&self, node: NodeId) -> Option<f64> {
        self.outcome(node)?.value.as_ref()?.as_number()
    }

    /// Resets the sink, then stores every outcome on it.
    pub fn write_back(&self, sink: &mut impl NodeSink) {
        sink.reset_all();
        for outcome in &self.outcomes {
            sink.store(outcome.node, outcome.value.clone(), &outcome.lines);
        }
    }
}

/// Where run results end up. The host's shared state implements this; the
/// evaluator itself never mutates the graph.
pub trait NodeSink {
    /// Clears result, processed flag and output on every node.
    fn reset_all(&mut self);
    /// Stores one node's result and output, marking it processed.
    fn store(&mut self, node: NodeId, value: Option<Value>, lines: &[String]);
}

impl NodeSink for FlowGraph {
    fn reset_all(&mut self) {
        self.clear_results();
    }

    fn store(&mut self, node: NodeId, value: Option<Value>, lines: &[String]) {
        if let Some(n) = self.node_mut(node) {
            n.store(value, lines);
        }
    }
}

/// Result of dispatching one node.
#[derive(Debug, Default)]
pub(super) struct Evaluated {
    pub(super) value: Option<Value>,
    pub(super) lines: Vec<String>,
    pub(super) inputs: Vec<(InputPort, f64)>,
}

/// Memoized, cycle-checking evaluator for one run over a [`FlowGraph`].
pub struct Evaluator<'g> {
    pub(super) graph: &'g FlowGraph,
    config: EvaluatorConfig,
    visits: HashMap<NodeId, Visit>,
    /// Values of `Done` nodes.
    memo: HashMap<NodeId, Option<Value>>,
    /// Nodes currently being resolved, outermost first.
    stack: Vec<NodeId>,
    report: RunReport,
}

impl<'g> Evaluator<'g> {
    pub fn new(graph: &'g FlowGraph, config: EvaluatorConfig) -> Self {
        let report = RunReport {
            trace: config.record_trace.then(Vec::new),
            ..RunReport::default()
        };
        Evaluator {
            graph,
            config,
            visits: HashMap::new(),
            memo: HashMap::new(),
            stack: Vec::new(),
            report,
        }
    }

    /// Current visit marker of a node (`None` means unvisited).
    pub fn visit(&self, node: NodeId) -> Option<Visit> {
        self.visits.get(&node).copied()
    }

    /// Evaluates the whole graph.
    ///
    /// Walks downstream from every source node in insertion order, depth
    /// first in edge id order, resolving each reached node. An error stops
    /// the walk below the failing node only. Afterwards, any cycle the walk
    /// could not see is reported too.
    pub fn run(mut self) -> RunReport {
        for view in self.graph.unread_edges() {
            tracing::debug!(
                edge = %view.id,
                source = %view.source,
                target = %view.target,
                port = %view.edge.target_port,
                "edge is never read"
            );
        }

        let mut walked = HashSet::new();
        for source in self.graph.sources() {
            self.walk(source, &mut walked);
        }
        self.report_unseen_cycles();

        tracing::info!(
            nodes = self.graph.node_count(),
            finished = self.report.outcomes.len(),
            errors = self.report.errors.len(),
            lines = self.report.transcript.len(),
            "run complete"
        );
        self.report
    }

    fn walk(&mut self, start: NodeId, walked: &mut HashSet<NodeId>) {
        let mut pending = vec![start];
        while let Some(node) = pending.pop() {
            if !walked.insert(node) {
                continue;
            }
            if let Err(error) = self.resolve(node) {
                tracing::warn!(node = %node, "{}", error);
                self.report.errors.push(error);
                continue;
            }
            // Reversed so the lowest edge id is walked first.
            for view in self.graph.outgoing(node).into_iter().rev() {
                pending.push(view.target);
            }
        }
    }

    fn report_unseen_cycles(&mut self) {
        for cycle in self.graph.cycles() {
            let seen = self.report.errors.iter().any(|e| {
                matches!(e, EvalError::Cycle { .. }) && e.nodes().iter().all(|n| cycle.contains(n))
            });
            if !seen {
                let error = EvalError::Cycle { nodes: cycle };
                tracing::warn!("{}", error);
                self.report.errors.push(error);
            }
        }
    }

    /// Resolves a node's value, evaluating it on first request.
    pub fn resolve(&mut self, node: NodeId) -> Result<Option<Value>, EvalError> {
        match self.visit(node) {
            Some(Visit::Done) => return Ok(self.memo.get(&node).cloned().flatten()),
            Some(Visit::Failed) => return Ok(None),
            Some(Visit::InProgress) => {
                let start = self.stack.iter().position(|&n| n == node).unwrap_or(0);
                return Err(EvalError::Cycle {
                    nodes: self.stack[start..].to_vec(),
                });
            }
            None => {}
        }
        // The node itself stays unvisited; only the frames unwinding above
        // it are marked failed.
        if self.stack.len() >= self.config.max_depth {
            return Err(EvalError::DepthLimitExceeded {
                node,
                limit: self.config.max_depth,
            });
        }

        self.visits.insert(node, Visit::InProgress);
        self.stack.push(node);
        let result = self.dispatch(node);
        self.stack.pop();

        match result {
            Ok(evaluated) => {
                let value = evaluated.value.clone();
                self.finish(node, evaluated);
                Ok(value)
            }
            Err(error) => {
                self.visits.insert(node, Visit::Failed);
                Err(error)
            }
        }
    }

    fn finish(&mut self, node: NodeId, evaluated: Evaluated) {
        let Evaluated {
            value,
            lines,
            inputs,
        } = evaluated;
        let key = self
            .graph
            .node(node)
            .map(|n| n.key.clone())
            .unwrap_or_default();

        tracing::debug!(
            node = %node,
            key = %key,
            value = ?value.as_ref().map(|v| v.to_string()),
            "node finished"
        );

        if let Some(trace) = self.report.trace.as_mut() {
            trace.push(TraceEntry {
                node_id: node,
                key: key.clone(),
                op_description: self
                    .graph
                    .node(node)
                    .map(|n| super::dispatch::describe(&n.kind))
                    .unwrap_or_default(),
                inputs,
                output: value.clone(),
            });
        }

        self.visits.insert(node, Visit::Done);
        self.memo.insert(node, value.clone());
        self.report.transcript.extend(lines.iter().cloned());
        self.report.outcomes.push(NodeOutcome {
            node,
            key,
            value,
            lines,
        });
    }

    /// Resolves whatever is wired into `port` of `node`.
    ///
    /// Unwired ports are missing. An edge leaving an if-node through its
    /// `true`/`false` port carries the if-node's result only when that port
    /// is the active one; the inactive port reads as missing.
    pub(super) fn resolve_input(
        &mut self,
        node: NodeId,
        port: InputPort,
    ) -> Result<Option<Value>, EvalError> {
        let Some(view) = self.graph.input(node, port) else {
            return Ok(None);
        };
        let value = self.resolve(view.source)?;
        let branching = self
            .graph
            .node(view.source)
            .is_some_and(|n| n.kind.is_branching());
        let result = value.as_ref().and_then(Value::as_number);
        let active = match view.edge.source_port {
            OutputPort::Default => true,
            OutputPort::True => branching && result == Some(1.0),
            OutputPort::False => branching && result == Some(0.0),
        };
        Ok(if active { value } else { None })
    }

    /// Resolves `port` and reads it as a number, recording it for the trace.
    pub(super) fn numeric(
        &mut self,
        node: NodeId,
        port: InputPort,
        inputs: &mut Vec<(InputPort, f64)>,
    ) -> Result<Option<f64>, EvalError> {
        let number = self
            .resolve_input(node, port)?
            .and_then(|v| v.as_number());
        if let Some(n) = number {
            inputs.push((port, n));
        }
        Ok(number)
    }

    /// Returns `true` if some edge targets `port` of `node`.
    pub(super) fn is_wired(&self, node: NodeId, port: InputPort) -> bool {
        self.graph.input(node, port).is_some()
    }
}
