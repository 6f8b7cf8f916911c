//! Per-node trace records.
//!
//! When [`EvaluatorConfig::record_trace`](super::EvaluatorConfig::record_trace)
//! is set, the evaluator records a [`TraceEntry`] each time a node finishes,
//! capturing the node, a description of its operation, the numeric inputs it
//! read and the value it produced.

use std::fmt;

use blockflow_core::{InputPort, NodeId, Value};

/// A single entry in the execution trace, recording one node evaluation.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub node_id: NodeId,
    pub key: String,
    /// Human-readable description of the operation, e.g. `binary divide`.
    pub op_description: String,
    /// Numeric inputs read by the node, in read order.
    pub inputs: Vec<(InputPort, f64)>,
    /// `None` when the node produced nothing.
    pub output: Option<Value>,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.node_id, self.key, self.op_description)?;
        for (port, value) in &self.inputs {
            write!(f, " {}={}", port, blockflow_core::format_number(*value))?;
        }
        match &self.output {
            Some(value) => write!(f, " -> {}", value),
            None => write!(f, " -> none"),
        }
    }
}
