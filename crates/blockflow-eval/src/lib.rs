//! Evaluation engine for blockflow graphs.
//!
//! - [`registry`]: arithmetic and conditional operation semantics.
//! - [`evaluator`]: memoized dependency resolution, branch routing and cycle
//!   rejection over a [`FlowGraph`](blockflow_core::FlowGraph).
//! - [`workspace`]: the run / clear command surface a host drives.

pub mod evaluator;
pub mod registry;
pub mod workspace;

pub use evaluator::{
    EvalError, Evaluator, EvaluatorConfig, NodeOutcome, NodeSink, RunReport, TraceEntry, Visit,
};
pub use workspace::Workspace;
