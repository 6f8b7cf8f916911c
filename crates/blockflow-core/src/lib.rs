//! Graph model for block-based flow programs.
//!
//! Nodes are blocks (literals, arithmetic, conditionals, console output,
//! file and image sources, pixel filters); edges carry values from a node's
//! output into a named input port of another node. Evaluation lives in
//! `blockflow-eval`; this crate only holds the data and its invariants.

pub mod id;
pub mod error;
pub mod port;
pub mod image;
pub mod value;
pub mod ops;
pub mod condition;
pub mod node;
pub mod edge;
pub mod graph;
pub mod snapshot;

// Re-export commonly used types
pub use id::{NodeId, EdgeId, ConditionId};
pub use error::CoreError;
pub use port::{InputPort, OutputPort};
pub use image::ImageData;
pub use value::{Literal, Value, format_number, parse_number};
pub use ops::{UnaryOp, BinaryOp, CmpOp, Connective, EdgeAlgorithm, ImageFilter};
pub use condition::{Condition, ConditionGroup};
pub use node::{Node, NodeKind, NodeState};
pub use edge::FlowEdge;
pub use graph::{EdgeView, FlowGraph};
pub use snapshot::{EdgeSpec, GraphSnapshot, NodeSpec};
