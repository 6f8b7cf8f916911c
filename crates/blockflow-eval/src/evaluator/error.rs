//! Structural errors raised while resolving a graph.
//!
//! Missing inputs and uncomputable operations are not errors; they resolve
//! to "no value". Only problems with the graph's shape land here.

use blockflow_core::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum EvalError {
    /// The listed nodes depend on each other. For cycles found during
    /// resolution the order follows the resolution stack; cycles found by the
    /// post-run scan are sorted by id.
    #[error("cycle detected through nodes [{}]", join_ids(.nodes))]
    Cycle { nodes: Vec<NodeId> },

    #[error("resolution depth limit ({limit}) exceeded at node {node}")]
    DepthLimitExceeded { node: NodeId, limit: usize },
}

impl EvalError {
    /// The nodes the error is about.
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            EvalError::Cycle { nodes } => nodes,
            EvalError::DepthLimitExceeded { node, .. } => std::slice::from_ref(node),
        }
    }
}

fn join_ids(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
