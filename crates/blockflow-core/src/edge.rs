//! Edge weights of the flow graph.
//!
//! An edge carries one node's output into another node's named input. The
//! endpoints themselves are stored by petgraph; the weight only records
//! which ports the edge connects.

use serde::{Deserialize, Serialize};

use crate::port::{InputPort, OutputPort};

/// A directed, port-addressed data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Which output of the source node (only if-nodes have more than one).
    pub source_port: OutputPort,
    /// Which input of the target node.
    pub target_port: InputPort,
}

impl FlowEdge {
    pub fn new(source_port: OutputPort, target_port: InputPort) -> Self {
        FlowEdge {
            source_port,
            target_port,
        }
    }

    /// An edge from the implicit output into `target_port`.
    pub fn into_port(target_port: InputPort) -> Self {
        FlowEdge::new(OutputPort::Default, target_port)
    }

    /// Returns `true` if this edge leaves through an if-node branch port.
    pub fn is_branch(&self) -> bool {
        matches!(self.source_port, OutputPort::True | OutputPort::False)
    }
}
