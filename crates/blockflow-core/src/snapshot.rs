//! Snapshot form of a flow graph, as handed over by the host application.
//!
//! A [`GraphSnapshot`] is the `{nodes, edges}` pair the editor keeps in its
//! shared state: nodes addressed by string keys, edges by endpoint keys and
//! optional handle names. It carries structure and payloads only; run state
//! is rebuilt by the evaluator.

use serde::{Deserialize, Serialize};

use crate::edge::FlowEdge;
use crate::error::CoreError;
use crate::graph::FlowGraph;
use crate::node::NodeKind;
use crate::port::{InputPort, OutputPort};

/// A node entry: its key plus its tagged kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// An edge entry. Missing handles mean the unnamed ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<OutputPort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<InputPort>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

impl GraphSnapshot {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FlowGraph {
    /// Builds a graph from a snapshot, applying the same validation as the
    /// builder methods (unique keys, one edge per input port, no self-loops).
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<FlowGraph, CoreError> {
        let mut graph = FlowGraph::new();
        for entry in &snapshot.nodes {
            graph.add_node(entry.id.clone(), entry.kind.clone())?;
        }
        for entry in &snapshot.edges {
            let from = graph.require_key(&entry.source)?;
            let to = graph.require_key(&entry.target)?;
            let edge = FlowEdge::new(
                entry.source_handle.unwrap_or_default(),
                entry.target_handle.unwrap_or(InputPort::Default),
            );
            graph.add_edge(from, to, edge)?;
        }
        Ok(graph)
    }

    /// Captures the graph's structure and payloads (not its run state).
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .nodes()
            .map(|(_, node)| NodeSpec {
                id: node.key.clone(),
                kind: node.kind.clone(),
            })
            .collect();
        let key_of = |id| self.node(id).map(|n| n.key.clone()).unwrap_or_default();
        let edges = self
            .edge_views()
            .into_iter()
            .map(|view| EdgeSpec {
                source: key_of(view.source),
                target: key_of(view.target),
                source_handle: match view.edge.source_port {
                    OutputPort::Default => None,
                    port => Some(port),
                },
                target_handle: match view.edge.target_port {
                    InputPort::Default => None,
                    port => Some(port),
                },
            })
            .collect();
        GraphSnapshot { nodes, edges }
    }
}
