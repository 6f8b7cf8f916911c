//! Core error types for blockflow-core.
//!
//! Uses `thiserror` for structured, matchable variants covering the failure
//! modes of building and editing a flow graph. Evaluation never produces a
//! `CoreError`; missing inputs are a normal graph state.

use thiserror::Error;

use crate::id::{EdgeId, NodeId};
use crate::port::InputPort;

/// Errors produced while constructing or mutating a [`FlowGraph`](crate::graph::FlowGraph).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A node index was not found in the graph.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// No node is registered under the given external key.
    #[error("unknown node key: '{key}'")]
    UnknownNodeKey { key: String },

    /// A node with this external key already exists.
    #[error("duplicate node key: '{key}'")]
    DuplicateNodeKey { key: String },

    /// An edge index was not found in the graph.
    #[error("edge not found: EdgeId({id})", id = id.0)]
    EdgeNotFound { id: EdgeId },

    /// A second edge was wired into an input port that already has one.
    #[error("input port '{port}' of node {node} is already connected")]
    PortOccupied { node: NodeId, port: InputPort },

    /// An edge failed validation.
    #[error("invalid edge: {reason}")]
    InvalidEdge { reason: String },

    /// A port handle string did not name any known port.
    #[error("unknown port handle: '{handle}'")]
    UnknownPort { handle: String },

    /// An RGBA buffer's length does not match `width * height * 4`.
    #[error("invalid image buffer: {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidImage {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// A condition group does not have exactly one connective between
    /// consecutive conditions.
    #[error("condition group has {conditions} condition(s) but {connectives} connective(s)")]
    InvalidConditionGroup {
        conditions: usize,
        connectives: usize,
    },

    /// A graph snapshot could not be parsed.
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The requested edit does not apply to this node's kind.
    #[error("node {node} is a {kind} node: {reason}")]
    KindMismatch {
        node: NodeId,
        kind: &'static str,
        reason: String,
    },
}
